pub mod batch;
pub mod extractor;
pub mod inspect;
pub mod output;
pub mod pipeline;
