mod config;
mod core;
mod decoder;
mod error;
mod matting;
mod shared;
mod utils;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{Overrides, PipelineConfig};
use crate::core::{batch, extractor, inspect, pipeline};
use crate::utils::logger;

#[derive(Parser)]
#[command(author, version, about = "Sample video frames and cut out their white background", long_about = None)]
struct Cli {
    /// JSON file with default tunables; flags override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for debug.log and error.log
    #[arg(long, global = true, default_value = ".")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SamplingArgs {
    /// Frames to keep per second of video
    #[arg(short, long)]
    rate: Option<u32>,
}

#[derive(Args)]
struct MattingArgs {
    /// Distance from pure white still treated as background (0-100)
    #[arg(short, long)]
    tolerance: Option<u32>,
    /// Odd edge blur kernel size, 0 for hard edges
    #[arg(short, long)]
    feather: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract frames from video at a fixed rate
    Extract {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output_dir: PathBuf,
        #[command(flatten)]
        sampling: SamplingArgs,
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Remove the white background from every image in a directory
    Matte {
        #[arg(short, long)]
        input_dir: PathBuf,
        #[arg(short, long)]
        output_dir: PathBuf,
        #[command(flatten)]
        matting: MattingArgs,
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Extract and matte in one pass
    Process {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Also keep the unmatted frames here
        #[arg(long)]
        raw_dir: Option<PathBuf>,
        #[command(flatten)]
        sampling: SamplingArgs,
        #[command(flatten)]
        matting: MattingArgs,
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Print video metadata and the sampling cadence as JSON
    Inspect {
        #[arg(short, long)]
        input: PathBuf,
        #[command(flatten)]
        sampling: SamplingArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(&cli.log_dir);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Error registering Ctrl-C handler")?;

    let result = run(cli, &running);
    if let Err(e) = &result {
        logger::error(&format!("{:#}", e));
    }
    result
}

fn run(cli: Cli, running: &AtomicBool) -> Result<()> {
    let base = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract { input, output_dir, sampling, prefix } => {
            let config = base.apply(Overrides { sample_rate: sampling.rate, prefix, ..Overrides::default() });
            let summary = extractor::extract_frames(&input, &output_dir, &config, running)?;
            report_frames(&summary, "frames extracted", &output_dir);
            print_json(&summary)
        }
        Commands::Matte { input_dir, output_dir, matting, prefix } => {
            let config = base.apply(Overrides {
                tolerance: matting.tolerance,
                feather_radius: matting.feather,
                prefix,
                ..Overrides::default()
            });
            let summary = batch::matte_directory(&input_dir, &output_dir, &config, running)?;
            if summary.is_empty() {
                println!("No images found in {}", input_dir.display());
            } else {
                println!("Matted {} of {} images -> {}", summary.processed, summary.found, output_dir.display());
            }
            print_json(&summary)
        }
        Commands::Process { input, output_dir, raw_dir, sampling, matting, prefix } => {
            let config = base.apply(Overrides {
                sample_rate: sampling.rate,
                tolerance: matting.tolerance,
                feather_radius: matting.feather,
                prefix,
            });
            let summary = pipeline::process_video(&input, &output_dir, raw_dir.as_deref(), &config, running)?;
            report_frames(&summary, "frames matted", &output_dir);
            print_json(&summary)
        }
        Commands::Inspect { input, sampling } => {
            let config = base.apply(Overrides { sample_rate: sampling.rate, ..Overrides::default() });
            config.validate_sampling()?;
            print_json(&inspect::inspect(&input, config.sample_rate)?)
        }
    }
}

fn report_frames(summary: &extractor::ExtractSummary, what: &str, output_dir: &Path) {
    if summary.interrupted {
        println!("Interrupted.");
    }
    if summary.is_empty() {
        println!("No frames matched the sampling cadence in {}", summary.source);
        return;
    }
    println!(
        "{} {} (every {} of {} decoded) -> {}",
        summary.frames_saved,
        what,
        summary.interval,
        summary.frames_decoded,
        output_dir.display()
    );
    if !summary.decode_faults.is_empty() {
        println!("Skipped {} undecodable frame(s); see the log for indices", summary.decode_faults.len());
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
