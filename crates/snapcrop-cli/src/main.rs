// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Snapcrop: detect a sheet of paper in a photo and crop to it.
//
// Entry point. Initialises logging, loads the configuration and dispatches
// to the subcommands.

mod commands;
mod input;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use snapcrop_core::AppConfig;
use snapcrop_core::CropArea;
use snapcrop_core::error::Result;
use snapcrop_core::human_errors::humanize_error;

#[derive(Parser, Debug)]
#[command(name = "snapcrop")]
#[command(version, about = "Find the paper in a photo and crop to it", long_about = None)]
struct Cli {
    /// JSON configuration file (missing fields use defaults)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the paper region and print it as JSON
    Detect(DetectArgs),

    /// Crop an image to an explicit area
    Crop(CropArgs),

    /// Detect, pre-apply the suggestion and write the cropped JPEG
    Auto(AutoArgs),

    /// Print the effective configuration as JSON
    Config,
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Image file, or text file holding a data URI
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Include coverage, grid and rejection reason in the output
    #[arg(long)]
    report: bool,

    /// Write a PNG with the suggested crop outlined
    #[arg(long, value_name = "FILE")]
    overlay: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct CropArgs {
    /// Image file, or text file holding a data URI
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Crop area in percent of the image (x,y,width,height)
    #[arg(long, value_name = "X,Y,W,H", value_parser = input::parse_area)]
    area: CropArea,

    /// Output file (default: cropped-<millis>.jpg in the current directory)
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// JPEG quality (1-100); overrides the configuration
    #[arg(short, long, value_name = "N")]
    quality: Option<u8>,
}

#[derive(Args, Debug)]
struct AutoArgs {
    /// Image file, or text file holding a data URI
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: cropped-<millis>.jpg in the current directory)
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// JPEG quality (1-100); overrides the configuration
    #[arg(short, long, value_name = "N")]
    quality: Option<u8>,

    /// Give up on detection after this many milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "snapcrop failed");
            let human = humanize_error(&err);
            eprintln!("{}", human.message);
            eprintln!("{}", human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Detect(args) => commands::detect(
            &config,
            &args.input,
            args.report,
            args.overlay.as_deref(),
        ),
        Command::Crop(args) => commands::crop(
            &config,
            &args.input,
            &args.area,
            args.out.as_deref(),
            args.quality,
        ),
        Command::Auto(args) => {
            let mut config = config;
            if let Some(quality) = args.quality {
                config.cropper.jpeg_quality = quality;
            }
            if args.timeout_ms.is_some() {
                config.cropper.detection_timeout_ms = args.timeout_ms;
            }
            commands::auto(&config, &args.input, args.out.as_deref()).await
        }
        Command::Config => commands::print_json(&config),
    }
}
