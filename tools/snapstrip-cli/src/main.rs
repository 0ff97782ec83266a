//! Snapstrip CLI — retro photo booth from the terminal.
//!
//! Usage:
//!   snapstrip shoot [OPTIONS]       Run a full booth session
//!   snapstrip compose <DIR>         Render a strip from saved photos
//!   snapstrip caption <STRIP>       Caption an existing strip PNG
//!   snapstrip check                 Check camera and API readiness

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "snapstrip",
    about = "Retro photo booth: countdown capture, vintage strips, AI captions",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full booth session: countdown, capture, develop, render
    Shoot {
        /// Output directory for the finished strip
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Camera device path (default: auto-detect)
        #[arg(long)]
        device: Option<String>,

        /// Photos per session
        #[arg(long, default_value = "4")]
        count: usize,

        /// Countdown start value before each shot
        #[arg(long, default_value = "3")]
        countdown: u32,

        /// Ask the caption service to name the strip
        #[arg(long)]
        caption: bool,

        /// Shorten countdown and develop pacing (demos, quick tests)
        #[arg(long)]
        fast: bool,
    },

    /// Render a strip from JPEG photos already on disk
    Compose {
        /// Directory holding the photos (sorted by file name)
        dir: PathBuf,

        /// Output directory for the finished strip
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Caption text to stamp above the footer
        #[arg(long)]
        caption: Option<String>,

        /// Footer serial number (default: random)
        #[arg(long)]
        serial: Option<u16>,

        /// Grain seed for reproducible output (default: random)
        #[arg(long)]
        seed: Option<u64>,

        /// Footer timestamp as unix milliseconds (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Request an AI caption for an existing strip PNG
    Caption {
        /// Path to the strip PNG
        strip: PathBuf,
    },

    /// Check camera devices and caption service readiness
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    snapstrip_common::logging::init_logging(&snapstrip_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Shoot {
            output,
            device,
            count,
            countdown,
            caption,
            fast,
        } => commands::shoot::run(output, device, count, countdown, caption, fast).await,
        Commands::Compose {
            dir,
            output,
            caption,
            serial,
            seed,
            timestamp,
        } => commands::compose::run(dir, output, caption, serial, seed, timestamp),
        Commands::Caption { strip } => commands::caption::run(strip).await,
        Commands::Check => commands::check::run(),
    }
}
