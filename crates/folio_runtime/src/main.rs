//! Folio Runtime
//!
//! The `folio` binary: opens the adaptive background window and exposes the
//! detector, project catalog and contact relay on the command line.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Portfolio site runtime")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Settings file (JSON); defaults are used when absent
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Overrides for the environment readings fed to the detector.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Viewport width in CSS pixels
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in CSS pixels
    #[arg(long)]
    height: Option<u32>,

    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    #[arg(long)]
    reduced_motion: bool,

    /// Device memory in GiB
    #[arg(long, value_name = "GIB")]
    memory: Option<f32>,

    /// Logical core count
    #[arg(long)]
    cores: Option<u32>,

    #[arg(long)]
    pixel_ratio: Option<f32>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Open the background window (default)
    Run,
    /// Print the detected device profile as JSON
    Profile {
        #[command(flatten)]
        probe: ProbeArgs,
    },
    /// List projects matching a search and tags
    Projects {
        /// Case-insensitive text to find in titles and descriptions
        #[arg(short, long, default_value = "")]
        search: String,

        /// Keep projects with any of these tags (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Only featured projects
        #[arg(long)]
        featured: bool,
    },
    /// Print the tech stack orbit offsets at a point in time
    Orbit {
        /// Seconds into the animation
        #[arg(long, default_value_t = 0.0)]
        time: f32,

        /// Viewport width in CSS pixels
        #[arg(long, default_value_t = 1280)]
        width: u32,
    },
    /// Send a message through the contact relay
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        message: String,
    },
    /// Mount the background headless and drive it for a number of frames
    Simulate {
        #[arg(long, default_value_t = 600)]
        frames: u32,

        /// Write the fallback markup here when the fallback is chosen
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        #[command(flatten)]
        probe: ProbeArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let settings = folio_services::Settings::load(cli.config.as_deref())?;
    tracing::debug!("Folio v{}", folio_core::VERSION);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::run(&settings),
        Command::Profile { probe } => commands::profile(&settings, &probe),
        Command::Projects { search, tags, featured } => commands::projects(&search, &tags, featured),
        Command::Orbit { time, width } => commands::orbit(time, width),
        Command::Contact { name, email, message } => commands::contact(&settings, name, email, message),
        Command::Simulate { frames, out, probe } => commands::simulate(&settings, &probe, frames, out.as_deref()),
    }
}
