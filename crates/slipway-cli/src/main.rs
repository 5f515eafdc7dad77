//! Slipway CLI - release orchestration for containerized apps

use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;

mod commands;
mod error;
mod exit_codes;

#[derive(Parser)]
#[command(name = "slipway")]
#[command(author = "Slipway Contributors")]
#[command(version)]
#[command(about = "Release orchestration - bump, build, push, package, upload", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(long, global = true, default_value = slipway_core::CONFIG_FILE)]
    config: PathBuf,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all published versions for the configured app
    Get {
        /// Deployment target whose chart repository is queried
        #[arg(long)]
        target: Option<String>,
    },

    /// Run the release pipeline for a deployment target
    Release {
        /// Bump the major version up by one
        #[arg(long)]
        major: bool,

        /// Bump the minor version up by one
        #[arg(long)]
        minor: bool,

        /// Bump the patch version up by one
        #[arg(long)]
        patch: bool,

        /// Reuse the latest published version unchanged
        #[arg(long)]
        rebuild: bool,

        /// The deployment to target in the config file
        #[arg(long)]
        target: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.debug {
        // SAFETY: We're the only thread interacting with the environment
        // at this point (start of main)
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }

    let result = match cli.command {
        Commands::Get { target } => commands::get::run(&cli.config, target.as_deref()).await,

        Commands::Release {
            major,
            minor,
            patch,
            rebuild,
            target,
        } => commands::release::run(&cli.config, &target, major, minor, patch, rebuild).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(e.exit_code());
    }
}
