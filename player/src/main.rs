use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;

mod commands;

use commands::CommandHandler;

/// Inspect lesson video URLs and the embeds the player would build for them
#[derive(Parser)]
#[command(name = "lesson-player", version, about)]
struct Cli {
    /// Path to a JSON player config (defaults to the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify video URLs by provider
    Resolve {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Print JSON instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },
    /// Print the markup that embeds a video URL
    Embed { url: String },
    /// Print the effective player configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;
    debug!("Using container '{}'", config.container_id);

    let mut stdout = io::stdout().lock();
    let code = CommandHandler::execute(&cli.command, &config, &mut stdout)?;
    stdout.flush()?;

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}
