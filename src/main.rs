mod app;
mod builtin;
mod collect;
mod config;
mod error;
mod fzf;
mod logging;
mod open;
mod paths;
mod present;
mod registry;
mod resolve;
mod scanner;
mod scheme;
mod text;
mod theme;
mod tmux;
mod user_schemes;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "panelinks",
    version,
    about = "Pick URLs, files and error locations from a tmux pane"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the config file in $EDITOR (default: nvim)
    Config,
    /// Print the numbered links found in a file (or stdin)
    Scan {
        /// Text to scan; stdin when omitted
        file: Option<PathBuf>,
    },
    /// List the active schemes in match order
    Schemes,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_path()?,
    };

    if let Some(Commands::Config) = cli.command {
        return config::open_config_in_editor(&config_path);
    }

    let cfg = config::load_config(&config_path)?;
    logging::init_logging(logging::LogConfig {
        level: &cfg.log_level,
        file: cfg.log_file.as_deref(),
        file_level: cfg.log_file_level.as_deref(),
        verbose: cli.verbose,
    })?;

    match cli.command {
        Some(Commands::Scan { file }) => app::run_scan(&cfg, file.as_deref()),
        Some(Commands::Schemes) => app::list_schemes(&cfg),
        Some(Commands::Config) | None => app::run_app(cfg),
    }
}
