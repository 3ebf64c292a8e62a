use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub struct LogConfig<'a> {
    pub level: &'a str,
    pub file: Option<&'a Path>,
    /// Level for the file layer; the stderr level when unset.
    pub file_level: Option<&'a str>,
    pub verbose: bool,
}

impl LogConfig<'_> {
    /// Levels for the stderr and file layers. `--verbose` lowers both.
    fn levels(&self) -> (&str, &str) {
        if self.verbose {
            return ("debug", "debug");
        }
        (self.level, self.file_level.unwrap_or(self.level))
    }
}

fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("panelinks={level}")))
}

/// Initialize tracing with stderr output and an optional append-only log file.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let (stderr_level, file_level) = config.levels();

    let file_layer = match config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(filter(file_level)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false)
                .with_filter(filter(stderr_level)),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}
