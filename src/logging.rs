use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Off,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "0" | "off" => LogTarget::Off,
            "2" | "stderr" => LogTarget::Stderr,
            path => LogTarget::File(PathBuf::from(path)),
        }
    }
}

/// Like [`init`], but a target that cannot be set up turns logging off
/// instead of stopping the program. Returns the target actually in use.
pub fn init_or_off(target: LogTarget, verbose: bool) -> LogTarget {
    match init(&target, verbose) {
        Ok(()) => target,
        Err(err) => {
            eprintln!("eisenmatrix: logging disabled: {err:#}");
            LogTarget::Off
        }
    }
}

pub fn init(target: &LogTarget, verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    match target {
        LogTarget::Off => {}
        LogTarget::Stderr => {
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogTarget::File(path) => {
            let file = open_log_file(path)?;
            let subscriber = FmtSubscriber::builder()
                .with_env_filter(filter(level))
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {:?}", path))
}

/// `RUST_LOG` wins over the level picked from `--verbose`.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
