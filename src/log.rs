use std::fs::OpenOptions;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

use crate::config;

/// Where log records go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// JSON lines appended to [`config::log_path`]
    File,
    /// Human readable output on stderr
    Stderr,
}

pub fn init(target: LogTarget) -> anyhow::Result<()> {
    // Use RUST_LOG if set, otherwise default to INFO
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match target {
        LogTarget::Stderr => {
            let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .try_init()?;
        }
        LogTarget::File => {
            let data_dir = config::data_dir();

            std::fs::create_dir_all(&data_dir).inspect_err(|e| {
                eprintln!("Failed to create data directory: {}", e);
            })?;

            let log_path = config::log_path();
            let log_file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .inspect_err(|e| {
                    eprintln!("Failed to open log file {:?}: {}", log_path, e);
                })?;

            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(log_file)
                .fmt_fields(JsonFields::default());

            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .try_init()?;
        }
    }

    Ok(())
}
