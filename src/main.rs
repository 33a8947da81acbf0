use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing::info;

use update_notifier::config::NotifierConfig;
use update_notifier::log::{self, LogTarget};
use update_notifier::notifier::{CheckOutcome, Notifier};
use update_notifier::pubsub::LocalBus;
use update_notifier::server;
use update_notifier::version::cache::{FileSnapshot, VersionCache};
use update_notifier::version::registries::NpmRegistry;

#[derive(Parser)]
#[command(name = "update-notifier")]
#[command(version, about = "Announces new npm package versions")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(long, global = true)]
    log_stderr: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Read package names from stdin and print update events to stdout
    Serve,
    /// Check a single package and print the outcome
    Check {
        /// Package name, e.g. left-pad or @types/node
        name: String,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<NotifierConfig> {
    match path {
        Some(path) => NotifierConfig::from_file(path),
        None => Ok(NotifierConfig::default()),
    }
}

fn build_notifier(config: NotifierConfig, bus: Arc<LocalBus>) -> Arc<Notifier> {
    let registry = NpmRegistry::with_user_agent(&config.registry.url, &config.registry.user_agent);

    let snapshot_path = config.cache.snapshot_path();
    info!("Using module registry {:?}", snapshot_path);
    let mut cache = VersionCache::new(Box::new(FileSnapshot::new(&snapshot_path)));
    if config.cache.remember_notified {
        cache = cache.remember_notified();
    }

    Arc::new(Notifier::new(
        Arc::new(registry),
        Arc::new(cache),
        bus.clone(),
        bus,
        config,
    ))
}

async fn serve(config: NotifierConfig) -> anyhow::Result<()> {
    let bus = Arc::new(LocalBus::new());
    let notifier = build_notifier(config, bus.clone());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    server::serve(&notifier, bus.as_ref(), stdin, &mut stdout, interrupt)
        .await
        .context("Failed to start notifier")?;
    Ok(())
}

async fn check(config: NotifierConfig, name: &str) -> anyhow::Result<()> {
    let bus = Arc::new(LocalBus::new());
    let notifier = build_notifier(config, bus);
    notifier
        .start()
        .await
        .context("Failed to load module registry")?;

    match notifier.handle_check_request(name).await? {
        CheckOutcome::Notified(module) => println!("{}", serde_json::to_string(&module)?),
        CheckOutcome::Suppressed => println!("{} is up to date", name),
        CheckOutcome::Skipped => println!("{} is already being checked", name),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let target = if cli.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File
    };
    log::init(target)?;

    let config = load_config(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        None | Some(Command::Serve) => runtime.block_on(serve(config)),
        Some(Command::Check { name }) => runtime.block_on(check(config, &name)),
    }
}
