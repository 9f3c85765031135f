mod cli;
mod config;
mod console;
mod display;
mod ops;
mod record;
mod store;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use config::{Config, DisplayMode};
use display::{Display, LogDisplay, NullDisplay};
use record::RecordStore;
use store::{ByteStore, FileStore, MemStore};

#[derive(Parser)]
#[command(name = "idcon", about = "Operator console for a fixed-slot identity store")]
pub struct Args {
    #[arg(long, help = "Config file path")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "IDCON_STORE", help = "Storage image path")]
    pub store: Option<PathBuf>,

    #[arg(long, help = "Run against a volatile in-memory store")]
    pub ephemeral: bool,

    #[arg(long, value_name = "MODE", help = "Display mode: off, log")]
    pub display: Option<String>,

    #[arg(long, help = "Verbose diagnostics on stderr")]
    pub verbose: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut cfg = if let Some(path) = &args.config {
        Config::load_from(path)?
    } else {
        Config::load()?
    };

    // CLI overrides layer on top of the config file.
    if let Some(path) = &args.store {
        cfg.storage.path = path.clone();
    }
    if let Some(mode) = &args.display {
        cfg.display = DisplayMode::from_str(mode)
            .ok_or_else(|| anyhow::anyhow!("Invalid display mode: {}. Use: off, log", mode))?;
    }
    if args.verbose {
        cfg.log_level = "debug".to_string();
    }

    init_tracing(&cfg.log_level);
    cfg.apply_env();

    let byte_store: Box<dyn ByteStore> = if args.ephemeral {
        Box::new(MemStore::new(cfg.storage.size))
    } else {
        Box::new(FileStore::open(&cfg.storage.path, cfg.storage.size)?)
    };
    let records = RecordStore::new(byte_store);

    let panel: Box<dyn Display> = match cfg.display {
        DisplayMode::Off => Box::new(NullDisplay),
        DisplayMode::Log => Box::new(LogDisplay),
    };

    tracing::debug!(
        store = %cfg.storage.path.display(),
        ephemeral = args.ephemeral,
        display = cfg.display.as_str(),
        "console starting"
    );

    let console = console::TerminalConsole::new()?;
    let mut ctx = cli::Context {
        config: cfg,
        records,
        console: Box::new(console),
        display: panel,
    };
    cli::run_repl(&mut ctx)
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}
