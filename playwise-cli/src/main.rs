//! PlayWise - Main entry point
//!
//! Interactive console over the in-memory music library, plus one-shot
//! `demo` and `dashboard` modes.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use playwise_cli::{Shell, ShellControl};
use playwise_core::config::{resolve_data_dir, ConfigResolver, DataDirInitializer, TomlConfig};
use playwise_core::dashboard::DashboardSnapshot;
use playwise_core::Library;

/// Command-line arguments for playwise
#[derive(Parser, Debug)]
#[command(name = "playwise")]
#[command(about = "In-memory music playlist and catalog manager")]
#[command(version)]
struct Args {
    /// Config file (overrides PLAYWISE_CONFIG and the per-user config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level for playwise crates (trace, debug, info, warn, error)
    #[arg(short, long, env = "PLAYWISE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Interactive shell (default)
    Shell {
        /// Start with the sample tracks loaded
        #[arg(long)]
        sample: bool,
    },
    /// Load sample data and run a scripted tour of the commands
    Demo,
    /// Print library statistics and exit
    Dashboard {
        /// Catalog snapshot to load (defaults to the data folder's catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

const DEMO_SCRIPT: &[&str] = &[
    "list",
    "play song_004",
    "play song_006 120",
    "history 5",
    "undo",
    "rate song_007 4",
    "top 3",
    "move 1 7",
    "sort duration desc merge",
    "list",
    "search beatles",
    "favorites",
    "dashboard",
];

fn main() -> Result<()> {
    let args = Args::parse();

    let (config, source) = ConfigResolver::new()
        .with_cli_path(args.config.clone())
        .resolve()
        .context("Failed to load configuration")?;

    init_tracing(args.log_level.as_deref(), &config)?;
    info!(source = ?source, "Starting PlayWise");

    match args.mode.unwrap_or(Mode::Shell { sample: false }) {
        Mode::Shell { sample } => run_shell(&config, sample),
        Mode::Demo => run_demo(&config),
        Mode::Dashboard { catalog, json } => run_dashboard(&config, catalog, json),
    }
}

/// Filter priority: --log-level, then RUST_LOG, then `[logging] level`.
/// Logs go to `[logging] file` when set, otherwise stderr.
fn init_tracing(cli_level: Option<&str>, config: &TomlConfig) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(crate_filter(level)),
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(crate_filter(&config.logging.level))),
    }
    .context("Invalid log level")?;

    let (file_layer, stderr_layer) = match &config.logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false);
            (Some(layer), None)
        }
        None => (None, Some(tracing_subscriber::fmt::layer().with_writer(io::stderr))),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
    Ok(())
}

fn crate_filter(level: &str) -> String {
    format!("playwise_core={level},playwise_cli={level},playwise={level}")
}

fn run_shell(config: &TomlConfig, sample: bool) -> Result<()> {
    let mut library = Library::from_config(config);
    if sample {
        library.load_sample_data();
    }

    let stdout = io::stdout();
    let mut shell = Shell::new(library, stdout.lock()).with_data_dir(resolve_data_dir(config));
    shell.run_line("help").context("Failed to write to stdout")?;
    shell
        .run(io::stdin().lock())
        .context("Shell terminated on I/O error")?;
    info!("Shell session ended");
    Ok(())
}

fn run_demo(config: &TomlConfig) -> Result<()> {
    let mut library = Library::from_config(config);
    library.load_sample_data();

    let stdout = io::stdout();
    let mut shell = Shell::new(library, stdout.lock());
    for line in DEMO_SCRIPT {
        println!("\n> {}", line);
        if shell.run_line(line).context("Failed to write to stdout")? == ShellControl::Quit {
            break;
        }
    }
    Ok(())
}

fn run_dashboard(config: &TomlConfig, catalog: Option<PathBuf>, json: bool) -> Result<()> {
    let mut library = Library::from_config(config);
    let path = catalog.unwrap_or_else(|| {
        DataDirInitializer::new(resolve_data_dir(config)).catalog_path()
    });

    if path.exists() {
        load_catalog(&mut library, &path)?;
    } else {
        info!(path = %path.display(), "No catalog snapshot, showing sample data");
        library.load_sample_data();
    }

    let snapshot = DashboardSnapshot::capture(&library);
    if json {
        println!("{}", snapshot.to_json().context("Failed to serialize dashboard")?);
    } else {
        println!("{}", snapshot);
    }
    Ok(())
}

fn load_catalog(library: &mut Library, path: &Path) -> Result<()> {
    let report = library
        .import_catalog(path)
        .with_context(|| format!("Failed to import catalog {}", path.display()))?;
    info!(
        imported = report.imported_count(),
        skipped = report.skipped(),
        "Loaded catalog snapshot"
    );
    Ok(())
}
