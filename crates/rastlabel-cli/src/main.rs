//! Command-line interface for `rastlabel`, which uploads raster values and
//! category labels at the positions of vector points.
//!
//! # Architecture
//!
//! The CLI is built using [`clap`] for argument parsing and [`tracing`] for structured logging.
//! It parses arguments, configures logging, checks that it runs inside a toolkit session,
//! and delegates to [`rastlabel_core::pipeline::run_interruptible`] on a blocking thread.
//!
//! Ctrl-C only raises a flag. The running module receives the same interrupt and exits,
//! the pipeline stops, and temporary maps are removed before the process exits with
//! status 130.

mod display;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};
use clap::{ArgGroup, Parser};
use tracing::{Level, debug, info, warn};
use tracing_log::LogTracer;
use tracing_subscriber::FmtSubscriber;

use rastlabel_core::environment::Environment;
use rastlabel_core::options::Options;
use rastlabel_core::pipeline;
use rastlabel_core::toolkit::GrassToolkit;

#[derive(Parser)]
#[command(
    name = "rastlabel",
    version,
    about = "Uploads raster values and labels to vector point layer",
    long_about = "Samples raster maps at the points of a vector map and stores cell values\n\
                  and category labels in the attribute table of a new point map, or joins\n\
                  them onto the input map with -o."
)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .multiple(true)
        .args(["output", "add_columns"])
))]
/// Command-line arguments and options for the `rastlabel` CLI.
struct Cli {
    /// Name of vector points map for which to add raster values & labels.
    #[arg(long, value_name = "NAME")]
    vector: String,

    /// Name of raster map(s) with labels to be queried (comma separated).
    #[arg(long, value_name = "NAME[,NAME...]")]
    raster: String,

    /// Name of raster map(s) without labels to be queried (comma separated).
    #[arg(long, value_name = "NAME[,NAME...]", default_value = "")]
    raster2: String,

    /// Name of output point layer.
    #[arg(long, value_name = "NAME")]
    output: Option<String>,

    /// Add columns to input vector map.
    #[arg(short = 'o', long = "add-columns")]
    add_columns: bool,

    /// Allow replacing an existing output map or existing input columns.
    #[arg(long)]
    overwrite: bool,

    /// Enable verbose (INFO level) logging output.
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug (DEBUG level) logging output with detailed diagnostics.
    #[arg(short, long)]
    debug: bool,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            vector: self.vector.clone(),
            raster: self.raster.clone(),
            raster2: self.raster2.clone(),
            output: self.output.clone(),
            add_columns: self.add_columns,
            overwrite: self.overwrite,
        }
    }
}

/// Entry point for the `rastlabel` command-line interface.
///
/// # Errors
///
/// Returns an error if the toolkit environment is missing, if any module
/// fails, or if the logging system cannot be initialized.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity flags
    let log_level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Bridge logs from the `log` crate to the `tracing` ecosystem.
    LogTracer::init()?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true) // Show module paths for better context
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let interrupted = Arc::new(AtomicBool::new(false));
    watch_interrupt(Arc::clone(&interrupted))?;

    let flag = Arc::clone(&interrupted);
    let outcome = tokio::task::spawn_blocking(move || handle_run(&cli, &flag)).await?;

    if interrupted.load(Ordering::SeqCst) {
        warn!("Interrupted, temporary maps removed");
        std::process::exit(130);
    }
    outcome
}

/// Sets `flag` on every SIGINT instead of terminating the process.
#[cfg(unix)]
fn watch_interrupt(flag: Arc<AtomicBool>) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            debug!("SIGINT received");
            flag.store(true, Ordering::SeqCst);
        }
    });
    Ok(())
}

/// Sets `flag` on every Ctrl-C instead of terminating the process.
#[cfg(not(unix))]
fn watch_interrupt(flag: Arc<AtomicBool>) -> Result<()> {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl-C received");
            flag.store(true, Ordering::SeqCst);
        }
    });
    Ok(())
}

fn handle_run(cli: &Cli, interrupted: &AtomicBool) -> Result<()> {
    let options = cli.options();
    info!("Sampling {} at points of {}", options.raster, options.vector);

    let summary = Environment::from_env()
        .map(|env| {
            debug!("Toolkit installation: {}", env.gisbase().display());
            GrassToolkit::new(env)
        })
        .and_then(|toolkit| pipeline::run_interruptible(&toolkit, &options, interrupted))
        .map_err(|e| {
            if let Some(hint) = e.recovery_suggestion() {
                warn!("{hint}");
            }
            anyhow!(e.user_message())
        })?;

    if cli.verbose || cli.debug {
        println!("{}", display::format_summary(&summary));
    }
    Ok(())
}
