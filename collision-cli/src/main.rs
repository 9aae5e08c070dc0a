//! Collision Detector CLI Application
//!
//! This is the command-line host for the collision-detector library.
//! It adds what the library leaves to its host:
//! - Loading channel events from JSON-lines files
//! - Selecting channel pairs (flags or config.toml)
//! - Running one tracker per (file, pair) in parallel
//! - Report generation (TXT/JSON)

use anyhow::{bail, Context, Result};
use clap::Parser;
use collision_detector::ChannelBinding;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod pipeline;
mod report;

use config::{AppConfig, OutputFormat};

/// Collision Detector - find overlap between two boolean channels
#[derive(Parser, Debug)]
#[command(name = "collision-cli")]
#[command(about = "Detect intervals where two digital channels are asserted together", long_about = None)]
#[command(version)]
struct Args {
    /// JSON-lines file(s) of decoded channel events
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// First channel to monitor
    #[arg(long, value_name = "NAME")]
    channel1: Option<String>,

    /// Second channel to monitor
    #[arg(long, value_name = "NAME")]
    channel2: Option<String>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Omit per-job summaries from TXT reports
    #[arg(long)]
    no_summary: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Collision Detector CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using detector library v{}", collision_detector::VERSION);

    let config = resolve_config(&args)?;
    config.validate()?;

    let jobs = pipeline::plan_jobs(&config.input.files, &config.bindings());
    log::info!("Running {} job(s)", jobs.len());

    let mut reports = Vec::new();
    let mut failed = 0;
    for result in pipeline::run_jobs(&jobs) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                log::error!("{:#}", e);
                failed += 1;
            }
        }
    }

    let output = &config.output;
    match &output.file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let mut writer = BufWriter::new(file);
            report::write_report(&mut writer, &reports, output.format, output.include_summary)?;
            writer.flush()?;
            log::info!("Report written to {:?}", path);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            report::write_report(&mut writer, &reports, output.format, output.include_summary)?;
        }
    }

    if failed > 0 {
        bail!("{} of {} job(s) failed", failed, jobs.len());
    }

    Ok(())
}

/// Merge the config file (if any) with command-line overrides
fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            let config = config::load_config(path)?;
            log::debug!("Configuration loaded successfully");
            config
        }
        None => AppConfig::default(),
    };

    if !args.files.is_empty() {
        config.input.files = args.files.clone();
    }

    // Channel flags describe a single pair and replace any configured pairs
    if args.channel1.is_some() || args.channel2.is_some() {
        let mut binding = ChannelBinding::default();
        if let Some(channel) = &args.channel1 {
            binding = binding.with_channel1(channel.as_str());
        }
        if let Some(channel) = &args.channel2 {
            binding = binding.with_channel2(channel.as_str());
        }
        config.pairs = vec![binding];
    }

    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(path) = &args.output {
        config.output.file = Some(path.clone());
    }
    if args.no_summary {
        config.output.include_summary = false;
    }

    Ok(config)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
