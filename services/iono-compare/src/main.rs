//! AMPERE / SWMF ionospheric comparison tool.
//!
//! Compares integrated field-aligned currents from AMPERE grids and SWMF
//! ionosphere output, reports hemispheric power and derives auroral indices
//! from magnetometer grids.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use iono_common::{parse_timestamp, Hemisphere};
use iono_compare::{run_aurora_index, run_grid, run_hpi, run_ifac, BatchReport, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "iono-compare")]
#[command(about = "Compare AMPERE and SWMF ionospheric currents")]
struct Cli {
    /// Run configuration (YAML)
    #[arg(short, long, env = "IONO_COMPARE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json: bool,

    /// Write results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Flags that take precedence over the configuration file.
#[derive(Args, Debug, Default)]
struct Overrides {
    #[arg(long, global = true)]
    ampere_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    swmf_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    mag_grid_dir: Option<PathBuf>,

    /// Start of the AMPERE event file
    #[arg(long, global = true, value_parser = parse_time)]
    event_start: Option<DateTime<Utc>>,

    #[arg(long, global = true, value_parser = parse_time)]
    start: Option<DateTime<Utc>>,

    #[arg(long, global = true, value_parser = parse_time)]
    end: Option<DateTime<Utc>>,

    #[arg(long, global = true)]
    cadence_minutes: Option<i64>,

    /// Clamp grid values to +/- this limit
    #[arg(long, global = true)]
    saturate: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Integrated FAC of AMPERE and SWMF per timestamp (JSON lines)
    Ifac,

    /// Hemispheric power and number flux of one IE file
    Hpi {
        /// IE output file (`.idl` or `.idl.gz`)
        file: PathBuf,
    },

    /// AU/AL/AE series from magnetometer grid files (JSON lines)
    AuroraIndex {
        /// Evaluate files on a thread pool
        #[arg(long)]
        parallel: bool,
    },

    /// Dump one finalised AMPERE grid
    Grid {
        #[arg(long, value_parser = parse_time)]
        time: DateTime<Utc>,

        #[arg(long, value_parser = parse_hemisphere, default_value = "north")]
        hemisphere: Hemisphere,
    },
}

fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s).map_err(|e| e.to_string())
}

fn parse_hemisphere(s: &str) -> Result<Hemisphere, String> {
    Hemisphere::parse(s).ok_or_else(|| format!("unknown hemisphere '{}'", s))
}

impl Overrides {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(dir) = &self.ampere_dir {
            config.ampere_dir = dir.clone();
        }
        if let Some(dir) = &self.swmf_dir {
            config.swmf_dir = dir.clone();
        }
        if let Some(dir) = &self.mag_grid_dir {
            config.mag_grid_dir = dir.clone();
        }
        if self.event_start.is_some() {
            config.ampere_event_start = self.event_start;
        }
        if self.start.is_some() {
            config.start = self.start;
        }
        if self.end.is_some() {
            config.end = self.end;
        }
        if let Some(cadence) = self.cadence_minutes {
            config.cadence_minutes = cadence;
        }
        if self.saturate.is_some() {
            config.integration.saturation_limit = self.saturate;
        }
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn write_lines<T: Serialize>(out: &mut dyn Write, records: &[T]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_document<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn finish<T>(command: &str, report: &BatchReport<T>) -> Result<()> {
    info!(
        command,
        written = report.records.len(),
        skipped = report.skipped,
        failed = report.failed,
        "Run finished"
    );
    if report.has_failures() {
        anyhow::bail!(
            "{} of {} timestamps failed",
            report.failed,
            report.total()
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json);
    ampere_parser::silence_hdf5_errors();

    let mut config = RunConfig::load_or_default(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);
    config.validate()?;

    let mut out = open_output(cli.output.as_ref())?;

    match &cli.command {
        Command::Ifac => {
            let report = run_ifac(&config)?;
            write_lines(&mut out, &report.records)?;
            out.flush()?;
            finish("ifac", &report)?;
        }
        Command::Hpi { file } => {
            let report = run_hpi(file, &config)?;
            write_document(&mut out, &report)?;
        }
        Command::AuroraIndex { parallel } => {
            let report = run_aurora_index(&config, *parallel)?;
            write_lines(&mut out, &report.records)?;
            out.flush()?;
            finish("aurora-index", &report)?;
        }
        Command::Grid { time, hemisphere } => {
            let axes = run_grid(&config, *time, *hemisphere)?;
            write_document(&mut out, &axes)?;
        }
    }

    out.flush()?;
    Ok(())
}
