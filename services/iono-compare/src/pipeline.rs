//! Per-timestamp comparison pipeline.
//!
//! Every timestamp is processed independently. A missing input file skips the
//! timestamp with a warning; any other failure is logged with its file,
//! timestamp and hemisphere and counted, and the batch carries on.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use ampere_parser::{parse_ampere_filename, read_ampere_file, AmpereDataset};
use iono_common::naming::{ampere_filename, iono_filename, mag_grid_filename};
use iono_common::{Hemisphere, PrecipitationSpecies};
use polar_grid::{
    calc_hemispheric_power, integrate_axes_current, integrate_iono_current, load_ampere_grid,
    AuroralIndices, CurrentTotals, GridError, HemisphericPower, PolarAxes,
};
use swmf_parser::{
    iono_time_from_filename, mag_grid_time_from_filename, read_iono_file, read_mag_grid,
};

use crate::config::RunConfig;

// ============================================================================
// Batch bookkeeping
// ============================================================================

/// Result of one timestamp.
#[derive(Debug)]
pub enum StepOutcome<T> {
    Done(T),
    /// An input file does not exist
    Skipped { file: PathBuf },
    Failed(anyhow::Error),
}

/// Outputs of a batch plus how many timestamps were skipped or failed.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub records: Vec<T>,
    pub skipped: usize,
    pub failed: usize,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            failed: 0,
        }
    }
}

impl<T> BatchReport<T> {
    /// Collect outcomes in order, logging skips and failures.
    pub fn collect(outcomes: impl IntoIterator<Item = (DateTime<Utc>, StepOutcome<T>)>) -> Self {
        let mut report = Self::default();
        for (timestamp, outcome) in outcomes {
            match outcome {
                StepOutcome::Done(record) => report.records.push(record),
                StepOutcome::Skipped { file } => {
                    warn!(%timestamp, file = %file.display(), "Input file missing, skipping timestamp");
                    report.skipped += 1;
                }
                StepOutcome::Failed(e) => {
                    let message = format!("{:#}", e);
                    error!(%timestamp, error = %message, "Timestamp failed");
                    report.failed += 1;
                }
            }
        }
        report
    }

    pub fn total(&self) -> usize {
        self.records.len() + self.skipped + self.failed
    }

    /// Whether the run should exit non-zero.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

fn missing(path: &Path) -> Option<PathBuf> {
    (!path.exists()).then(|| path.to_path_buf())
}

// ============================================================================
// Integrated FAC comparison
// ============================================================================

/// Integrated current in both hemispheres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HemisphereCurrents {
    pub north: CurrentTotals,
    pub south: CurrentTotals,
}

/// One line of `ifac` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfacRecord {
    pub timestamp: DateTime<Utc>,
    pub ampere: HemisphereCurrents,
    pub swmf: HemisphereCurrents,
}

/// The pair of AMPERE event files for a run.
pub struct AmpereSources {
    pub north: AmpereDataset,
    pub south: AmpereDataset,
}

impl AmpereSources {
    pub fn get(&self, hemisphere: Hemisphere) -> &AmpereDataset {
        match hemisphere {
            Hemisphere::North => &self.north,
            Hemisphere::South => &self.south,
        }
    }
}

/// Path of the AMPERE event file for `hemisphere`.
///
/// With `ampere_event_start` set the name is built from it. Otherwise the
/// directory is searched for a `hemisphere` event file covering the run
/// start, falling back to a name built from the run start.
pub fn ampere_path(config: &RunConfig, hemisphere: Hemisphere) -> Result<PathBuf> {
    if config.ampere_event_start.is_none() {
        if let Some(start) = config.start {
            if let Some(path) = find_ampere_file(&config.ampere_dir, hemisphere, start)? {
                return Ok(path);
            }
        }
    }

    let name = ampere_filename(
        config.event_start()?,
        config.ampere_span_secs,
        config.ampere_cadence_secs,
        hemisphere,
    );
    Ok(config.ampere_dir.join(name))
}

/// The event file in `dir` for `hemisphere` whose span covers `time`.
/// `Ok(None)` when there is none or the directory does not exist.
pub fn find_ampere_file(
    dir: &Path,
    hemisphere: Hemisphere,
    time: DateTime<Utc>,
) -> Result<Option<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("listing {}", dir.display())),
    };

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry?.path();
        match parse_ampere_filename(&path) {
            Some(info) if info.hemisphere == hemisphere && info.covers(time) => {
                candidates.push((info.start, path))
            }
            _ => {}
        }
    }

    // latest event start wins when files overlap
    candidates.sort();
    let found = candidates.pop().map(|(_, path)| path);
    if let Some(path) = &found {
        debug!(file = %path.display(), %hemisphere, %time, "Found AMPERE event file");
    }
    Ok(found)
}

/// Path of the IE output for `timestamp`, preferring an uncompressed file.
pub fn iono_path(dir: &Path, timestamp: DateTime<Utc>) -> PathBuf {
    let plain = dir.join(iono_filename(timestamp));
    if plain.exists() {
        return plain;
    }
    let gz = dir.join(format!("{}.gz", iono_filename(timestamp)));
    if gz.exists() {
        gz
    } else {
        plain
    }
}

/// Open both AMPERE event files. `Ok(None)` when one is absent.
pub fn load_ampere_sources(config: &RunConfig) -> Result<Option<AmpereSources>> {
    let mut datasets = Vec::with_capacity(2);
    for hemisphere in Hemisphere::BOTH {
        let path = ampere_path(config, hemisphere)?;
        match read_ampere_file(&path).map_err(GridError::from) {
            Ok(dataset) => datasets.push(dataset),
            Err(e) if e.is_missing_input() => {
                warn!(file = %path.display(), %hemisphere, "AMPERE event file missing");
                return Ok(None);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {} ({})", path.display(), hemisphere))
            }
        }
    }

    let south = datasets.pop().context("south dataset")?;
    let north = datasets.pop().context("north dataset")?;
    Ok(Some(AmpereSources { north, south }))
}

/// Integrated FAC from both sources and hemispheres at one timestamp.
pub fn ifac_step(
    sources: &AmpereSources,
    config: &RunConfig,
    timestamp: DateTime<Utc>,
) -> StepOutcome<IfacRecord> {
    let iono = iono_path(&config.swmf_dir, timestamp);
    if let Some(file) = missing(&iono) {
        return StepOutcome::Skipped { file };
    }

    let ampere_totals = |hemisphere: Hemisphere| -> Result<CurrentTotals> {
        let dataset = sources.get(hemisphere);
        let axes = load_ampere_grid(dataset, timestamp, hemisphere)
            .with_context(|| format!("{} ({}) at {}", dataset.source, hemisphere, timestamp))?;
        Ok(integrate_axes_current(&axes, &config.integration)
            .with_context(|| format!("integrating {} ({})", dataset.source, hemisphere))?)
    };

    let run = || -> Result<IfacRecord> {
        let fields = read_iono_file(&iono).with_context(|| format!("reading {}", iono.display()))?;
        let swmf_totals = |hemisphere: Hemisphere| {
            integrate_iono_current(&fields, hemisphere, &config.integration)
                .with_context(|| format!("{} ({}) at {}", iono.display(), hemisphere, timestamp))
        };

        Ok(IfacRecord {
            timestamp,
            ampere: HemisphereCurrents {
                north: ampere_totals(Hemisphere::North)?,
                south: ampere_totals(Hemisphere::South)?,
            },
            swmf: HemisphereCurrents {
                north: swmf_totals(Hemisphere::North)?,
                south: swmf_totals(Hemisphere::South)?,
            },
        })
    };

    match run() {
        Ok(record) => {
            debug!(
                %timestamp,
                ampere_north = record.ampere.north.total,
                swmf_north = record.swmf.north.total,
                "Compared integrated FAC"
            );
            StepOutcome::Done(record)
        }
        Err(e) => StepOutcome::Failed(e),
    }
}

/// `ifac` over the configured window.
pub fn run_ifac(config: &RunConfig) -> Result<BatchReport<IfacRecord>> {
    let timestamps = config.time_range()?.steps(config.cadence())?;
    info!(count = timestamps.len(), "Comparing integrated FAC");

    let Some(sources) = load_ampere_sources(config)? else {
        return Ok(BatchReport {
            records: Vec::new(),
            skipped: timestamps.len(),
            failed: 0,
        });
    };

    Ok(BatchReport::collect(
        timestamps
            .into_iter()
            .map(|ts| (ts, ifac_step(&sources, config, ts))),
    ))
}

// ============================================================================
// Hemispheric power
// ============================================================================

/// Precipitation report for one IE file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HpiReport {
    pub file: String,
    pub time: Option<DateTime<Utc>>,
    /// Total hemispheric power, GW
    pub north_gw: f64,
    pub south_gw: f64,
    pub species: HemisphericPower,
}

pub fn run_hpi(path: &Path, config: &RunConfig) -> Result<HpiReport> {
    let file = read_iono_file(path).with_context(|| format!("reading {}", path.display()))?;
    let species = calc_hemispheric_power(&file, &config.integration)
        .with_context(|| format!("hemispheric power of {}", path.display()))?;

    for hemisphere in Hemisphere::BOTH {
        let table = species.hemisphere(hemisphere);
        for kind in PrecipitationSpecies::ALL {
            debug!(
                %hemisphere,
                species = kind.label(),
                number_flux = table[kind].number_flux,
                energy_flux_gw = table[kind].energy_flux,
                "Precipitation"
            );
        }
    }
    info!(
        file = %path.display(),
        north_gw = species.north.total_power(),
        south_gw = species.south.total_power(),
        "Computed hemispheric power"
    );

    Ok(HpiReport {
        file: path.display().to_string(),
        // header time, else the time in the filename
        time: file.time.or_else(|| iono_time_from_filename(path)),
        north_gw: species.north.total_power(),
        south_gw: species.south.total_power(),
        species,
    })
}

// ============================================================================
// Auroral indices
// ============================================================================

/// One line of `aurora-index` output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AuroraRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub indices: AuroralIndices,
}

/// Magnetometer grid snapshots to evaluate: the configured window stepped by
/// the cadence, or every grid file in the directory when no window is set.
pub fn aurora_timestamps(config: &RunConfig) -> Result<Vec<DateTime<Utc>>> {
    if config.start.is_some() || config.end.is_some() {
        return Ok(config.time_range()?.steps(config.cadence())?);
    }

    let entries = std::fs::read_dir(&config.mag_grid_dir)
        .with_context(|| format!("listing {}", config.mag_grid_dir.display()))?;
    let mut times = Vec::new();
    for entry in entries {
        let entry = entry?;
        if let Some(time) = mag_grid_time_from_filename(entry.path()) {
            times.push(time);
        }
    }
    times.sort();
    Ok(times)
}

pub fn aurora_step(dir: &Path, timestamp: DateTime<Utc>) -> StepOutcome<AuroraRecord> {
    let path = dir.join(mag_grid_filename(timestamp));
    if let Some(file) = missing(&path) {
        return StepOutcome::Skipped { file };
    }

    let run = || -> Result<AuroraRecord> {
        let grid = read_mag_grid(&path).with_context(|| format!("reading {}", path.display()))?;
        let indices = AuroralIndices::from_perturbations(&grid.dbn)
            .with_context(|| format!("indices of {}", path.display()))?;
        Ok(AuroraRecord { timestamp, indices })
    };

    match run() {
        Ok(record) => StepOutcome::Done(record),
        Err(e) => StepOutcome::Failed(e),
    }
}

/// AU/AL/AE series, optionally evaluated on rayon's pool. Output keeps
/// timestamp order either way.
pub fn run_aurora_index(config: &RunConfig, parallel: bool) -> Result<BatchReport<AuroraRecord>> {
    let timestamps = aurora_timestamps(config)?;
    let dir = config.mag_grid_dir.as_path();
    info!(count = timestamps.len(), parallel, "Computing auroral indices");

    let outcomes: Vec<_> = if parallel {
        timestamps
            .par_iter()
            .map(|&ts| (ts, aurora_step(dir, ts)))
            .collect()
    } else {
        timestamps
            .iter()
            .map(|&ts| (ts, aurora_step(dir, ts)))
            .collect()
    };

    Ok(BatchReport::collect(outcomes))
}

// ============================================================================
// Grid dump
// ============================================================================

/// A finalised AMPERE grid, clamped when a saturation limit is configured.
pub fn run_grid(
    config: &RunConfig,
    timestamp: DateTime<Utc>,
    hemisphere: Hemisphere,
) -> Result<PolarAxes> {
    let path = ampere_path(config, hemisphere)?;
    let dataset = read_ampere_file(&path)
        .with_context(|| format!("reading {} ({})", path.display(), hemisphere))?;
    let mut axes = load_ampere_grid(&dataset, timestamp, hemisphere)
        .with_context(|| format!("{} ({}) at {}", path.display(), hemisphere, timestamp))?;

    if let Some(limit) = config.integration.saturation_limit {
        axes.saturate(limit);
    }
    Ok(axes)
}
