//! AMPERE / SWMF ionospheric comparison runs.
//!
//! Library half of the `iono-compare` binary: run configuration and the
//! per-timestamp pipelines behind each subcommand.

pub mod config;
pub mod pipeline;

pub use config::RunConfig;
pub use pipeline::{
    ampere_path, find_ampere_file, run_aurora_index, run_grid, run_hpi, run_ifac, AuroraRecord, BatchReport, HpiReport,
    IfacRecord, StepOutcome,
};
