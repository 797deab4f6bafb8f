//! Reader for AMPERE hemispheric field-aligned current grids.
//!
//! AMPERE distributes one netCDF file per hemisphere per event. Each file
//! holds a sequence of two-minute epochs; every epoch stores colatitude,
//! magnetic local time and radial current density on an `nlat x nlon` grid,
//! flattened latitude-fastest.
//!
//! # Example
//!
//! ```ignore
//! use ampere_parser::read_ampere_file;
//!
//! let dataset = read_ampere_file("20110926.1000.86400.120.north.grd.ncdf")?;
//! let record = dataset.record(timestamp)?;
//! ```

pub mod dataset;
pub mod error;
pub mod metadata;
pub mod native;

pub use dataset::{AmpereDataset, AmpereRecord, EpochFields};
pub use error::{AmpereError, AmpereResult};
pub use metadata::{parse_ampere_filename, AmpereFileInfo};
pub use native::{read_ampere_file, silence_hdf5_errors};
