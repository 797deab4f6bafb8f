//! Common types and utilities shared across the iono-compare crates.

pub mod error;
pub mod fields;
pub mod grid;
pub mod hemisphere;
pub mod naming;
pub mod time;

pub use error::GridShapeError;
pub use fields::{field_key, FieldMap, IonoFields};
pub use grid::{FieldGrid, ScanOrder};
pub use hemisphere::{Hemisphere, PrecipitationSpecies};
pub use time::{epoch_timestamp, parse_timestamp, TimeParseError, TimeRange};
