//! Narrow read contract for ionospheric model output.
//!
//! Model files expose per-hemisphere 2-D arrays keyed by name (`theta`, `psi`,
//! `jr`, `diff_e-flux`, `rt rho`, ...). Integration and regridding code only
//! depends on this trait, so it can be exercised with in-memory fixtures.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::grid::FieldGrid;
use crate::hemisphere::Hemisphere;

/// A source of named hemispheric fields.
pub trait IonoFields {
    /// The 2-D array named `name` for `hemisphere`, if present.
    fn field(&self, hemisphere: Hemisphere, name: &str) -> Option<&FieldGrid>;

    /// Number of colatitude rows per hemisphere.
    fn ntheta(&self) -> usize;

    /// Number of longitude / local-time columns per hemisphere.
    fn nphi(&self) -> usize;

    /// Simulation time of the output, when known.
    fn time(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// Compose the prefixed key used by model output, e.g. `n_jr`.
pub fn field_key(hemisphere: Hemisphere, name: &str) -> String {
    format!("{}_{}", hemisphere.prefix(), name)
}

/// In-memory `IonoFields` backed by a map of prefixed keys.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    pub ntheta: usize,
    pub nphi: usize,
    pub time: Option<DateTime<Utc>>,
    fields: HashMap<String, FieldGrid>,
}

impl FieldMap {
    pub fn new(ntheta: usize, nphi: usize) -> Self {
        Self {
            ntheta,
            nphi,
            time: None,
            fields: HashMap::new(),
        }
    }

    pub fn insert(&mut self, hemisphere: Hemisphere, name: &str, grid: FieldGrid) {
        self.fields.insert(field_key(hemisphere, name), grid);
    }

    /// Builder form of `insert`.
    pub fn with(mut self, hemisphere: Hemisphere, name: &str, grid: FieldGrid) -> Self {
        self.insert(hemisphere, name, grid);
        self
    }
}

impl IonoFields for FieldMap {
    fn field(&self, hemisphere: Hemisphere, name: &str) -> Option<&FieldGrid> {
        self.fields.get(&field_key(hemisphere, name))
    }

    fn ntheta(&self) -> usize {
        self.ntheta
    }

    fn nphi(&self) -> usize {
        self.nphi
    }

    fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }
}
