//! Auroral electrojet indices from ground magnetic perturbations.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// AU/AL style indices over a set of virtual stations, nT.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuroralIndices {
    /// Largest northward perturbation
    pub au: f64,
    /// Smallest (most negative) northward perturbation
    pub al: f64,
    /// `au + |al|`
    pub ae: f64,
    /// `(au + al) / 2`
    pub ao: f64,
}

impl AuroralIndices {
    /// Indices from the northward perturbation at every station. Non-finite
    /// values are ignored.
    pub fn from_perturbations(values: &[f64]) -> Result<Self> {
        let (al, au) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .ok_or_else(|| {
                GridError::empty_grid(format!(
                    "no finite perturbations among {} stations",
                    values.len()
                ))
            })?;

        Ok(Self {
            au,
            al,
            ae: au + al.abs(),
            ao: (au + al) / 2.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices() {
        let idx = AuroralIndices::from_perturbations(&[12.0, -340.5, 88.25, -15.0]).unwrap();
        assert_eq!(idx.au, 88.25);
        assert_eq!(idx.al, -340.5);
        assert_eq!(idx.ae, 428.75);
        assert_eq!(idx.ao, -126.125);
    }

    #[test]
    fn test_all_positive() {
        let idx = AuroralIndices::from_perturbations(&[5.0, 3.0]).unwrap();
        assert_eq!(idx.al, 3.0);
        assert_eq!(idx.ae, 8.0);
    }

    #[test]
    fn test_empty_and_nan_only() {
        assert!(matches!(
            AuroralIndices::from_perturbations(&[]),
            Err(GridError::EmptyGrid(_))
        ));
        assert!(matches!(
            AuroralIndices::from_perturbations(&[f64::NAN]),
            Err(GridError::EmptyGrid(_))
        ));
    }

    #[test]
    fn test_nan_skipped() {
        let idx = AuroralIndices::from_perturbations(&[f64::NAN, -2.0, 1.0]).unwrap();
        assert_eq!((idx.au, idx.al), (1.0, -2.0));
    }
}
