//! Dev-only helpers shared by the iono-compare tests.
//!
//! - [`paths`]: locating optional event files, writing temporary fixtures
//! - [`generators`]: synthetic AMPERE records, IE IDL text and magnetometer grids
//! - [`fixtures`]: small hand-checkable inputs and canonical filenames
//!
//! Real AMPERE and SWMF event files are not committed. Tests that need one use
//! [`require_test_file!`] and return early when it is absent.

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Resolve an event file via [`find_test_file`], or print a skip notice and
/// return from the calling test.
///
/// ```ignore
/// let path = require_test_file!("20110926.1000.86400.120.north.grd.ncdf");
/// ```
#[macro_export]
macro_rules! require_test_file {
    ($name:expr) => {{
        match $crate::find_test_file($name) {
            Some(path) => path,
            None => {
                eprintln!(
                    "SKIPPED: Test file '{}' not found. Download test data or set TEST_DATA_DIR.",
                    $name
                );
                return;
            }
        }
    }};
}

/// Assert `|left - right| <= epsilon`, comparing as `f64`.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff.is_nan() || diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
