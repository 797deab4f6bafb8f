//! Path utilities for locating and writing test data files.
//!
//! Real AMPERE and SWMF files are large and not committed; tests that need
//! them look in a few well-known places and skip when absent. Small synthetic
//! fixtures are written into temporary directories instead.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a test file in multiple locations.
///
/// This function checks the following locations in order:
/// 1. Environment variable `TEST_DATA_DIR` (if set)
/// 2. `crates/ampere-parser/testdata/`
/// 3. `crates/swmf-parser/testdata/`
/// 4. `crates/polar-grid/testdata/`
/// 5. `testdata/` at the workspace root
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    // Check environment variable first
    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        root.join("crates/ampere-parser/testdata").join(name),
        root.join("crates/swmf-parser/testdata").join(name),
        root.join("crates/polar-grid/testdata").join(name),
        root.join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_text_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write text fixture");
    path
}

/// Write `contents` gzip-compressed to `dir/name` and return the path.
pub fn write_gzip_fixture(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).expect("Failed to create gzip fixture");
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(contents.as_bytes())
        .expect("Failed to write gzip fixture");
    encoder.finish().expect("Failed to finish gzip fixture");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        // Should contain Cargo.toml at workspace level
        assert!(
            root.join("Cargo.toml").exists(),
            "Workspace root should contain Cargo.toml: {:?}",
            root
        );
    }

    #[test]
    fn test_write_fixtures() {
        let dir = temp_test_dir();
        let plain = write_text_fixture(dir.path(), "a.txt", "hello");
        let gz = write_gzip_fixture(dir.path(), "a.txt.gz", "hello");
        assert_eq!(std::fs::read_to_string(plain).unwrap(), "hello");
        // gzip magic bytes
        assert_eq!(&std::fs::read(gz).unwrap()[..2], &[0x1f, 0x8b]);
    }
}
