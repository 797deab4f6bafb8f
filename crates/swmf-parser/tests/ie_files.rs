//! On-disk reading of generated IE and magnetometer grid files.

use iono_common::{Hemisphere, IonoFields};
use swmf_parser::{read_iono_file, read_mag_grid, SwmfError};
use test_utils::{
    assert_approx_eq, fixtures, mag_grid_text, temp_test_dir, write_gzip_fixture,
    write_text_fixture, IdlBuilder,
};

fn builder() -> IdlBuilder {
    IdlBuilder::new(5, 9)
        .variable("JR", "`mA/m`+2", |p| if p.north { p.theta } else { -p.psi })
        .constant("RT Rho", "`m`", 2.5)
}

// ============================================================================
// IE output
// ============================================================================

#[test]
fn test_plain_and_gzip_read_identically() {
    let dir = temp_test_dir();
    let text = builder().build();
    let plain = write_text_fixture(dir.path(), fixtures::files::IE_OUTPUT, &text);
    let gz = write_gzip_fixture(
        dir.path(),
        &format!("{}.gz", fixtures::files::IE_OUTPUT),
        &text,
    );

    let a = read_iono_file(plain).unwrap();
    let b = read_iono_file(gz).unwrap();

    assert_eq!(a.variable_names(), vec!["theta", "psi", "jr", "rt rho"]);
    assert_eq!(a.variable_names(), b.variable_names());
    for h in Hemisphere::BOTH {
        assert_eq!(a.field(h, "jr"), b.field(h, "jr"));
    }
}

#[test]
fn test_generated_coordinates() {
    let dir = temp_test_dir();
    let path = write_text_fixture(dir.path(), "it.idl", &builder().build());
    let file = read_iono_file(path).unwrap();

    assert_eq!(file.ntheta(), 5);
    assert_eq!(file.nphi(), 9);

    let theta = file.field(Hemisphere::North, "theta").unwrap();
    let psi = file.field(Hemisphere::North, "psi").unwrap();
    assert_approx_eq!(theta.get(3, 0).unwrap() - theta.get(2, 0).unwrap(), 22.5, 1e-9);
    assert_approx_eq!(psi.get(0, 3).unwrap() - psi.get(0, 2).unwrap(), 45.0, 1e-9);

    let south_theta = file.field(Hemisphere::South, "theta").unwrap();
    assert_approx_eq!(south_theta.get(0, 0).unwrap(), 90.0, 1e-9);

    let north_jr = file.field(Hemisphere::North, "jr").unwrap();
    assert_approx_eq!(north_jr.get(4, 7).unwrap(), 90.0, 1e-9);
    let south_jr = file.field(Hemisphere::South, "jr").unwrap();
    assert_approx_eq!(south_jr.get(4, 7).unwrap(), -315.0, 1e-9);

    let rho = file.field(Hemisphere::South, "rt rho").unwrap();
    assert!(rho.iter().all(|v| (v - 2.5).abs() < 1e-12));
}

#[test]
fn test_time_header() {
    let text = builder().time([2011, 9, 26, 14, 8, 0, 0]).build();
    let file = swmf_parser::parse_iono(&text).unwrap();
    let expected = iono_common::parse_timestamp(fixtures::IE_TIME).unwrap();
    assert_eq!(file.time(), Some(expected));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = temp_test_dir();
    let err = read_iono_file(dir.path().join("it000000_000000_000.idl")).unwrap_err();
    assert!(matches!(err, SwmfError::IoError(_)));
}

// ============================================================================
// Magnetometer grid
// ============================================================================

#[test]
fn test_mag_grid_file() {
    let dir = temp_test_dir();
    let values = [12.0, -340.5, 88.25, -15.0];
    let path = write_text_fixture(
        dir.path(),
        fixtures::files::MAG_GRID,
        &mag_grid_text(&values),
    );

    let grid = read_mag_grid(path).unwrap();
    assert_eq!(grid.dbn, values.to_vec());
}
