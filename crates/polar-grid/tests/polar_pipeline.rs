//! End-to-end regridding and integration against hand-computed values.

use std::f64::consts::PI;

use ampere_parser::{AmpereDataset, EpochFields};
use chrono::{TimeZone, Utc};
use iono_common::{FieldGrid, Hemisphere, IonoFields, PrecipitationSpecies};
use polar_grid::{
    calc_hemispheric_power, integrate_axes_current, integrate_iono_current, load_ampere_grid,
    GridError, IntegrationConfig, PolarAxes,
};
use test_utils::{ampere_2x3, ampere_epoch_arrays, assert_approx_eq, physics, IdlBuilder};

fn fixture_dataset() -> AmpereDataset {
    let epochs = (0..3).map(|t| EpochFields::new(2011, 9, 26, 10, 2 * t)).collect();
    let copies = |values: &[f64]| vec![values.to_vec(); 3];
    AmpereDataset::new(
        "fixture.north.grd.ncdf",
        ampere_2x3::NLAT,
        ampere_2x3::NLON,
        epochs,
        copies(&ampere_2x3::COLAT),
        copies(&ampere_2x3::MLT),
        copies(&ampere_2x3::JR),
    )
    .unwrap()
}

fn middle_epoch() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2011, 9, 26, 10, 2, 0).unwrap()
}

// ============================================================================
// AMPERE grids
// ============================================================================

#[test]
fn test_2x3_fixture_end_to_end() {
    let axes = load_ampere_grid(&fixture_dataset(), middle_epoch(), Hemisphere::North).unwrap();
    assert_eq!(axes.shape(), (2, 4));
    assert_eq!(axes.timestamp, Some(middle_epoch()));

    // latitude 91 - colat: ring 0 at the pole, ring 1 one degree away
    assert_eq!(axes.radius.row(0).unwrap(), &[0.0; 4]);
    assert_eq!(axes.radius.row(1).unwrap(), &[1.0; 4]);
    assert_eq!(axes.value.row(1).unwrap(), &[0.25, -1.0, 3.0, 0.25]);

    let totals = integrate_axes_current(&axes, &IntegrationConfig::default()).unwrap();

    // Only ring 1 has sin(colat) > 0; the ghost column is not counted.
    let cell = physics::MICROAMP_TO_MEGAAMP
        * physics::IONOSPHERE_RADIUS_M.powi(2)
        * 1f64.to_radians().sin()
        * 1f64.to_radians()
        * (2.0 * PI / 3.0);
    assert_approx_eq!(totals.upward, 3.25 * cell, 1e-12);
    assert_approx_eq!(totals.downward, -1.0 * cell, 1e-12);
    assert_approx_eq!(totals.net, 2.25 * cell, 1e-12);
    assert_approx_eq!(totals.total, 0.5 * 4.25 * cell, 1e-12);
}

#[test]
fn test_hemispheres_mirror_radius() {
    let dataset = fixture_dataset();
    let north = load_ampere_grid(&dataset, middle_epoch(), Hemisphere::North).unwrap();
    let south = load_ampere_grid(&dataset, middle_epoch(), Hemisphere::South).unwrap();

    for (i, j, colat) in [(0, 0, 1.0), (1, 2, 2.0)] {
        let lat = 91.0 - colat;
        assert_eq!(north.radius.get(i, j), Some(90.0 - lat));
        assert_eq!(south.radius.get(i, j), Some(90.0 + lat));
    }

    // sin(180 - x) = sin(x), and the ring step has the same size
    let config = IntegrationConfig::default();
    let n = integrate_axes_current(&north, &config).unwrap();
    let s = integrate_axes_current(&south, &config).unwrap();
    assert_approx_eq!(n.total, s.total, n.total.abs() * 1e-9);
}

#[test]
fn test_wraparound_on_generated_grid() {
    let arrays = ampere_epoch_arrays(6, 8, 1.0, 1.0, |i, j| (i as f64 - 2.5) * (j as f64 + 1.0));
    let dataset = AmpereDataset::new(
        "generated.south.grd.ncdf",
        6,
        8,
        vec![EpochFields::new(2011, 9, 26, 10, 0)],
        vec![arrays.colat],
        vec![arrays.mlt],
        vec![arrays.jr],
    )
    .unwrap();
    let ts = Utc.with_ymd_and_hms(2011, 9, 26, 10, 0, 0).unwrap();

    for h in Hemisphere::BOTH {
        let axes = load_ampere_grid(&dataset, ts, h).unwrap();
        assert!(axes.ghost_column);
        assert_eq!(axes.physical_columns(), 8);
        for i in 0..6 {
            assert_eq!(axes.value.get(i, 8), axes.value.get(i, 0));
            assert_eq!(axes.radius.get(i, 8), axes.radius.get(i, 0));
        }
    }
}

#[test]
fn test_absent_timestamp() {
    let late = Utc.with_ymd_and_hms(2011, 9, 26, 12, 0, 0).unwrap();
    let err = load_ampere_grid(&fixture_dataset(), late, Hemisphere::North).unwrap_err();
    match err {
        GridError::TimestampNotFound { timestamp, file } => {
            assert_eq!(timestamp, late);
            assert_eq!(file, "fixture.north.grd.ncdf");
        }
        other => panic!("expected TimestampNotFound, got {other}"),
    }
}

#[test]
fn test_saturation_keeps_shape() {
    let mut axes = load_ampere_grid(&fixture_dataset(), middle_epoch(), Hemisphere::North).unwrap();
    axes.saturate(1.0);
    assert_eq!(axes.value_range(), Some((-1.0, 1.0)));
    assert_eq!(axes.shape(), (2, 4));
}

// ============================================================================
// Model output
// ============================================================================

fn model_text() -> String {
    IdlBuilder::new(9, 13)
        .variable("JR", "`mA/m`+2", |p| {
            let sign = if p.north { 0.5 } else { -0.5 };
            sign * (p.j as f64 - 6.0)
        })
        .constant("RT Rho", "`kg/m`+3", 1e-20)
        .constant("diff_Ave-E", "keV", 2.0)
        .constant("diff_E-Flux", "W/m2", 1e-3)
        .constant("idif_Ave-E", "keV", 8.0)
        .constant("idif_E-Flux", "W/m2", 2e-4)
        .constant("mono_E-Flux", "W/m2", 5e-4)
        .constant("bbnd_N-Flux", "/cm2/s", 1e8)
        .constant("bbnd_E-Flux", "W/m2", 1e-4)
        .build()
}

#[test]
fn test_model_current_linear_and_decomposed() {
    let file = swmf_parser::parse_iono(&model_text()).unwrap();
    let config = IntegrationConfig::default();

    for h in Hemisphere::BOTH {
        let totals = integrate_iono_current(&file, h, &config).unwrap();
        assert_approx_eq!(
            totals.total,
            0.5 * (totals.upward.abs() + totals.downward.abs()),
            1e-9
        );
        assert!(totals.upward > 0.0 && totals.downward < 0.0);
    }

    let mut scaled = file.fields().clone();
    let jr = file.field(Hemisphere::North, "jr").unwrap().map(|v| 3.0 * v);
    scaled.insert(Hemisphere::North, "jr", jr);
    let base = integrate_iono_current(&file, Hemisphere::North, &config).unwrap();
    let tripled = integrate_iono_current(&scaled, Hemisphere::North, &config).unwrap();
    assert_approx_eq!(tripled.total, 3.0 * base.total, base.total.abs() * 1e-12);
    assert_approx_eq!(tripled.net, 3.0 * base.net, 1e-9);
}

#[test]
fn test_model_axes_orientation() {
    let file = swmf_parser::parse_iono(&model_text()).unwrap();
    let south = PolarAxes::from_iono(&file, Hemisphere::South).unwrap();

    // southern theta runs 90..180, mapped back to 90..0 from the pole
    assert_approx_eq!(south.radius.get(0, 0).unwrap(), 90.0, 1e-9);
    assert_approx_eq!(south.radius.get(8, 0).unwrap(), 0.0, 1e-9);
    assert_approx_eq!(south.angle.get(0, 0).unwrap(), PI / 2.0, 1e-9);
}

#[test]
fn test_hemispheric_power_report() {
    let file = swmf_parser::parse_iono(&model_text()).unwrap();
    let power = calc_hemispheric_power(&file, &IntegrationConfig::default()).unwrap();

    // constant fluxes: energy flux ratios follow the inputs
    let north = power.hemisphere(Hemisphere::North);
    let diff = north[PrecipitationSpecies::ElectronDiffuse].energy_flux;
    let bbnd = north[PrecipitationSpecies::Broadband].energy_flux;
    assert_approx_eq!(diff / bbnd, 10.0, 1e-6);
    assert!(north.total_power() > 0.0);

    // upward current is half of each hemisphere with opposite sign, so the
    // monoenergetic number flux mirrors between hemispheres
    let mono_n = power.north[PrecipitationSpecies::Monoenergetic].number_flux;
    let mono_s = power.south[PrecipitationSpecies::Monoenergetic].number_flux;
    assert!(mono_n > 0.0);
    assert!(mono_s > 0.0);

    let json = serde_json::to_value(power).unwrap();
    assert!(json["south"]["idif"]["number_flux"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_model_grid_too_small_for_spacing() {
    let grid = FieldGrid::filled(3, 3, 1.0);
    let fields = iono_common::FieldMap::new(3, 3)
        .with(Hemisphere::North, "theta", grid.clone())
        .with(Hemisphere::North, "psi", grid.clone())
        .with(Hemisphere::North, "jr", grid);
    assert!(matches!(
        integrate_iono_current(&fields, Hemisphere::North, &IntegrationConfig::default()),
        Err(GridError::InvalidSpacing(_))
    ));
}
