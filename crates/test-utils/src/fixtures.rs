//! Common test fixtures for iono-compare tests.
//!
//! Small hand-checkable inputs shared by the parser, grid and service tests.

/// Physical constants used when checking integrated quantities by hand.
pub mod physics {
    /// Earth radius plus ionospheric altitude, metres
    pub const IONOSPHERE_RADIUS_M: f64 = (6371.0 + 110.0) * 1000.0;

    /// µA/m² integrated over m² to MA
    pub const MICROAMP_TO_MEGAAMP: f64 = 1e-12;
}

/// A 2-ring, 3-sector AMPERE epoch with mixed-sign currents.
///
/// Arrays are in file layout, latitude fastest (`i + j * NLAT`).
pub mod ampere_2x3 {
    pub const NLAT: usize = 2;
    pub const NLON: usize = 3;

    /// Colatitude 1° for ring 0, 2° for ring 1
    pub const COLAT: [f64; 6] = [1.0, 2.0, 1.0, 2.0, 1.0, 2.0];

    /// Sectors at 0, 8 and 16 MLT
    pub const MLT: [f64; 6] = [0.0, 0.0, 8.0, 8.0, 16.0, 16.0];

    /// `jr[i][j]` = `[[1.0, -2.0, 0.5], [0.25, -1.0, 3.0]]`
    pub const JR: [f64; 6] = [1.0, 0.25, -2.0, -1.0, 0.5, 3.0];

    /// `JR` as rows (ring-major), for comparing against regridded values
    pub const JR_ROWS: [[f64; 3]; 2] = [[1.0, -2.0, 0.5], [0.25, -1.0, 3.0]];
}

/// A timestamp with matching IE output in the reference event.
pub const IE_TIME: &str = "2011-09-26T14:08:00Z";

/// Canonical filenames.
pub mod files {
    pub const AMPERE_NORTH: &str = "20110926.1000.86400.120.north.grd.ncdf";
    pub const AMPERE_SOUTH: &str = "20110926.1000.86400.120.south.grd.ncdf";
    pub const IE_OUTPUT: &str = "it110926_140800_000.idl";
    pub const MAG_GRID: &str = "mag_grid_e20100405-083000.out";
}
