//! Test data generators for synthetic ionospheric inputs.
//!
//! These produce the raw layouts the readers consume (latitude-fastest AMPERE
//! records, IE IDL text, magnetometer grid text) so parsers and integrators
//! can be tested without real event files.

use std::fmt::Write;

/// One AMPERE epoch in file layout (latitude fastest, `i + j * nlat`).
#[derive(Debug, Clone, PartialEq)]
pub struct AmpereEpochArrays {
    pub colat: Vec<f64>,
    pub mlt: Vec<f64>,
    pub jr: Vec<f64>,
}

/// Build one AMPERE epoch with rings at `colat0 + i * dcolat` degrees,
/// sectors at `j * 24 / nlon` hours and `jr(i, j)` current density.
pub fn ampere_epoch_arrays(
    nlat: usize,
    nlon: usize,
    colat0: f64,
    dcolat: f64,
    jr: impl Fn(usize, usize) -> f64,
) -> AmpereEpochArrays {
    let n = nlat * nlon;
    let mut arrays = AmpereEpochArrays {
        colat: Vec::with_capacity(n),
        mlt: Vec::with_capacity(n),
        jr: Vec::with_capacity(n),
    };

    let sector_hours = if nlon == 0 { 0.0 } else { 24.0 / nlon as f64 };
    for j in 0..nlon {
        for i in 0..nlat {
            arrays.colat.push(colat0 + i as f64 * dcolat);
            arrays.mlt.push(j as f64 * sector_hours);
            arrays.jr.push(jr(i, j));
        }
    }
    arrays
}

/// Location of one point while generating IE output.
#[derive(Debug, Clone, Copy)]
pub struct IdlPoint {
    pub north: bool,
    /// Colatitude row
    pub i: usize,
    /// Longitude column
    pub j: usize,
    /// Colatitude, degrees (0..90 north, 90..180 south)
    pub theta: f64,
    /// Longitude from midnight, degrees
    pub psi: f64,
}

type PointFn = Box<dyn Fn(IdlPoint) -> f64>;

/// Builder for SWMF IE IDL text.
///
/// `Theta` and `Psi` are always written first on an evenly spaced grid; other
/// variables are added with [`IdlBuilder::variable`].
pub struct IdlBuilder {
    ntheta: usize,
    nphi: usize,
    time: [i32; 7],
    variables: Vec<(String, String, PointFn)>,
}

impl IdlBuilder {
    pub fn new(ntheta: usize, nphi: usize) -> Self {
        Self {
            ntheta,
            nphi,
            time: [2011, 9, 26, 14, 8, 0, 0],
            variables: Vec::new(),
        }
    }

    /// Year, month, day, hour, minute, second, millisecond.
    pub fn time(mut self, time: [i32; 7]) -> Self {
        self.time = time;
        self
    }

    /// Add a variable whose value at each point is `f(point)`.
    pub fn variable(
        mut self,
        name: &str,
        unit: &str,
        f: impl Fn(IdlPoint) -> f64 + 'static,
    ) -> Self {
        self.variables
            .push((name.to_string(), unit.to_string(), Box::new(f)));
        self
    }

    /// Add a variable with the same value everywhere.
    pub fn constant(self, name: &str, unit: &str, value: f64) -> Self {
        self.variable(name, unit, move |_| value)
    }

    /// Colatitude spacing in degrees.
    pub fn dtheta(&self) -> f64 {
        if self.ntheta < 2 {
            0.0
        } else {
            90.0 / (self.ntheta - 1) as f64
        }
    }

    /// Longitude spacing in degrees.
    pub fn dpsi(&self) -> f64 {
        if self.nphi < 2 {
            0.0
        } else {
            360.0 / (self.nphi - 1) as f64
        }
    }

    fn point(&self, north: bool, i: usize, j: usize) -> IdlPoint {
        let offset = if north { 0.0 } else { 90.0 };
        IdlPoint {
            north,
            i,
            j,
            theta: offset + i as f64 * self.dtheta(),
            psi: j as f64 * self.dpsi(),
        }
    }

    /// Render the file text.
    pub fn build(&self) -> String {
        let nvars = self.variables.len() + 2;
        let mut out = String::new();

        section(&mut out, "TITLE");
        let _ = writeln!(out, " \"Synthetic ionospheric electrodynamics output\"");
        let _ = writeln!(out);
        section(&mut out, "NUMERICAL VALUES");
        let _ = writeln!(out, "{:>12}  nvars", nvars);
        let _ = writeln!(out, "{:>12}  nTheta", self.ntheta);
        let _ = writeln!(out, "{:>12}  nPhi", self.nphi);
        let _ = writeln!(out);
        section(&mut out, "TIME");
        for (value, label) in self.time.iter().zip([
            "year", "month", "day", "hour", "minute", "second", "msecond",
        ]) {
            let _ = writeln!(out, "{:>12}  {}", value, label);
        }
        let _ = writeln!(out);
        section(&mut out, "SIMULATION");
        let _ = writeln!(out, "{:>12}  time step", 0);
        let _ = writeln!(out, "{:>24.13E}  simulation time", 0.0);
        let _ = writeln!(out);
        section(&mut out, "DIPOLE TILT");
        let _ = writeln!(out, "{:>12.4}  xx", 0.0);
        let _ = writeln!(out, "{:>12.4}  yy", 0.0);
        let _ = writeln!(out);
        section(&mut out, "VARIABLE LIST");
        let _ = writeln!(out, "{:>5} {:<20} [deg]", 1, "Theta");
        let _ = writeln!(out, "{:>5} {:<20} [deg]", 2, "Psi");
        for (k, (name, unit, _)) in self.variables.iter().enumerate() {
            let _ = writeln!(out, "{:>5} {:<20} [{}]", k + 3, name, unit);
        }
        let _ = writeln!(out);

        for (north, header) in [
            (true, "BEGIN NORTHERN HEMISPHERE"),
            (false, "BEGIN SOUTHERN HEMISPHERE"),
        ] {
            let _ = writeln!(out, " {}", header);
            for j in 0..self.nphi {
                for i in 0..self.ntheta {
                    let point = self.point(north, i, j);
                    let _ = write!(out, " {:.6E} {:.6E}", point.theta, point.psi);
                    for (_, _, f) in &self.variables {
                        let _ = write!(out, " {:.6E}", f(point));
                    }
                    let _ = writeln!(out);
                }
            }
        }
        out
    }
}

/// Title line followed by its `=` underline.
fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, " {}", title);
    let _ = writeln!(out, " {}", "=".repeat(title.len()));
}

/// Render magnetometer grid text: four header lines, then
/// `lon lat dBn dBe dBd` rows with `dBn` taken from `values`.
pub fn mag_grid_text(values: &[f64]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Magnetometer grid (MAG) perturbations");
    let _ = writeln!(out, "t=2010-04-05 08:30:00");
    let _ = writeln!(out, "{:>5} {:>5}", values.len(), 5);
    let _ = writeln!(out, "Lon Lat dBn dBe dBd");
    for (k, value) in values.iter().enumerate() {
        let lon = (k * 5 % 360) as f64;
        let lat = 60.0 + (k / 72) as f64;
        let _ = writeln!(out, "{:8.2} {:8.2} {:14.6} {:10.3} {:10.3}", lon, lat, value, 0.0, 0.0);
    }
    out
}
