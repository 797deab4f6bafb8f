//! SWMF ionospheric electrodynamics (IE) IDL output.
//!
//! The ASCII format is a sequence of titled sections, each title optionally
//! underlined with `=`, followed by two data blocks:
//!
//! ```text
//!  NUMERICAL VALUES
//!  ================
//!           15  nvars
//!           91  nTheta
//!          181  nPhi
//!  TIME
//!  ====
//!         2011  year
//!            9  month
//!          ...  day .. msecond
//!  SIMULATION
//!  ==========
//!            0  time step
//!  VARIABLE LIST
//!     1 Theta                [deg]
//!     2 Psi                  [deg]
//!     8 JR                   [`mA/m`+2]
//!  BEGIN NORTHERN HEMISPHERE
//!   <nvars values per point, ntheta * nphi points, theta fastest>
//!  BEGIN SOUTHERN HEMISPHERE
//!   ...
//! ```
//!
//! Sections other than the ones read here (`SIMULATION`, `DIPOLE TILT`, any
//! other upper-case title) are skipped.
//!
//! Variable names are lower-cased and multi-word names keep a single space
//! (`RT Rho` becomes `rt rho`), so fields are looked up as `jr`, `rt rho`,
//! `diff_e-flux`, ...

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use flate2::read::GzDecoder;
use tracing::{debug, info};

use iono_common::{FieldGrid, FieldMap, Hemisphere, IonoFields};

use crate::error::{SwmfError, SwmfResult};

/// One entry of the `VARIABLE LIST` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IonoVariable {
    /// 1-based column index as written in the file
    pub index: usize,
    /// Lower-cased name
    pub name: String,
    /// Unit text between the brackets, possibly empty
    pub unit: String,
}

/// A parsed IE output file.
#[derive(Debug, Clone)]
pub struct IonoFile {
    pub nvars: usize,
    pub time: Option<DateTime<Utc>>,
    pub variables: Vec<IonoVariable>,
    fields: FieldMap,
}

impl IonoFile {
    /// Lower-cased variable names in file order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.variables.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }
}

impl IonoFields for IonoFile {
    fn field(&self, hemisphere: Hemisphere, name: &str) -> Option<&FieldGrid> {
        self.fields.field(hemisphere, name)
    }

    fn ntheta(&self) -> usize {
        self.fields.ntheta
    }

    fn nphi(&self) -> usize {
        self.fields.nphi
    }

    fn time(&self) -> Option<DateTime<Utc>> {
        self.time
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Title,
    Numerical,
    Time,
    Simulation,
    DipoleTilt,
    /// Any other upper-case title
    Unknown,
    Variables,
    North,
    South,
}

impl Section {
    fn from_header(line: &str) -> Option<Self> {
        match line.trim() {
            "TITLE" => Some(Section::Title),
            "NUMERICAL VALUES" => Some(Section::Numerical),
            "TIME" => Some(Section::Time),
            "SIMULATION" => Some(Section::Simulation),
            "DIPOLE TILT" => Some(Section::DipoleTilt),
            "VARIABLE LIST" => Some(Section::Variables),
            "BEGIN NORTHERN HEMISPHERE" => Some(Section::North),
            "BEGIN SOUTHERN HEMISPHERE" => Some(Section::South),
            other if is_title(other) => Some(Section::Unknown),
            _ => None,
        }
    }
}

/// Upper-case letters and spaces only, e.g. `RUN PARAMETERS`.
fn is_title(line: &str) -> bool {
    line.chars().any(|c| c.is_ascii_uppercase())
        && line.chars().all(|c| c.is_ascii_uppercase() || c == ' ')
}

fn is_underline(line: &str) -> bool {
    !line.is_empty() && line.chars().all(|c| c == '=')
}

#[derive(Default)]
struct Header {
    nvars: Option<usize>,
    ntheta: Option<usize>,
    nphi: Option<usize>,
    time: [Option<i64>; 7],
    saw_numerical: bool,
    time_line: Option<usize>,
    variables_line: Option<usize>,
    variables: Vec<IonoVariable>,
}

const TIME_LABELS: [&str; 7] = [
    "year",
    "month",
    "day",
    "hour",
    "minute",
    "second",
    "millisecond",
];

fn time_slot(label: &str) -> Option<usize> {
    match label {
        "msecond" | "msec" => Some(6),
        _ => TIME_LABELS.iter().position(|l| *l == label),
    }
}

/// Parse IE IDL text.
pub fn parse_iono(text: &str) -> SwmfResult<IonoFile> {
    let mut header = Header::default();
    let mut section = Section::Preamble;
    let mut north: Option<(usize, Vec<f64>)> = None;
    let mut south: Option<(usize, Vec<f64>)> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || is_underline(trimmed) {
            continue;
        }

        if let Some(next) = Section::from_header(trimmed) {
            section = next;
            match next {
                Section::Numerical => header.saw_numerical = true,
                Section::Time => header.time_line = Some(line_no),
                Section::Variables => header.variables_line = Some(line_no),
                Section::North => north = Some((line_no, Vec::new())),
                Section::South => south = Some((line_no, Vec::new())),
                Section::Unknown => debug!(line = line_no, title = trimmed, "Skipping IE section"),
                _ => {}
            }
            continue;
        }

        match section {
            Section::Preamble
            | Section::Title
            | Section::Simulation
            | Section::DipoleTilt
            | Section::Unknown => {}
            Section::Numerical => {
                let (value, label) = value_and_label(trimmed, line_no)?;
                match label.to_lowercase().as_str() {
                    "nvars" => header.nvars = Some(to_count(value, line_no)?),
                    "ntheta" => header.ntheta = Some(to_count(value, line_no)?),
                    "nphi" => header.nphi = Some(to_count(value, line_no)?),
                    other => debug!(field = other, "Ignoring numerical header field"),
                }
            }
            Section::Time => {
                let (value, label) = value_and_label(trimmed, line_no)?;
                if let Some(slot) = time_slot(&label.to_lowercase()) {
                    header.time[slot] = Some(value.round() as i64);
                }
            }
            Section::Variables => header.variables.push(parse_variable(trimmed, line_no)?),
            Section::North => push_values(&mut north, trimmed, line_no)?,
            Section::South => push_values(&mut south, trimmed, line_no)?,
        }
    }

    if !header.saw_numerical {
        return Err(SwmfError::MissingSection("NUMERICAL VALUES".to_string()));
    }
    let nvars = header
        .nvars
        .ok_or_else(|| SwmfError::MissingField("nvars".to_string()))?;
    let ntheta = header
        .ntheta
        .ok_or_else(|| SwmfError::MissingField("nTheta".to_string()))?;
    let nphi = header
        .nphi
        .ok_or_else(|| SwmfError::MissingField("nPhi".to_string()))?;

    let variables_line = header
        .variables_line
        .ok_or_else(|| SwmfError::MissingSection("VARIABLE LIST".to_string()))?;
    if header.variables.len() != nvars {
        return Err(SwmfError::invalid(
            variables_line,
            format!(
                "variable list has {} entries, nvars is {}",
                header.variables.len(),
                nvars
            ),
        ));
    }

    let time = match header.time_line {
        Some(line_no) => Some(build_time(&header.time, line_no)?),
        None => None,
    };

    let mut fields = FieldMap::new(ntheta, nphi);
    fields.time = time;

    for (hemisphere, block, name) in [
        (Hemisphere::North, north, "BEGIN NORTHERN HEMISPHERE"),
        (Hemisphere::South, south, "BEGIN SOUTHERN HEMISPHERE"),
    ] {
        let (line_no, values) = block.ok_or_else(|| SwmfError::MissingSection(name.to_string()))?;
        split_block(&mut fields, hemisphere, &header.variables, ntheta, nphi, &values)
            .map_err(|message| SwmfError::invalid(line_no, message))?;
    }

    Ok(IonoFile {
        nvars,
        time,
        variables: header.variables,
        fields,
    })
}

/// Read an IE IDL file, decompressing `.gz` files transparently.
pub fn read_iono_file<P: AsRef<Path>>(path: P) -> SwmfResult<IonoFile> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;

    let mut text = String::new();
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        GzDecoder::new(file).read_to_string(&mut text)?;
    } else {
        std::io::BufReader::new(file).read_to_string(&mut text)?;
    }

    let parsed = parse_iono(&text)?;
    info!(
        file = %path.display(),
        ntheta = parsed.ntheta(),
        nphi = parsed.nphi(),
        nvars = parsed.nvars,
        "Loaded IE output"
    );
    Ok(parsed)
}

/// Output time encoded in an IE filename such as `it110926_140800_000.idl`
/// (two-digit year, interpreted as 20YY).
pub fn iono_time_from_filename<P: AsRef<Path>>(path: P) -> Option<DateTime<Utc>> {
    let filename = path.as_ref().file_name()?.to_str()?;
    let stamp = filename.strip_prefix("it")?.get(..13)?;
    let naive = NaiveDateTime::parse_from_str(&format!("20{}", stamp), "%Y%m%d_%H%M%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

// =============================================================================
// Internal helpers
// =============================================================================

fn parse_number(token: &str, line: usize) -> SwmfResult<f64> {
    // Fortran writers occasionally emit `D` exponents
    token
        .replace(['D', 'd'], "E")
        .parse::<f64>()
        .map_err(|_| SwmfError::invalid(line, format!("not a number: '{}'", token)))
}

fn value_and_label(line: &str, line_no: usize) -> SwmfResult<(f64, &str)> {
    let mut parts = line.split_whitespace();
    let value = parts
        .next()
        .ok_or_else(|| SwmfError::invalid(line_no, "empty header line"))?;
    let label = parts
        .next()
        .ok_or_else(|| SwmfError::invalid(line_no, "header value without a label"))?;
    Ok((parse_number(value, line_no)?, label))
}

fn to_count(value: f64, line: usize) -> SwmfResult<usize> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(SwmfError::invalid(line, format!("invalid count {}", value)));
    }
    Ok(value as usize)
}

fn parse_variable(line: &str, line_no: usize) -> SwmfResult<IonoVariable> {
    let (index, rest) = line
        .split_once(char::is_whitespace)
        .ok_or_else(|| SwmfError::invalid(line_no, "variable entry without a name"))?;
    let index = index
        .parse::<usize>()
        .map_err(|_| SwmfError::invalid(line_no, format!("bad variable index '{}'", index)))?;

    let (name, unit) = match rest.find('[') {
        Some(pos) => (
            &rest[..pos],
            rest[pos + 1..].trim().trim_end_matches(']'),
        ),
        None => (rest, ""),
    };

    let name = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    if name.is_empty() {
        return Err(SwmfError::invalid(line_no, "empty variable name"));
    }

    Ok(IonoVariable {
        index,
        name,
        unit: unit.to_string(),
    })
}

fn push_values(block: &mut Option<(usize, Vec<f64>)>, line: &str, line_no: usize) -> SwmfResult<()> {
    if let Some((_, values)) = block.as_mut() {
        for token in line.split_whitespace() {
            values.push(parse_number(token, line_no)?);
        }
    }
    Ok(())
}

fn build_time(fields: &[Option<i64>; 7], line_no: usize) -> SwmfResult<DateTime<Utc>> {
    let get = |slot: usize| {
        fields[slot].ok_or_else(|| SwmfError::MissingField(format!("TIME {}", TIME_LABELS[slot])))
    };
    let year = get(0)?;
    let month = get(1)?;
    let day = get(2)?;
    let hour = get(3)?;
    let minute = get(4)?;
    let second = get(5)?;
    let millisecond = fields[6].unwrap_or(0);

    let invalid = || {
        SwmfError::invalid(
            line_no,
            format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02} is not a calendar time",
                year, month, day, hour, minute, second
            ),
        )
    };
    let to_u32 = |v: i64| u32::try_from(v).map_err(|_| invalid());

    let base = Utc
        .with_ymd_and_hms(
            i32::try_from(year).map_err(|_| invalid())?,
            to_u32(month)?,
            to_u32(day)?,
            to_u32(hour)?,
            to_u32(minute)?,
            to_u32(second)?,
        )
        .single()
        .ok_or_else(invalid)?;
    Ok(base + Duration::milliseconds(millisecond))
}

fn split_block(
    fields: &mut FieldMap,
    hemisphere: Hemisphere,
    variables: &[IonoVariable],
    ntheta: usize,
    nphi: usize,
    values: &[f64],
) -> Result<(), String> {
    let nvars = variables.len();
    let npoints = ntheta * nphi;
    if values.len() != nvars * npoints {
        return Err(format!(
            "{} hemisphere has {} values, expected {} ({} vars x {} x {})",
            hemisphere,
            values.len(),
            nvars * npoints,
            nvars,
            ntheta,
            nphi
        ));
    }

    for (k, variable) in variables.iter().enumerate() {
        let column: Vec<f64> = (0..npoints).map(|p| values[p * nvars + k]).collect();
        let grid = FieldGrid::from_fortran_order(ntheta, nphi, column).map_err(|e| e.to_string())?;
        fields.insert(hemisphere, &variable.name, grid);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: &str = "\
 TITLE
 tiny
 NUMERICAL VALUES
  3 nvars
  2 nTheta
  2 nPhi
 TIME
  2011 Year
  9 Month
  26 Day
  14 Hour
  8 Minute
  0 Second
  250 Millisecond
 VARIABLE LIST
  1 Theta [deg]
  2 Psi [deg]
  3 RT   Rho [`m`]
 BEGIN NORTHERN HEMISPHERE
  0.0 0.0 1.0
  10.0 0.0 2.0
  0.0 90.0 3.0
  10.0 90.0 4.0
 BEGIN SOUTHERN HEMISPHERE
  90.0 0.0 -1.0  100.0 0.0 -2.0
  90.0 90.0 -3.0 100.0 90.0 -4.0
";

    #[test]
    fn test_parse_tiny_file() {
        let file = parse_iono(TINY).unwrap();
        assert_eq!(file.nvars, 3);
        assert_eq!(file.ntheta(), 2);
        assert_eq!(file.nphi(), 2);
        assert_eq!(file.variable_names(), vec!["theta", "psi", "rt rho"]);
        assert_eq!(file.variables[2].unit, "`m`");

        let t = file.time.unwrap();
        assert_eq!(
            t,
            Utc.with_ymd_and_hms(2011, 9, 26, 14, 8, 0).unwrap() + Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_theta_fastest_layout() {
        let file = parse_iono(TINY).unwrap();
        let rho = file.field(Hemisphere::North, "rt rho").unwrap();
        // point order: (i=0,j=0), (i=1,j=0), (i=0,j=1), (i=1,j=1)
        assert_eq!(rho.get(0, 0), Some(1.0));
        assert_eq!(rho.get(1, 0), Some(2.0));
        assert_eq!(rho.get(0, 1), Some(3.0));
        assert_eq!(rho.get(1, 1), Some(4.0));

        let theta = file.field(Hemisphere::South, "theta").unwrap();
        assert_eq!(theta.get(1, 0), Some(100.0));
        let south_rho = file.field(Hemisphere::South, "rt rho").unwrap();
        assert_eq!(south_rho.get(0, 1), Some(-3.0));
    }

    #[test]
    fn test_value_count_mismatch() {
        let truncated = TINY.replace("  10.0 90.0 4.0\n", "");
        match parse_iono(&truncated) {
            Err(SwmfError::InvalidFormat { line, message }) => {
                assert_eq!(line, 19);
                assert!(message.contains("north"));
            }
            other => panic!("expected InvalidFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_sections() {
        let no_south = TINY.split(" BEGIN SOUTHERN").next().unwrap();
        assert!(matches!(
            parse_iono(no_south),
            Err(SwmfError::MissingSection(s)) if s.contains("SOUTHERN")
        ));

        let no_header = TINY.replace(" NUMERICAL VALUES\n", "");
        assert!(matches!(parse_iono(&no_header), Err(SwmfError::MissingSection(_))));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let bad = TINY.replace("10.0 0.0 2.0", "10.0 zero 2.0");
        assert!(matches!(
            parse_iono(&bad),
            Err(SwmfError::InvalidFormat { line: 21, .. })
        ));
    }

    const UNDERLINED: &str = "\
 TITLE
 =====
 \"BATSRUS: Ionospheric Potential Solution\"

 NUMERICAL VALUES
 ================
           3  nvars
           2  nTheta
           2  nPhi

 TIME
 ====
        2000  year
           3  month
          21  day
          10  hour
          45  minute
          10  second
         500  msecond

 SIMULATION
 ==========
           0  time step
  0.0000000000000E+00  simulation time

 DIPOLE TILT
 ===========
     0.0000  xx
     0.0000  yy

 RUN PARAMETERS
 ==============
   coupled with GM

 VARIABLE LIST
 =============
   1 Theta                [deg]
   2 Psi                  [deg]
   3 JR                   [`mA/m`+2]

 BEGIN NORTHERN HEMISPHERE
  0.0 0.0 0.1
  10.0 0.0 0.2
  0.0 90.0 0.3
  10.0 90.0 0.4
 BEGIN SOUTHERN HEMISPHERE
  90.0 0.0 -0.1
  100.0 0.0 -0.2
  90.0 90.0 -0.3
  100.0 90.0 -0.4
";

    #[test]
    fn test_underlined_sections_and_simulation_block() {
        let file = parse_iono(UNDERLINED).unwrap();
        assert_eq!(file.variable_names(), vec!["theta", "psi", "jr"]);
        assert_eq!(
            file.time,
            Some(Utc.with_ymd_and_hms(2000, 3, 21, 10, 45, 10).unwrap() + Duration::milliseconds(500))
        );
        assert_eq!(file.field(Hemisphere::North, "jr").unwrap().get(1, 1), Some(0.4));
        assert_eq!(file.field(Hemisphere::South, "jr").unwrap().get(0, 1), Some(-0.3));
    }

    #[test]
    fn test_section_titles() {
        assert_eq!(Section::from_header(" SIMULATION "), Some(Section::Simulation));
        assert_eq!(Section::from_header("RUN PARAMETERS"), Some(Section::Unknown));
        assert_eq!(Section::from_header("  1 Theta [deg]"), None);
        assert_eq!(Section::from_header("1.000000E+00 2.0"), None);
        assert!(is_underline("====="));
        assert!(!is_underline("=x="));
    }

    #[test]
    fn test_fortran_exponent() {
        assert_eq!(parse_number("1.5D+02", 1).unwrap(), 150.0);
    }

    #[test]
    fn test_iono_time_from_filename() {
        assert_eq!(
            iono_time_from_filename("SWMF/it110926_140800_000.idl.gz"),
            Some(Utc.with_ymd_and_hms(2011, 9, 26, 14, 8, 0).unwrap())
        );
        assert_eq!(iono_time_from_filename("mag_grid_e20100405-083000.out"), None);
    }
}
