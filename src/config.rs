//! Configuration management and validation.
//!
//! Station lists come from either a TOML file or the five-line
//! `user_input.csv` layout used by existing model setups. Both are turned into a
//! [`BoundaryConfig`] and validated before any station file is read.

use crate::constants::{
    DEFAULT_COMMENT_MARKER, DEFAULT_MISSING_TOKEN, DEFAULT_OUTPUT_FILE, DEFAULT_PRECISION,
    DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TIME_COLUMN, DEFAULT_TRAILING_HEADER_ROWS,
    DEFAULT_VALUE_COLUMN, MAX_PRECISION, MIN_PRECISION,
};
use crate::error::{BoundaryError, Result};
use crate::models::{SeriesKind, UnitSystem};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Layout of the header block at the top of station files
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFormat {
    /// Lines starting with this character are comments
    pub comment_marker: char,

    /// Non-comment header rows between the comments and the data
    pub trailing_header_rows: usize,

    /// chrono format string of the timestamp column
    pub timestamp_format: String,
}

impl Default for SourceFormat {
    fn default() -> Self {
        Self {
            comment_marker: DEFAULT_COMMENT_MARKER,
            trailing_header_rows: DEFAULT_TRAILING_HEADER_ROWS,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// How to fill rows before a station's first projected sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LeadingFill {
    /// Copy the first known value backwards to row 0
    #[default]
    FirstKnown,
    /// Fail the run with a degenerate series error
    Reject,
}

/// Numeric layout of the written table
#[derive(Debug, Clone, PartialEq)]
pub struct TableFormat {
    /// Fixed decimal digits per value
    pub precision: usize,

    /// Literal written for cells without a value
    pub missing_token: String,
}

impl Default for TableFormat {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            missing_token: DEFAULT_MISSING_TOKEN.to_string(),
        }
    }
}

/// One gauging station and how to read it
#[derive(Debug, Clone, PartialEq)]
pub struct StationConfig {
    pub name: String,
    pub path: PathBuf,
    pub kind: SeriesKind,
    pub unit_system: UnitSystem,
    pub datum_shift: Option<f64>,
    pub time_column: usize,
    pub value_column: usize,

    /// Overrides [`SourceFormat::trailing_header_rows`] for this station
    pub trailing_header_rows: Option<usize>,

    /// Output header label, defaults to `Q(n)` / `SL(n)`
    pub label: Option<String>,

    /// Output unit label, defaults to the converted unit of the kind
    pub unit_label: Option<String>,
}

impl StationConfig {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, kind: SeriesKind) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind,
            unit_system: UnitSystem::default(),
            datum_shift: None,
            time_column: DEFAULT_TIME_COLUMN,
            value_column: DEFAULT_VALUE_COLUMN,
            trailing_header_rows: None,
            label: None,
            unit_label: None,
        }
    }

    pub fn with_units(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = unit_system;
        self
    }

    pub fn with_datum_shift(mut self, shift: f64) -> Self {
        self.datum_shift = Some(shift);
        self
    }

    pub fn with_columns(mut self, time_column: usize, value_column: usize) -> Self {
        self.time_column = time_column;
        self.value_column = value_column;
        self
    }

    pub fn with_labels(mut self, label: impl Into<String>, unit_label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self.unit_label = Some(unit_label.into());
        self
    }

    /// Header label for the station at zero-based `position`
    pub fn header_label(&self, position: usize) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("{}({})", self.kind.header_key(), position + 1))
    }

    pub fn header_unit(&self) -> String {
        self.unit_label
            .clone()
            .unwrap_or_else(|| self.kind.output_unit().to_string())
    }

    /// Source format with this station's overrides applied
    pub fn source_format(&self, base: &SourceFormat) -> SourceFormat {
        SourceFormat {
            trailing_header_rows: self
                .trailing_header_rows
                .unwrap_or(base.trailing_header_rows),
            ..base.clone()
        }
    }
}

/// Complete configuration of one boundary file run
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConfig {
    pub stations: Vec<StationConfig>,
    pub output_path: PathBuf,
    pub source: SourceFormat,
    pub table_format: TableFormat,
    pub leading_fill: LeadingFill,

    /// Drop rows with empty or non-numeric values instead of failing
    pub skip_invalid_values: bool,
}

impl BoundaryConfig {
    pub fn new(stations: Vec<StationConfig>) -> Self {
        Self {
            stations,
            output_path: PathBuf::from(DEFAULT_OUTPUT_FILE),
            source: SourceFormat::default(),
            table_format: TableFormat::default(),
            leading_fill: LeadingFill::default(),
            skip_invalid_values: false,
        }
    }

    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.table_format.precision = precision;
        self
    }

    pub fn with_leading_fill(mut self, leading_fill: LeadingFill) -> Self {
        self.leading_fill = leading_fill;
        self
    }

    pub fn with_skip_invalid_values(mut self, skip: bool) -> Self {
        self.skip_invalid_values = skip;
        self
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file without validating it, choosing the
    /// format by extension
    ///
    /// Relative station paths and the output path resolve against the
    /// directory containing the configuration file.
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BoundaryError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        let text = std::fs::read_to_string(path)?;
        let base_dir = config_dir(path);

        let config = if is_toml(path) {
            Self::from_toml_str(&text, base_dir).map_err(|e| match e {
                BoundaryError::ConfigFile { source, .. } => BoundaryError::ConfigFile {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            })?
        } else {
            Self::from_legacy_str(&text, base_dir)?
        };

        debug!(
            "Loaded {} stations from {} ({} format)",
            config.stations.len(),
            path.display(),
            if is_toml(path) { "toml" } else { "legacy" }
        );
        Ok(config)
    }

    /// Output path a configuration file writes to, found without reading
    /// its stations
    ///
    /// Legacy files always write `liquid_boundary.xls` next to themselves.
    /// Returns `None` for a TOML file that cannot be read or parsed.
    pub fn resolve_output_path(path: &Path) -> Option<PathBuf> {
        let base_dir = config_dir(path);
        if !is_toml(path) {
            return Some(base_dir.join(DEFAULT_OUTPUT_FILE));
        }

        let text = std::fs::read_to_string(path).ok()?;
        let section: OutputSection = toml::from_str(&text).ok()?;
        let output = section
            .output
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));
        Some(base_dir.join(output))
    }

    /// Parse a TOML configuration
    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|source| BoundaryError::ConfigFile {
                path: PathBuf::from("<toml>"),
                source,
            })?;

        let defaults = SourceFormat::default();
        let source = SourceFormat {
            comment_marker: file.source.comment_marker.unwrap_or(defaults.comment_marker),
            trailing_header_rows: file
                .source
                .trailing_header_rows
                .unwrap_or(defaults.trailing_header_rows),
            timestamp_format: file
                .source
                .timestamp_format
                .unwrap_or(defaults.timestamp_format),
        };

        let stations = file
            .stations
            .into_iter()
            .map(|entry| {
                let path = entry.path.unwrap_or_else(|| PathBuf::from(&entry.name));
                StationConfig {
                    path: base_dir.join(path),
                    kind: entry.kind,
                    unit_system: entry.units,
                    datum_shift: entry.datum_shift,
                    time_column: entry.time_column.unwrap_or(DEFAULT_TIME_COLUMN),
                    value_column: entry.value_column.unwrap_or(DEFAULT_VALUE_COLUMN),
                    trailing_header_rows: entry.trailing_header_rows,
                    label: entry.label,
                    unit_label: entry.unit_label,
                    name: entry.name,
                }
            })
            .collect();

        let output = file
            .output
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

        Ok(Self {
            stations,
            output_path: base_dir.join(output),
            source,
            table_format: TableFormat {
                precision: file.precision.unwrap_or(DEFAULT_PRECISION),
                missing_token: file
                    .missing_token
                    .unwrap_or_else(|| DEFAULT_MISSING_TOKEN.to_string()),
            },
            leading_fill: file.leading_fill,
            skip_invalid_values: file.skip_invalid_values,
        })
    }

    /// Parse the legacy five-line station list
    ///
    /// Rows: station files, value columns, type labels, unit labels, datum
    /// shifts (`nan` for none). Legacy inputs are USGS exports and
    /// therefore imperial.
    pub fn from_legacy_str(text: &str, base_dir: &Path) -> Result<Self> {
        let rows: Vec<Vec<&str>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.split(',').map(str::trim).collect())
            .collect();

        if rows.len() < 5 {
            return Err(BoundaryError::configuration(format!(
                "Legacy station list needs 5 rows (files, columns, types, units, datums), found {}",
                rows.len()
            )));
        }

        let (files, columns, types, units, datums) =
            (&rows[0], &rows[1], &rows[2], &rows[3], &rows[4]);

        for (row_name, row) in [
            ("value columns", columns),
            ("types", types),
            ("units", units),
            ("datum shifts", datums),
        ] {
            if row.len() != files.len() {
                return Err(BoundaryError::configuration(format!(
                    "Legacy station list has {} files but {} {}",
                    files.len(),
                    row.len(),
                    row_name
                )));
            }
        }

        let mut stations = Vec::with_capacity(files.len());
        for i in 0..files.len() {
            let value_column = columns[i].parse::<usize>().map_err(|_| {
                BoundaryError::configuration(format!(
                    "Invalid value column '{}' for station {}",
                    columns[i], files[i]
                ))
            })?;

            let kind = SeriesKind::from_code(types[i]).ok_or_else(|| {
                BoundaryError::configuration(format!(
                    "Unknown series type '{}' for station {} (expected Q, H or S)",
                    types[i], files[i]
                ))
            })?;

            let mut station = StationConfig::new(files[i], base_dir.join(files[i]), kind)
                .with_units(UnitSystem::Imperial)
                .with_columns(DEFAULT_TIME_COLUMN, value_column)
                .with_labels(types[i], units[i]);
            station.datum_shift = parse_datum(datums[i], files[i])?;

            stations.push(station);
        }

        Ok(Self::new(stations).with_output_path(base_dir.join(DEFAULT_OUTPUT_FILE)))
    }

    /// Reject configurations that cannot produce a meaningful table
    pub fn validate(&self) -> Result<()> {
        if self.stations.is_empty() {
            return Err(BoundaryError::configuration("No stations configured"));
        }

        let precision = self.table_format.precision;
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(BoundaryError::configuration(format!(
                "Precision {} outside supported range {}..={}",
                precision, MIN_PRECISION, MAX_PRECISION
            )));
        }

        if self.table_format.missing_token.is_empty() {
            return Err(BoundaryError::configuration("Missing-value token is empty"));
        }

        let mut names = HashSet::new();
        for station in &self.stations {
            if !names.insert(station.name.as_str()) {
                return Err(BoundaryError::configuration(format!(
                    "Station '{}' configured more than once",
                    station.name
                )));
            }

            if station.time_column == station.value_column {
                return Err(BoundaryError::configuration(format!(
                    "Station '{}' uses column {} for both time and value",
                    station.name, station.time_column
                )));
            }

            match (station.kind, station.datum_shift) {
                (SeriesKind::Discharge, Some(_)) => {
                    return Err(BoundaryError::configuration(format!(
                        "Station '{}' is a discharge series but declares a datum shift",
                        station.name
                    )));
                }
                (_, Some(shift)) if !shift.is_finite() => {
                    return Err(BoundaryError::configuration(format!(
                        "Station '{}' has a non-finite datum shift",
                        station.name
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

fn config_dir(path: &Path) -> &Path {
    path.parent().unwrap_or_else(|| Path::new("."))
}

fn parse_datum(raw: &str, station: &str) -> Result<Option<f64>> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| {
        BoundaryError::configuration(format!(
            "Invalid datum shift '{}' for station {}",
            raw, station
        ))
    })
}

/// Just the output key of a TOML configuration; other keys are ignored
#[derive(Debug, Deserialize)]
struct OutputSection {
    output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    output: Option<PathBuf>,
    precision: Option<usize>,
    missing_token: Option<String>,
    #[serde(default)]
    leading_fill: LeadingFill,
    #[serde(default)]
    skip_invalid_values: bool,
    #[serde(default)]
    source: SourceSection,
    #[serde(default)]
    stations: Vec<StationEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceSection {
    comment_marker: Option<char>,
    trailing_header_rows: Option<usize>,
    timestamp_format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StationEntry {
    name: String,
    path: Option<PathBuf>,
    kind: SeriesKind,
    #[serde(default)]
    units: UnitSystem,
    datum_shift: Option<f64>,
    time_column: Option<usize>,
    value_column: Option<usize>,
    trailing_header_rows: Option<usize>,
    label: Option<String>,
    unit_label: Option<String>,
}
