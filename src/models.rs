//! Core data structures and types for boundary file generation.
//!
//! Defines series kinds, unit systems, extracted station series and the
//! processing statistics reported at the end of a run.

use crate::constants::{DISCHARGE_LABEL, DISCHARGE_UNIT, STAGE_LABEL, STAGE_UNIT};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Kind of quantity a station series measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum SeriesKind {
    /// Volumetric flow rate
    #[serde(rename = "Q", alias = "q", alias = "discharge")]
    Discharge,
    /// Water surface elevation
    #[serde(rename = "H", alias = "h", alias = "S", alias = "stage")]
    Stage,
}

impl SeriesKind {
    /// Detect the kind from a type code such as `Q`, `H`, `SL(2)` or `Q(1)`
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().chars().next()?.to_ascii_uppercase() {
            'Q' => Some(SeriesKind::Discharge),
            'H' | 'S' => Some(SeriesKind::Stage),
            _ => None,
        }
    }

    /// TELEMAC header key for this kind
    pub fn header_key(&self) -> &'static str {
        match self {
            SeriesKind::Discharge => DISCHARGE_LABEL,
            SeriesKind::Stage => STAGE_LABEL,
        }
    }

    /// Unit of values after conversion
    pub fn output_unit(&self) -> &'static str {
        match self {
            SeriesKind::Discharge => DISCHARGE_UNIT,
            SeriesKind::Stage => STAGE_UNIT,
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesKind::Discharge => write!(f, "discharge"),
            SeriesKind::Stage => write!(f, "stage"),
        }
    }
}

/// Unit family the raw station values are reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Cubic metres per second, metres
    Metric,
    /// Cubic feet per second, feet
    #[default]
    Imperial,
}

/// One reading, timed relative to the first reading of its station
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub elapsed_seconds: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(elapsed_seconds: f64, value: f64) -> Self {
        Self {
            elapsed_seconds,
            value,
        }
    }
}

/// Raw readings of one station as extracted from its source
///
/// `samples` are ordered by strictly increasing `elapsed_seconds`, starting
/// at 0 for the station's own first timestamp. Values are in the station's
/// native units; conversion happens during matrix assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct StationSeries {
    pub name: String,
    pub kind: SeriesKind,
    pub unit_system: UnitSystem,
    pub datum_shift: Option<f64>,
    pub samples: Vec<Sample>,
}

impl StationSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub stations_processed: usize,
    pub samples_read: usize,
    pub output_rows: usize,
    pub reference_station: String,
    pub previous_output_removed: bool,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
