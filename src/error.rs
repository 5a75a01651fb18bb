//! Error handling for boundary file generation.
//!
//! Every failure is fatal to a run. Variants carry the file and line, or
//! the station, that caused it.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoundaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Parse error in {path} at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Missing column {column} in {path} at line {line}")]
    MissingColumn {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("Input source not found: {path}")]
    MissingInput { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Station '{station}' has no usable samples: {reason}")]
    DegenerateSeries { station: String, reason: String },
}

impl BoundaryError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn degenerate(station: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DegenerateSeries {
            station: station.into(),
            reason: reason.into(),
        }
    }

    /// Short category name used when reporting a failed run
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse { .. } | Self::MissingColumn { .. } => "parse",
            Self::MissingInput { .. } => "missing-input",
            Self::Configuration { .. } | Self::ConfigFile { .. } => "configuration",
            Self::DegenerateSeries { .. } => "degenerate-series",
            Self::Io(_) | Self::Polars(_) => "io",
        }
    }

    /// Process exit status for this error category
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            "configuration" => 2,
            "missing-input" => 3,
            "parse" => 4,
            "degenerate-series" => 5,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BoundaryError>;
