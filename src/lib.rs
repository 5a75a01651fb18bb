//! Gauge Boundary Library
//!
//! Converts irregularly sampled river gauge records (discharge and stage)
//! from several stations into one uniformly time-stamped liquid boundary
//! table for the TELEMAC hydrodynamic model.
//!
//! This library provides tools for:
//! - Reading USGS tab-delimited station files with configurable header layouts
//! - Converting imperial discharge and stage to metric, with datum shifts
//! - Aligning all stations on the time axis of the longest record
//! - Filling gaps by linear interpolation
//! - Writing the boundary table atomically

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod header;
pub mod matrix;
pub mod models;
pub mod processor;
pub mod progress;
pub mod table;
pub mod units;
pub mod unify;

pub use config::{BoundaryConfig, LeadingFill, StationConfig};
pub use error::{BoundaryError, Result};
pub use models::{SeriesKind, StationSeries, UnitSystem};
pub use processor::BoundaryProcessor;
pub use unify::OutputTable;
