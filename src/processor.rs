//! Boundary file pipeline.
//!
//! Orchestrates one run: remove the previous output, extract every station,
//! assemble the raw matrix, unify it onto the reference axis, and write the
//! table. Any error aborts the run before the output file is written.

use crate::config::BoundaryConfig;
use crate::error::Result;
use crate::extract::extract_series;
use crate::matrix::RawMatrix;
use crate::models::{ProcessingStats, StationSeries};
use crate::table::write_table_file;
use crate::unify::{OutputTable, unify};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Runs the boundary pipeline for one configuration
#[derive(Debug, Clone)]
pub struct BoundaryProcessor {
    config: BoundaryConfig,
}

impl BoundaryProcessor {
    /// Create a processor, rejecting invalid configurations up front
    pub fn new(config: BoundaryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Main processing entry point
    pub fn process(&self) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let output_path = &self.config.output_path;

        let previous_output_removed = self.remove_previous_output()?;

        let (table, samples_read) = self.build_table()?;
        write_table_file(&table, &self.config.table_format, output_path)?;

        let stats = ProcessingStats {
            stations_processed: table.columns.len(),
            samples_read,
            output_rows: table.rows(),
            reference_station: table.reference_name().to_string(),
            previous_output_removed,
            output_path: output_path.clone(),
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        info!(
            "Wrote {} rows for {} stations to {} in {}ms",
            stats.output_rows,
            stats.stations_processed,
            output_path.display(),
            stats.processing_time_ms
        );
        Ok(stats)
    }

    /// Extract, assemble and unify without touching the output file
    ///
    /// Returns the table and the number of samples read over all stations.
    pub fn build_table(&self) -> Result<(OutputTable, usize)> {
        let series = self.extract_all()?;
        let samples_read = series.iter().map(StationSeries::len).sum();

        let matrix = RawMatrix::assemble(&series, &self.config.stations)?;
        debug!(
            "Assembled raw matrix: {} rows x {} stations",
            matrix.rows,
            matrix.columns.len()
        );

        let table = unify(&matrix, self.config.leading_fill)?;
        Ok((table, samples_read))
    }

    /// Extract every configured station in order
    pub fn extract_all(&self) -> Result<Vec<StationSeries>> {
        self.config
            .stations
            .iter()
            .map(|station| {
                debug!("Extracting station {} from {}", station.name, station.path.display());
                extract_series(station, &self.config.source, self.config.skip_invalid_values)
            })
            .collect()
    }

    /// Delete an output file left by an earlier run
    ///
    /// Happens before any computation, never as failure cleanup.
    pub fn remove_previous_output(&self) -> Result<bool> {
        remove_previous_output(&self.config.output_path)
    }
}

/// Delete `path` if it exists, reporting whether a file was removed
pub fn remove_previous_output(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            info!("Previous output file deleted: {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
