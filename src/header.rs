//! Station file header scanning.
//!
//! Counts the comment block at the top of a station file and adds the
//! configured number of trailing header rows, giving the number of lines
//! to skip before the first data row.

use crate::config::SourceFormat;
use crate::error::{BoundaryError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Where the data section of a station file starts and ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataBoundaries {
    pub comment_lines: usize,
    pub skip_rows: usize,
    pub total_lines: usize,
    /// Non-blank lines after the header block
    pub data_rows: usize,
}

/// Scan the header of a station file
pub fn scan_source(file_path: &Path, format: &SourceFormat) -> Result<DataBoundaries> {
    let file = File::open(file_path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => BoundaryError::MissingInput {
            path: file_path.to_path_buf(),
        },
        _ => BoundaryError::Io(e),
    })?;
    let reader = BufReader::new(file);

    let mut comment_lines = 0;
    let mut skip_rows = None;
    let mut total_lines = 0;
    let mut data_rows = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        total_lines = line_num + 1;

        let skip = match skip_rows {
            Some(skip) => skip,
            None if line.starts_with(format.comment_marker) => {
                comment_lines += 1;
                continue;
            }
            None => {
                let skip = comment_lines + format.trailing_header_rows;
                skip_rows = Some(skip);
                skip
            }
        };

        if line_num >= skip && !line.trim().is_empty() {
            data_rows += 1;
        }
    }

    let boundaries = DataBoundaries {
        comment_lines,
        skip_rows: skip_rows.unwrap_or(comment_lines + format.trailing_header_rows),
        total_lines,
        data_rows,
    };

    debug!(
        "Scanned header of {}: {} comment lines, skip_rows={}, data_rows={}",
        file_path.display(),
        comment_lines,
        boundaries.skip_rows,
        boundaries.data_rows
    );

    Ok(boundaries)
}
