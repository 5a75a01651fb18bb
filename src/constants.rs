//! Application constants for the boundary file generator
//!
//! Default values for source formats, unit conversion and the TELEMAC
//! liquid boundary output layout.

// =============================================================================
// Source Format Defaults (USGS RDB)
// =============================================================================

/// Character that starts a comment line at the top of a station file
pub const DEFAULT_COMMENT_MARKER: char = '#';

/// Header rows following the comment block (column names, column formats)
pub const DEFAULT_TRAILING_HEADER_ROWS: usize = 2;

/// Zero-based column holding the `YYYY-MM-DD HH:MM` timestamp
pub const DEFAULT_TIME_COLUMN: usize = 2;

/// Zero-based column holding the measured value
pub const DEFAULT_VALUE_COLUMN: usize = 4;

/// chrono format of source timestamps
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Field separator of station files
pub const SOURCE_SEPARATOR: u8 = b'\t';

// =============================================================================
// Unit Conversion
// =============================================================================

/// Metres per international foot
pub const METRES_PER_FOOT: f64 = 0.3048;

// =============================================================================
// Output Table
// =============================================================================

/// Default output file name expected by TELEMAC setups
pub const DEFAULT_OUTPUT_FILE: &str = "liquid_boundary.xls";

/// Default station configuration file of the legacy tool
pub const DEFAULT_CONFIG_FILE: &str = "user_input.csv";

/// First header line of the output file
pub const HEADER_MARKER: &str = "#";

/// Label and unit of the elapsed-time column
pub const TIME_LABEL: &str = "T";
pub const TIME_UNIT: &str = "s";

/// Header labels for each series kind (TELEMAC liquid boundary keys)
pub const DISCHARGE_LABEL: &str = "Q";
pub const STAGE_LABEL: &str = "SL";

/// Output units once conversion has been applied
pub const DISCHARGE_UNIT: &str = "m3/s";
pub const STAGE_UNIT: &str = "m";

/// Decimal digits written per value
pub const DEFAULT_PRECISION: usize = 4;
pub const MIN_PRECISION: usize = 4;
pub const MAX_PRECISION: usize = 6;

/// Literal written for a cell without a value
pub const DEFAULT_MISSING_TOKEN: &str = "nan";

// =============================================================================
// Progress Display
// =============================================================================

/// Spinner redraw interval in milliseconds
pub const SPINNER_TICK_MS: u64 = 100;
