//! Command-line interface components.

use crate::config::{BoundaryConfig, LeadingFill};
use crate::constants::DEFAULT_CONFIG_FILE;
use crate::error::Result;
use crate::processor::remove_previous_output;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "gauge-boundary")]
#[command(about = "Merge river gauge series into a TELEMAC liquid boundary file")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Station configuration: a TOML file or the legacy five-line CSV
    #[arg(value_name = "CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config_path: PathBuf,

    /// Output file (overrides the configuration)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Decimal digits per value (4 to 6)
    #[arg(long)]
    pub precision: Option<usize>,

    /// Policy for rows before a station's first sample
    #[arg(long, value_enum)]
    pub leading_fill: Option<LeadingFill>,

    /// Drop rows with empty or non-numeric values instead of failing
    #[arg(long)]
    pub skip_invalid_values: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only report errors; no spinner or summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Output path of this run: the `--output` override, else the path
    /// named by the configuration file
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_path
            .clone()
            .or_else(|| BoundaryConfig::resolve_output_path(&self.config_path))
    }

    /// Clear the previous output, then load the configuration and apply
    /// command-line overrides
    ///
    /// The output file is deleted before the stations are parsed or
    /// validated, so a rejected configuration leaves no earlier table in
    /// place. Returns the validated configuration and whether a previous
    /// output file was deleted.
    pub fn load_config(&self) -> Result<(BoundaryConfig, bool)> {
        let previous_output_removed = match self.output_path() {
            Some(path) => remove_previous_output(&path)?,
            None => false,
        };

        let mut config = BoundaryConfig::read(&self.config_path)?;

        if let Some(output_path) = &self.output_path {
            config.output_path = output_path.clone();
        }
        if let Some(precision) = self.precision {
            config.table_format.precision = precision;
        }
        if let Some(leading_fill) = self.leading_fill {
            config.leading_fill = leading_fill;
        }
        if self.skip_invalid_values {
            config.skip_invalid_values = true;
        }

        config.validate()?;
        Ok((config, previous_output_removed))
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gauge_boundary={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
