use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::models::TimeComponent;

/// File name the dashboard reads when no path is given.
pub const DEFAULT_DATA_FILE: &str = "Customerattributiondata.csv";

// ── Enumerated options ────────────────────────────────────────────────────────

/// Which section of the dashboard to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Raw preview and schema summary.
    Overview,
    /// Revenue attribution by marketing channel.
    Revenue,
    /// Distinct customers per marketing channel.
    Customers,
    /// Daily touchpoint time series.
    Daily,
    /// Touchpoints by the selected time component.
    Time,
    /// Distribution of sessions per customer.
    Sessions,
    /// Every section above, in order.
    All,
}

/// Output encoding of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Marketing attribution dashboard: channel, time and session breakdowns
#[derive(Parser, Debug, Clone)]
#[command(
    name = "attribution-dashboard",
    about = "Descriptive marketing-attribution dashboard over a tab-separated events file",
    version
)]
pub struct Settings {
    /// Tab-separated events file
    #[arg(env = "ATTRIBUTION_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Dashboard section to print
    #[arg(long, value_enum, default_value_t = View::All)]
    pub view: View,

    /// Time component for the touchpoint distribution
    #[arg(long, value_enum, default_value_t = TimeComponent::Year)]
    pub component: TimeComponent,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Number of raw rows shown in the overview
    #[arg(long, default_value = "5")]
    pub preview_rows: usize,

    /// Read time components from stdin, one per line, and print each distribution
    #[arg(long)]
    pub interactive: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path (logs go to stderr when absent)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse process arguments and apply derived overrides.
    pub fn load() -> Self {
        Self::from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but with an explicit argument list.
    pub fn from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(args).resolve()
    }

    /// `--debug` overrides the log level.
    fn resolve(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
