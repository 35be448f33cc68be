//! Load-and-clean pipeline entry point.
//!
//! Reads the events file, cleans it and returns an [`AnalysisResult`] holding
//! the cleaned table together with its schema summary and timing metadata.

use std::io::Read;
use std::path::Path;
use std::time::Instant;

use attribution_core::error::Result;
use attribution_core::models::{
    CleanedTable, ColumnKind, ColumnSummary, DataQuality, RawEvent, RawTable, TableSummary,
    COLUMN_CHANNEL, COLUMN_CUSTOMER_ID, COLUMN_REVENUE, COLUMN_SESSION_ID, COLUMN_TIMESTAMP,
};
use chrono::Utc;
use tracing::info;

use crate::cleaner::clean_table;
use crate::reader::{load_events, load_events_from_reader};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of rows loaded.
    pub rows_loaded: usize,
    /// Wall-clock seconds spent reading the file.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent cleaning the table.
    pub clean_time_seconds: f64,
}

/// The complete output of [`analyze_file`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub table: CleanedTable,
    pub summary: TableSummary,
    pub metadata: AnalysisMetadata,
}

impl AnalysisResult {
    pub fn quality(&self) -> &DataQuality {
        &self.table.quality
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the load and clean stages over the file at `path`.
///
/// Ingest failures are returned unchanged; per-row parse problems never fail.
pub fn analyze_file(path: &Path) -> Result<AnalysisResult> {
    let load_start = Instant::now();
    let raw = load_events(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    let result = analyze_raw(raw, load_time);
    info!(
        rows = result.metadata.rows_loaded,
        warnings = result.quality().warning_count(),
        "Loaded {}",
        path.display()
    );
    Ok(result)
}

/// Same as [`analyze_file`] for an in-memory source.
pub fn analyze_reader<R: Read>(reader: R) -> Result<AnalysisResult> {
    let load_start = Instant::now();
    let raw = load_events_from_reader(reader)?;
    let load_time = load_start.elapsed().as_secs_f64();
    Ok(analyze_raw(raw, load_time))
}

/// Column statistics of a cleaned table, in the input's canonical column order.
pub fn summarize_table(table: &CleanedTable) -> TableSummary {
    let column = |name: &str, get: fn(&RawEvent) -> Option<&str>| {
        let values: Vec<&str> = table.events.iter().filter_map(|e| get(&e.raw)).collect();
        ColumnSummary {
            name: name.to_string(),
            non_null: values.len(),
            kind: infer_kind(&values),
        }
    };

    let columns = vec![
        column(COLUMN_CUSTOMER_ID, |e| e.customer_id.as_deref()),
        column(COLUMN_SESSION_ID, |e| e.session_id.as_deref()),
        column(COLUMN_TIMESTAMP, |e| e.timestamp_touchpoint.as_deref()),
        column(COLUMN_CHANNEL, |e| e.marketing_channel.as_deref()),
        column(COLUMN_REVENUE, |e| e.revenue.as_deref()),
    ];

    let timestamps = table.events.iter().filter_map(|e| e.timestamp);

    TableSummary {
        rows: table.len(),
        columns,
        first_touchpoint: timestamps.clone().min(),
        last_touchpoint: timestamps.max(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn analyze_raw(raw: RawTable, load_time: f64) -> AnalysisResult {
    let rows_loaded = raw.len();

    let clean_start = Instant::now();
    let table = clean_table(raw);
    let clean_time = clean_start.elapsed().as_secs_f64();

    let summary = summarize_table(&table);

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        rows_loaded,
        load_time_seconds: load_time,
        clean_time_seconds: clean_time,
    };

    AnalysisResult {
        table,
        summary,
        metadata,
    }
}

/// Narrowest kind that fits every value. An all-null column is a float column,
/// as missing values are NaN.
fn infer_kind(values: &[&str]) -> ColumnKind {
    if values.is_empty() {
        return ColumnKind::Float;
    }
    if values.iter().all(|v| v.trim().parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if values.iter().all(|v| v.trim().parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
