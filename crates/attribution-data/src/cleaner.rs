//! Type coercion and calendar derivation for loaded events.
//!
//! Nothing in here fails: a revenue value that is not a number or a timestamp
//! that matches no known format is nulled, counted as a [`ParseWarning`] and
//! the row is kept.

use attribution_core::error::ParseWarning;
use attribution_core::models::{
    CalendarFields, CleanedEvent, CleanedTable, DataQuality, RawTable, Revenue,
};
use attribution_core::time_utils;
use chrono::NaiveDateTime;
use tracing::{debug, warn};

// ── Single-value operations ───────────────────────────────────────────────────

/// Numeric coercion of one revenue field.
///
/// `None` and blank strings are [`Revenue::Absent`]; anything that does not
/// parse to a finite `f64` is [`Revenue::Unparsable`].
pub fn coerce_revenue(value: Option<&str>) -> Revenue {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Revenue::Absent;
    };

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Revenue::Amount(v),
        _ => Revenue::Unparsable,
    }
}

/// Date-time parse of one timestamp field. `None` on failure.
pub fn parse_timestamp(value: Option<&str>) -> Option<NaiveDateTime> {
    value.and_then(time_utils::parse_timestamp)
}

/// Calendar components of a parsed timestamp; `None` stays `None`.
pub fn derive_calendar_fields(timestamp: Option<NaiveDateTime>) -> Option<CalendarFields> {
    timestamp.as_ref().map(time_utils::calendar_fields)
}

// ── Column operations ─────────────────────────────────────────────────────────

/// Coerce the whole revenue column, one entry per row.
pub fn coerce_revenue_column(table: &RawTable) -> Vec<Revenue> {
    table
        .events
        .iter()
        .map(|e| coerce_revenue(e.revenue.as_deref()))
        .collect()
}

/// Parse the whole timestamp column, one entry per row.
pub fn parse_timestamp_column(table: &RawTable) -> Vec<Option<NaiveDateTime>> {
    table
        .events
        .iter()
        .map(|e| parse_timestamp(e.timestamp_touchpoint.as_deref()))
        .collect()
}

/// Derive calendar fields for a parsed timestamp column.
pub fn derive_calendar_column(timestamps: &[Option<NaiveDateTime>]) -> Vec<Option<CalendarFields>> {
    timestamps.iter().copied().map(derive_calendar_fields).collect()
}

// ── Table cleaning ────────────────────────────────────────────────────────────

/// Apply revenue coercion, timestamp parsing and calendar derivation to every
/// row. Row count and order are preserved.
pub fn clean_table(raw: RawTable) -> CleanedTable {
    let (table, warnings) = clean_table_with_warnings(raw);

    if !warnings.is_empty() {
        warn!(
            revenue_unparsable = table.quality.revenue_unparsable,
            timestamp_unparsable = table.quality.timestamp_unparsable,
            "{} values could not be parsed and were treated as missing",
            warnings.len()
        );
    }

    table
}

/// Like [`clean_table`], also returning every individual [`ParseWarning`].
pub fn clean_table_with_warnings(raw: RawTable) -> (CleanedTable, Vec<ParseWarning>) {
    let mut quality = DataQuality {
        rows: raw.len(),
        ..DataQuality::default()
    };
    let mut warnings = Vec::new();
    let mut events = Vec::with_capacity(raw.len());

    for event in raw.events {
        let revenue = coerce_revenue(event.revenue.as_deref());
        match revenue {
            Revenue::Amount(_) => quality.revenue_present += 1,
            Revenue::Unparsable => {
                quality.revenue_unparsable += 1;
                warnings.push(ParseWarning::UnparsableRevenue {
                    line: event.line,
                    value: event.revenue.clone().unwrap_or_default(),
                });
            }
            Revenue::Absent => {}
        }

        let timestamp = parse_timestamp(event.timestamp_touchpoint.as_deref());
        if timestamp.is_none() {
            // A missing timestamp is plain null data, only a present but
            // unreadable one is a warning.
            if let Some(value) = event.timestamp_touchpoint.as_deref() {
                if !value.trim().is_empty() {
                    quality.timestamp_unparsable += 1;
                    warnings.push(ParseWarning::UnparsableTimestamp {
                        line: event.line,
                        value: value.to_string(),
                    });
                }
            }
        }

        events.push(CleanedEvent {
            calendar: derive_calendar_fields(timestamp),
            timestamp,
            revenue,
            raw: event,
        });
    }

    for warning in &warnings {
        debug!("{}", warning);
    }

    (CleanedTable { events, quality }, warnings)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
