use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::time_utils;

/// Column names of the input file, in their canonical order.
pub const COLUMN_CUSTOMER_ID: &str = "CUSTOMERID";
pub const COLUMN_SESSION_ID: &str = "SESSIONID";
pub const COLUMN_TIMESTAMP: &str = "TIMESTAMP_TOUCHPOINT";
pub const COLUMN_CHANNEL: &str = "MARKETINGCHANNEL";
pub const COLUMN_REVENUE: &str = "REVENUE";

/// The five required header names. Matching is case-sensitive.
pub const EXPECTED_COLUMNS: [&str; 5] = [
    COLUMN_CUSTOMER_ID,
    COLUMN_SESSION_ID,
    COLUMN_TIMESTAMP,
    COLUMN_CHANNEL,
    COLUMN_REVENUE,
];

// ── Raw input ─────────────────────────────────────────────────────────────────

/// One row of the input file, exactly as read.
///
/// Empty fields are stored as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    pub customer_id: Option<String>,
    pub session_id: Option<String>,
    pub timestamp_touchpoint: Option<String>,
    pub marketing_channel: Option<String>,
    pub revenue: Option<String>,
}

/// The loaded input table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub events: Vec<RawEvent>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ── Cleaned table ─────────────────────────────────────────────────────────────

/// Result of numeric coercion of the revenue column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "amount", rename_all = "lowercase")]
pub enum Revenue {
    /// Field was null or the empty string.
    Absent,
    /// Field was non-empty but not a finite number.
    Unparsable,
    /// A usable numeric value.
    Amount(f64),
}

impl Revenue {
    /// The numeric value, if any. Only `Amount` contributes to sums.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Revenue::Amount(v) => Some(*v),
            _ => None,
        }
    }
}

/// Calendar components derived from a successfully parsed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarFields {
    pub year: i32,
    /// 1–12.
    pub month: u32,
    /// Day of month, 1–31.
    pub day: u32,
    /// 0–23.
    pub hour: u32,
    /// Weeks start on Monday.
    pub weekday: Weekday,
}

/// A raw event plus its coerced revenue, parsed timestamp and calendar fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedEvent {
    pub raw: RawEvent,
    pub revenue: Revenue,
    /// `None` when the timestamp was missing or unparseable.
    pub timestamp: Option<NaiveDateTime>,
    /// `None` exactly when `timestamp` is `None`.
    pub calendar: Option<CalendarFields>,
}

impl CleanedEvent {
    pub fn customer_id(&self) -> Option<&str> {
        self.raw.customer_id.as_deref()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.raw.session_id.as_deref()
    }

    pub fn channel(&self) -> Option<&str> {
        self.raw.marketing_channel.as_deref()
    }

    /// Calendar day of the touchpoint.
    pub fn date(&self) -> Option<NaiveDate> {
        self.timestamp.map(|ts| ts.date())
    }
}

/// Counts of recoverable parse problems found while cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    /// Total rows cleaned.
    pub rows: usize,
    /// Rows with a usable numeric revenue.
    pub revenue_present: usize,
    /// Rows whose non-empty revenue failed to parse.
    pub revenue_unparsable: usize,
    /// Rows whose non-empty timestamp failed to parse.
    pub timestamp_unparsable: usize,
}

impl DataQuality {
    /// Total number of parse warnings.
    pub fn warning_count(&self) -> usize {
        self.revenue_unparsable + self.timestamp_unparsable
    }
}

/// The cleaned table. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedTable {
    pub events: Vec<CleanedEvent>,
    pub quality: DataQuality,
}

impl CleanedTable {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// ── Time components ───────────────────────────────────────────────────────────

/// Calendar component used to bucket touchpoints.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeComponent {
    Year,
    Month,
    Hour,
    Weekday,
}

impl TimeComponent {
    pub const ALL: [TimeComponent; 4] = [
        TimeComponent::Year,
        TimeComponent::Month,
        TimeComponent::Hour,
        TimeComponent::Weekday,
    ];

    /// Chart title for this component.
    pub fn title(&self) -> &'static str {
        match self {
            TimeComponent::Year => "Distribution of Touchpoints by Year",
            TimeComponent::Month => "Distribution of Touchpoints by Month",
            TimeComponent::Hour => "Distribution of Touchpoints by Hour of Day",
            TimeComponent::Weekday => "Distribution of Touchpoints by Day of the week",
        }
    }

    /// Sort key and display label of `fields` for this component.
    ///
    /// The key orders buckets naturally: weekdays run Monday (0) to Sunday (6).
    pub fn bucket(&self, fields: &CalendarFields) -> (i64, String) {
        match self {
            TimeComponent::Year => (i64::from(fields.year), fields.year.to_string()),
            TimeComponent::Month => (i64::from(fields.month), fields.month.to_string()),
            TimeComponent::Hour => (i64::from(fields.hour), fields.hour.to_string()),
            TimeComponent::Weekday => (
                i64::from(fields.weekday.num_days_from_monday()),
                time_utils::weekday_name(fields.weekday).to_string(),
            ),
        }
    }
}

impl std::fmt::Display for TimeComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TimeComponent::Year => "year",
            TimeComponent::Month => "month",
            TimeComponent::Hour => "hour",
            TimeComponent::Weekday => "weekday",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for TimeComponent {
    type Err = String;

    /// Case-insensitive, so the selector spelling `WeekDay` is accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(TimeComponent::Year),
            "month" => Ok(TimeComponent::Month),
            "hour" => Ok(TimeComponent::Hour),
            "weekday" => Ok(TimeComponent::Weekday),
            other => Err(format!(
                "unknown time component \"{}\" (expected year, month, hour or weekday)",
                other
            )),
        }
    }
}

// ── Derived tables ────────────────────────────────────────────────────────────

/// Summed revenue attributed to one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRevenue {
    pub channel: String,
    pub revenue: f64,
}

/// Number of distinct customers who touched one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelCustomers {
    pub channel: String,
    pub customers: u64,
}

/// Number of touchpoints recorded on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTouchpoints {
    pub date: NaiveDate,
    pub touchpoints: u64,
}

/// Number of distinct sessions of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSessions {
    pub customer_id: String,
    pub sessions: u64,
}

/// One bucket of a time-component distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeComponentCount {
    /// Natural sort key (year, month number, hour, or days from Monday).
    pub key: i64,
    pub label: String,
    pub count: u64,
}

/// Pie-chart share of one channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelShare {
    pub channel: String,
    pub value: f64,
    /// Percentage of the total, 0–100.
    pub percent: f64,
}

/// How many customers had exactly `sessions` sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCountFrequency {
    pub sessions: u64,
    pub customers: u64,
}

// ── Table summary ─────────────────────────────────────────────────────────────

/// Inferred storage kind of a column, in the spirit of a data-frame `info()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColumnKind::Integer => "int64",
            ColumnKind::Float => "float64",
            ColumnKind::Text => "object",
        };
        f.write_str(s)
    }
}

/// Per-column statistics of the raw table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub non_null: usize,
    pub kind: ColumnKind,
}

/// Schema overview shown next to the raw preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    /// Earliest parsed timestamp, if any.
    pub first_touchpoint: Option<NaiveDateTime>,
    /// Latest parsed timestamp, if any.
    pub last_touchpoint: Option<NaiveDateTime>,
}
