//! Per-load dashboard state.
//!
//! A [`DashboardSession`] owns one cleaned table and lazily computes each
//! derived table the first time it is asked for. Later requests, including
//! repeated time-component selections, reuse the stored result.

use std::cell::OnceCell;

use attribution_core::models::{
    ChannelCustomers, ChannelRevenue, ChannelShare, CleanedEvent, CleanedTable, CustomerSessions,
    DailyTouchpoints, DataQuality, SessionCountFrequency, TableSummary, TimeComponent,
    TimeComponentCount,
};
use attribution_data::aggregator::AttributionAggregator;
use attribution_data::analysis::{summarize_table, AnalysisMetadata, AnalysisResult};
use tracing::debug;

/// Cleaned table plus memoized aggregates.
///
/// Not `Sync`: the memo cells assume a single thread drives the session.
#[derive(Debug)]
pub struct DashboardSession {
    table: CleanedTable,
    summary: TableSummary,
    metadata: Option<AnalysisMetadata>,

    revenue_by_channel: OnceCell<Vec<ChannelRevenue>>,
    customer_count_by_channel: OnceCell<Vec<ChannelCustomers>>,
    touchpoints_per_day: OnceCell<Vec<DailyTouchpoints>>,
    sessions_per_customer: OnceCell<Vec<CustomerSessions>>,
    /// One slot per [`TimeComponent`], in [`TimeComponent::ALL`] order.
    time_components: [OnceCell<Vec<TimeComponentCount>>; 4],
}

impl DashboardSession {
    /// Wrap the output of the load-and-clean pipeline.
    pub fn new(result: AnalysisResult) -> Self {
        Self::with_parts(result.table, result.summary, Some(result.metadata))
    }

    /// Build a session straight from a cleaned table.
    pub fn from_table(table: CleanedTable) -> Self {
        let summary = summarize_table(&table);
        Self::with_parts(table, summary, None)
    }

    fn with_parts(
        table: CleanedTable,
        summary: TableSummary,
        metadata: Option<AnalysisMetadata>,
    ) -> Self {
        Self {
            table,
            summary,
            metadata,
            revenue_by_channel: OnceCell::new(),
            customer_count_by_channel: OnceCell::new(),
            touchpoints_per_day: OnceCell::new(),
            sessions_per_customer: OnceCell::new(),
            time_components: Default::default(),
        }
    }

    // ── Snapshot accessors ────────────────────────────────────────────────

    pub fn cleaned(&self) -> &CleanedTable {
        &self.table
    }

    /// The first `n` rows, or all of them when the table is shorter.
    pub fn preview(&self, n: usize) -> &[CleanedEvent] {
        let end = n.min(self.table.len());
        &self.table.events[..end]
    }

    pub fn summary(&self) -> &TableSummary {
        &self.summary
    }

    pub fn data_quality(&self) -> &DataQuality {
        &self.table.quality
    }

    /// Load timings, present when the session came from [`DashboardSession::new`].
    pub fn metadata(&self) -> Option<&AnalysisMetadata> {
        self.metadata.as_ref()
    }

    // ── Memoized aggregates ───────────────────────────────────────────────

    pub fn revenue_by_channel(&self) -> &[ChannelRevenue] {
        self.revenue_by_channel.get_or_init(|| {
            debug!("computing revenue by channel");
            AttributionAggregator::revenue_by_channel(&self.table)
        })
    }

    pub fn customer_count_by_channel(&self) -> &[ChannelCustomers] {
        self.customer_count_by_channel.get_or_init(|| {
            debug!("computing customer count by channel");
            AttributionAggregator::customer_count_by_channel(&self.table)
        })
    }

    pub fn touchpoints_per_day(&self) -> &[DailyTouchpoints] {
        self.touchpoints_per_day.get_or_init(|| {
            debug!("computing touchpoints per day");
            AttributionAggregator::touchpoints_per_day(&self.table)
        })
    }

    pub fn sessions_per_customer(&self) -> &[CustomerSessions] {
        self.sessions_per_customer.get_or_init(|| {
            debug!("computing sessions per customer");
            AttributionAggregator::sessions_per_customer(&self.table)
        })
    }

    /// Touchpoint counts bucketed by `component`, memoized per component.
    pub fn touchpoints_by_time_component(&self, component: TimeComponent) -> &[TimeComponentCount] {
        self.time_components[slot(component)].get_or_init(|| {
            debug!(%component, "computing touchpoints by time component");
            AttributionAggregator::touchpoints_by_time_component(&self.table, component)
        })
    }

    // ── Chart helpers ─────────────────────────────────────────────────────

    pub fn revenue_shares(&self) -> Vec<ChannelShare> {
        AttributionAggregator::revenue_shares(self.revenue_by_channel())
    }

    pub fn customer_shares(&self) -> Vec<ChannelShare> {
        AttributionAggregator::customer_shares(self.customer_count_by_channel())
    }

    pub fn session_count_frequency(&self) -> Vec<SessionCountFrequency> {
        AttributionAggregator::session_count_frequency(self.sessions_per_customer())
    }
}

fn slot(component: TimeComponent) -> usize {
    match component {
        TimeComponent::Year => 0,
        TimeComponent::Month => 1,
        TimeComponent::Hour => 2,
        TimeComponent::Weekday => 3,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
