//! Group-by reductions over the cleaned event table.
//!
//! Every reduction is a pure function of the table. Rows whose grouping key
//! is null are skipped, and an empty input yields an empty result.

use std::collections::{BTreeMap, BTreeSet};

use attribution_core::models::{
    ChannelCustomers, ChannelRevenue, ChannelShare, CleanedEvent, CleanedTable, CustomerSessions,
    DailyTouchpoints, SessionCountFrequency, TimeComponent, TimeComponentCount,
};
use chrono::NaiveDate;

// ── AttributionAggregator ─────────────────────────────────────────────────────

/// Stateless helper computing the dashboard's derived tables.
pub struct AttributionAggregator;

impl AttributionAggregator {
    /// Sum of numeric revenue per marketing channel.
    ///
    /// Only rows whose revenue parsed to a number contribute; absent and
    /// unparsable values are excluded rather than counted as zero. Channels are
    /// returned in ascending label order, which carries no meaning.
    pub fn revenue_by_channel(table: &CleanedTable) -> Vec<ChannelRevenue> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();

        for event in &table.events {
            let (Some(channel), Some(amount)) = (event.channel(), event.revenue.amount()) else {
                continue;
            };
            *totals.entry(channel).or_insert(0.0) += amount;
        }

        totals
            .into_iter()
            .map(|(channel, revenue)| ChannelRevenue {
                channel: channel.to_string(),
                revenue,
            })
            .collect()
    }

    /// Distinct customers per marketing channel, most customers first.
    ///
    /// Ties are broken by channel label ascending.
    pub fn customer_count_by_channel(table: &CleanedTable) -> Vec<ChannelCustomers> {
        let groups = Self::distinct_by(table, |e| e.channel(), |e| e.customer_id());

        let mut result: Vec<ChannelCustomers> = groups
            .into_iter()
            .map(|(channel, customers)| ChannelCustomers {
                channel: channel.to_string(),
                customers: customers.len() as u64,
            })
            .collect();

        result.sort_by(|a, b| {
            b.customers
                .cmp(&a.customers)
                .then_with(|| a.channel.cmp(&b.channel))
        });
        result
    }

    /// Touchpoints per calendar day, oldest first.
    ///
    /// Only days that occur in the data are present; rows without a parsed
    /// timestamp are excluded.
    pub fn touchpoints_per_day(table: &CleanedTable) -> Vec<DailyTouchpoints> {
        let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();

        for date in table.events.iter().filter_map(|e| e.date()) {
            *days.entry(date).or_insert(0) += 1;
        }

        days.into_iter()
            .map(|(date, touchpoints)| DailyTouchpoints { date, touchpoints })
            .collect()
    }

    /// Distinct sessions per customer, most sessions first.
    ///
    /// Ties are broken by customer identifier ascending.
    pub fn sessions_per_customer(table: &CleanedTable) -> Vec<CustomerSessions> {
        let groups = Self::distinct_by(table, |e| e.customer_id(), |e| e.session_id());

        let mut result: Vec<CustomerSessions> = groups
            .into_iter()
            .map(|(customer, sessions)| CustomerSessions {
                customer_id: customer.to_string(),
                sessions: sessions.len() as u64,
            })
            .collect();

        result.sort_by(|a, b| {
            b.sessions
                .cmp(&a.sessions)
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });
        result
    }

    /// Touchpoint counts bucketed by one calendar component.
    ///
    /// Buckets come in natural order (years ascending, months 1–12, hours
    /// 0–23, Monday through Sunday) and only values present in the data appear.
    pub fn touchpoints_by_time_component(
        table: &CleanedTable,
        component: TimeComponent,
    ) -> Vec<TimeComponentCount> {
        let mut buckets: BTreeMap<i64, (String, u64)> = BTreeMap::new();

        for fields in table.events.iter().filter_map(|e| e.calendar.as_ref()) {
            let (key, label) = component.bucket(fields);
            buckets.entry(key).or_insert_with(|| (label, 0)).1 += 1;
        }

        buckets
            .into_iter()
            .map(|(key, (label, count))| TimeComponentCount { key, label, count })
            .collect()
    }

    /// Pie-chart shares of `values`, in input order.
    ///
    /// Returns an empty vector when there is nothing to share out (no values or
    /// a non-positive total).
    pub fn channel_shares<'a, I>(values: I) -> Vec<ChannelShare>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let values: Vec<(&str, f64)> = values.into_iter().collect();
        let total: f64 = values.iter().map(|(_, v)| v).sum();
        if !total.is_finite() || total <= 0.0 {
            return Vec::new();
        }

        values
            .into_iter()
            .map(|(channel, value)| ChannelShare {
                channel: channel.to_string(),
                value,
                percent: value / total * 100.0,
            })
            .collect()
    }

    /// Shares of total revenue per channel.
    pub fn revenue_shares(revenue: &[ChannelRevenue]) -> Vec<ChannelShare> {
        Self::channel_shares(revenue.iter().map(|r| (r.channel.as_str(), r.revenue)))
    }

    /// Shares of per-channel customer counts.
    pub fn customer_shares(customers: &[ChannelCustomers]) -> Vec<ChannelShare> {
        Self::channel_shares(
            customers
                .iter()
                .map(|c| (c.channel.as_str(), c.customers as f64)),
        )
    }

    /// Histogram source for the sessions chart: how many customers had each
    /// session count, ascending by session count.
    pub fn session_count_frequency(sessions: &[CustomerSessions]) -> Vec<SessionCountFrequency> {
        let mut freq: BTreeMap<u64, u64> = BTreeMap::new();
        for customer in sessions {
            *freq.entry(customer.sessions).or_insert(0) += 1;
        }

        freq.into_iter()
            .map(|(sessions, customers)| SessionCountFrequency {
                sessions,
                customers,
            })
            .collect()
    }

    // ── Private ───────────────────────────────────────────────────────────────

    /// Group rows by `key_fn` and collect the distinct non-null `value_fn`
    /// values of each group.
    ///
    /// A group whose values are all null is kept with an empty set, so it
    /// reports a count of zero.
    fn distinct_by<'a>(
        table: &'a CleanedTable,
        key_fn: impl Fn(&'a CleanedEvent) -> Option<&'a str>,
        value_fn: impl Fn(&'a CleanedEvent) -> Option<&'a str>,
    ) -> BTreeMap<&'a str, BTreeSet<&'a str>> {
        let mut groups: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

        for event in &table.events {
            let Some(key) = key_fn(event) else { continue };
            let values = groups.entry(key).or_default();
            if let Some(value) = value_fn(event) {
                values.insert(value);
            }
        }

        groups
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
