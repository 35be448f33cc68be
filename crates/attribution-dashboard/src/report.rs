//! Text and JSON rendering of the dashboard sections.

use attribution_core::formatting::{format_bar, format_count, format_number, format_percent};
use attribution_core::models::{
    ChannelCustomers, ChannelRevenue, CustomerSessions, DailyTouchpoints, DataQuality, RawEvent,
    SessionCountFrequency, TableSummary, TimeComponent, TimeComponentCount,
};
use attribution_core::settings::View;
use attribution_runtime::session::DashboardSession;
use serde::Serialize;

/// Widest histogram bar, in characters.
const BAR_WIDTH: usize = 40;

const NO_DATA: &str = "(no data)";

// ── Text report ───────────────────────────────────────────────────────────────

/// Render the sections selected by `view` as plain text.
pub fn render_text(
    session: &DashboardSession,
    view: View,
    component: TimeComponent,
    preview_rows: usize,
) -> String {
    let mut sections = Vec::new();

    if wants(view, View::Overview) {
        sections.push(preview_text(session, preview_rows));
        sections.push(summary_text(session.summary(), session.data_quality()));
    }
    if wants(view, View::Revenue) {
        sections.push(revenue_text(session));
    }
    if wants(view, View::Customers) {
        sections.push(customers_text(session));
    }
    if wants(view, View::Daily) {
        sections.push(daily_text(session.touchpoints_per_day()));
    }
    if wants(view, View::Time) {
        sections.push(time_component_text(session, component));
    }
    if wants(view, View::Sessions) {
        sections.push(sessions_text(&session.session_count_frequency()));
    }

    sections.join("\n")
}

/// One time-component distribution, as printed by the interactive prompt.
pub fn time_component_text(session: &DashboardSession, component: TimeComponent) -> String {
    let buckets: &[TimeComponentCount] = session.touchpoints_by_time_component(component);
    let max = buckets.iter().map(|b| b.count).max().unwrap_or(0) as f64;

    let rows: Vec<Vec<String>> = buckets
        .iter()
        .map(|b| {
            vec![
                b.label.clone(),
                format_count(b.count),
                format_bar(b.count as f64, max, BAR_WIDTH),
            ]
        })
        .collect();

    section(
        component.title(),
        &[component_header(component), "Touchpoints", ""],
        rows,
    )
}

fn preview_text(session: &DashboardSession, n: usize) -> String {
    let rows: Vec<Vec<String>> = session
        .preview(n)
        .iter()
        .map(|e| {
            let raw = &e.raw;
            [
                &raw.customer_id,
                &raw.session_id,
                &raw.timestamp_touchpoint,
                &raw.marketing_channel,
                &raw.revenue,
            ]
            .iter()
            .map(|v| v.as_deref().unwrap_or("-").to_string())
            .collect()
        })
        .collect();

    section(
        "Data Overview",
        &[
            "CUSTOMERID",
            "SESSIONID",
            "TIMESTAMP_TOUCHPOINT",
            "MARKETINGCHANNEL",
            "REVENUE",
        ],
        rows,
    )
}

fn summary_text(summary: &TableSummary, quality: &DataQuality) -> String {
    let rows: Vec<Vec<String>> = summary
        .columns
        .iter()
        .map(|c| vec![c.name.clone(), format_count(c.non_null as u64), c.kind.to_string()])
        .collect();

    let mut out = section(
        "Summary of the Data",
        &["Column", "Non-Null Count", "Dtype"],
        rows,
    );

    out.push_str(&format!("Rows: {}\n", format_count(summary.rows as u64)));
    if let (Some(first), Some(last)) = (summary.first_touchpoint, summary.last_touchpoint) {
        out.push_str(&format!("Touchpoints from {} to {}\n", first, last));
    }
    if quality.warning_count() > 0 {
        out.push_str(&format!(
            "Unparsable values treated as missing: {} revenue, {} timestamp\n",
            format_count(quality.revenue_unparsable as u64),
            format_count(quality.timestamp_unparsable as u64),
        ));
    }
    out
}

fn revenue_text(session: &DashboardSession) -> String {
    let revenue: &[ChannelRevenue] = session.revenue_by_channel();
    let shares = session.revenue_shares();
    let max = revenue.iter().map(|r| r.revenue).fold(0.0, f64::max);

    let rows: Vec<Vec<String>> = revenue
        .iter()
        .enumerate()
        .map(|(i, r)| {
            vec![
                r.channel.clone(),
                format_number(r.revenue, 2),
                shares
                    .get(i)
                    .map(|s| format_percent(s.percent))
                    .unwrap_or_default(),
                format_bar(r.revenue, max, BAR_WIDTH),
            ]
        })
        .collect();

    section(
        "Revenue Attribution by Marketing Channel",
        &["Channel", "Revenue", "Share", ""],
        rows,
    )
}

fn customers_text(session: &DashboardSession) -> String {
    let customers: &[ChannelCustomers] = session.customer_count_by_channel();
    let shares = session.customer_shares();

    let rows: Vec<Vec<String>> = customers
        .iter()
        .enumerate()
        .map(|(i, c)| {
            vec![
                c.channel.clone(),
                format_count(c.customers),
                shares
                    .get(i)
                    .map(|s| format_percent(s.percent))
                    .unwrap_or_default(),
            ]
        })
        .collect();

    section(
        "Distribution of Customers per Marketing Channel",
        &["Channel", "Customers", "Share"],
        rows,
    )
}

fn daily_text(days: &[DailyTouchpoints]) -> String {
    let max = days.iter().map(|d| d.touchpoints).max().unwrap_or(0) as f64;

    let rows: Vec<Vec<String>> = days
        .iter()
        .map(|d| {
            vec![
                d.date.to_string(),
                format_count(d.touchpoints),
                format_bar(d.touchpoints as f64, max, BAR_WIDTH),
            ]
        })
        .collect();

    section(
        "Time Series Analysis of Touchpoints (Daily)",
        &["Date", "Touchpoints", ""],
        rows,
    )
}

fn sessions_text(frequency: &[SessionCountFrequency]) -> String {
    let max = frequency.iter().map(|f| f.customers).max().unwrap_or(0) as f64;

    let rows: Vec<Vec<String>> = frequency
        .iter()
        .map(|f| {
            vec![
                f.sessions.to_string(),
                format_count(f.customers),
                format_bar(f.customers as f64, max, BAR_WIDTH),
            ]
        })
        .collect();

    section(
        "Distribution of Number of Sessions per Customer",
        &["Sessions", "Customers", ""],
        rows,
    )
}

fn component_header(component: TimeComponent) -> &'static str {
    match component {
        TimeComponent::Year => "Year",
        TimeComponent::Month => "Month",
        TimeComponent::Hour => "Hour",
        TimeComponent::Weekday => "Day",
    }
}

/// A titled, column-aligned table. Empty `rows` print as `(no data)`.
fn section(title: &str, headers: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut out = format!("{}\n{}\n", title, "=".repeat(title.chars().count()));

    if rows.is_empty() {
        out.push_str(NO_DATA);
        out.push('\n');
        return out;
    }

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    out.push_str(&line(headers.to_vec()));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(rule.iter().map(String::as_str).collect()));
    for row in &rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

fn wants(view: View, section: View) -> bool {
    view == View::All || view == section
}

// ── JSON report ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize)]
struct JsonReport<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    preview: Option<Vec<&'a RawEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a TableSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data_quality: Option<&'a DataQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    revenue_by_channel: Option<&'a [ChannelRevenue]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_count_by_channel: Option<&'a [ChannelCustomers]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    touchpoints_per_day: Option<&'a [DailyTouchpoints]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    touchpoints_by_time_component: Option<JsonTimeComponent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sessions_per_customer: Option<&'a [CustomerSessions]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_count_frequency: Option<Vec<SessionCountFrequency>>,
}

#[derive(Debug, Serialize)]
struct JsonTimeComponent<'a> {
    component: TimeComponent,
    buckets: &'a [TimeComponentCount],
}

/// Render the sections selected by `view` as one pretty-printed JSON object.
pub fn render_json(
    session: &DashboardSession,
    view: View,
    component: TimeComponent,
    preview_rows: usize,
) -> serde_json::Result<String> {
    let mut report = JsonReport::default();

    if wants(view, View::Overview) {
        report.preview = Some(session.preview(preview_rows).iter().map(|e| &e.raw).collect());
        report.summary = Some(session.summary());
        report.data_quality = Some(session.data_quality());
    }
    if wants(view, View::Revenue) {
        report.revenue_by_channel = Some(session.revenue_by_channel());
    }
    if wants(view, View::Customers) {
        report.customer_count_by_channel = Some(session.customer_count_by_channel());
    }
    if wants(view, View::Daily) {
        report.touchpoints_per_day = Some(session.touchpoints_per_day());
    }
    if wants(view, View::Time) {
        report.touchpoints_by_time_component = Some(JsonTimeComponent {
            component,
            buckets: session.touchpoints_by_time_component(component),
        });
    }
    if wants(view, View::Sessions) {
        report.sessions_per_customer = Some(session.sessions_per_customer());
        report.session_count_frequency = Some(session.session_count_frequency());
    }

    serde_json::to_string_pretty(&report)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attribution_core::models::CleanedTable;
    use attribution_data::analysis::analyze_reader;

    const EVENTS: &str = "CUSTOMERID\tSESSIONID\tTIMESTAMP_TOUCHPOINT\tMARKETINGCHANNEL\tREVENUE\n\
        C1\tS1\t2020-01-06 10:00:00\tSEO\t1200.5\n\
        C1\tS2\t2020-01-07 14:00:00\tDirect\t\n\
        C2\tS3\t2020-01-07 09:00:00\tSEO\tN/A\n";

    fn session() -> DashboardSession {
        DashboardSession::new(analyze_reader(EVENTS.as_bytes()).unwrap())
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn test_render_all_sections() {
        let text = render_text(&session(), View::All, TimeComponent::Year, 5);
        for title in [
            "Data Overview",
            "Summary of the Data",
            "Revenue Attribution by Marketing Channel",
            "Distribution of Customers per Marketing Channel",
            "Time Series Analysis of Touchpoints (Daily)",
            "Distribution of Touchpoints by Year",
            "Distribution of Number of Sessions per Customer",
        ] {
            assert!(text.contains(title), "missing section {title}");
        }
        assert!(!text.contains(NO_DATA));
    }

    #[test]
    fn test_render_single_view() {
        let text = render_text(&session(), View::Revenue, TimeComponent::Year, 5);
        assert!(text.starts_with("Revenue Attribution by Marketing Channel\n"));
        assert!(text.contains("1,200.50"));
        assert!(text.contains("100.0%"));
        assert!(!text.contains("Data Overview"));
    }

    #[test]
    fn test_render_summary_mentions_unparsable_values() {
        let text = render_text(&session(), View::Overview, TimeComponent::Year, 2);
        assert!(text.contains("Rows: 3"));
        assert!(text.contains("1 revenue, 0 timestamp"));
        assert!(text.contains("TIMESTAMP_TOUCHPOINT  3"));
    }

    #[test]
    fn test_time_component_text_weekday() {
        let text = time_component_text(&session(), TimeComponent::Weekday);
        assert!(text.starts_with("Distribution of Touchpoints by Day of the week\n"));
        let monday = text.find("Monday").unwrap();
        let tuesday = text.find("Tuesday").unwrap();
        assert!(monday < tuesday);
    }

    #[test]
    fn test_empty_session_prints_no_data() {
        let empty = DashboardSession::from_table(CleanedTable::default());
        let text = render_text(&empty, View::Revenue, TimeComponent::Year, 5);
        assert!(text.contains(NO_DATA));
    }

    #[test]
    fn test_section_alignment() {
        let text = section(
            "T",
            &["A", "Long"],
            vec![
                vec!["xyz".to_string(), "1".to_string()],
                vec!["q".to_string(), "22".to_string()],
            ],
        );
        assert_eq!(text, "T\n=\nA    Long\n---  ----\nxyz  1\nq    22\n");
    }

    // ── json ──────────────────────────────────────────────────────────────

    #[test]
    fn test_render_json_all() {
        let json = render_json(&session(), View::All, TimeComponent::Month, 1).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["preview"].as_array().unwrap().len(), 1);
        assert_eq!(value["revenue_by_channel"][0]["channel"], "SEO");
        assert_eq!(value["revenue_by_channel"][0]["revenue"], 1200.5);
        assert_eq!(value["touchpoints_by_time_component"]["component"], "month");
        assert_eq!(
            value["touchpoints_by_time_component"]["buckets"][0]["count"],
            3
        );
        assert_eq!(value["touchpoints_per_day"][0]["date"], "2020-01-06");
        assert_eq!(value["data_quality"]["revenue_unparsable"], 1);
    }

    #[test]
    fn test_render_json_single_view_omits_other_sections() {
        let json = render_json(&session(), View::Sessions, TimeComponent::Year, 5).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = value.as_object().unwrap();

        assert!(object.contains_key("sessions_per_customer"));
        assert!(object.contains_key("session_count_frequency"));
        assert!(!object.contains_key("revenue_by_channel"));
        assert!(!object.contains_key("preview"));
    }
}
