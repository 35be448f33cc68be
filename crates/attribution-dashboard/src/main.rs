mod bootstrap;
mod report;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use attribution_core::models::TimeComponent;
use attribution_core::settings::{OutputFormat, Settings, View};
use attribution_runtime::data_manager::SessionManager;
use attribution_runtime::session::DashboardSession;

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Attribution dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data file: {}, View: {:?}, Component: {}",
        settings.data_file.display(),
        settings.view,
        settings.component
    );

    let mut manager = SessionManager::new(&settings.data_file);
    let session = manager
        .get_session(false)
        .with_context(|| format!("Unable to load {}", settings.data_file.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let report = render(
        session,
        settings.format,
        settings.view,
        settings.component,
        settings.preview_rows,
    )?;
    out.write_all(report.as_bytes())?;

    if settings.interactive {
        tracing::info!("Reading time components from stdin...");
        run_interactive(session, settings.format, io::stdin().lock(), &mut out)?;
    }

    out.flush()?;
    Ok(())
}

fn render(
    session: &DashboardSession,
    format: OutputFormat,
    view: View,
    component: TimeComponent,
    preview_rows: usize,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report::render_text(session, view, component, preview_rows)),
        OutputFormat::Json => {
            let mut json = report::render_json(session, view, component, preview_rows)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Print one distribution per component name read from `input`.
///
/// Every answer comes from the same session, so a component is computed at
/// most once. Blank lines are skipped and `q`/`quit` stops early.
fn run_interactive<R: BufRead, W: Write>(
    session: &DashboardSession,
    format: OutputFormat,
    input: R,
    out: &mut W,
) -> Result<()> {
    for line in input.lines() {
        let line = line.context("reading stdin")?;
        let choice = line.trim();
        if choice.is_empty() {
            continue;
        }
        if matches!(choice, "q" | "quit") {
            break;
        }

        match choice.parse::<TimeComponent>() {
            Ok(component) => {
                let text = match format {
                    OutputFormat::Text => report::time_component_text(session, component),
                    OutputFormat::Json => render(session, format, View::Time, component, 0)?,
                };
                writeln!(out, "{}", text.trim_end())?;
            }
            Err(message) => {
                tracing::warn!("{}", message);
                writeln!(out, "{}", message)?;
            }
        }
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use attribution_data::analysis::analyze_reader;
    use std::io::Cursor;

    const EVENTS: &str = "CUSTOMERID\tSESSIONID\tTIMESTAMP_TOUCHPOINT\tMARKETINGCHANNEL\tREVENUE\n\
        C1\tS1\t2019-12-30 23:00:00\tSEO\t4\n\
        C2\tS2\t2020-01-02 08:00:00\tEmail\t\n";

    fn session() -> DashboardSession {
        DashboardSession::new(analyze_reader(EVENTS.as_bytes()).unwrap())
    }

    fn interact(input: &str, format: OutputFormat) -> String {
        let mut out = Vec::new();
        run_interactive(&session(), format, Cursor::new(input), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_interactive_prints_each_component() {
        let out = interact("year\n\nWeekDay\n", OutputFormat::Text);
        assert!(out.contains("Distribution of Touchpoints by Year"));
        assert!(out.contains("2019"));
        assert!(out.contains("2020"));
        assert!(out.contains("Distribution of Touchpoints by Day of the week"));
        assert!(out.contains("Monday"));
        assert!(out.contains("Thursday"));
    }

    #[test]
    fn test_interactive_rejects_unknown_component() {
        let out = interact("minute\nhour\n", OutputFormat::Text);
        assert!(out.contains("unknown time component \"minute\""));
        assert!(out.contains("Distribution of Touchpoints by Hour of Day"));
    }

    #[test]
    fn test_interactive_quit_stops_reading() {
        let out = interact("quit\nyear\n", OutputFormat::Text);
        assert!(out.is_empty());
    }

    #[test]
    fn test_interactive_json() {
        let out = interact("month\n", OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let buckets = value["touchpoints_by_time_component"]["buckets"]
            .as_array()
            .unwrap();
        let labels: Vec<&str> = buckets.iter().filter_map(|b| b["label"].as_str()).collect();
        assert_eq!(labels, vec!["1", "12"]);
    }

    #[test]
    fn test_render_text_and_json() {
        let s = session();
        let text = render(&s, OutputFormat::Text, View::Daily, TimeComponent::Year, 5).unwrap();
        assert!(text.contains("2019-12-30"));

        let json = render(&s, OutputFormat::Json, View::Daily, TimeComponent::Year, 5).unwrap();
        assert!(json.ends_with("}\n"));
    }
}
