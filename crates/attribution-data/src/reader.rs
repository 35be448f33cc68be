//! Tab-separated event file loading.
//!
//! Reads the attribution events file into a [`RawTable`], validating the
//! header and the field count of every row. Every failure here is fatal and
//! reported as an [`IngestError`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use attribution_core::error::{IngestError, Result};
use attribution_core::models::{RawEvent, RawTable, EXPECTED_COLUMNS};
use tracing::debug;

/// Field delimiter of the input file.
pub const DELIMITER: u8 = b'\t';

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the events file at `path`.
///
/// Fails when the file is missing or unreadable, has no header, has a header
/// other than the five expected column names, or contains a row whose field
/// count differs from the header's.
pub fn load_events(path: &Path) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let table = load_events_from_reader(file)?;

    debug!("Loaded {} rows from {}", table.len(), path.display());
    Ok(table)
}

/// Load events from any reader, e.g. an in-memory buffer.
pub fn load_events_from_reader<R: Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .map_err(map_csv_error)?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(IngestError::MissingHeader);
    }

    let columns = ColumnIndex::from_headers(&headers)?;

    let mut events = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(map_csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        events.push(columns.to_event(&record, line));
    }

    Ok(RawTable { events })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Positions of the five required columns within the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    customer_id: usize,
    session_id: usize,
    timestamp: usize,
    channel: usize,
    revenue: usize,
}

impl ColumnIndex {
    /// Validate `headers` against the expected schema.
    ///
    /// Column order is free, but the header must contain each expected name
    /// exactly once and nothing else.
    fn from_headers(headers: &[String]) -> Result<Self> {
        let missing: Vec<String> = EXPECTED_COLUMNS
            .iter()
            .copied()
            .filter(|expected| !headers.iter().any(|h| h.as_str() == *expected))
            .map(str::to_string)
            .collect();

        let mut unexpected: Vec<String> = Vec::new();
        for (i, header) in headers.iter().enumerate() {
            let known = EXPECTED_COLUMNS.contains(&header.as_str());
            let duplicate = headers[..i].contains(header);
            if !known || duplicate {
                unexpected.push(header.clone());
            }
        }

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(IngestError::SchemaMismatch {
                missing,
                unexpected,
            });
        }

        let position = |name: &str| headers.iter().position(|h| h.as_str() == name).unwrap_or(0);
        let [customer_id, session_id, timestamp, channel, revenue] =
            EXPECTED_COLUMNS.map(position);

        Ok(Self {
            customer_id,
            session_id,
            timestamp,
            channel,
            revenue,
        })
    }

    fn to_event(&self, record: &csv::StringRecord, line: u64) -> RawEvent {
        let field = |idx: usize| non_empty(record.get(idx));
        RawEvent {
            line,
            customer_id: field(self.customer_id),
            session_id: field(self.session_id),
            timestamp_touchpoint: field(self.timestamp),
            marketing_channel: field(self.channel),
            revenue: field(self.revenue),
        }
    }
}

/// Empty fields become `None`.
fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn map_csv_error(err: csv::Error) -> IngestError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => IngestError::Io(e),
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => IngestError::MalformedRow {
            line: pos.map(|p| p.line()).unwrap_or(0),
            expected: expected_len as usize,
            found: len as usize,
        },
        _ => IngestError::Csv(message),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    const HEADER: &str = "CUSTOMERID\tSESSIONID\tTIMESTAMP_TOUCHPOINT\tMARKETINGCHANNEL\tREVENUE";

    fn write_tsv(dir: &Path, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn load_str(content: &str) -> Result<RawTable> {
        load_events_from_reader(content.as_bytes())
    }

    // ── load_events ───────────────────────────────────────────────────────────

    #[test]
    fn test_load_events_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_tsv(
            dir.path(),
            "events.csv",
            &[
                HEADER,
                "C1\tS1\t2020-01-01 10:00:00\tSEO\t10.5",
                "C1\tS2\t2020-01-01 11:00:00\tSEO\t",
            ],
        );

        let table = load_events(&path).unwrap();
        assert_eq!(table.len(), 2);

        let first = &table.events[0];
        assert_eq!(first.line, 2);
        assert_eq!(first.customer_id.as_deref(), Some("C1"));
        assert_eq!(first.session_id.as_deref(), Some("S1"));
        assert_eq!(
            first.timestamp_touchpoint.as_deref(),
            Some("2020-01-01 10:00:00")
        );
        assert_eq!(first.marketing_channel.as_deref(), Some("SEO"));
        assert_eq!(first.revenue.as_deref(), Some("10.5"));

        // Empty revenue is stored as None.
        assert_eq!(table.events[1].revenue, None);
    }

    #[test]
    fn test_load_events_missing_file() {
        let err = load_events(Path::new("/tmp/does-not-exist-attribution-xyz.csv")).unwrap_err();
        match err {
            IngestError::FileRead { path, .. } => {
                assert!(path.ends_with("does-not-exist-attribution-xyz.csv"));
            }
            other => panic!("expected FileRead, got {:?}", other),
        }
    }

    // ── load_events_from_reader ───────────────────────────────────────────────

    #[test]
    fn test_header_only_gives_empty_table() {
        let table = load_str(&format!("{}\n", HEADER)).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_empty_input_is_missing_header() {
        let err = load_str("").unwrap_err();
        assert!(matches!(err, IngestError::MissingHeader));
    }

    #[test]
    fn test_columns_in_any_order() {
        let content = "REVENUE\tMARKETINGCHANNEL\tTIMESTAMP_TOUCHPOINT\tSESSIONID\tCUSTOMERID\n\
                       5\tDirect\t2020-01-02 09:00:00\tS3\tC2\n";
        let table = load_str(content).unwrap();
        let event = &table.events[0];
        assert_eq!(event.customer_id.as_deref(), Some("C2"));
        assert_eq!(event.session_id.as_deref(), Some("S3"));
        assert_eq!(event.marketing_channel.as_deref(), Some("Direct"));
        assert_eq!(event.revenue.as_deref(), Some("5"));
    }

    #[test]
    fn test_header_is_case_sensitive() {
        let content = "customerid\tSESSIONID\tTIMESTAMP_TOUCHPOINT\tMARKETINGCHANNEL\tREVENUE\n";
        match load_str(content).unwrap_err() {
            IngestError::SchemaMismatch {
                missing,
                unexpected,
            } => {
                assert_eq!(missing, vec!["CUSTOMERID".to_string()]);
                assert_eq!(unexpected, vec!["customerid".to_string()]);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_column_is_schema_mismatch() {
        let content = format!("{}\tEXTRA\n", HEADER);
        match load_str(&content).unwrap_err() {
            IngestError::SchemaMismatch {
                missing,
                unexpected,
            } => {
                assert!(missing.is_empty());
                assert_eq!(unexpected, vec!["EXTRA".to_string()]);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_column_is_schema_mismatch() {
        let content = format!("{}\tREVENUE\n", HEADER);
        assert!(matches!(
            load_str(&content).unwrap_err(),
            IngestError::SchemaMismatch { .. }
        ));
    }

    #[test]
    fn test_comma_delimited_file_is_schema_mismatch() {
        let content = "CUSTOMERID,SESSIONID,TIMESTAMP_TOUCHPOINT,MARKETINGCHANNEL,REVENUE\n";
        assert!(matches!(
            load_str(content).unwrap_err(),
            IngestError::SchemaMismatch { .. }
        ));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let content = format!(
            "{}\nC1\tS1\t2020-01-01 10:00:00\tSEO\t\nC2\tS2\tSEO\n",
            HEADER
        );
        match load_str(&content).unwrap_err() {
            IngestError::MalformedRow {
                line,
                expected,
                found,
            } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 5);
                assert_eq!(found, 3);
            }
            other => panic!("expected MalformedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_long_row_is_malformed() {
        let content = format!("{}\nC1\tS1\t2020-01-01\tSEO\t1\textra\n", HEADER);
        assert!(matches!(
            load_str(&content).unwrap_err(),
            IngestError::MalformedRow { found: 6, .. }
        ));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let content = format!(
            "{}\nC1\tS1\t2020-01-01 10:00:00\tSEO\t\n\nC2\tS2\t2020-01-02 10:00:00\tSEO\t\n\n",
            HEADER
        );
        let table = load_str(&content).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = format!(
            "{}\r\nC1\tS1\t2020-01-01 10:00:00\tSEO\t3\r\n",
            HEADER
        );
        let table = load_str(&content).unwrap();
        assert_eq!(table.events[0].revenue.as_deref(), Some("3"));
    }

    #[test]
    fn test_byte_order_mark_stripped() {
        let content = format!("\u{feff}{}\nC1\tS1\t2020-01-01\tSEO\t\n", HEADER);
        let table = load_str(&content).unwrap();
        assert_eq!(table.len(), 1);
    }
}
