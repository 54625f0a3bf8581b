//! CSV reader for eGauge register exports.
//!
//! The feed is a header row followed by rows of
//! `timestamp,used,generated,...` with exactly [`FEED_COLUMNS`] fields.
//! Any bad data row aborts the whole read.

use std::io::Read;

use chrono::{DateTime, Utc};
use csv::{ByteRecord, ReaderBuilder, Trim};
use tracing::debug;

use crate::error::{FetchError, MalformedFeedError, ReportError};
use crate::stats::{Sample, Totals};

/// Number of columns in every data row of the export.
pub const FEED_COLUMNS: usize = 6;

/// Samples in arrival order plus their totals.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedFeed {
    pub totals: Totals,
    pub samples: Vec<Sample>,
}

/// Decodes a feed held in memory.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, ReportError> {
    read_feed(bytes)
}

/// Reads a feed stream to the end.
///
/// # Errors
///
/// Returns [`ReportError::MalformedFeed`] for the first data row with the
/// wrong column count or an unparseable field, and [`ReportError::Fetch`] if
/// the stream itself fails. Nothing read before the failure is returned.
pub fn read_feed<R: Read>(reader: R) -> Result<ParsedFeed, ReportError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut feed = ParsedFeed::default();

    for (row, result) in rdr.byte_records().enumerate() {
        // The header is dropped whatever it holds.
        if row == 0 {
            continue;
        }

        let record = result.map_err(|e| csv_error(row, e))?;
        let sample = parse_row(row, &record)?;

        feed.totals.add(&sample);
        feed.samples.push(sample);
    }

    debug!(
        rows = feed.samples.len(),
        used = feed.totals.used,
        generated = feed.totals.generated,
        "Feed read"
    );

    Ok(feed)
}

fn parse_row(row: usize, record: &ByteRecord) -> Result<Sample, MalformedFeedError> {
    if record.len() != FEED_COLUMNS {
        return Err(MalformedFeedError {
            row,
            reason: format!("expected {} fields, found {}", FEED_COLUMNS, record.len()),
        });
    }

    let secs: i64 = field(row, record, 0, "timestamp")?
        .parse()
        .map_err(|e| malformed(row, "timestamp", e))?;
    let timestamp = DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| MalformedFeedError {
        row,
        reason: format!("timestamp {secs} is out of range"),
    })?;

    let used = reading(row, record, 1, "used")?;
    let generated = reading(row, record, 2, "generated")?;

    Ok(Sample::new(timestamp, used, generated))
}

fn reading(
    row: usize,
    record: &ByteRecord,
    index: usize,
    name: &str,
) -> Result<f64, MalformedFeedError> {
    let value: f64 = field(row, record, index, name)?
        .parse()
        .map_err(|e| malformed(row, name, e))?;

    if !value.is_finite() {
        return Err(MalformedFeedError {
            row,
            reason: format!("{name} is not a finite number"),
        });
    }
    Ok(value)
}

fn field<'r>(
    row: usize,
    record: &'r ByteRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, MalformedFeedError> {
    let raw = record.get(index).ok_or_else(|| MalformedFeedError {
        row,
        reason: format!("missing {name} field"),
    })?;
    std::str::from_utf8(raw).map_err(|e| malformed(row, name, e))
}

fn malformed(row: usize, name: &str, err: impl std::fmt::Display) -> MalformedFeedError {
    MalformedFeedError {
        row,
        reason: format!("invalid {name}: {err}"),
    }
}

fn csv_error(row: usize, err: csv::Error) -> ReportError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(io) => FetchError::Io(io).into(),
        _ => malformed(row, "record", message).into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date & Time,Usage [kWh],Generation [kWh],Grid [kWh],Solar [kWh],Solar+ [kWh]\n";

    fn feed(rows: &[&str]) -> String {
        let mut s = HEADER.to_string();
        for r in rows {
            s.push_str(r);
            s.push('\n');
        }
        s
    }

    fn expect_malformed(result: Result<ParsedFeed, ReportError>) -> MalformedFeedError {
        match result {
            Err(ReportError::MalformedFeed(e)) => e,
            other => panic!("expected malformed feed, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_feed_is_empty() {
        let parsed = parse_feed(HEADER.as_bytes()).unwrap();
        assert!(parsed.samples.is_empty());
        assert_eq!(parsed.totals, Totals::default());
    }

    #[test]
    fn test_empty_input_is_empty() {
        let parsed = parse_feed(&[]).unwrap();
        assert!(parsed.samples.is_empty());
    }

    #[test]
    fn test_header_row_is_excluded() {
        let input = "timestamp,used,generated,a,b,c\n1000,1.0,2.0,0,0,0\n";
        let parsed = parse_feed(input.as_bytes()).unwrap();
        assert_eq!(parsed.samples.len(), 1);
    }

    #[test]
    fn test_malformed_header_is_still_skipped() {
        let input = "garbage header\n1000,1.0,2.0,0,0,0\n";
        let parsed = parse_feed(input.as_bytes()).unwrap();
        assert_eq!(parsed.samples.len(), 1);
        assert_eq!(parsed.samples[0].timestamp.timestamp(), 1000);
    }

    #[test]
    fn test_rows_keep_arrival_order_and_clamp() {
        let input = feed(&[
            "1000,1.5,2.0,0,0,0",
            "2000,-0.5,3.0,0,0,0",
            "500,0.0,0.0,0,0,0",
        ]);
        let parsed = parse_feed(input.as_bytes()).unwrap();

        let stamps: Vec<i64> = parsed.samples.iter().map(|s| s.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![1000, 2000, 500]);
        assert_eq!(parsed.samples[1].used, 0.0);
        assert_eq!(parsed.totals.used, 1.5);
        assert_eq!(parsed.totals.generated, 5.0);
    }

    #[test]
    fn test_quoted_and_padded_fields() {
        let input = feed(&["\"1000\",\"2.1\", 0.25 ,x,y,z"]);
        let parsed = parse_feed(input.as_bytes()).unwrap();
        assert_eq!(parsed.samples[0].used, 2.1);
        assert_eq!(parsed.samples[0].generated, 0.25);
    }

    #[test]
    fn test_short_row_aborts_read() {
        let input = feed(&["1000,1.0,1.0,0,0,0", "2000,1.0,1.0,0"]);
        let err = expect_malformed(parse_feed(input.as_bytes()));
        assert_eq!(err.row, 2);
        assert!(err.reason.contains("expected 6 fields, found 4"));
    }

    #[test]
    fn test_long_row_aborts_read() {
        let input = feed(&["1000,1.0,1.0,0,0,0,0"]);
        let err = expect_malformed(parse_feed(input.as_bytes()));
        assert_eq!(err.row, 1);
    }

    #[test]
    fn test_bad_timestamp_aborts_read() {
        let input = feed(&["10.5,1.0,1.0,0,0,0"]);
        let err = expect_malformed(parse_feed(input.as_bytes()));
        assert_eq!(err.row, 1);
        assert!(err.reason.contains("timestamp"));
    }

    #[test]
    fn test_out_of_range_timestamp_aborts_read() {
        let input = feed(&[format!("{},1.0,1.0,0,0,0", i64::MAX).as_str()]);
        let err = expect_malformed(parse_feed(input.as_bytes()));
        assert!(err.reason.contains("out of range"));
    }

    #[test]
    fn test_bad_reading_aborts_read() {
        let input = feed(&["1000,1.0,1.0,0,0,0", "2000,1.0,1.0,0,0,0", "3000,abc,1.0,0,0,0"]);
        let err = expect_malformed(parse_feed(input.as_bytes()));
        assert_eq!(err.row, 3);
        assert!(err.reason.contains("used"));
    }

    #[test]
    fn test_non_finite_reading_aborts_read() {
        let input = feed(&["1000,1.0,inf,0,0,0"]);
        let err = expect_malformed(parse_feed(input.as_bytes()));
        assert!(err.reason.contains("generated"));
    }

    #[test]
    fn test_stream_failure_is_fetch_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            }
        }

        let result = read_feed(HEADER.as_bytes().chain(Broken));
        assert!(matches!(result, Err(ReportError::Fetch(FetchError::Io(_)))));
    }
}
