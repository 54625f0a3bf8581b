//! Fetch, parse, normalise and render one daily report.

use std::io::Read;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::colour::ColourScale;
use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::fetch::{FeedSource, HttpClient};
use crate::output::{OutputFormat, render};
use crate::parser::read_feed;
use crate::series::{Series, normalize};
use crate::window::ReportWindow;
use crate::zone::ReportZone;

/// A finished report, ready for a sink.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub day: NaiveDate,
    pub zone: String,
    pub series: Series,
    pub format: OutputFormat,
    pub document: String,
}

/// Builds a report from an already opened feed stream.
pub fn build_report<R: Read>(
    feed: R,
    window: &ReportWindow,
    zone: &ReportZone,
    scale: &ColourScale,
    format: OutputFormat,
) -> Result<Report, ReportError> {
    let parsed = read_feed(feed)?;
    let series = normalize(parsed, zone, scale);
    let document = render(format, window.report_day, &series)?;

    Ok(Report {
        day: window.report_day,
        zone: zone.name(),
        series,
        format,
        document,
    })
}

/// Loads the feed for the day before `now` and builds its report.
///
/// Any fetch or parse failure ends the request; no partial report is built.
#[tracing::instrument(skip_all, fields(source = ?source, %now))]
pub async fn generate_report<C: HttpClient>(
    client: &C,
    source: &FeedSource,
    config: &ReportConfig,
    zone: &ReportZone,
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<Report, ReportError> {
    let window = ReportWindow::ending_at_midnight(now, zone);
    info!(
        day = %window.report_day,
        first = window.first_row(),
        zone = %zone.name(),
        "Generating report"
    );

    let bytes = source.load(client, &window, config.hours).await?;
    let report = build_report(
        bytes.as_slice(),
        &window,
        zone,
        &config.colour_scale(),
        format,
    )?;

    info!(
        points = report.series.points.len(),
        used = report.series.totals.used,
        generated = report.series.totals.generated,
        "Report built"
    );
    Ok(report)
}
