use chrono::{DateTime, NaiveDate, Utc};

use crate::zone::ReportZone;

/// The day a report covers: the 24 hours ending at local midnight today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    /// Start of today in the report zone; the feed returns rows ending here.
    pub first: DateTime<Utc>,
    pub report_day: NaiveDate,
}

impl ReportWindow {
    pub fn ending_at_midnight(now: DateTime<Utc>, zone: &ReportZone) -> Self {
        let first = zone.start_of_day(now);
        let today = zone.localize(first).date_naive();
        let report_day = today.pred_opt().unwrap_or(today);
        ReportWindow { first, report_day }
    }

    /// Value of the feed's `f` query parameter.
    pub fn first_row(&self) -> i64 {
        self.first.timestamp()
    }
}
