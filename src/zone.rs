//! Time zone used to present a report.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::ZoneResolutionError;

/// A named IANA zone, or a fixed offset standing in for one.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportZone {
    Named(Tz),
    Fixed { label: String, offset: FixedOffset },
}

impl ReportZone {
    pub fn named(name: &str) -> Result<Self, ZoneResolutionError> {
        name.parse::<Tz>()
            .map(ReportZone::Named)
            .map_err(|_| ZoneResolutionError(name.to_string()))
    }

    pub fn fixed(label: &str, offset: FixedOffset) -> Self {
        ReportZone::Fixed {
            label: label.to_string(),
            offset,
        }
    }

    /// Looks up `name`, falling back to `offset` when the zone is unknown.
    pub fn resolve(name: &str, fallback_label: &str, offset: FixedOffset) -> Self {
        match Self::named(name) {
            Ok(zone) => zone,
            Err(e) => {
                warn!(error = %e, fallback = fallback_label, %offset, "Using fixed-offset zone");
                Self::fixed(fallback_label, offset)
            }
        }
    }

    pub fn name(&self) -> String {
        match self {
            ReportZone::Named(tz) => tz.name().to_string(),
            ReportZone::Fixed { label, .. } => label.clone(),
        }
    }

    /// Wall-clock view of `instant` in this zone.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            ReportZone::Named(tz) => instant.with_timezone(tz).fixed_offset(),
            ReportZone::Fixed { offset, .. } => instant.with_timezone(offset),
        }
    }

    /// Local midnight of the day containing `now`.
    pub fn start_of_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ReportZone::Named(tz) => local_midnight(tz, now),
            ReportZone::Fixed { offset, .. } => local_midnight(offset, now),
        }
    }
}

// Where midnight is skipped by a DST change, the day starts at the first
// local hour that exists.
fn local_midnight<Z: TimeZone>(tz: &Z, now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = now.with_timezone(tz).date_naive().and_time(NaiveTime::MIN);

    (0..3)
        .find_map(|h| {
            tz.from_local_datetime(&(midnight + Duration::hours(h)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight).with_timezone(&Utc))
}
