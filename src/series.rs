//! Orders samples and annotates them for presentation.

use chrono::{DateTime, FixedOffset, Timelike};
use serde::Serialize;

use crate::colour::{ColourScale, Rgb};
use crate::parser::ParsedFeed;
use crate::stats::{Sample, Totals};
use crate::zone::ReportZone;

/// A sample with its local time and display colours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    #[serde(flatten)]
    pub sample: Sample,
    pub local: DateTime<FixedOffset>,
    pub hour: u32,
    pub used_colour: Rgb,
    pub generated_colour: Rgb,
}

impl Point {
    /// 24-hour `HH:MM` label for tables.
    pub fn label(&self) -> String {
        self.local.format("%H:%M").to_string()
    }

    /// 12-hour `hh:MM` label for the chart axis.
    pub fn chart_label(&self) -> String {
        self.local.format("%I:%M").to_string()
    }
}

/// One report period, oldest point first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub totals: Totals,
    pub points: Vec<Point>,
}

pub fn normalize(feed: ParsedFeed, zone: &ReportZone, scale: &ColourScale) -> Series {
    let ParsedFeed {
        totals,
        mut samples,
    } = feed;

    // sort_by_key is stable, so equal timestamps keep arrival order
    samples.sort_by_key(|s| s.timestamp);

    let points = samples
        .into_iter()
        .map(|sample| {
            let local = zone.localize(sample.timestamp);
            Point {
                hour: local.hour(),
                used_colour: scale.used_colour(sample.used),
                generated_colour: scale.generated_colour(sample.generated),
                local,
                sample,
            }
        })
        .collect();

    Series { totals, points }
}
