use chrono::{DateTime, Utc};
use serde::Serialize;

/// One meter reading for a single interval.
///
/// Readings are floored at zero on construction; small negative values in the
/// feed are sensor noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub used: f64,
    pub generated: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, used: f64, generated: f64) -> Self {
        Sample {
            timestamp,
            used: used.max(0.0),
            generated: generated.max(0.0),
        }
    }
}

/// Running sum of every sample seen in a feed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub used: f64,
    pub generated: f64,
}

impl Totals {
    pub fn add(&mut self, sample: &Sample) {
        self.used += sample.used;
        self.generated += sample.generated;
    }
}
