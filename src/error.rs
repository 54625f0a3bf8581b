//! Error types for report generation and delivery.
//!
//! Generation failures ([`ReportError`]) and delivery failures
//! ([`DeliveryError`]) are kept apart so a caller can tell "could not build
//! the report" from "built it but could not send it".

use thiserror::Error;

/// The feed source could not be read.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid feed url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed returned HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("feed stream failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A data row could not be parsed. `row` is the zero-based record index,
/// counting the header as row 0.
#[derive(Debug, Error, PartialEq)]
#[error("malformed feed row {row}: {reason}")]
pub struct MalformedFeedError {
    pub row: usize,
    pub reason: String,
}

/// A named zone is not known to the zone database.
#[derive(Debug, Error, PartialEq)]
#[error("unknown time zone '{0}'")]
pub struct ZoneResolutionError(pub String);

/// Terminal failure while generating a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    MalformedFeed(#[from] MalformedFeedError),

    #[error("failed to render report: {0}")]
    Render(String),
}

/// Delivery settings that cannot produce a sink. Checked before the feed is
/// fetched.
#[derive(Debug, Error, PartialEq)]
pub enum SinkConfigError {
    #[error("email delivery needs SMTP_HOST, SMTP_USER, SMTP_PASSWORD, MAIL_FROM and MAIL_TO")]
    MissingMail,

    #[error("invalid {what}: {reason}")]
    Invalid { what: String, reason: String },
}

/// The report sink rejected the report.
///
/// The rendered document travels with the error so it can still be saved or
/// inspected after a failed send. `saved_to` is set once a copy is on disk.
#[derive(Debug, Error)]
#[error("delivery to {destination} failed: {reason}")]
pub struct DeliveryError {
    pub destination: String,
    pub reason: String,
    pub document: String,
    pub saved_to: Option<String>,
}

impl DeliveryError {
    pub fn new(destination: impl Into<String>, reason: impl ToString, document: &str) -> Self {
        Self {
            destination: destination.into(),
            reason: reason.to_string(),
            document: document.to_string(),
            saved_to: None,
        }
    }
}
