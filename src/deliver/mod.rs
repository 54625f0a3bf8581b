//! Report sinks.
//!
//! [`ReportSink`] is the async trait a finished [`Report`] is handed to.
//! [`ConsoleSink`] and [`FileSink`] return the document to the caller,
//! [`EmailSink`] sends it as an HTML message over SMTP.

mod console;
mod email;
mod file;

pub use console::ConsoleSink;
pub use email::{EmailSink, SUBJECT};
pub use file::FileSink;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::config::MailConfig;
use crate::error::{DeliveryError, SinkConfigError};
use crate::report::Report;

/// What a sink did with a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivered {
    pub destination: String,
    pub bytes: usize,
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn deliver(&self, report: &Report) -> Result<Delivered, DeliveryError>;
}

/// Where the caller asked the report to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Console,
    File(String),
    Email,
}

/// Builds the sink for `target`.
///
/// Run this before generating the report so bad mail settings fail early
/// instead of after the feed has been fetched.
pub fn select_sink(
    target: Target,
    mail: Option<&MailConfig>,
) -> Result<Box<dyn ReportSink>, SinkConfigError> {
    Ok(match target {
        Target::Console => Box::new(ConsoleSink),
        Target::File(path) => Box::new(FileSink::new(path)),
        Target::Email => Box::new(EmailSink::new(mail.ok_or(SinkConfigError::MissingMail)?)?),
    })
}

/// Hands the report to `sink`.
///
/// If the sink fails, the document is written to
/// `<fallback_dir>/egauge-report-<day>.<ext>` and the returned error records
/// where it went.
#[tracing::instrument(skip(sink, report), fields(day = %report.day))]
pub async fn deliver_or_save(
    sink: &dyn ReportSink,
    report: &Report,
    fallback_dir: &str,
) -> Result<Delivered, DeliveryError> {
    let mut err = match sink.deliver(report).await {
        Ok(delivered) => {
            info!(
                destination = %delivered.destination,
                bytes = delivered.bytes,
                format = ?report.format,
                "Report delivered"
            );
            return Ok(delivered);
        }
        Err(e) => e,
    };
    error!(destination = %err.destination, reason = %err.reason, "Report delivery failed");

    let path = format!(
        "{fallback_dir}/egauge-report-{}.{}",
        report.day,
        report.format.extension()
    );
    match FileSink::new(path).deliver(report).await {
        Ok(saved) => {
            warn!(path = %saved.destination, "Undelivered report saved");
            err.saved_to = Some(saved.destination);
        }
        Err(save_err) => error!(error = %save_err, "Could not save undelivered report"),
    }

    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use crate::series::Series;
    use chrono::NaiveDate;
    use std::env;
    use std::fs;

    struct RejectingSink;

    #[async_trait]
    impl ReportSink for RejectingSink {
        async fn deliver(&self, report: &Report) -> Result<Delivered, DeliveryError> {
            Err(DeliveryError::new("mailto:owner@example.com", "relay refused", &report.document))
        }
    }

    fn report(format: OutputFormat, document: &str) -> Report {
        Report {
            day: NaiveDate::from_ymd_opt(2024, 3, 19).unwrap(),
            zone: "America/Chicago".to_string(),
            series: Series {
                totals: Default::default(),
                points: vec![],
            },
            format,
            document: document.to_string(),
        }
    }

    fn mail_config() -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_user: "meter".to_string(),
            smtp_password: "secret".to_string(),
            from: "meter@example.com".to_string(),
            to: "owner@example.com".to_string(),
        }
    }

    #[test]
    fn test_email_without_mail_settings_is_rejected() {
        assert_eq!(
            select_sink(Target::Email, None).err(),
            Some(SinkConfigError::MissingMail)
        );
    }

    #[test]
    fn test_email_with_bad_sender_is_rejected() {
        let mut mail = mail_config();
        mail.from = "bad addr".to_string();
        assert!(matches!(
            select_sink(Target::Email, Some(&mail)).err(),
            Some(SinkConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_valid_targets_build_sinks() {
        assert!(select_sink(Target::Console, None).is_ok());
        assert!(select_sink(Target::File("out.html".to_string()), None).is_ok());
        assert!(select_sink(Target::Email, Some(&mail_config())).is_ok());
    }

    #[tokio::test]
    async fn test_failed_delivery_saves_document() {
        let dir = format!("{}/egauge_report_undelivered", env::temp_dir().display());
        let expected = format!("{dir}/egauge-report-2024-03-19.json");
        let _ = fs::remove_file(&expected);

        let err = deliver_or_save(&RejectingSink, &report(OutputFormat::Json, "{\"kept\":true}"), &dir)
            .await
            .unwrap_err();

        assert_eq!(err.reason, "relay refused");
        assert_eq!(err.document, "{\"kept\":true}");
        assert_eq!(err.saved_to.as_deref(), Some(expected.as_str()));
        assert_eq!(fs::read_to_string(&expected).unwrap(), "{\"kept\":true}");

        fs::remove_file(&expected).unwrap();
    }

    #[tokio::test]
    async fn test_unsaveable_failure_still_carries_document() {
        let blocker = format!("{}/egauge_report_undelivered_blocker", env::temp_dir().display());
        fs::write(&blocker, "x").unwrap();

        let err = deliver_or_save(&RejectingSink, &report(OutputFormat::Html, "<p>kept</p>"), &blocker)
            .await
            .unwrap_err();

        assert_eq!(err.saved_to, None);
        assert_eq!(err.document, "<p>kept</p>");

        fs::remove_file(&blocker).unwrap();
    }

    #[tokio::test]
    async fn test_successful_delivery_writes_nothing_else() {
        let path = format!("{}/egauge_report_delivered.html", env::temp_dir().display());
        let sink = FileSink::new(path.clone());

        let delivered = deliver_or_save(&sink, &report(OutputFormat::Html, "<p>ok</p>"), "/nonexistent")
            .await
            .unwrap();

        assert_eq!(delivered.destination, path);
        fs::remove_file(&path).unwrap();
    }
}
