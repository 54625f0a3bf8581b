use async_trait::async_trait;
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

use super::{Delivered, ReportSink};
use crate::config::MailConfig;
use crate::error::{DeliveryError, SinkConfigError};
use crate::output::{OutputFormat, summary};
use crate::report::Report;

pub const SUBJECT: &str = "eGauge daily summary";

/// Sends the report as an email through an SMTP relay.
///
/// The body is multipart: a one-line plain-text summary plus the HTML page.
/// JSON reports are sent as the plain-text part only.
pub struct EmailSink {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailSink {
    pub fn new(config: &MailConfig) -> Result<Self, SinkConfigError> {
        let invalid = |what: &str, e: &dyn std::fmt::Display| SinkConfigError::Invalid {
            what: what.to_string(),
            reason: e.to_string(),
        };

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| invalid("sender address", &e))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| invalid("recipient address", &e))?;

        let creds = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());
        // Submission port 587 with STARTTLS
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| invalid("SMTP host", &e))?
            .credentials(creds)
            .build();

        Ok(Self { mailer, from, to })
    }

    fn message(&self, report: &Report) -> Result<Message, lettre::error::Error> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(SUBJECT);
        let plain = summary(report.day, &report.series);

        match report.format {
            OutputFormat::Html => builder.multipart(MultiPart::alternative_plain_html(
                plain,
                report.document.clone(),
            )),
            OutputFormat::Json => builder.body(format!("{plain}\n\n{}", report.document)),
        }
    }
}

#[async_trait]
impl ReportSink for EmailSink {
    async fn deliver(&self, report: &Report) -> Result<Delivered, DeliveryError> {
        let destination = format!("mailto:{}", self.to.email);

        let message = self
            .message(report)
            .map_err(|e| DeliveryError::new(destination.as_str(), e, &report.document))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| DeliveryError::new(destination.as_str(), e, &report.document))?;
        debug!(%destination, "Report mailed");

        Ok(Delivered {
            destination,
            bytes: report.document.len(),
        })
    }
}
