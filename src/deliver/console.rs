use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::{Delivered, ReportSink};
use crate::error::DeliveryError;
use crate::report::Report;

/// Writes the document to standard output.
pub struct ConsoleSink;

#[async_trait]
impl ReportSink for ConsoleSink {
    async fn deliver(&self, report: &Report) -> Result<Delivered, DeliveryError> {
        let mut stdout = tokio::io::stdout();
        let write = async {
            stdout.write_all(report.document.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await
        };
        write
            .await
            .map_err(|e| DeliveryError::new("stdout", e, &report.document))?;

        Ok(Delivered {
            destination: "stdout".to_string(),
            bytes: report.document.len(),
        })
    }
}
