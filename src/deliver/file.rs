use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{Delivered, ReportSink};
use crate::error::DeliveryError;
use crate::report::Report;

/// Writes the document to a file, replacing any previous content.
pub struct FileSink {
    pub path: String,
}

impl FileSink {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReportSink for FileSink {
    async fn deliver(&self, report: &Report) -> Result<Delivered, DeliveryError> {
        let fail = |e: std::io::Error| DeliveryError::new(self.path.as_str(), e, &report.document);

        if let Some(dir) = Path::new(&self.path).parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(fail)?;
        }
        tokio::fs::write(&self.path, &report.document)
            .await
            .map_err(fail)?;
        debug!(path = %self.path, "Report written");

        Ok(Delivered {
            destination: self.path.clone(),
            bytes: report.document.len(),
        })
    }
}
