//! Loading the raw meter feed.
//!
//! The feed is the eGauge `egauge-show` CSV export. It can come over HTTP
//! from the meter or from a file saved earlier.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::Url;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::window::ReportWindow;

/// Where the feed bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Base `egauge-show` URL; the query is added per request.
    Http(String),
    File(String),
}

impl FeedSource {
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            FeedSource::Http(source.to_string())
        } else {
            FeedSource::File(source.to_string())
        }
    }

    /// Reads the whole feed for `window`. One attempt, no retry.
    #[tracing::instrument(skip(self, client, window), fields(source = ?self))]
    pub async fn load<C: HttpClient>(
        &self,
        client: &C,
        window: &ReportWindow,
        hours: u32,
    ) -> Result<Vec<u8>, FetchError> {
        let bytes = match self {
            FeedSource::Http(base) => {
                let url = feed_url(base, window.first_row(), hours)?;
                fetch_bytes(client, url).await?
            }
            FeedSource::File(path) => tokio::fs::read(path).await?,
        };
        info!(bytes = bytes.len(), "Feed loaded");
        Ok(bytes)
    }
}

/// Builds the export URL for `hours` hourly rows ending at `first_row`.
///
/// `h` selects hourly rows, `a` totals, `C` delta values and `c` CSV output.
pub fn feed_url(base: &str, first_row: i64, hours: u32) -> Result<Url, FetchError> {
    let sep = if base.contains('?') { '&' } else { '?' };
    let raw = format!("{base}{sep}h&n={hours}&a&C&c&f={first_row}");
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
        url: raw,
        reason: e.to_string(),
    })
}

pub async fn fetch_bytes<C: HttpClient>(client: &C, url: Url) -> Result<Vec<u8>, FetchError> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.clone());

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(%status, "Feed response");
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }

    Ok(resp.bytes().await?.to_vec())
}
