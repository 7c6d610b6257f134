//! HTTP record client
//!
//! Retrieves the complete record set of one data-source by walking the remote
//! store's offset pagination. The pagination loop itself is a free function
//! over an injectable page-fetch so it can be exercised against a scripted
//! sequence of batches without a network.

use crate::config::SourceConfig;
use crate::error::{EngineError, Result};
use crate::record::RawRecord;
use reqwest::Client;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

// ============================================================================
// Remote API Constants
// ============================================================================

/// Header carrying the per-source access token.
pub const API_TOKEN_HEADER: &str = "X-Cybozu-API-Token";

/// The remote store's per-request record cap.
pub const REMOTE_PAGE_SIZE_CAP: u32 = 500;

/// The remote store's cumulative offset cap. Not enforced here; a request
/// past it surfaces the remote error verbatim.
pub const REMOTE_OFFSET_CAP: u64 = 10_000;

/// The remote store's total result cap. Not enforced here either.
pub const REMOTE_RESULT_CAP: u64 = 100_000;

#[derive(Debug, Deserialize)]
struct RecordsPage {
    #[serde(default)]
    records: Vec<RawRecord>,
}

/// HTTP client for one record-store endpoint
pub struct RecordClient {
    client: Client,
    base_url: String,
}

impl RecordClient {
    /// Create a client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every record of one data-source.
    ///
    /// Fails on the first non-success response; nothing fetched so far is
    /// returned in that case, and nothing is retried.
    pub async fn fetch_records(&self, source: &SourceConfig) -> Result<Vec<RawRecord>> {
        debug!(
            app = %source.app_no,
            page_size = source.page_size,
            page_cap = REMOTE_PAGE_SIZE_CAP,
            offset_cap = REMOTE_OFFSET_CAP,
            result_cap = REMOTE_RESULT_CAP,
            "Fetching records"
        );

        fetch_all_pages(source.page_size, |offset| self.fetch_page(source, offset)).await
    }

    async fn fetch_page(&self, source: &SourceConfig, offset: u64) -> Result<Vec<RawRecord>> {
        let query = format!("{} limit {} offset {}", source.query, source.page_size, offset);

        let response = self
            .client
            .get(&self.base_url)
            .header(API_TOKEN_HEADER, &source.apitoken)
            .query(&[("app", source.app_no.as_str()), ("query", query.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::api(status.as_u16(), body));
        }

        let page: RecordsPage = response.json().await?;
        Ok(page.records)
    }
}

/// Walk offset pagination until the remote returns an empty batch.
///
/// The empty batch is the sole termination condition: a batch shorter than
/// `page_size` but non-empty keeps the loop going. The offset advances by
/// `page_size` per request regardless of how many records came back.
pub async fn fetch_all_pages<F, Fut>(page_size: u32, mut fetch_page: F) -> Result<Vec<RawRecord>>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Vec<RawRecord>>>,
{
    let mut records = Vec::new();
    let mut offset = 0u64;

    loop {
        let batch = fetch_page(offset).await?;
        if batch.is_empty() {
            break;
        }

        debug!(
            offset,
            batch = batch.len(),
            total = records.len() + batch.len(),
            "Fetched batch"
        );

        records.extend(batch);
        offset += u64::from(page_size);
    }

    debug!(total = records.len(), "Fetch complete");
    Ok(records)
}
