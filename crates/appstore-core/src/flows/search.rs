//! Catalog search over the public JSON search endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::client::StoreClient;
use crate::error::StoreError;
use crate::events::StoreObserver;
use crate::protocol::constants::*;
use crate::transport::{HttpRequest, HttpTransport};

/// An app in the public catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppItem {
    pub track_id: u64,
    pub track_name: String,
    pub bundle_id: String,
    pub minimum_os_version: String,
    pub artist_id: u64,
    pub artist_name: String,
    pub price: f64,
    pub genres: Vec<String>,
    pub primary_genre_id: u64,
    pub primary_genre_name: String,
    pub seller_name: String,
    pub version: String,
    pub release_notes: String,
    pub file_size_bytes: String,
    pub release_date: Option<DateTime<Utc>>,
    pub current_version_release_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub query: String,
    /// Catalog region. Falls back to the credential's region, then "US".
    pub region: Option<String>,
    pub limit: u32,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            region: None,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<AppItem>,
}

impl<T: HttpTransport, O: StoreObserver> StoreClient<T, O> {
    /// Region a search should use: the caller's, unless empty.
    pub fn search_region(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .or_else(|| self.credential().map(|c| c.region()))
            .unwrap_or(DEFAULT_REGION)
            .to_string()
    }

    /// Search the catalog. Does not need a credential.
    #[instrument(skip(self, options), fields(query = %options.query))]
    pub fn search(&self, options: &SearchOptions) -> Result<Vec<AppItem>, StoreError> {
        let region = self.search_region(options.region.as_deref());
        let request = HttpRequest::get(self.config().endpoints.search.as_str())
            .query(SEARCH_TERM, options.query.as_str())
            .query(SEARCH_COUNTRY, region)
            .query(SEARCH_ENTITY, SEARCH_SOFTWARE)
            .query(SEARCH_MEDIA, SEARCH_SOFTWARE)
            .query(SEARCH_LIMIT, options.limit.to_string());

        let response = self.send(request).map_err(|e| self.fail(e))?;
        let parsed: SearchResponse = serde_json::from_slice(&response.body).map_err(|e| {
            self.fail(StoreError::malformed(
                format!("invalid search response: {}", e),
                response.body.len(),
            ))
        })?;

        debug!(results = parsed.results.len(), "Search complete");
        Ok(parsed.results)
    }
}
