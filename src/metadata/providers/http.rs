//! HTTP metadata lookup.
//!
//! Two JSON endpoints, both taking `{"token", "name"}`:
//! - the name endpoint answers `{"predicted_name": "..."}`
//! - the ids endpoint answers `{"tmdb_id": 603, "omdb_id": "tt0133093"}`
//!
//! Requests share a token-bucket rate limiter and a per-request timeout.

use std::num::NonZeroU32;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use vlib_common::{Error, Result};

use crate::config::MetadataConfig;
use crate::metadata::provider::{ExternalIds, MetadataLookup};

#[derive(Debug, Serialize)]
struct LookupRequest<'a> {
    token: &'a str,
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictedNameResponse {
    predicted_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdsResponse {
    tmdb_id: Option<i64>,
    omdb_id: Option<String>,
}

/// [`MetadataLookup`] backed by the name/ids HTTP service.
pub struct HttpMetadataLookup {
    client: reqwest::Client,
    name_url: String,
    ids_url: String,
    token: String,
    rate_limiter: DefaultDirectRateLimiter,
}

impl HttpMetadataLookup {
    /// Build a lookup from the `[metadata]` config section.
    pub fn new(config: &MetadataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| Error::configuration(format!("failed to build HTTP client: {e}")))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            client,
            name_url: config.name_url.clone(),
            ids_url: config.ids_url.clone(),
            token: config.token.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    async fn post<T: DeserializeOwned>(&self, url: &str, name: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let resp = self
            .client
            .post(url)
            .json(&LookupRequest {
                token: &self.token,
                name,
            })
            .send()
            .await
            .map_err(|e| Error::metadata_lookup(format!("request to {url} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::metadata_lookup(format!(
                "{url} returned {status}: {body}"
            )));
        }

        resp.json::<T>()
            .await
            .map_err(|e| Error::metadata_lookup(format!("invalid response from {url}: {e}")))
    }
}

#[async_trait]
impl MetadataLookup for HttpMetadataLookup {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn predict_title(&self, candidate_name: &str) -> Result<String> {
        debug!(name = candidate_name, "Requesting predicted name");
        let resp: PredictedNameResponse = self.post(&self.name_url, candidate_name).await?;
        resp.predicted_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| Error::metadata_lookup("response has no predicted_name"))
    }

    async fn external_ids(&self, title: &str) -> Result<ExternalIds> {
        debug!(title, "Requesting external ids");
        let resp: IdsResponse = self.post(&self.ids_url, title).await?;
        Ok(ExternalIds {
            tmdb_id: resp.tmdb_id,
            omdb_id: resp.omdb_id.filter(|id| !id.is_empty()),
        })
    }
}
