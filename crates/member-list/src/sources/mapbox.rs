//! Mapbox Geocoding API client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use thiserror::Error;
use tracing::{debug, warn};

use super::geocoder::{FeatureCollection, Geocoder};
use super::rate_limit::RateLimiter;

pub const MAPBOX_ENDPOINT: &str = "https://api.mapbox.com";

/// Upper bound on a single lookup, including the response body.
pub const MAPBOX_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unexpected status {0}")]
    Status(StatusCode),
    #[error("Rate limited by provider")]
    RateLimited,
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Client for the Mapbox `mapbox.places` geocoding endpoint.
///
/// Every request first takes a slot from the shared [`RateLimiter`].
pub struct MapboxGeocoder {
    client: reqwest::Client,
    access_token: String,
    endpoint: String,
    timeout: Duration,
    limiter: Arc<RateLimiter>,
}

impl MapboxGeocoder {
    /// Creates a client with the default endpoint and its own limiter.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.into(),
            endpoint: MAPBOX_ENDPOINT.to_string(),
            timeout: MAPBOX_REQUEST_TIMEOUT,
            limiter: Arc::new(RateLimiter::mapbox_geocoding()),
        }
    }

    /// Sets a custom API endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the per-request timeout. A lookup that runs past it has no result.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shares a run-wide limiter with other clients.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Forward geocoding restricted to the US.
    pub async fn forward_geocode(
        &self,
        query: &str,
        types: &[&str],
    ) -> Result<FeatureCollection, GeocodeError> {
        let mut params = vec![("country", "us".to_string())];
        if !types.is_empty() {
            params.push(("types", types.join(",")));
        }
        self.execute(query.trim(), params).await
    }

    pub async fn reverse_geocode(
        &self,
        lon: f64,
        lat: f64,
    ) -> Result<FeatureCollection, GeocodeError> {
        self.execute(&format!("{lon},{lat}"), Vec::new()).await
    }

    async fn execute(
        &self,
        search: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<FeatureCollection, GeocodeError> {
        let url = self.request_url(search)?;
        self.limiter.acquire().await;

        params.push(("access_token", self.access_token.clone()));

        let response = self
            .client
            .get(url)
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::TOO_MANY_REQUESTS => return Err(GeocodeError::RateLimited),
            status => return Err(GeocodeError::Status(status)),
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// `{endpoint}/geocoding/v5/mapbox.places/{search}.json`, with `search`
    /// encoded as a single path segment.
    fn request_url(&self, search: &str) -> Result<Url, GeocodeError> {
        let invalid = || GeocodeError::InvalidEndpoint(self.endpoint.clone());
        let mut url = Url::parse(&self.endpoint).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places"])
            .push(&format!("{search}.json"));
        Ok(url)
    }
}

/// Logs a failed lookup and turns it into "no result".
fn no_result(search: &str, err: GeocodeError) -> Option<FeatureCollection> {
    match err {
        GeocodeError::RateLimited => warn!("Mapbox rate limited lookup for {search}"),
        err => debug!("Mapbox lookup for {search} failed: {err}"),
    }
    None
}

#[async_trait]
impl Geocoder for MapboxGeocoder {
    async fn forward(&self, query: &str, types: &[&str]) -> Option<FeatureCollection> {
        match self.forward_geocode(query, types).await {
            Ok(collection) => Some(collection),
            Err(err) => no_result(query, err),
        }
    }

    async fn reverse(&self, lon: f64, lat: f64) -> Option<FeatureCollection> {
        match self.reverse_geocode(lon, lat).await {
            Ok(collection) => Some(collection),
            Err(err) => no_result(&format!("{lon},{lat}"), err),
        }
    }
}
