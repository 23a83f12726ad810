//! Configuration for generation runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::builders::RosterBuilder;
use crate::generators::MemberGenConfig;
use crate::sources::{
    Geocoder, MAPBOX_ENDPOINT, MAPBOX_REQUEST_TIMEOUT, MapboxGeocoder, RateLimiter,
};

/// File checked for a Mapbox token when none is given explicitly.
pub const MAPBOX_TOKEN_FILE: &str = ".mapbox_token";

/// Settings for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    /// Number of members to generate.
    pub record_count: usize,
    pub dsa_chapter: String,
    pub ydsa_chapter: String,
    /// Zip codes real addresses are looked up in.
    pub zip_pool: Vec<String>,
    /// Geocoding credential; without it every address is fabricated.
    pub mapbox_token: Option<String>,
    pub mapbox_endpoint: String,
    /// Per-lookup timeout; a stalled lookup falls through to the next tier.
    pub mapbox_timeout: Duration,
    /// Output path prefix; the run date and extension are appended.
    pub output: PathBuf,
    /// Also write a ZIP archive containing the CSV.
    pub write_zip: bool,
    /// Seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            record_count: 10,
            dsa_chapter: "Heaven".to_string(),
            ydsa_chapter: String::new(),
            zip_pool: Vec::new(),
            mapbox_token: None,
            mapbox_endpoint: MAPBOX_ENDPOINT.to_string(),
            mapbox_timeout: MAPBOX_REQUEST_TIMEOUT,
            output: PathBuf::from("fake-members"),
            write_zip: false,
            seed: None,
        }
    }
}

impl GenerateConfig {
    /// Geocoder for this run, sharing `limiter`; `None` without a token.
    pub fn geocoder(&self, limiter: Arc<RateLimiter>) -> Option<Box<dyn Geocoder>> {
        let token = self.mapbox_token.as_deref()?;
        let client = MapboxGeocoder::new(token)
            .with_endpoint(&self.mapbox_endpoint)
            .with_timeout(self.mapbox_timeout)
            .with_rate_limiter(limiter);
        Some(Box::new(client))
    }

    /// Builder configured for this run.
    pub fn roster_builder(&self, limiter: Arc<RateLimiter>) -> RosterBuilder {
        let member_config = MemberGenConfig {
            dsa_chapter: self.dsa_chapter.clone(),
            ydsa_chapter: self.ydsa_chapter.clone(),
            ..Default::default()
        };

        RosterBuilder::new()
            .with_records(self.record_count)
            .with_member_config(member_config)
            .with_zip_pool(self.zip_pool.clone())
            .with_optional_geocoder(self.geocoder(limiter))
    }
}

/// Splits a comma-separated zip list, dropping blanks.
pub fn parse_zip_pool(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|zip| !zip.is_empty())
        .map(str::to_string)
        .collect()
}

/// Explicit token first, then the token file; blank tokens count as absent.
pub fn discover_mapbox_token(explicit: Option<&str>, token_file: &Path) -> Option<String> {
    let from_file = || {
        std::fs::read_to_string(token_file)
            .inspect_err(|e| tracing::debug!("No Mapbox token at {}: {e}", token_file.display()))
            .ok()
    };

    explicit
        .map(str::to_string)
        .filter(|token| !token.trim().is_empty())
        .or_else(from_file)
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
