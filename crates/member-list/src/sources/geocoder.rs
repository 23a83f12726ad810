//! Geocoding provider interface and the response model it returns.

use async_trait::async_trait;
use serde::Deserialize;

/// Forward and reverse geocoding.
///
/// Both operations report "no usable result" as `None`; providers swallow
/// and log their own transport or protocol failures.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Looks up `query` within the US, optionally restricted to place `types`.
    async fn forward(&self, query: &str, types: &[&str]) -> Option<FeatureCollection>;

    /// Looks up the features at a coordinate.
    async fn reverse(&self, lon: f64, lat: f64) -> Option<FeatureCollection>;
}

/// Ranked list of features returned by a geocoding request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: String,
    /// Place types such as `address`, `poi`, `postcode`.
    #[serde(default)]
    pub place_type: Vec<String>,
    /// Street name for address features, display name otherwise.
    #[serde(default)]
    pub text: String,
    /// House number, present on address features.
    #[serde(default)]
    pub address: Option<String>,
    /// `[longitude, latitude]`.
    #[serde(default)]
    pub center: Option<[f64; 2]>,
    #[serde(default)]
    pub properties: FeatureProperties,
    /// Enclosing places; unordered and heterogeneous.
    #[serde(default)]
    pub context: Vec<ContextEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureProperties {
    /// Street line for points of interest.
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContextEntry {
    /// Prefixed by the place type, e.g. `place.9962989` or `region.9937`.
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub short_code: Option<String>,
}

impl Feature {
    pub fn has_place_type(&self, place_type: &str) -> bool {
        self.place_type.iter().any(|t| t == place_type)
    }

    /// `(longitude, latitude)` of the feature center.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.center.map(|[lon, lat]| (lon, lat))
    }

    /// First context entry whose id starts with `prefix`.
    pub fn context_entry(&self, prefix: &str) -> Option<&ContextEntry> {
        self.context
            .iter()
            .find(|entry| entry.id.starts_with(prefix) && !entry.text.trim().is_empty())
    }

    pub fn context_text(&self, prefix: &str) -> Option<&str> {
        self.context_entry(prefix).map(|entry| entry.text.trim())
    }

    /// Two-letter state code when the region carries one, else the region name.
    pub fn state(&self) -> Option<String> {
        let region = self.context_entry("region.")?;
        let code = region
            .short_code
            .as_deref()
            .and_then(|code| code.strip_prefix("US-"))
            .filter(|code| !code.is_empty());

        Some(code.unwrap_or(region.text.trim()).to_string())
    }
}
