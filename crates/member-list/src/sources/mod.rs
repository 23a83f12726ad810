//! External data sources for address resolution.
//!
//! - [`Geocoder`]: provider interface returning ranked features
//! - [`MapboxGeocoder`]: Mapbox Geocoding API client
//! - [`RateLimiter`]: sliding-window limiter shared by provider clients

mod geocoder;
mod mapbox;
mod rate_limit;

pub use geocoder::{ContextEntry, Feature, FeatureCollection, FeatureProperties, Geocoder};
pub use mapbox::{GeocodeError, MAPBOX_ENDPOINT, MAPBOX_REQUEST_TIMEOUT, MapboxGeocoder};
pub use rate_limit::{MAPBOX_GEOCODING_CALLS, MAPBOX_GEOCODING_PERIOD, RateLimiter};
