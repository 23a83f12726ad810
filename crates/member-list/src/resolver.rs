//! Address resolution with tiered fallback.
//!
//! With a geocoder and a zip pool, each lookup tries in order:
//! 1. a real street address near the zip (forward then reverse geocoding)
//! 2. the address of a business in the zip
//! 3. a fabricated address pinned to the zip
//!
//! Provider failures only ever move resolution to the next tier.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::generators::fabricate_address;
use crate::models::Address;
use crate::sources::{Feature, Geocoder};

const ADDRESS_PLACE_TYPE: &str = "address";
const BUSINESS_PLACE_TYPE: &str = "poi";

/// Which strategy produced an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressTier {
    Realistic,
    Business,
    Fabricated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAddress {
    pub address: Address,
    pub tier: AddressTier,
}

/// Per-tier counts over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionSummary {
    pub realistic: usize,
    pub business: usize,
    pub fabricated: usize,
}

impl ResolutionSummary {
    fn record(&mut self, tier: AddressTier) {
        match tier {
            AddressTier::Realistic => self.realistic += 1,
            AddressTier::Business => self.business += 1,
            AddressTier::Fabricated => self.fabricated += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.realistic + self.business + self.fabricated
    }
}

/// Resolves one address per member.
pub struct AddressResolver {
    geocoder: Option<Box<dyn Geocoder>>,
    summary: ResolutionSummary,
}

impl AddressResolver {
    pub fn new(geocoder: Option<Box<dyn Geocoder>>) -> Self {
        Self {
            geocoder,
            summary: ResolutionSummary::default(),
        }
    }

    /// Resolver used when no provider credential is configured.
    pub fn fabricated_only() -> Self {
        Self::new(None)
    }

    pub fn with_geocoder(geocoder: impl Geocoder + 'static) -> Self {
        Self::new(Some(Box::new(geocoder)))
    }

    pub fn has_geocoder(&self) -> bool {
        self.geocoder.is_some()
    }

    /// Resolves an address for a zip drawn uniformly from `zip_pool`.
    ///
    /// Never fails: without a geocoder or a zip pool the address is fabricated.
    pub async fn resolve(
        &mut self,
        zip_pool: Option<&[String]>,
        rng: &mut impl Rng,
    ) -> ResolvedAddress {
        let resolved = resolve_with(self.geocoder.as_deref(), zip_pool, rng).await;
        self.summary.record(resolved.tier);
        resolved
    }

    pub fn summary(&self) -> ResolutionSummary {
        self.summary
    }
}

async fn resolve_with(
    geocoder: Option<&dyn Geocoder>,
    zip_pool: Option<&[String]>,
    rng: &mut impl Rng,
) -> ResolvedAddress {
    let zip = zip_pool.and_then(|pool| pool.choose(rng)).map(String::as_str);

    let (Some(geocoder), Some(zip)) = (geocoder, zip) else {
        return ResolvedAddress {
            address: fabricate_address(zip, rng),
            tier: AddressTier::Fabricated,
        };
    };

    if let Some(address) = realistic_address(geocoder, zip, rng).await {
        return ResolvedAddress {
            address,
            tier: AddressTier::Realistic,
        };
    }
    debug!("No street address found for zip {zip}, trying businesses");

    if let Some(address) = business_address(geocoder, zip).await {
        return ResolvedAddress {
            address,
            tier: AddressTier::Business,
        };
    }
    debug!("No business address found for zip {zip}, fabricating");

    ResolvedAddress {
        address: fabricate_address(Some(zip), rng),
        tier: AddressTier::Fabricated,
    }
}

/// Picks a random location in the zip, then a random street address at it.
async fn realistic_address(
    geocoder: &dyn Geocoder,
    zip: &str,
    rng: &mut impl Rng,
) -> Option<Address> {
    let places = geocoder.forward(zip, &[]).await?;
    let centers: Vec<(f64, f64)> = places
        .features
        .iter()
        .filter_map(Feature::coordinates)
        .collect();
    let &(lon, lat) = centers.choose(rng)?;

    let nearby = geocoder.reverse(lon, lat).await?;
    let addresses: Vec<&Feature> = nearby
        .features
        .iter()
        .filter(|feature| feature.has_place_type(ADDRESS_PLACE_TYPE))
        .collect();
    let feature = addresses.choose(rng)?;

    address_from_street_feature(feature, lon, lat)
}

/// Takes the first point of interest the provider returns for the zip.
async fn business_address(geocoder: &dyn Geocoder, zip: &str) -> Option<Address> {
    let businesses = geocoder.forward(zip, &[BUSINESS_PLACE_TYPE]).await?;
    let feature = businesses.features.first()?;

    address_from_business_feature(feature)
}

/// Street address from a reverse-geocoded `address` feature.
pub fn address_from_street_feature(feature: &Feature, lon: f64, lat: f64) -> Option<Address> {
    let number = non_empty(feature.address.as_deref())?;
    let street = non_empty(Some(feature.text.as_str()))?;
    let (city, state, zip) = locality(feature)?;

    Some(Address {
        address1: format!("{number} {street}"),
        address2: String::new(),
        city,
        state,
        zip,
        country: "US".to_string(),
        lat: Some(lat),
        lon: Some(lon),
    })
}

/// Business address from a point-of-interest feature.
pub fn address_from_business_feature(feature: &Feature) -> Option<Address> {
    let street = non_empty(feature.properties.address.as_deref())?;
    let (city, state, zip) = locality(feature)?;

    Some(Address {
        address1: street.to_string(),
        address2: String::new(),
        city,
        state,
        zip,
        country: "US".to_string(),
        lat: None,
        lon: None,
    })
}

/// City, state, and zip from context entries, matched by id prefix.
fn locality(feature: &Feature) -> Option<(String, String, String)> {
    let city = feature.context_text("place.")?;
    let state = feature.state()?;
    let zip = feature.context_text("postcode.")?;
    Some((city.to_string(), state, zip.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
