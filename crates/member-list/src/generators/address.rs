//! Fully fabricated postal addresses.

use fake::Fake;
use fake::faker::address::en::{
    BuildingNumber, CityName, SecondaryAddress, StateAbbr, StreetName, ZipCode,
};
use rand::Rng;

use crate::models::Address;

/// Builds a made-up US address, pinned to `zip` when one is given.
pub fn fabricate_address(zip: Option<&str>, rng: &mut impl Rng) -> Address {
    let building: String = BuildingNumber().fake_with_rng(rng);
    let street: String = StreetName().fake_with_rng(rng);
    let zip = match zip {
        Some(zip) if !zip.trim().is_empty() => zip.trim().to_string(),
        _ => ZipCode().fake_with_rng(rng),
    };

    Address {
        address1: format!("{building} {street}"),
        address2: SecondaryAddress().fake_with_rng(rng),
        city: CityName().fake_with_rng(rng),
        state: StateAbbr().fake_with_rng(rng),
        zip,
        country: "US".to_string(),
        lat: None,
        lon: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_pinned_zip() {
        let mut rng = StdRng::seed_from_u64(1);
        let address = fabricate_address(Some("04101"), &mut rng);

        assert_eq!(address.zip, "04101");
        assert_eq!(address.country, "US");
        assert!(address.lat.is_none() && address.lon.is_none());
        assert!(!address.address1.is_empty());
        assert!(!address.city.is_empty());
        assert_eq!(address.state.len(), 2);
    }

    #[test]
    fn test_random_zip_when_unpinned() {
        let mut rng = StdRng::seed_from_u64(2);

        for zip in [None, Some(""), Some("  ")] {
            let address = fabricate_address(zip, &mut rng);
            assert!(!address.zip.trim().is_empty());
        }
    }
}
