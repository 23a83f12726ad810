//! Synthetic membership list generation.
//!
//! This crate produces fake membership lists for exercising membership
//! pipelines: member records with internally consistent dates, dues, and
//! affiliations, each paired with a geocoded or fabricated postal address.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use member_list::prelude::*;
//!
//! let limiter = Arc::new(RateLimiter::mapbox_geocoding());
//! let result = RosterBuilder::new()
//!     .with_records(100)
//!     .with_chapter("Maine")
//!     .with_zip_pool(parse_zip_pool("04101,04102"))
//!     .with_geocoder(MapboxGeocoder::new(token).with_rate_limiter(limiter))
//!     .build(&mut rng)
//!     .await?;
//!
//! write_roster(&result.rows, Path::new("fake-members"), today, true)?;
//! ```

pub mod builders;
pub mod config;
pub mod generators;
pub mod models;
pub mod output;
pub mod resolver;
pub mod sources;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::builders::{GenerateError, RosterBuilder, RosterMetrics, RosterResult};
    pub use crate::config::{GenerateConfig, discover_mapbox_token, parse_zip_pool};
    pub use crate::generators::{MemberGenConfig, MemberGenerator, fabricate_address};
    pub use crate::models::{Address, MemberRecord, MembershipStatus, RosterRow};
    pub use crate::output::{OutputFiles, write_csv, write_roster};
    pub use crate::resolver::{AddressResolver, AddressTier, ResolutionSummary, ResolvedAddress};
    pub use crate::sources::{Geocoder, MapboxGeocoder, RateLimiter};
}
