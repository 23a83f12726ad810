//! Record generators.
//!
//! - [`MemberGenerator`]: member records with dues, union, and date fields
//! - [`fabricate_address`]: made-up postal addresses
//! - [`sampling`]: weighted categorical primitives shared by the generators

pub mod address;
pub mod member;
pub mod sampling;

pub use address::fabricate_address;
pub use member::{MemberGenConfig, MemberGenerator};
pub use sampling::{Categorical, TableError};
