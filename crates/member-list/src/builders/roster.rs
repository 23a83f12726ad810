//! Fluent builder for generating a complete membership roster.

use std::time::Instant;

use rand::Rng;
use thiserror::Error;
use time::Date;

use crate::generators::member::ACTIONKIT_ID_CAPACITY;
use crate::generators::{MemberGenConfig, MemberGenerator, TableError};
use crate::models::RosterRow;
use crate::resolver::{AddressResolver, ResolutionSummary};
use crate::sources::Geocoder;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Cannot generate {requested} members with unique ActionKit ids (at most {capacity})")]
    TooManyRecords { requested: usize, capacity: usize },
    #[error("Invalid member tables: {0}")]
    Tables(#[from] TableError),
}

/// Result of building a roster.
#[derive(Debug)]
pub struct RosterResult {
    pub rows: Vec<RosterRow>,
    /// How each address was obtained.
    pub summary: ResolutionSummary,
    pub metrics: RosterMetrics,
}

/// Timing from roster generation.
#[derive(Debug, Clone)]
pub struct RosterMetrics {
    pub generation_time_ms: u64,
    pub record_count: usize,
}

/// Builder for a roster of synthetic members with addresses.
///
/// # Example
///
/// ```rust,ignore
/// let result = RosterBuilder::new()
///     .with_records(250)
///     .with_chapter("Maine")
///     .with_zip_pool(vec!["04101".into(), "04102".into()])
///     .with_geocoder(MapboxGeocoder::new(token))
///     .build(&mut rng)
///     .await?;
/// ```
pub struct RosterBuilder {
    record_count: usize,
    member_config: MemberGenConfig,
    zip_pool: Vec<String>,
    geocoder: Option<Box<dyn Geocoder>>,
    today: Option<Date>,
}

impl RosterBuilder {
    pub fn new() -> Self {
        Self {
            record_count: 10,
            member_config: MemberGenConfig::default(),
            zip_pool: Vec::new(),
            geocoder: None,
            today: None,
        }
    }

    /// Number of records to generate.
    pub fn with_records(mut self, count: usize) -> Self {
        self.record_count = count;
        self
    }

    pub fn with_chapter(mut self, name: impl Into<String>) -> Self {
        self.member_config.dsa_chapter = name.into();
        self
    }

    pub fn with_ydsa_chapter(mut self, name: impl Into<String>) -> Self {
        self.member_config.ydsa_chapter = name.into();
        self
    }

    pub fn with_districts(mut self, districts: Vec<String>) -> Self {
        self.member_config.congressional_districts = districts;
        self
    }

    pub fn with_member_config(mut self, config: MemberGenConfig) -> Self {
        self.member_config = config;
        self
    }

    /// Zip codes addresses are drawn from.
    pub fn with_zip_pool(mut self, zips: Vec<String>) -> Self {
        self.zip_pool = zips;
        self
    }

    /// Enables geocoded addresses.
    pub fn with_geocoder(mut self, geocoder: impl Geocoder + 'static) -> Self {
        self.geocoder = Some(Box::new(geocoder));
        self
    }

    pub fn with_optional_geocoder(mut self, geocoder: Option<Box<dyn Geocoder>>) -> Self {
        self.geocoder = geocoder;
        self
    }

    /// Pins the date every record is computed against.
    pub fn with_today(mut self, today: Date) -> Self {
        self.today = Some(today);
        self
    }

    /// Generates every record, resolving one address per member.
    pub async fn build(self, rng: &mut impl Rng) -> Result<RosterResult, GenerateError> {
        if self.record_count > ACTIONKIT_ID_CAPACITY {
            return Err(GenerateError::TooManyRecords {
                requested: self.record_count,
                capacity: ACTIONKIT_ID_CAPACITY,
            });
        }

        let start = Instant::now();
        let mut member_gen = MemberGenerator::with_config(self.member_config)?;
        let mut resolver = AddressResolver::new(self.geocoder);
        let zip_pool = (!self.zip_pool.is_empty()).then_some(self.zip_pool.as_slice());

        tracing::info!(
            "Generating {} members ({} addresses)",
            self.record_count,
            if resolver.has_geocoder() && zip_pool.is_some() {
                "geocoded"
            } else {
                "fabricated"
            }
        );

        let mut rows = Vec::with_capacity(self.record_count);
        for generated in 1..=self.record_count {
            let member = match self.today {
                Some(today) => member_gen.generate_on(today, rng),
                None => member_gen.generate(rng),
            };
            let resolved = resolver.resolve(zip_pool, rng).await;
            rows.push(RosterRow::new(member, resolved.address));

            if generated % 100 == 0 {
                tracing::debug!("Generated {generated}/{} members", self.record_count);
            }
        }

        let summary = resolver.summary();
        if summary.fabricated > 0 && resolver.has_geocoder() && zip_pool.is_some() {
            tracing::warn!(
                "{} of {} addresses fell back to fabricated",
                summary.fabricated,
                summary.total()
            );
        }

        Ok(RosterResult {
            metrics: RosterMetrics {
                generation_time_ms: start.elapsed().as_millis() as u64,
                record_count: rows.len(),
            },
            rows,
            summary,
        })
    }
}

impl Default for RosterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
