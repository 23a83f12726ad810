//! Membership list generator - writes a fake member list as CSV (and ZIP).
//!
//! Run with:
//! ```
//! cargo run -p member-list --bin generate -- -n 100 --chapter-name Maine \
//!     --real-address-zips 04101,04102
//! ```
//!
//! Real addresses need a Mapbox token (`--mapbox-token`, `MAPBOX_TOKEN`, or a
//! `.mapbox_token` file); without one every address is fabricated.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use member_list::config::{GenerateConfig, MAPBOX_TOKEN_FILE, discover_mapbox_token, parse_zip_pool};
use member_list::output::write_roster;
use member_list::sources::{MAPBOX_ENDPOINT, RateLimiter};
use rand::SeedableRng;
use rand::rngs::StdRng;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// Member list generator
#[derive(Parser, Debug)]
#[command(name = "generate", version, about, long_about = None)]
struct Cli {
    /// Chapter name
    #[arg(long, default_value = "Heaven")]
    chapter_name: String,

    /// Young chapter name
    #[arg(long, default_value = "")]
    y_chapter_name: String,

    /// Number of members to generate
    #[arg(short = 'n', default_value_t = 10)]
    count: usize,

    /// Output file prefix; the date and extension are appended
    #[arg(long, default_value = "fake-members")]
    output: PathBuf,

    /// Generate real addresses for these zip codes (comma-separated)
    #[arg(long)]
    real_address_zips: Option<String>,

    /// Mapbox API key (required for real addresses)
    #[arg(long, env = "MAPBOX_TOKEN", hide_env_values = true)]
    mapbox_token: Option<String>,

    /// Mapbox API endpoint
    #[arg(long, default_value = MAPBOX_ENDPOINT)]
    mapbox_endpoint: String,

    /// Seconds to wait for one Mapbox lookup before falling back
    #[arg(long, default_value_t = 10)]
    mapbox_timeout_secs: u64,

    /// Also write a ZIP archive containing the CSV
    #[arg(long)]
    zip: bool,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn into_config(self) -> GenerateConfig {
        GenerateConfig {
            record_count: self.count,
            dsa_chapter: self.chapter_name,
            ydsa_chapter: self.y_chapter_name,
            zip_pool: self
                .real_address_zips
                .as_deref()
                .map(parse_zip_pool)
                .unwrap_or_default(),
            mapbox_token: discover_mapbox_token(
                self.mapbox_token.as_deref(),
                Path::new(MAPBOX_TOKEN_FILE),
            ),
            mapbox_endpoint: self.mapbox_endpoint,
            mapbox_timeout: Duration::from_secs(self.mapbox_timeout_secs),
            output: self.output,
            write_zip: self.zip,
            seed: self.seed,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();
    if config.mapbox_token.is_none() && !config.zip_pool.is_empty() {
        tracing::info!("No Mapbox token configured; addresses will be fabricated");
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let limiter = Arc::new(RateLimiter::mapbox_geocoding());
    let result = config.roster_builder(limiter).build(&mut rng).await?;

    let today = OffsetDateTime::now_utc().date();
    let files = write_roster(&result.rows, &config.output, today, config.write_zip)?;

    // Summary output
    tracing::info!("Generation completed in {}ms", result.metrics.generation_time_ms);
    tracing::info!("  Members: {}", result.rows.len());
    tracing::info!("  Realistic addresses: {}", result.summary.realistic);
    tracing::info!("  Business addresses: {}", result.summary.business);
    tracing::info!("  Fabricated addresses: {}", result.summary.fabricated);
    tracing::info!("  CSV: {}", files.csv.display());
    if let Some(zip) = files.zip {
        tracing::info!("  ZIP: {}", zip.display());
    }

    Ok(())
}
