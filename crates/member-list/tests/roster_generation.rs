//! End-to-end tests for roster generation.
//!
//! These tests drive the full path: member sampling, address resolution
//! against a mock Mapbox server, and CSV output.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use member_list::config::GenerateConfig;
use member_list::models::{MembershipStatus, MonthlyDuesStatus, YearlyDuesStatus};
use member_list::output::write_csv;
use member_list::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forward_body() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {"id": "postcode.1", "place_type": ["postcode"], "text": "04101", "center": [-70.26, 43.66]},
            {"id": "place.2", "place_type": ["place"], "text": "Portland", "center": [-70.25, 43.65]}
        ]
    })
}

fn reverse_body() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "id": "address.9",
            "place_type": ["address"],
            "text": "Congress Street",
            "address": "561",
            "center": [-70.26, 43.66],
            "context": [
                {"id": "place.9962989", "text": "Portland"},
                {"id": "country.1", "short_code": "us", "text": "United States"},
                {"id": "region.9937", "short_code": "US-ME", "text": "Maine"},
                {"id": "postcode.1138", "text": "04101"}
            ]
        }]
    })
}

async fn mount_mapbox(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geocoding/v5/mapbox.places/04101.json"))
        .and(query_param("access_token", "pk.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forward_body()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/geocoding/v5/mapbox\.places/-70\.2[56],43\.6[56]\.json$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reverse_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fabricated_roster_without_credential() {
    let config = GenerateConfig::default();
    let mut rng = StdRng::seed_from_u64(10);

    let result = config
        .roster_builder(Arc::new(RateLimiter::default()))
        .build(&mut rng)
        .await
        .unwrap();

    assert_eq!(result.rows.len(), 10);
    assert_eq!(result.summary.fabricated, 10);
    for row in &result.rows {
        assert!(!row.address1.is_empty());
        assert!(!row.city.is_empty());
        assert!(!row.zip.is_empty());
        assert_eq!(row.country, "US");
        assert!(row.lat.is_none());
    }
}

#[tokio::test]
async fn test_geocoded_roster() {
    let server = MockServer::start().await;
    mount_mapbox(&server).await;

    let config = GenerateConfig {
        record_count: 8,
        zip_pool: vec!["04101".to_string()],
        mapbox_token: Some("pk.test".to_string()),
        mapbox_endpoint: server.uri(),
        ..Default::default()
    };
    let limiter = Arc::new(RateLimiter::mapbox_geocoding());
    let mut rng = StdRng::seed_from_u64(11);

    let result = config
        .roster_builder(Arc::clone(&limiter))
        .build(&mut rng)
        .await
        .unwrap();

    assert_eq!(result.summary.realistic, 8);
    for row in &result.rows {
        assert_eq!(row.address1, "561 Congress Street");
        assert_eq!(row.city, "Portland");
        assert_eq!(row.state, "ME");
        assert_eq!(row.zip, "04101");
        assert!(row.lat.is_some() && row.lon.is_some());
    }
    // One forward and one reverse lookup per member.
    assert_eq!(limiter.in_flight().await, 16);
}

#[tokio::test]
async fn test_provider_outage_degrades_to_fabricated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = GenerateConfig {
        record_count: 5,
        zip_pool: vec!["04101".to_string(), "04102".to_string()],
        mapbox_token: Some("pk.test".to_string()),
        mapbox_endpoint: server.uri(),
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(12);

    let result = config
        .roster_builder(Arc::new(RateLimiter::default()))
        .build(&mut rng)
        .await
        .unwrap();

    assert_eq!(result.rows.len(), 5);
    assert_eq!(result.summary.fabricated, 5);
    for row in &result.rows {
        assert!(config.zip_pool.contains(&row.zip));
    }
}

#[tokio::test]
async fn test_stalled_provider_does_not_block_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forward_body())
                .set_delay(Duration::from_secs(3600)),
        )
        .mount(&server)
        .await;

    let config = GenerateConfig {
        record_count: 2,
        zip_pool: vec!["04101".to_string()],
        mapbox_token: Some("pk.test".to_string()),
        mapbox_endpoint: server.uri(),
        mapbox_timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(15);

    let result = tokio::time::timeout(
        Duration::from_secs(30),
        config
            .roster_builder(Arc::new(RateLimiter::default()))
            .build(&mut rng),
    )
    .await
    .expect("run finished")
    .unwrap();

    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.summary.fabricated, 2);
    assert!(result.rows.iter().all(|row| row.zip == "04101"));
}

#[tokio::test]
async fn test_roster_invariants() {
    let mut rng = StdRng::seed_from_u64(13);
    let result = RosterBuilder::new()
        .with_records(1500)
        .build(&mut rng)
        .await
        .unwrap();

    let ids: HashSet<_> = result.rows.iter().map(|r| r.actionkit_id).collect();
    assert_eq!(ids.len(), result.rows.len());

    for row in &result.rows {
        let good_standing = row.membership_status == MembershipStatus::GoodStanding;
        let monthly_active = row.monthly_dues_status == MonthlyDuesStatus::Active;
        let yearly_active = row.yearly_dues_status == YearlyDuesStatus::Active;

        assert!(good_standing || !(monthly_active || yearly_active));
        assert!(!(monthly_active && yearly_active));

        if !row.union_member.is_member() {
            assert!(row.union_name.is_empty());
            assert!(row.union_local.is_none());
        }

        let phones = [&row.mobile_phone, &row.home_phone, &row.work_phone];
        let expected = phones.iter().find(|p| !p.is_empty()).map(|p| p.as_str());
        assert_eq!(row.best_phone, expected.unwrap_or(""));
    }
}

#[tokio::test]
async fn test_csv_has_one_row_per_member() {
    let mut rng = StdRng::seed_from_u64(14);
    let result = RosterBuilder::new()
        .with_records(12)
        .build(&mut rng)
        .await
        .unwrap();

    let mut buf = Vec::new();
    write_csv(&result.rows, &mut buf).unwrap();

    let mut reader = csv::Reader::from_reader(buf.as_slice());
    let width = reader.headers().unwrap().len();
    let records: Vec<_> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 12);
    assert!(records.iter().all(|r| r.len() == width));
}
