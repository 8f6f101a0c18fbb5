//! Aggregation engine integration tests against the SQLite backend

use std::sync::Arc;

use mailtrace::enrich::GeoIpService;
use mailtrace::models::{GeoLocation, OpenEvent};
use mailtrace::storage::{EventStore, SqliteStore};
use mailtrace::tracking::TrackingEngine;

async fn create_test_store() -> Arc<dyn EventStore> {
    let store = SqliteStore::new("sqlite::memory:", 5).await.unwrap();
    store.init().await.unwrap();
    Arc::new(store)
}

struct Seed<'a> {
    email_id: &'a str,
    recipient: &'a str,
    ip: &'a str,
    campaign: Option<&'a str>,
    opened_at: i64,
    device: &'a str,
    country: Option<&'a str>,
    opens: i64,
}

async fn seed(store: &Arc<dyn EventStore>, seed: Seed<'_>) {
    let event = OpenEvent {
        email_id: seed.email_id.to_string(),
        recipient_email: seed.recipient.to_string(),
        campaign_id: seed.campaign.map(str::to_string),
        opened_at: seed.opened_at,
        ip_address: seed.ip.to_string(),
        user_agent: String::new(),
        device: seed.device.to_string(),
        browser: "Chrome 91".to_string(),
        os: "Windows 10".to_string(),
        location: seed.country.map(|country| GeoLocation {
            country: country.to_string(),
            region: None,
            city: None,
            coordinates: None,
        }),
    };

    for _ in 0..seed.opens {
        store.upsert_open(&event).await.unwrap();
    }
}

#[tokio::test]
async fn test_email_stats_over_store() {
    let store = create_test_store().await;
    seed(
        &store,
        Seed {
            email_id: "e1",
            recipient: "r1",
            ip: "ip1",
            campaign: None,
            opened_at: 100,
            device: "mobile",
            country: Some("US"),
            opens: 3,
        },
    )
    .await;
    seed(
        &store,
        Seed {
            email_id: "e1",
            recipient: "r2",
            ip: "ip1",
            campaign: None,
            opened_at: 120,
            device: "desktop",
            country: None,
            opens: 1,
        },
    )
    .await;
    // A different email must not leak into e1's stats
    seed(
        &store,
        Seed {
            email_id: "e2",
            recipient: "r1",
            ip: "ip1",
            campaign: None,
            opened_at: 130,
            device: "mobile",
            country: Some("GB"),
            opens: 5,
        },
    )
    .await;

    let engine = TrackingEngine::new(store, GeoIpService::new(None).unwrap());
    let stats = engine.email_stats("e1").await.unwrap();

    assert_eq!(stats.total_opens, 4);
    assert_eq!(stats.unique_opens, 2);
    assert_eq!(stats.device_stats.get("mobile"), Some(&1));
    assert_eq!(stats.device_stats.get("desktop"), Some(&1));
    // The record without a location is excluded, not counted as unknown
    assert_eq!(stats.location_stats.len(), 1);
    assert_eq!(stats.location_stats.get("US"), Some(&1));
}

#[tokio::test]
async fn test_email_stats_unknown_id_is_empty() {
    let store = create_test_store().await;
    let engine = TrackingEngine::new(store, GeoIpService::new(None).unwrap());

    let stats = engine.email_stats("no-such-email").await.unwrap();
    assert_eq!(stats.total_opens, 0);
    assert_eq!(stats.unique_opens, 0);
    assert!(stats.device_stats.is_empty());
    assert!(stats.browser_stats.is_empty());
    assert!(stats.location_stats.is_empty());
}

#[tokio::test]
async fn test_campaign_stats_rollup_across_emails() {
    let store = create_test_store().await;
    seed(
        &store,
        Seed {
            email_id: "e1",
            recipient: "r1",
            ip: "ip1",
            campaign: Some("camp"),
            opened_at: 100,
            device: "pc",
            country: None,
            opens: 2,
        },
    )
    .await;
    seed(
        &store,
        Seed {
            email_id: "e2",
            recipient: "r1",
            ip: "ip1",
            campaign: Some("camp"),
            opened_at: 300,
            device: "pc",
            country: None,
            opens: 3,
        },
    )
    .await;
    seed(
        &store,
        Seed {
            email_id: "e2",
            recipient: "r2",
            ip: "ip2",
            campaign: Some("camp"),
            opened_at: 200,
            device: "pc",
            country: None,
            opens: 1,
        },
    )
    .await;
    // Different campaign, must be excluded
    seed(
        &store,
        Seed {
            email_id: "e3",
            recipient: "r3",
            ip: "ip3",
            campaign: Some("other"),
            opened_at: 500,
            device: "pc",
            country: None,
            opens: 7,
        },
    )
    .await;

    let engine = TrackingEngine::new(store, GeoIpService::new(None).unwrap());
    let stats = engine.campaign_stats("camp").await.unwrap();

    assert_eq!(stats.total_emails, 2);
    assert_eq!(stats.total_recipients, 2);
    assert_eq!(stats.total_opens, 6);

    let r1 = stats.opens_by_email.get("r1").unwrap();
    assert_eq!(r1.open_count, 5, "r1 opens sum across both emails");
    assert_eq!(r1.last_opened_at, 300);

    let r2 = stats.opens_by_email.get("r2").unwrap();
    assert_eq!(r2.open_count, 1);
    assert_eq!(r2.last_opened_at, 200);
}

#[tokio::test]
async fn test_campaign_stats_unknown_id_is_empty() {
    let store = create_test_store().await;
    let engine = TrackingEngine::new(store, GeoIpService::new(None).unwrap());

    let stats = engine.campaign_stats("no-such-campaign").await.unwrap();
    assert_eq!(stats.total_emails, 0);
    assert_eq!(stats.total_recipients, 0);
    assert_eq!(stats.total_opens, 0);
    assert!(stats.opens_by_email.is_empty());
}
