use crate::models::{Coordinates, GeoLocation, OpenEvent, TrackingRecord};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Equality filters for record queries. An empty filter matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFilter {
    pub email_id: Option<String>,
    pub recipient_email: Option<String>,
    pub campaign_id: Option<String>,
}

impl RecordFilter {
    pub fn for_email(email_id: &str) -> Self {
        Self {
            email_id: Some(email_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_campaign(campaign_id: &str) -> Self {
        Self {
            campaign_id: Some(campaign_id.to_string()),
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Initialize the storage (create tables and indexes)
    async fn init(&self) -> Result<()>;

    /// Atomically record an open: insert a new row for a never-seen
    /// (email_id, recipient_email, ip_address) key, or increment `open_count`
    /// and refresh `opened_at` for an existing one. The enrichment columns
    /// and `campaign_id` are only written on insert.
    ///
    /// Returns the `open_count` after the upsert (1 means a new record).
    async fn upsert_open(&self, event: &OpenEvent) -> Result<i64>;

    /// Fetch records matching the filter, most recently opened first
    async fn find(&self, filter: &RecordFilter) -> Result<Vec<TrackingRecord>>;
}

/// Flat row shape shared by both SQL backends
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RecordRow {
    pub id: i64,
    pub email_id: String,
    pub recipient_email: String,
    pub campaign_id: Option<String>,
    pub opened_at: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub open_count: i64,
}

impl From<RecordRow> for TrackingRecord {
    fn from(row: RecordRow) -> Self {
        // A row has a location only when the lookup produced a country.
        let location = row.country.map(|country| GeoLocation {
            country,
            region: row.region,
            city: row.city,
            coordinates: match (row.latitude, row.longitude) {
                (Some(latitude), Some(longitude)) => Some(Coordinates {
                    latitude,
                    longitude,
                }),
                _ => None,
            },
        });

        TrackingRecord {
            id: row.id,
            email_id: row.email_id,
            recipient_email: row.recipient_email,
            campaign_id: row.campaign_id,
            opened_at: row.opened_at,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            device: row.device,
            browser: row.browser,
            os: row.os,
            location,
            open_count: row.open_count,
        }
    }
}
