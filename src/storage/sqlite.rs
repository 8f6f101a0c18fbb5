use crate::models::{OpenEvent, TrackingRecord};
use crate::storage::trait_def::{EventStore, RecordFilter, RecordRow};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStore {
    pool: Arc<SqlitePool>,
}

impl SqliteStore {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS opens (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email_id TEXT NOT NULL,
                recipient_email TEXT NOT NULL DEFAULT '',
                campaign_id TEXT,
                opened_at INTEGER NOT NULL,
                ip_address TEXT NOT NULL,
                user_agent TEXT NOT NULL DEFAULT '',
                device TEXT NOT NULL DEFAULT '',
                browser TEXT NOT NULL DEFAULT '',
                os TEXT NOT NULL DEFAULT '',
                country TEXT,
                region TEXT,
                city TEXT,
                latitude REAL,
                longitude REAL,
                open_count INTEGER NOT NULL DEFAULT 1,
                UNIQUE (email_id, recipient_email, ip_address)
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_opens_email_id ON opens(email_id)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_opens_campaign_id ON opens(campaign_id)")
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn upsert_open(&self, event: &OpenEvent) -> Result<i64> {
        let (latitude, longitude) = event
            .location
            .as_ref()
            .and_then(|l| l.coordinates)
            .map(|c| (Some(c.latitude), Some(c.longitude)))
            .unwrap_or((None, None));

        let open_count = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO opens (
                email_id, recipient_email, campaign_id, opened_at, ip_address,
                user_agent, device, browser, os,
                country, region, city, latitude, longitude, open_count
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
            ON CONFLICT (email_id, recipient_email, ip_address) DO UPDATE SET
                open_count = open_count + 1,
                opened_at = excluded.opened_at
            RETURNING open_count
            "#,
        )
        .bind(&event.email_id)
        .bind(&event.recipient_email)
        .bind(&event.campaign_id)
        .bind(event.opened_at)
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(&event.device)
        .bind(&event.browser)
        .bind(&event.os)
        .bind(event.location.as_ref().map(|l| l.country.as_str()))
        .bind(event.location.as_ref().and_then(|l| l.region.as_deref()))
        .bind(event.location.as_ref().and_then(|l| l.city.as_deref()))
        .bind(latitude)
        .bind(longitude)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(open_count)
    }

    async fn find(&self, filter: &RecordFilter) -> Result<Vec<TrackingRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, email_id, recipient_email, campaign_id, opened_at, ip_address,
                   user_agent, device, browser, os,
                   country, region, city, latitude, longitude, open_count
            FROM opens
            WHERE (? IS NULL OR email_id = ?)
              AND (? IS NULL OR recipient_email = ?)
              AND (? IS NULL OR campaign_id = ?)
            ORDER BY opened_at DESC, id DESC
            "#,
        )
        .bind(&filter.email_id)
        .bind(&filter.email_id)
        .bind(&filter.recipient_email)
        .bind(&filter.recipient_email)
        .bind(&filter.campaign_id)
        .bind(&filter.campaign_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(TrackingRecord::from).collect())
    }
}
