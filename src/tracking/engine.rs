use anyhow::Result;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

use crate::enrich::{user_agent, GeoIpService};
use crate::models::{OpenEvent, TrackingRecord};
use crate::storage::{EventStore, RecordFilter};
use crate::tracking::stats::{self, CampaignStats, EmailStats};

/// A single beacon hit as seen by the routing layer
#[derive(Debug, Clone)]
pub struct OpenHit {
    pub email_id: String,
    pub recipient_email: String,
    pub campaign_id: Option<String>,
    pub ip: IpAddr,
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// First hit for this identity key; a new record was created
    FirstOpen,
    /// Repeat hit; the existing record's counter was incremented
    RepeatOpen,
}

/// Ingestion and aggregation over the event store.
///
/// Construct once at startup with an explicit store handle and GeoIP
/// service; handlers share it behind an `Arc`.
pub struct TrackingEngine {
    store: Arc<dyn EventStore>,
    geoip: GeoIpService,
}

impl TrackingEngine {
    pub fn new(store: Arc<dyn EventStore>, geoip: GeoIpService) -> Self {
        Self { store, geoip }
    }

    /// Record one open-beacon hit.
    ///
    /// Enrichment never fails: an unparseable user agent degrades to
    /// "unknown" attributes and an unmatched IP to no location. The store
    /// upsert is atomic per identity key, so concurrent hits for the same
    /// brand-new key produce exactly one record.
    ///
    /// The beacon handler discards the result; a store error here must
    /// never fail the pixel response.
    pub async fn record_open(&self, hit: OpenHit) -> Result<OpenOutcome> {
        let ua = user_agent::parse(&hit.user_agent);
        let location = self.geoip.lookup(hit.ip);

        let event = OpenEvent {
            email_id: hit.email_id,
            recipient_email: hit.recipient_email,
            campaign_id: hit.campaign_id,
            opened_at: chrono::Utc::now().timestamp(),
            ip_address: hit.ip.to_string(),
            user_agent: hit.user_agent,
            device: ua.device,
            browser: ua.browser,
            os: ua.os,
            location,
        };

        let open_count = self.store.upsert_open(&event).await?;

        let outcome = if open_count <= 1 {
            OpenOutcome::FirstOpen
        } else {
            OpenOutcome::RepeatOpen
        };

        debug!(
            email_id = %event.email_id,
            ip = %event.ip_address,
            open_count,
            "recorded open"
        );

        Ok(outcome)
    }

    /// Per-email rollups: total/unique opens plus device, browser and
    /// country frequency tables. Empty aggregates for an unknown id.
    pub async fn email_stats(&self, email_id: &str) -> Result<EmailStats> {
        let records = self.store.find(&RecordFilter::for_email(email_id)).await?;
        Ok(stats::email_stats(&records))
    }

    /// Per-campaign rollups: distinct emails/recipients, total opens and
    /// per-recipient activity. Empty aggregates for an unknown id.
    pub async fn campaign_stats(&self, campaign_id: &str) -> Result<CampaignStats> {
        let records = self
            .store
            .find(&RecordFilter::for_campaign(campaign_id))
            .await?;
        Ok(stats::campaign_stats(&records))
    }

    /// Raw record listing for the query endpoint
    pub async fn find_records(&self, filter: &RecordFilter) -> Result<Vec<TrackingRecord>> {
        self.store.find(filter).await
    }
}
