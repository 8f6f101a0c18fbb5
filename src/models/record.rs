use serde::{Deserialize, Serialize};

/// Geographic location derived from the source IP at record creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// ISO country code (e.g., "US", "GB")
    pub country: String,

    /// Region/state/province
    pub region: Option<String>,

    /// City name
    pub city: Option<String>,

    /// Approximate coordinates of the source IP
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One tracked open, deduplicated by (email_id, recipient_email, ip_address).
///
/// `opened_at` and `open_count` are updated on every matching hit; the
/// enrichment fields (`device`, `browser`, `os`, `location`) are set once at
/// creation and never rewritten, even if a later hit carries a different
/// user agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRecord {
    pub id: i64,
    pub email_id: String,
    pub recipient_email: String,
    pub campaign_id: Option<String>,
    /// Unix timestamp of the most recent open for this identity key
    pub opened_at: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub location: Option<GeoLocation>,
    pub open_count: i64,
}

/// Fully enriched open event handed to the store for the atomic upsert.
/// The enrichment fields only take effect when the identity key is new.
#[derive(Debug, Clone)]
pub struct OpenEvent {
    pub email_id: String,
    pub recipient_email: String,
    pub campaign_id: Option<String>,
    pub opened_at: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub device: String,
    pub browser: String,
    pub os: String,
    pub location: Option<GeoLocation>,
}
