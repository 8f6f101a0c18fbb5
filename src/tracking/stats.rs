//! Read-side rollups over tracking records
//!
//! Pure functions over a pre-filtered record set. Frequency tables count
//! records (one per identity key), not accumulated open counts, so a
//! single noisy recipient cannot skew the device/browser/geo breakdown.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::TrackingRecord;

/// Aggregates for a single tracked email
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmailStats {
    /// Sum of open_count across matching records
    pub total_opens: i64,
    /// Count of matching records, i.e. distinct identity keys
    pub unique_opens: i64,
    /// Record count per device class
    pub device_stats: BTreeMap<String, i64>,
    /// Record count per browser
    pub browser_stats: BTreeMap<String, i64>,
    /// Record count per country; records without a location are excluded
    pub location_stats: BTreeMap<String, i64>,
}

/// Aggregates for a campaign
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignStats {
    /// Distinct email ids in the campaign
    pub total_emails: i64,
    /// Distinct recipient addresses in the campaign
    pub total_recipients: i64,
    /// Sum of open_count across matching records
    pub total_opens: i64,
    /// Per-recipient activity across all of the campaign's emails
    pub opens_by_email: BTreeMap<String, RecipientOpens>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecipientOpens {
    /// Summed open_count across the recipient's records
    pub open_count: i64,
    /// Most recent open time for the recipient within the campaign
    pub last_opened_at: i64,
}

/// Compute per-email rollups over records already filtered to one email id
pub fn email_stats(records: &[TrackingRecord]) -> EmailStats {
    let mut result = EmailStats {
        unique_opens: records.len() as i64,
        ..Default::default()
    };

    for record in records {
        result.total_opens += record.open_count;

        *result
            .device_stats
            .entry(record.device.clone())
            .or_insert(0) += 1;
        *result
            .browser_stats
            .entry(record.browser.clone())
            .or_insert(0) += 1;

        if let Some(location) = &record.location {
            *result
                .location_stats
                .entry(location.country.clone())
                .or_insert(0) += 1;
        }
    }

    result
}

/// Compute campaign rollups over records already filtered to one campaign id
pub fn campaign_stats(records: &[TrackingRecord]) -> CampaignStats {
    let mut emails = BTreeSet::new();
    let mut recipients = BTreeSet::new();
    let mut result = CampaignStats::default();

    for record in records {
        emails.insert(record.email_id.as_str());
        recipients.insert(record.recipient_email.as_str());
        result.total_opens += record.open_count;

        result
            .opens_by_email
            .entry(record.recipient_email.clone())
            .and_modify(|entry| {
                entry.open_count += record.open_count;
                entry.last_opened_at = entry.last_opened_at.max(record.opened_at);
            })
            .or_insert(RecipientOpens {
                open_count: record.open_count,
                last_opened_at: record.opened_at,
            });
    }

    result.total_emails = emails.len() as i64;
    result.total_recipients = recipients.len() as i64;
    result
}
