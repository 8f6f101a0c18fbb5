//! Open-tracking core: ingestion/dedup engine, aggregation, link helper
//!
//! The engine owns the enrichment collaborators and the event store. One
//! `TrackingRecord` exists per (email_id, recipient_email, ip_address)
//! identity key; repeated hits for the same key increment its counter.

pub mod engine;
pub mod link;
pub mod pixel;
pub mod stats;

pub use engine::{OpenHit, OpenOutcome, TrackingEngine};
pub use link::{build_tracking_link, LinkError, TrackingLink};
pub use stats::{CampaignStats, EmailStats, RecipientOpens};
