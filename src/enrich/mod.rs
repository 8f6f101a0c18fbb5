//! Enrichment collaborators for beacon hits
//!
//! These are black boxes from the engine's point of view: a user-agent
//! parser, a GeoIP lookup, and client-IP extraction behind proxies. None
//! of them can fail a request; missing data degrades to unknown/absent
//! attribute values.

pub mod geoip;
pub mod ip_extractor;
pub mod user_agent;

pub use geoip::GeoIpService;
pub use ip_extractor::extract_client_ip;
pub use user_agent::UaInfo;
