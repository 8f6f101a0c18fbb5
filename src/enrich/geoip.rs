//! GeoIP lookup service using MaxMind GeoLite2/GeoIP2 MMDB
//!
//! Thread-safe IP geolocation over a memory-mapped MaxMind City database.
//! The database is optional; without one, every lookup reports no location.

use anyhow::{Context, Result};
use maxminddb::{geoip2, Mmap, Reader};
use std::net::IpAddr;
use std::sync::Arc;

use crate::models::{Coordinates, GeoLocation};

pub struct GeoIpService {
    city_reader: Option<Arc<Reader<Mmap>>>,
}

impl GeoIpService {
    /// Create a new GeoIP service from an optional City .mmdb path
    pub fn new(city_path: Option<&str>) -> Result<Self> {
        let city_reader = if let Some(path) = city_path {
            let reader = unsafe { Reader::open_mmap(path) }
                .with_context(|| format!("Failed to open GeoIP City database at {}", path))?;
            Some(Arc::new(reader))
        } else {
            None
        };

        Ok(Self { city_reader })
    }

    /// Lookup the geographic location for an IP address
    ///
    /// Returns `None` when no database is loaded, the address has no entry
    /// (private/unroutable ranges), or the entry carries no country. A miss
    /// is never an error.
    pub fn lookup(&self, ip: IpAddr) -> Option<GeoLocation> {
        let reader = self.city_reader.as_ref()?;
        let result = reader.lookup(ip).ok()?;
        let city = result.decode::<geoip2::City>().ok().flatten()?;

        let country = city.country.iso_code.map(|s| s.to_string())?;

        let region = city
            .subdivisions
            .first()
            .and_then(|subdivision| subdivision.names.english.map(|s| s.to_string()));

        let city_name = city.city.names.english.map(|s| s.to_string());

        let coordinates = match (city.location.latitude, city.location.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        };

        Some(GeoLocation {
            country,
            region,
            city: city_name,
            coordinates,
        })
    }
}

// Implement Clone by cloning the Arc
impl Clone for GeoIpService {
    fn clone(&self) -> Self {
        Self {
            city_reader: self.city_reader.clone(),
        }
    }
}
