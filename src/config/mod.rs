use anyhow::Context;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub beacon_server: ServerConfig,
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// How to determine the real client IP behind proxies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustedProxyMode {
    /// Use the socket remote address as-is
    None,
    /// Parse Forwarded / X-Forwarded-For with trust validation
    Standard,
    /// Use the CF-Connecting-IP header
    Cloudflare,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Optional path to a MaxMind GeoLite2-City or GeoIP2-City .mmdb file.
    /// When absent, records are stored without location enrichment.
    pub geoip_city_db: Option<String>,

    pub trusted_proxy_mode: TrustedProxyMode,

    /// Number of proxies between the client and this server, counted
    /// from the right of the X-Forwarded-For chain.
    pub num_trusted_proxies: Option<usize>,

    /// CIDR ranges of trusted proxies for chain validation.
    pub trusted_proxies: Vec<IpNet>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            geoip_city_db: None,
            trusted_proxy_mode: TrustedProxyMode::None,
            num_trusted_proxies: None,
            trusted_proxies: vec![],
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            _ => DatabaseBackend::Sqlite,
        };

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://./mailtrace.db".to_string());

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = std::env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let beacon_host = std::env::var("BEACON_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let beacon_port = std::env::var("BEACON_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()?;

        let geoip_city_db = std::env::var("GEOIP_CITY_DB").ok();

        let trusted_proxy_mode = match std::env::var("TRUSTED_PROXY_MODE")
            .unwrap_or_else(|_| "none".to_string())
            .to_lowercase()
            .as_str()
        {
            "standard" => TrustedProxyMode::Standard,
            "cloudflare" => TrustedProxyMode::Cloudflare,
            "none" => TrustedProxyMode::None,
            other => {
                tracing::warn!(
                    "Unknown TRUSTED_PROXY_MODE '{other}', falling back to 'none'. Supported values: none, standard, cloudflare"
                );
                TrustedProxyMode::None
            }
        };

        let num_trusted_proxies = std::env::var("NUM_TRUSTED_PROXIES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok());

        let trusted_proxies = match std::env::var("TRUSTED_PROXIES") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<IpNet>()
                        .with_context(|| format!("Invalid CIDR in TRUSTED_PROXIES: {s}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?,
            Err(_) => vec![],
        };

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            beacon_server: ServerConfig {
                host: beacon_host,
                port: beacon_port,
            },
            tracking: TrackingConfig {
                geoip_city_db,
                trusted_proxy_mode,
                num_trusted_proxies,
                trusted_proxies,
            },
        })
    }
}
