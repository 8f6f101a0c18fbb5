//! Client IP extraction from HTTP headers with trust validation
//!
//! Mail clients frequently fetch tracking pixels through proxies and
//! privacy relays, so the socket address alone is often a load balancer.
//! This module:
//! - Validates trust chains for X-Forwarded-For and Forwarded headers
//! - Supports vendor-specific headers (e.g., CF-Connecting-IP)
//! - Falls back to the socket remote address when headers are untrusted

use axum::http::HeaderMap;
use std::net::IpAddr;
use tracing::warn;

use crate::config::{TrackingConfig, TrustedProxyMode};

/// Extract the client IP address according to the trust configuration
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: IpAddr,
    config: &TrackingConfig,
) -> IpAddr {
    match config.trusted_proxy_mode {
        TrustedProxyMode::Cloudflare => extract_cloudflare_ip(headers).unwrap_or_else(|| {
            warn!("CF-Connecting-IP header missing in Cloudflare mode, using socket address");
            socket_addr
        }),
        TrustedProxyMode::Standard => {
            extract_standard_ip(headers, socket_addr, config).unwrap_or(socket_addr)
        }
        TrustedProxyMode::None => socket_addr,
    }
}

/// Extract IP from Cloudflare-specific header
fn extract_cloudflare_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("cf-connecting-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<IpAddr>().ok())
}

/// Extract IP from standard headers (Forwarded, X-Forwarded-For) with trust validation
fn extract_standard_ip(
    headers: &HeaderMap,
    socket_addr: IpAddr,
    config: &TrackingConfig,
) -> Option<IpAddr> {
    // Prefer RFC 7239 Forwarded header
    if let Some(ip) = extract_from_forwarded(headers) {
        return Some(ip);
    }

    extract_from_x_forwarded_for(headers, socket_addr, config)
}

/// Parse RFC 7239 Forwarded header: Forwarded: for=192.0.2.60;proto=http;by=203.0.113.43
fn extract_from_forwarded(headers: &HeaderMap) -> Option<IpAddr> {
    let forwarded = headers.get("forwarded")?.to_str().ok()?;

    for element in forwarded.split(',') {
        for param in element.split(';') {
            let param = param.trim();
            if let Some(value) = param.strip_prefix("for=") {
                // Remove quotes, brackets and port if present
                let ip_str = value
                    .trim_matches('"')
                    .trim_start_matches('[')
                    .split(']')
                    .next()
                    .unwrap_or(value)
                    .split(':')
                    .next()
                    .unwrap_or(value);

                if let Ok(ip) = ip_str.parse::<IpAddr>() {
                    return Some(ip);
                }
            }
        }
    }

    None
}

/// Parse X-Forwarded-For with right-to-left trust validation
fn extract_from_x_forwarded_for(
    headers: &HeaderMap,
    socket_addr: IpAddr,
    config: &TrackingConfig,
) -> Option<IpAddr> {
    let xff = headers.get("x-forwarded-for")?.to_str().ok()?;

    let ips: Vec<IpAddr> = xff
        .split(',')
        .filter_map(|s| s.trim().parse::<IpAddr>().ok())
        .collect();

    if ips.is_empty() {
        return None;
    }

    // If num_trusted_proxies is specified, skip that many from the right
    if let Some(num_trusted) = config.num_trusted_proxies {
        if ips.len() > num_trusted {
            return Some(ips[ips.len() - num_trusted - 1]);
        }
        // Not enough IPs in the chain, return the leftmost (least trusted)
        return ips.first().copied();
    }

    // With a trusted CIDR list, walk right to left past trusted proxies;
    // the first address outside the list is the client.
    if !config.trusted_proxies.is_empty() {
        if !is_trusted(socket_addr, config) {
            return None;
        }
        for ip in ips.iter().rev() {
            if !is_trusted(*ip, config) {
                return Some(*ip);
            }
        }
        // Every hop was a trusted proxy
        return ips.first().copied();
    }

    // No trust configuration, return the rightmost IP
    ips.last().copied()
}

fn is_trusted(ip: IpAddr, config: &TrackingConfig) -> bool {
    config.trusted_proxies.iter().any(|net| net.contains(&ip))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn create_config(mode: TrustedProxyMode) -> TrackingConfig {
        TrackingConfig {
            trusted_proxy_mode: mode,
            ..Default::default()
        }
    }

    #[test]
    fn test_extract_client_ip_none_mode() {
        let headers = HeaderMap::new();
        let socket_addr: IpAddr = "192.168.1.1".parse().unwrap();
        let config = create_config(TrustedProxyMode::None);

        let result = extract_client_ip(&headers, socket_addr, &config);
        assert_eq!(result, socket_addr);
    }

    #[test]
    fn test_extract_cloudflare_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.1"));
        let socket_addr: IpAddr = "192.168.1.1".parse().unwrap();
        let config = create_config(TrustedProxyMode::Cloudflare);

        let result = extract_client_ip(&headers, socket_addr, &config);
        assert_eq!(result, "203.0.113.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_extract_x_forwarded_for_basic() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1"),
        );
        let socket_addr: IpAddr = "192.168.1.1".parse().unwrap();
        let config = create_config(TrustedProxyMode::Standard);

        let result = extract_client_ip(&headers, socket_addr, &config);
        // Rightmost IP in the absence of trust configuration
        assert_eq!(result, "198.51.100.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_extract_x_forwarded_for_num_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1"),
        );
        let socket_addr: IpAddr = "192.168.1.1".parse().unwrap();
        let mut config = create_config(TrustedProxyMode::Standard);
        config.num_trusted_proxies = Some(1);

        let result = extract_client_ip(&headers, socket_addr, &config);
        assert_eq!(result, "203.0.113.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_extract_x_forwarded_for_cidr_trust_chain() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 10.0.0.5, 10.0.0.6"),
        );
        let socket_addr: IpAddr = "10.0.0.1".parse().unwrap();
        let mut config = create_config(TrustedProxyMode::Standard);
        config.trusted_proxies = vec!["10.0.0.0/8".parse().unwrap()];

        let result = extract_client_ip(&headers, socket_addr, &config);
        assert_eq!(result, "203.0.113.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_extract_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "forwarded",
            HeaderValue::from_static("for=192.0.2.60;proto=http;by=203.0.113.43"),
        );
        let socket_addr: IpAddr = "192.168.1.1".parse().unwrap();
        let config = create_config(TrustedProxyMode::Standard);

        let result = extract_client_ip(&headers, socket_addr, &config);
        assert_eq!(result, "192.0.2.60".parse::<IpAddr>().unwrap());
    }
}
