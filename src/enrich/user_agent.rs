//! User-agent string parsing via woothee
//!
//! Parsing is pure and infallible: anything woothee cannot classify is
//! reported as "unknown" rather than an error, so a malformed header can
//! never fail a beacon request.

use woothee::parser::Parser;

const UNKNOWN: &str = "unknown";

/// Attributes derived from a raw User-Agent header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UaInfo {
    /// Device class ("pc", "smartphone", "crawler", ...)
    pub device: String,
    /// Browser display name, with version when known ("Chrome 91.0.4472.124")
    pub browser: String,
    /// Operating system display name ("Windows 10", "Mac OSX", ...)
    pub os: String,
}

/// Parse a raw User-Agent header into device/browser/os attributes
pub fn parse(raw: &str) -> UaInfo {
    let parser = Parser::new();
    let result = parser.parse(raw).unwrap_or_default();

    let device = normalize(result.category);
    let os = normalize(result.os);

    let browser = if is_unknown(result.name) {
        UNKNOWN.to_string()
    } else if is_unknown(&result.version) {
        result.name.to_string()
    } else {
        format!("{} {}", result.name, result.version)
    };

    UaInfo {
        device,
        browser,
        os,
    }
}

fn is_unknown(value: &str) -> bool {
    value.is_empty() || value == "UNKNOWN"
}

fn normalize(value: &str) -> String {
    if is_unknown(value) {
        UNKNOWN.to_string()
    } else {
        value.to_string()
    }
}
