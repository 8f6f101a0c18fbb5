//! Tracking link and HTML snippet construction
//!
//! Pure string templating; no store access. The generated URL targets the
//! beacon server's `/track/{email_id}` route.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("email_id must not be empty")]
    EmptyEmailId,
    #[error("recipient_email must not be empty")]
    EmptyRecipientEmail,
    #[error("base_url must not be empty")]
    EmptyBaseUrl,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingLink {
    pub url: String,
    pub html: String,
}

/// Build the beacon URL and an embeddable `<img>` snippet.
///
/// `email_id`, `recipient_email` and `base_url` are required; an empty
/// value is a client input error, not a malformed link.
pub fn build_tracking_link(
    email_id: &str,
    recipient_email: &str,
    campaign_id: Option<&str>,
    base_url: &str,
) -> Result<TrackingLink, LinkError> {
    if email_id.is_empty() {
        return Err(LinkError::EmptyEmailId);
    }
    if recipient_email.is_empty() {
        return Err(LinkError::EmptyRecipientEmail);
    }
    if base_url.is_empty() {
        return Err(LinkError::EmptyBaseUrl);
    }

    let base = base_url.trim_end_matches('/');
    let mut url = format!(
        "{}/track/{}?recipient={}",
        base,
        urlencoding::encode(email_id),
        urlencoding::encode(recipient_email),
    );

    if let Some(campaign) = campaign_id.filter(|c| !c.is_empty()) {
        url.push_str("&campaign=");
        url.push_str(&urlencoding::encode(campaign));
    }

    let html = format!(
        r#"<img src="{url}" width="1" height="1" style="border:0;display:block" alt="" />"#
    );

    Ok(TrackingLink { url, html })
}
