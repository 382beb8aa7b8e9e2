//! User-sync registration.

use crate::types::ServerResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Iframe,
    Image,
}

/// A sync pixel or iframe the host should drop after the auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSync {
    #[serde(rename = "type")]
    pub kind: SyncType,
    pub url: String,
}

/// Which sync mechanisms the publisher allows.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    #[serde(default)]
    pub iframe_enabled: bool,
    #[serde(default)]
    pub pixel_enabled: bool,
}

/// GDPR consent data as aggregated by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GdprConsent {
    /// Only honored when it is a JSON boolean
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr_applies: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_string: Option<String>,
}

impl GdprConsent {
    pub fn new(applies: Option<bool>, consent_string: impl Into<String>) -> Self {
        Self {
            gdpr_applies: applies.map(Value::Bool),
            consent_string: Some(consent_string.into()),
        }
    }

    pub fn applies(&self) -> Option<bool> {
        self.gdpr_applies.as_ref().and_then(Value::as_bool)
    }

    /// Query fragment appended to every sync URL.
    pub fn query_fragment(&self) -> String {
        let consent = self.consent_string.as_deref().unwrap_or_default();
        match self.applies() {
            Some(applies) => format!("gdpr={}&gdpr_consent={consent}", u8::from(applies)),
            None => format!("gdpr_consent={consent}"),
        }
    }
}

fn pixel_sync_url(response: &ServerResponse) -> Option<&str> {
    response
        .body
        .get("userSync")
        .and_then(|s| s.get("url"))
        .and_then(Value::as_str)
}

/// Compute the syncs to drop: the vendor iframe when allowed, then the
/// first response's pixel when allowed and present.
pub fn get_user_syncs(
    options: &SyncOptions,
    responses: &[ServerResponse],
    consent: &GdprConsent,
    iframe_sync_url: &str,
) -> Vec<UserSync> {
    let fragment = consent.query_fragment();
    let mut syncs = Vec::new();

    if options.iframe_enabled {
        syncs.push(UserSync {
            kind: SyncType::Iframe,
            url: format!("{iframe_sync_url}{fragment}"),
        });
    }
    if options.pixel_enabled {
        if let Some(first) = responses.first() {
            match pixel_sync_url(first) {
                Some(url) => syncs.push(UserSync {
                    kind: SyncType::Image,
                    url: format!("{url}{fragment}"),
                }),
                None => debug!("first response carries no userSync.url, skipping pixel sync"),
            }
        }
    }
    syncs
}
