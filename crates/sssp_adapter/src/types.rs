use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Publisher-configured parameters for this bidder.
///
/// Values stay raw JSON: publishers configure them by hand and the host
/// forwards whatever type they wrote (`"123"`, `123`, `true`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inv_code: Option<Value>,
}

/// Media-type sub-objects of an ad unit, passed through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<Value>,
}

/// One bid request as handed over by the host orchestrator.
///
/// Decoding never rejects a record over a malformed optional field: a
/// `null` or mistyped `params` / `mediaTypes` decodes as empty, which makes
/// the record invalid instead of failing the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawBidRequest")]
pub struct BidRequest {
    pub bid_id: String,
    pub bidder_request_id: String,
    pub auction_id: String,
    pub ad_unit_code: String,
    pub media_types: MediaTypes,
    pub params: BidderParams,
    /// Identity assertions from the host's user-id modules. Not validated
    /// upstream, so kept as raw JSON until normalization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id_as_eids: Option<Value>,
}

// Wire shape. Older hosts send `mediaType` / `userIdAsEid`; when both
// spellings are present the current one wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBidRequest {
    #[serde(default)]
    bid_id: Option<Value>,
    #[serde(default)]
    bidder_request_id: Option<Value>,
    #[serde(default)]
    auction_id: Option<Value>,
    #[serde(default)]
    ad_unit_code: Option<Value>,
    #[serde(default)]
    media_types: Option<Value>,
    #[serde(default)]
    media_type: Option<Value>,
    #[serde(default)]
    params: Option<Value>,
    #[serde(default)]
    user_id_as_eids: Option<Value>,
    #[serde(default)]
    user_id_as_eid: Option<Value>,
}

fn text(value: Option<Value>) -> String {
    match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn lenient<T: DeserializeOwned + Default>(value: Option<Value>) -> T {
    value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

impl From<RawBidRequest> for BidRequest {
    fn from(raw: RawBidRequest) -> Self {
        Self {
            bid_id: text(raw.bid_id),
            bidder_request_id: text(raw.bidder_request_id),
            auction_id: text(raw.auction_id),
            ad_unit_code: text(raw.ad_unit_code),
            media_types: lenient(raw.media_types.or(raw.media_type)),
            params: lenient(raw.params),
            user_id_as_eids: raw.user_id_as_eids.or(raw.user_id_as_eid),
        }
    }
}

impl BidRequest {
    /// Decode a batch of bid requests from host JSON.
    ///
    /// Only a non-array document is an error; elements that are not
    /// objects are dropped.
    pub fn batch_from_json(json: &str) -> crate::Result<Vec<BidRequest>> {
        let items: Vec<Value> = serde_json::from_str(json)?;
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(bid) => Some(bid),
                Err(e) => {
                    debug!(error = %e, "dropping undecodable bid request");
                    None
                }
            })
            .collect())
    }
}

/// Page and device snapshot captured once by the host at session start.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    /// Full page URL
    pub page: String,
    /// Page hostname
    pub domain: String,
    /// Viewport width in CSS pixels
    pub width: u32,
    /// Viewport height in CSS pixels
    pub height: u32,
}

impl PageContext {
    pub fn new(page: impl Into<String>, domain: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            page: page.into(),
            domain: domain.into(),
            width,
            height,
        }
    }
}

/// Outbound request descriptor: one per valid bid request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    /// JSON-serialized request payload
    pub data: String,
}

/// A response from the endpoint as relayed by the host.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerResponse {
    #[serde(default)]
    pub body: Value,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ServerResponse {
    pub fn new(body: Value) -> Self {
        Self {
            body,
            headers: BTreeMap::new(),
        }
    }
}

/// Bid record returned to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundBid {
    pub request_id: String,
    pub cpm: f64,
    pub width: u32,
    pub height: u32,
    pub creative_id: String,
    pub deal_id: String,
    pub currency: String,
    pub net_revenue: bool,
    pub ttl: u32,
    pub referrer: String,
    pub ad: String,
}

/// Payload of the host's timeout notification, one entry per timed-out bid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeoutNotice {
    #[serde(default)]
    pub bidder: String,
    #[serde(default)]
    pub bid_id: String,
    #[serde(default)]
    pub ad_unit_code: String,
    #[serde(default)]
    pub auction_id: String,
    /// Auction timeout in milliseconds
    #[serde(default)]
    pub timeout: u64,
}

/// Identifies the bidder request an error belongs to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderRequestRef {
    #[serde(default)]
    pub bidder_request_id: String,
}

/// Payload of the host's bidder-error notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderErrorNotice {
    /// Transport error description as reported by the host
    #[serde(default)]
    pub error: Value,
    #[serde(default)]
    pub bidder_request: BidderRequestRef,
}
