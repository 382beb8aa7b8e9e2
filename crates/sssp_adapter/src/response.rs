//! Response interpretation.
//!
//! The endpoint's pricing schema is not wired in yet: every bid carries
//! fixed placeholder pricing and creative fields, and only the request id
//! and viewport dimensions vary.

use crate::types::{BidRequest, InboundBid, PageContext, ServerResponse};

pub const PLACEHOLDER_CPM: f64 = 1.0;
pub const PLACEHOLDER_CREATIVE_ID: &str = "CREATIVE_ID";
pub const PLACEHOLDER_DEAL_ID: &str = "DEAL_ID";
pub const PLACEHOLDER_CURRENCY: &str = "USD";
pub const PLACEHOLDER_REFERRER: &str = "REFERER";
pub const PLACEHOLDER_AD: &str = "CREATIVE_BODY";
/// Bid time-to-live in seconds
pub const BID_TTL_SECS: u32 = 360;

/// Turn one server response into the host's bid list (always one bid).
pub fn interpret_response(
    _response: &ServerResponse,
    request: &BidRequest,
    page: &PageContext,
) -> Vec<InboundBid> {
    vec![InboundBid {
        request_id: request.bid_id.clone(),
        cpm: PLACEHOLDER_CPM,
        width: page.width,
        height: page.height,
        creative_id: PLACEHOLDER_CREATIVE_ID.into(),
        deal_id: PLACEHOLDER_DEAL_ID.into(),
        currency: PLACEHOLDER_CURRENCY.into(),
        net_revenue: true,
        ttl: BID_TTL_SECS,
        referrer: PLACEHOLDER_REFERRER.into(),
        ad: PLACEHOLDER_AD.into(),
    }]
}
