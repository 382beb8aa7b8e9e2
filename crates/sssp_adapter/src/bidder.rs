//! Registration surface shared with the host orchestrator.

use crate::sync::{GdprConsent, SyncOptions, UserSync};
use crate::types::{
    BidRequest, BidderErrorNotice, InboundBid, OutboundRequest, PageContext, ServerResponse,
    TimeoutNotice,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderAlias {
    pub code: String,
    /// IAB Global Vendor List id registered for the alias
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gvlid: Option<u64>,
}

/// Capability descriptor the host registers the bidder with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderSpec {
    pub code: String,
    pub gvlid: u64,
    pub supported_media_types: Vec<MediaType>,
    #[serde(default)]
    pub aliases: Vec<BidderAlias>,
}

impl BidderSpec {
    /// True when `code` is the primary bidder code or one of its aliases.
    pub fn answers_to(&self, code: &str) -> bool {
        self.code == code || self.aliases.iter().any(|a| a.code == code)
    }

    pub fn supports(&self, media_type: MediaType) -> bool {
        self.supported_media_types.contains(&media_type)
    }
}

/// Notification hooks. Every hook defaults to a no-op.
pub trait BidderHooks {
    /// Bids from this bidder missed the auction deadline.
    fn on_timeout(&self, _timeouts: &[TimeoutNotice]) {}

    /// A bid from this bidder won the auction.
    fn on_bid_won(&self, _bid: &InboundBid) {}

    /// Ad-server targeting was set for a bid from this bidder.
    fn on_set_targeting(&self, _bid: &InboundBid) {}

    /// The endpoint call failed. Observability only: recovery belongs to the host.
    fn on_bidder_error(&self, _notice: &BidderErrorNotice) {}
}

/// The operations the host drives during an auction round.
pub trait Bidder: BidderHooks + Send + Sync {
    fn spec(&self) -> &BidderSpec;

    fn is_bid_request_valid(&self, bid: &BidRequest) -> bool;

    fn build_requests(&self, bids: &[BidRequest], page: &PageContext) -> Vec<OutboundRequest>;

    fn interpret_response(
        &self,
        response: &ServerResponse,
        request: &BidRequest,
        page: &PageContext,
    ) -> Vec<InboundBid>;

    /// `usp_consent` is the US Privacy string; it is not encoded into sync URLs.
    fn get_user_syncs(
        &self,
        options: &SyncOptions,
        responses: &[ServerResponse],
        consent: &GdprConsent,
        usp_consent: Option<&str>,
    ) -> Vec<UserSync>;
}
