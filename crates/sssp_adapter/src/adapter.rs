use crate::bidder::{Bidder, BidderAlias, BidderHooks, BidderSpec, MediaType};
use crate::config::AdapterConfig;
use crate::sync::{self, GdprConsent, SyncOptions, UserSync};
use crate::types::{
    BidRequest, BidderErrorNotice, InboundBid, OutboundRequest, PageContext, ServerResponse,
    TimeoutNotice,
};
use crate::{request, response};
use tracing::{debug, error, info, warn};

pub const GVLID: u64 = 0;
pub const ALIAS_CODE: &str = "myAlias";
pub const ALIAS_GVLID: u64 = 99_999_999_999;

/// The SuperSSP bidder. Immutable after construction.
#[derive(Debug, Clone)]
pub struct SsspAdapter {
    config: AdapterConfig,
    spec: BidderSpec,
}

impl SsspAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        let spec = BidderSpec {
            code: config.bidder_code.clone(),
            gvlid: GVLID,
            supported_media_types: vec![MediaType::Banner, MediaType::Video, MediaType::Native],
            aliases: vec![BidderAlias {
                code: ALIAS_CODE.into(),
                gvlid: Some(ALIAS_GVLID),
            }],
        };
        Self { config, spec }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

impl Default for SsspAdapter {
    fn default() -> Self {
        Self::new(AdapterConfig::default())
    }
}

impl Bidder for SsspAdapter {
    fn spec(&self) -> &BidderSpec {
        &self.spec
    }

    fn is_bid_request_valid(&self, bid: &BidRequest) -> bool {
        request::is_bid_request_valid(bid)
    }

    fn build_requests(&self, bids: &[BidRequest], page: &PageContext) -> Vec<OutboundRequest> {
        let out = request::build_requests(bids, page, &self.config);
        debug!(bids = bids.len(), requests = out.len(), "built outbound requests");
        out
    }

    fn interpret_response(
        &self,
        response: &ServerResponse,
        request: &BidRequest,
        page: &PageContext,
    ) -> Vec<InboundBid> {
        response::interpret_response(response, request, page)
    }

    fn get_user_syncs(
        &self,
        options: &SyncOptions,
        responses: &[ServerResponse],
        consent: &GdprConsent,
        _usp_consent: Option<&str>,
    ) -> Vec<UserSync> {
        sync::get_user_syncs(options, responses, consent, &self.config.iframe_sync_url)
    }
}

impl BidderHooks for SsspAdapter {
    fn on_timeout(&self, timeouts: &[TimeoutNotice]) {
        for t in timeouts {
            warn!(
                bidder = %self.spec.code,
                bid_id = %t.bid_id,
                auction_id = %t.auction_id,
                timeout_ms = t.timeout,
                "bid timed out"
            );
        }
    }

    fn on_bid_won(&self, bid: &InboundBid) {
        info!(request_id = %bid.request_id, cpm = bid.cpm, currency = %bid.currency, "bid won");
    }

    fn on_set_targeting(&self, bid: &InboundBid) {
        debug!(request_id = %bid.request_id, "targeting set");
    }

    fn on_bidder_error(&self, notice: &BidderErrorNotice) {
        error!(
            bidder_request_id = %notice.bidder_request.bidder_request_id,
            error = %notice.error,
            "Failed on bidderRequestId:{}",
            notice.bidder_request.bidder_request_id
        );
    }
}
