//! Bid request validation and outbound request building.

use crate::config::AdapterConfig;
use crate::eids::{self, IdentityTable, ReconciliationCode};
use crate::types::{BidRequest, OutboundRequest, PageContext};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

pub const METHOD_POST: &str = "POST";

/// JavaScript truthiness of a host-supplied value.
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// A request is valid with a placement id, or with both member and
/// inventory code.
pub fn is_bid_request_valid(bid: &BidRequest) -> bool {
    let p = &bid.params;
    is_truthy(p.placement_id.as_ref())
        || (is_truthy(p.member.as_ref()) && is_truthy(p.inv_code.as_ref()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestPayload<'a> {
    sssp_uid: &'a str,
    ad_unit_code: &'a str,
    auction_id: &'a str,
    bid_id: &'a str,
    media_type: BannerOnly<'a>,
    site: Site<'a>,
    device: Device,
    pub_provided_ids: &'a IdentityTable,
    tdid_repetition: ReconciliationCode,
}

// Only banner is forwarded even though video and native are registered.
#[derive(Debug, Serialize)]
struct BannerOnly<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    banner: Option<&'a Value>,
}

#[derive(Debug, Serialize)]
struct Site<'a> {
    page: &'a str,
    domain: &'a str,
    publisher: Publisher<'a>,
}

#[derive(Debug, Serialize)]
struct Publisher<'a> {
    domain: &'a str,
}

#[derive(Debug, Serialize)]
struct Device {
    w: u32,
    h: u32,
}

/// Serialize the endpoint payload for one bid request.
pub fn build_payload(bid: &BidRequest, page: &PageContext) -> crate::Result<String> {
    let ids = eids::normalize(bid.user_id_as_eids.as_ref());
    let repetition = eids::reconcile(&ids);
    let payload = RequestPayload {
        sssp_uid: &bid.bidder_request_id,
        ad_unit_code: &bid.ad_unit_code,
        auction_id: &bid.auction_id,
        bid_id: &bid.bid_id,
        media_type: BannerOnly {
            banner: bid.media_types.banner.as_ref(),
        },
        site: Site {
            page: &page.page,
            domain: &page.domain,
            publisher: Publisher {
                domain: &page.domain,
            },
        },
        device: Device {
            w: page.width,
            h: page.height,
        },
        pub_provided_ids: &ids,
        tdid_repetition: repetition,
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Build one POST per valid bid request; invalid requests produce nothing.
pub fn build_requests(
    bids: &[BidRequest],
    page: &PageContext,
    config: &AdapterConfig,
) -> Vec<OutboundRequest> {
    bids.iter()
        .filter(|bid| {
            let valid = is_bid_request_valid(bid);
            if !valid {
                debug!(bid_id = %bid.bid_id, "skipping bid request without placement or member/invCode");
            }
            valid
        })
        .filter_map(|bid| match build_payload(bid, page) {
            Ok(data) => Some(OutboundRequest {
                method: METHOD_POST.into(),
                url: config.endpoint_url.clone(),
                data,
            }),
            Err(e) => {
                warn!(bid_id = %bid.bid_id, error = %e, "failed to serialize bid payload");
                None
            }
        })
        .collect()
}
