//! SuperSSP bidder adapter.
//!
//! Translates the host auction's bid requests into POSTs for the SuperSSP
//! endpoint and maps its responses back into host bids. The host owns
//! transport, timing and consent aggregation; everything here is a pure
//! transformation over the inputs it is handed.
//!
//! # Flow
//!
//! ```text
//! host bid requests + PageContext
//!   │
//!   ▼  is_bid_request_valid / build_requests
//! OutboundRequest { POST, endpoint, payload }
//!   │        payload.pubProvidedIds = eids::normalize(userIdAsEids)
//!   │        payload.tdidRepetition = eids::reconcile(..)
//!   ▼  (transport, owned by the host)
//! ServerResponse
//!   │
//!   ▼  interpret_response / get_user_syncs
//! InboundBid[], UserSync[]
//! ```

pub mod adapter;
pub mod bidder;
pub mod config;
pub mod eids;
pub mod error;
pub mod request;
pub mod response;
pub mod sync;
pub mod types;

#[cfg(test)]
mod test_support;

pub use adapter::SsspAdapter;
pub use bidder::{Bidder, BidderHooks, BidderSpec, MediaType};
pub use config::AdapterConfig;
pub use eids::{IdentityTable, ReconciliationCode};
pub use error::{AdapterError, Result};
pub use sync::{GdprConsent, SyncOptions, SyncType, UserSync};
pub use types::{BidRequest, InboundBid, OutboundRequest, PageContext, ServerResponse};
