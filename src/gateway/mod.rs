//! The seam between the simulator and the ranking service.
//!
//! The engine only needs three things from the service: accept an item,
//! accept a vote event, and show a ranked page. Any transport that can do
//! those implements [`Gateway`]:
//! - [`HttpGateway`] talks to a live service over HTTP
//! - [`InMemoryGateway`] stands in for the service in tests and dry runs

mod http;
mod memory;

use std::future::Future;

pub use http::HttpGateway;
pub use memory::InMemoryGateway;

use crate::error::GatewayError;
use crate::model::{Item, PageId, ScoredItem, VoteEvent};

/// Client-side contract of the ranking service.
///
/// Submissions return `Ok(())` only when the service confirmed them. A
/// rejection or transport failure is an `Err`, never a panic, so the caller
/// can decide to carry on.
pub trait Gateway {
    /// Submits a new item.
    fn post_item(&self, item: &Item) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Submits a vote event.
    fn post_vote_event(
        &self,
        vote_event: &VoteEvent,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Fetches the current ranking snapshot of `page`, best first.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::MalformedRanking` if the service answered with
    /// something other than a sequence of scored items.
    fn get_ranking(
        &self,
        page: PageId,
    ) -> impl Future<Output = Result<Vec<ScoredItem>, GatewayError>> + Send;
}

/// Path of the item submission endpoint.
pub const ITEMS_ENDPOINT: &str = "/items";

/// Path of the vote-event submission endpoint.
pub const VOTE_EVENTS_ENDPOINT: &str = "/vote_events";
