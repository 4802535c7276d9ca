//! Bid module: the local log of bids the auction service accepted.
//!
//! `SubmitBid` sends a bid to the auction service, validates the answer with
//! [`check_status`], and only then commits `PushBid`. The log is append-only and
//! keeps the order in which submissions *completed*: when two submissions
//! overlap, the one whose call finishes first is appended first, regardless of
//! which was dispatched first.

use std::sync::Arc;

use bidboard_states::{Action, ActionCtx, ActionFuture, Module, ModuleDescriptor, Mutation};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ApiError, AuctionApi, check_status};

/// One auction bid. The payload is opaque to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bid(Value);

impl Bid {
    /// Captures any serializable value as a bid.
    ///
    /// Serializability is the only requirement; nothing inside is checked.
    pub fn new(payload: &impl Serialize) -> Result<Self, serde_json::Error> {
        serde_json::to_value(payload).map(Self)
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Bid {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Default)]
pub struct BidState {
    submitted_bids: Vec<Bid>,
}

/// The bid module, carrying the auction collaborator its actions call.
#[derive(Debug)]
pub struct BidModule<A> {
    auction: Arc<A>,
}

impl<A: AuctionApi> BidModule<A> {
    pub fn new(auction: A) -> Self {
        Self {
            auction: Arc::new(auction),
        }
    }

    pub fn auction(&self) -> &A {
        &self.auction
    }
}

impl<A: AuctionApi> Module for BidModule<A> {
    const NAME: &'static str = "bid";

    type State = BidState;
    type Getters<'a> = BidGetters<'a>;

    fn descriptor() -> ModuleDescriptor {
        ModuleDescriptor::namespaced(Self::NAME)
            .with_getters(&["submittedBids", "lastBid", "len", "isEmpty"])
            .with_actions(&[SubmitBid::NAME])
            .with_mutations(&[PushBid::NAME])
    }
}

/// Appends one accepted bid to the log.
#[derive(Debug)]
pub struct PushBid(pub Bid);

impl PushBid {
    pub const NAME: &'static str = "pushBid";
}

impl<A: AuctionApi> Mutation<BidModule<A>> for PushBid {
    const NAME: &'static str = Self::NAME;

    fn apply(self, state: &mut BidState) {
        state.submitted_bids.push(self.0);
    }
}

/// Submits a bid; appends it to the log once the service accepted it.
#[derive(Debug)]
pub struct SubmitBid {
    bid: Bid,
}

impl SubmitBid {
    pub const NAME: &'static str = "submitBid";

    pub fn new(bid: Bid) -> Self {
        Self { bid }
    }
}

impl<A: AuctionApi> Action<BidModule<A>> for SubmitBid {
    const NAME: &'static str = Self::NAME;

    type Error = ApiError;

    fn run(self, ctx: ActionCtx<BidModule<A>>) -> ActionFuture<ApiError> {
        let Self { bid } = self;
        Box::pin(async move {
            info!("{}: submitting clock bid", ctx.id());

            let response = ctx.module().auction().submit_clock_bid(&bid).await?;
            check_status(response)?;

            ctx.commit(PushBid(bid));
            Ok(())
        })
    }
}

/// Read-only views over [`BidState`].
#[derive(Debug, Clone, Copy)]
pub struct BidGetters<'a> {
    state: &'a BidState,
}

impl<'a> From<&'a BidState> for BidGetters<'a> {
    fn from(state: &'a BidState) -> Self {
        Self { state }
    }
}

impl<'a> BidGetters<'a> {
    /// Every accepted bid, oldest completion first.
    pub fn submitted_bids(&self) -> &'a [Bid] {
        &self.state.submitted_bids
    }

    pub fn last_bid(&self) -> Option<&'a Bid> {
        self.state.submitted_bids.last()
    }

    pub fn len(&self) -> usize {
        self.state.submitted_bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.submitted_bids.is_empty()
    }
}
