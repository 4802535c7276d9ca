//! Store modules of the bid board: the bid log and the registered users.
//!
//! Both modules are registered into a [`bidboard_states::StateCtx`] by
//! [`build_store`]. Their collaborators are the [`AuctionApi`] and
//! [`LoginApi`] traits; [`HttpAuctionApi`] and [`HttpLoginApi`] implement them
//! over reqwest.

mod api;
mod bid;
mod config;
mod http;
mod store;
mod test_utils;
mod users;

pub use api::{ApiError, ApiResult, AuctionApi, LoginApi, SubmitResponse, check_status};
pub use bid::{Bid, BidGetters, BidModule, BidState, PushBid, SubmitBid};
pub use config::{BusinessConfig, ConfigError, DEFAULT_API_BASE_URL};
pub use http::{HttpAuctionApi, HttpLoginApi};
pub use store::{HttpBidModule, HttpUsersModule, build_http_store, build_store};
pub use users::{EMPTY_USER, FetchUsers, SetUsers, User, UsersGetters, UsersModule, UsersState};
