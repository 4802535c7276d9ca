//! Collaborator contracts consumed by the store modules.
//!
//! The modules never talk HTTP themselves. They are generic over these traits,
//! so the app wires in the reqwest-backed clients from [`crate::http`] while
//! tests wire in scripted fakes.

use std::fmt::Display;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{Bid, User};

/// Why a collaborator call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The call itself did not complete (connectivity, upstream timeout, ...).
    #[error("Request failed: {0}")]
    Network(String),
    /// The call completed but its status reports failure.
    #[error("API returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },
    /// The call completed but the body could not be understood.
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn network(err: impl Display) -> Self {
        Self::Network(err.to_string())
    }

    pub fn decode(err: impl Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn http_status(status: u16) -> Self {
        Self::HttpStatus {
            status,
            message: "request failed".to_owned(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::HttpStatus { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Raw answer of the auction service to a bid submission, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub status: u16,
    #[serde(default)]
    pub data: Value,
}

impl SubmitResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    pub fn ok(data: Value) -> Self {
        Self::new(200, data)
    }
}

pub trait AuctionApi: Send + Sync + 'static {
    fn submit_clock_bid(&self, bid: &Bid) -> impl Future<Output = ApiResult<SubmitResponse>> + Send;
}

pub trait LoginApi: Send + Sync + 'static {
    /// Registered users, in the order the service lists them.
    fn get_registered_users(&self) -> impl Future<Output = ApiResult<Vec<User>>> + Send;
}

/// Validates a submission response and hands back its payload.
///
/// A response fails when its status is outside `2xx`, or when the payload is
/// an auction status envelope (`{"status": {"rc": .., "message": ..}}`) whose
/// return code is non-zero. Both surface as [`ApiError::HttpStatus`].
pub fn check_status(response: SubmitResponse) -> ApiResult<Value> {
    let SubmitResponse { status, data } = response;

    if !(200..300).contains(&status) {
        let message = envelope_message(&data)
            .or_else(|| data.as_str())
            .filter(|message| !message.is_empty())
            .unwrap_or("request failed")
            .to_owned();
        return Err(ApiError::HttpStatus { status, message });
    }

    if let Some(rc) = data.pointer("/status/rc").and_then(Value::as_i64)
        && rc != 0
    {
        let message = envelope_message(&data)
            .map_or_else(|| format!("return code {rc}"), ToOwned::to_owned);
        return Err(ApiError::HttpStatus { status, message });
    }

    Ok(data)
}

fn envelope_message(data: &Value) -> Option<&str> {
    data.pointer("/status/message").and_then(Value::as_str)
}
