//! reqwest-backed collaborators.
//!
//! Both clients only move bytes: they report transport failures as
//! [`ApiError::Network`] and hand everything else to the caller. Judging a bid
//! submission is left to [`crate::check_status`]; the user listing has no
//! envelope, so a non-2xx answer is an error right here.

use log::debug;
use serde_json::Value;

use crate::{ApiError, ApiResult, AuctionApi, Bid, BusinessConfig, LoginApi, SubmitResponse, User};

#[derive(Debug, Clone)]
pub struct HttpAuctionApi {
    client: reqwest::Client,
    config: BusinessConfig,
}

impl HttpAuctionApi {
    pub fn with_client(client: reqwest::Client, config: BusinessConfig) -> Self {
        Self { client, config }
    }

    fn submit_url(&self) -> String {
        format!("{}/clock_auction/submitClockBid", self.config.api_url())
    }
}

impl AuctionApi for HttpAuctionApi {
    /// POST `/api/clock_auction/submitClockBid` with the bid as body.
    async fn submit_clock_bid(&self, bid: &Bid) -> ApiResult<SubmitResponse> {
        let url = self.submit_url();
        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(bid)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(ApiError::network)?;

        // Error pages are often not JSON; keep them as text so the status
        // check can still report them.
        let data = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()))
        };

        Ok(SubmitResponse { status, data })
    }
}

#[derive(Debug, Clone)]
pub struct HttpLoginApi {
    client: reqwest::Client,
    config: BusinessConfig,
}

impl HttpLoginApi {
    pub fn with_client(client: reqwest::Client, config: BusinessConfig) -> Self {
        Self { client, config }
    }

    fn users_url(&self) -> String {
        format!("{}/getRegisteredUsers", self.config.api_url())
    }
}

impl LoginApi for HttpLoginApi {
    /// GET `/api/getRegisteredUsers`, a JSON array of users.
    async fn get_registered_users(&self) -> ApiResult<Vec<User>> {
        let url = self.users_url();
        debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ApiError::network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::http_status(status.as_u16()));
        }

        response
            .json::<Vec<User>>()
            .await
            .map_err(ApiError::decode)
    }
}
