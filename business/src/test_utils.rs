//! Scripted collaborators for exercising the store modules without a server.
//!
//! Each fake answers from a script prepared by the test. An optional delay per
//! answer lets tests overlap calls under Tokio's paused clock and control
//! which one completes first.
//!
//! ```ignore
//! let auction = ScriptedAuction::default()
//!     .respond_after(Duration::from_millis(80), 200, json!({}))
//!     .respond(500, json!(null));
//! ```

#![cfg(test)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Value, json};

use crate::{ApiError, ApiResult, AuctionApi, Bid, LoginApi, SubmitResponse, User};

#[derive(Debug)]
struct Scripted<T> {
    delay: Duration,
    outcome: ApiResult<T>,
}

impl<T> Scripted<T> {
    async fn play(self) -> ApiResult<T> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.outcome
    }
}

/// Auction fake. Answers are consumed in call order.
#[derive(Debug, Default)]
pub struct ScriptedAuction {
    script: Mutex<VecDeque<Scripted<SubmitResponse>>>,
}

impl ScriptedAuction {
    pub fn respond(self, status: u16, data: Value) -> Self {
        self.respond_after(Duration::ZERO, status, data)
    }

    pub fn respond_after(self, delay: Duration, status: u16, data: Value) -> Self {
        self.push(delay, Ok(SubmitResponse::new(status, data)))
    }

    pub fn fail(self, err: ApiError) -> Self {
        self.push(Duration::ZERO, Err(err))
    }

    fn push(self, delay: Duration, outcome: ApiResult<SubmitResponse>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted { delay, outcome });
        self
    }
}

impl AuctionApi for ScriptedAuction {
    async fn submit_clock_bid(&self, _bid: &Bid) -> ApiResult<SubmitResponse> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(scripted) => scripted.play().await,
            None => Err(ApiError::network("no scripted auction response")),
        }
    }
}

/// Login fake. Answers are consumed in call order.
#[derive(Debug, Default)]
pub struct ScriptedLogin {
    script: Mutex<VecDeque<Scripted<Vec<User>>>>,
}

impl ScriptedLogin {
    pub fn respond(self, users: Vec<User>) -> Self {
        self.respond_after(Duration::ZERO, users)
    }

    pub fn respond_after(self, delay: Duration, users: Vec<User>) -> Self {
        self.push(delay, Ok(users))
    }

    pub fn fail(self, err: ApiError) -> Self {
        self.push(Duration::ZERO, Err(err))
    }

    fn push(self, delay: Duration, outcome: ApiResult<Vec<User>>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted { delay, outcome });
        self
    }
}

impl LoginApi for ScriptedLogin {
    async fn get_registered_users(&self) -> ApiResult<Vec<User>> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(scripted) => scripted.play().await,
            None => Err(ApiError::network("no scripted login response")),
        }
    }
}

pub fn bid(item_id: &str, price: u32) -> Bid {
    Bid::from(json!({ "itemId": item_id, "price": price }))
}

pub fn user(id: &str, approle: &str, color: &str, avatar: &str) -> User {
    User {
        id: id.to_owned(),
        approle: approle.to_owned(),
        color: color.to_owned(),
        avatar: avatar.to_owned(),
    }
}
