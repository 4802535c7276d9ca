use std::net::TcpListener;

use bidboard_business::{BusinessConfig, HttpBidModule, HttpUsersModule, build_http_store};
use bidboard_states::StateCtx;
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type Bids = HttpBidModule;
pub type Users = HttpUsersModule;

/// A store wired to a fresh mock server.
pub struct TestCtx {
    mock_server: MockServer,
    store: StateCtx,
}

impl TestCtx {
    pub async fn new() -> Self {
        let mock_server = MockServer::start().await;
        let config = BusinessConfig::new(mock_server.uri());
        let store = build_http_store(&config).expect("store should build");

        Self { mock_server, store }
    }

    pub fn store(&self) -> &StateCtx {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut StateCtx {
        &mut self.store
    }

    pub fn server(&self) -> &MockServer {
        &self.mock_server
    }

    /// Mounts a one-shot answer for the next bid submission.
    pub async fn mock_submit_bid(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/api/clock_auction/submitClockBid"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .up_to_n_times(1)
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    /// Mounts a one-shot answer for the next user listing.
    pub async fn mock_registered_users(&self, users: Value) {
        Mock::given(method("GET"))
            .and(path("/api/getRegisteredUsers"))
            .respond_with(ResponseTemplate::new(200).set_body_json(users))
            .up_to_n_times(1)
            .expect(1)
            .mount(&self.mock_server)
            .await;
    }

    #[allow(unused)]
    pub async fn mock_registered_users_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/getRegisteredUsers"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.mock_server)
            .await;
    }
}

/// A config pointing at a port nothing listens on.
#[allow(unused)]
pub fn unreachable_config() -> BusinessConfig {
    let listener = TcpListener::bind("127.0.0.1:0").expect("should bind an ephemeral port");
    let addr = listener.local_addr().expect("listener has an address");
    drop(listener);
    BusinessConfig::new(format!("http://{addr}"))
}
