//! Test helper functions and utilities

use salon_client::{ApiClient, Session};
use salon_core::types::TokenPair;
use serde_json::{Value, json};
use std::sync::{Arc, Once};
use wiremock::MockServer;

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Base URL of the mocked backend, shaped like the real `/api` prefix
pub fn api_base(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

/// Client pointed at `server` with a signed-out session
pub fn client_for(server: &MockServer) -> ApiClient {
    init_test_logging();
    ApiClient::new(api_base(server)).expect("Failed to create API client")
}

/// Client pointed at `server` holding the given tokens
pub fn signed_in_client(server: &MockServer, access: &str, refresh: &str) -> ApiClient {
    let session = Arc::new(Session::with_tokens(TokenPair {
        access: access.to_string(),
        refresh: refresh.to_string(),
    }));
    client_for(server).with_session(session)
}

/// Body the backend sends for an expired access token
pub fn expired_token_body() -> Value {
    json!({
        "detail": "Given token not valid for any token type",
        "code": "token_not_valid",
        "messages": [
            {
                "token_class": "AccessToken",
                "token_type": "access",
                "message": "Token is expired"
            }
        ]
    })
}
