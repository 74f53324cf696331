//! Integration tests for login and token refresh

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

mod common;

use common::*;
use futures::future::join_all;
use pretty_assertions::assert_eq;
use salon_client::ClientError;
use salon_core::types::{AppointmentFilters, LoginRequest};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

async fn mount_list(server: &MockServer, token: &str, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(AppointmentFixtures::single_page(
            vec![AppointmentFixtures::booked(
                1,
                "2024-03-15",
                "09:00:00",
                "2024-03-14T10:00:00Z",
            )],
        )))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_expired(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .and(header("authorization", format!("Bearer {token}").as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(expired_token_body()))
        .mount(server)
        .await;
}

/// Login stores the issued tokens and later requests carry them
#[tokio::test]
async fn test_login_stores_tokens() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .and(body_json(json!({
            "email": "owner@salon.example",
            "password": "hunter2"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, "a1", 1).await;

    let tokens = client
        .login(&LoginRequest {
            email: "owner@salon.example".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(tokens.access, "a1");
    assert!(client.session().is_authenticated().await);

    let page = client
        .list_appointments(&AppointmentFilters::default())
        .await
        .unwrap();
    assert_eq!(page.results.len(), 1);
}

/// Rejected credentials surface the backend's detail
#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/create/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&server)
        .await;

    let err = client
        .login(&LoginRequest {
            email: "owner@salon.example".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("No active account"));
    assert!(!client.session().is_authenticated().await);
}

/// An expired token is refreshed once and the request replayed with the new token
#[tokio::test]
async fn test_expired_token_is_refreshed_and_retried() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "stale", "r1");

    mount_expired(&server, "stale").await;
    mount_list(&server, "fresh", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .list_appointments(&AppointmentFilters::default())
        .await
        .unwrap();

    assert_eq!(page.count, 1);
    assert_eq!(
        client.session().access_token().await.as_deref(),
        Some("fresh")
    );
    assert_eq!(
        client.session().refresh_token().await.as_deref(),
        Some("r1")
    );
}

/// Concurrent requests hitting an expired token share a single refresh
#[tokio::test]
async fn test_concurrent_requests_refresh_once() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "stale", "r1");

    mount_expired(&server, "stale").await;
    mount_list(&server, "fresh", 8).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let filters = AppointmentFilters::default();
    let results = join_all((0..8).map(|_| client.list_appointments(&filters))).await;

    assert!(results.iter().all(Result::is_ok));
    server.verify().await;
}

/// A failed refresh clears the session and reports an authentication error
#[tokio::test]
async fn test_failed_refresh_clears_session() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "stale", "revoked");

    mount_expired(&server, "stale").await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is blacklisted",
            "code": "token_not_valid"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .list_appointments(&AppointmentFilters::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized { .. }));
    assert!(!client.session().is_authenticated().await);
    assert!(client.session().refresh_token().await.is_none());
}

/// Without a refresh token the session is cleared and nothing is sent to the refresh endpoint
#[tokio::test]
async fn test_missing_refresh_token() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "stale", "r1");
    client.session().clear().await;
    client
        .session()
        .set_access_token("stale".to_string())
        .await;

    mount_expired(&server, "stale").await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .list_appointments(&AppointmentFilters::default())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!client.session().is_authenticated().await);
}

/// A 401 that is not about token expiry does not trigger a refresh
#[tokio::test]
async fn test_other_unauthorized_is_not_refreshed() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/appointments/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Authentication credentials were not provided."
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .list_appointments(&AppointmentFilters::default())
        .await
        .unwrap_err();

    assert!(
        matches!(&err, ClientError::Unauthorized { message } if message.contains("not provided"))
    );
}

/// The replayed request is not retried a second time
#[tokio::test]
async fn test_retry_happens_only_once() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "stale", "r1");

    mount_expired(&server, "stale").await;
    mount_expired(&server, "fresh").await;
    Mock::given(method("POST"))
        .and(path("/api/auth/jwt/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .list_appointments(&AppointmentFilters::default())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
}
