//! HTTP client for the salon booking backend
//!
//! Every authenticated request attaches the bearer token of the shared
//! [`Session`]. On an expired-token 401 the session is refreshed once and the
//! request replayed once.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use salon_core::{
    config::ApiConfig,
    types::{AccessToken, LoginRequest, TokenPair},
};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::{
    error::{ClientError, ClientResult, ErrorBody},
    session::Session,
};

const LOGIN_PATH: &str = "/auth/jwt/create/";
const REFRESH_PATH: &str = "/auth/jwt/refresh/";

/// API client for the salon booking backend
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client with the default timeout and a fresh session
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::build(base_url.into(), ApiConfig::default().timeout())
    }

    /// Create a client from the `api` configuration section
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> ClientResult<Self> {
        Self::build(config.normalized_base_url().to_string(), config.timeout())
    }

    fn build(base_url: String, timeout: Duration) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: Arc::new(Session::new()),
        })
    }

    /// Share an existing session
    #[must_use]
    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = session;
        self
    }

    /// The session used by this client
    #[must_use]
    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Base URL without trailing slash
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) const fn http(&self) -> &Client {
        &self.http
    }

    /// Exchange credentials for a token pair and store it in the session
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for malformed credentials (nothing
    /// is sent), or the backend error when the login is rejected.
    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<TokenPair> {
        credentials.validate()?;

        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(credentials)
            .send()
            .await?;
        let tokens: TokenPair = Self::decode(response).await?;

        self.session.set_tokens(tokens.clone()).await;
        info!(email = %credentials.email, "Signed in");
        Ok(tokens)
    }

    /// Forget the current tokens
    pub async fn logout(&self) {
        self.session.clear().await;
        info!("Signed out");
    }

    /// Send a request built by `build`, refreshing the session once if the
    /// access token has expired
    ///
    /// `build` is called again for the replay, so it must produce the same
    /// request each time.
    pub(crate) async fn execute<T, F>(&self, build: F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let token = self.session.access_token().await;
        let response = Self::dispatch(&build, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::decode(response).await;
        }

        let path = response.url().path().to_string();
        let body = response.bytes().await?;
        if !ErrorBody::parse(&body).is_token_expired() {
            return Err(ClientError::from_response(
                StatusCode::UNAUTHORIZED,
                &path,
                &body,
            ));
        }

        debug!(path = %path, "Access token expired, refreshing");
        let fresh = self.refresh_access_token(token.as_deref()).await?;
        let retried = Self::dispatch(&build, Some(&fresh)).await?;
        Self::decode(retried).await
    }

    async fn dispatch<F>(build: &F, token: Option<&str>) -> ClientResult<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut request = build();
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// Obtain a usable access token after `stale` was rejected
    ///
    /// Callers queue on the session's refresh lock. Whoever finds the access
    /// token still equal to `stale` performs the refresh; later callers pick
    /// up the token it stored.
    async fn refresh_access_token(&self, stale: Option<&str>) -> ClientResult<String> {
        let _guard = self.session.lock_refresh().await;

        if let Some(current) = self.session.access_token().await
            && Some(current.as_str()) != stale
        {
            debug!("Access token already refreshed by another request");
            return Ok(current);
        }

        let Some(refresh) = self.session.refresh_token().await else {
            self.session.clear().await;
            warn!("No refresh token held, session cleared");
            return Err(ClientError::unauthorized("session expired"));
        };

        match self.request_access_token(&refresh).await {
            Ok(AccessToken { access }) => {
                self.session.set_access_token(access.clone()).await;
                info!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                self.session.clear().await;
                warn!(error = %e, "Token refresh failed, session cleared");
                Err(ClientError::unauthorized(format!("token refresh failed: {e}")))
            }
        }
    }

    async fn request_access_token(&self, refresh: &str) -> ClientResult<AccessToken> {
        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await?;
        Self::decode(response).await
    }

    /// Turn a response into `T`, mapping non-success statuses to errors
    pub(crate) async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        let path = response.url().path().to_string();
        let body = response.bytes().await?;

        if !status.is_success() {
            debug!(path = %path, status = status.as_u16(), "Backend returned an error");
            return Err(ClientError::from_response(status, &path, &body));
        }

        serde_json::from_slice(&body)
            .map_err(|e| ClientError::invalid_response(format!("{path}: {e}")))
    }
}
