//! In-memory authentication session
//!
//! One [`Session`] is shared by `Arc` between every clone of the client. The
//! token pair sits behind an async `RwLock`; a separate async `Mutex` makes
//! sure at most one token refresh is in flight at a time.

use salon_core::types::TokenPair;
use std::fmt;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

#[derive(Clone, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

impl fmt::Debug for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokens")
            .field("access", &self.access.as_ref().map(|_| "<redacted>"))
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Tokens of the signed-in operator
#[derive(Debug, Default)]
pub struct Session {
    tokens: RwLock<Tokens>,
    refresh_guard: Mutex<()>,
}

impl Session {
    /// An empty, signed-out session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session holding an existing token pair
    #[must_use]
    pub fn with_tokens(pair: TokenPair) -> Self {
        Self {
            tokens: RwLock::new(Tokens {
                access: Some(pair.access),
                refresh: Some(pair.refresh),
            }),
            refresh_guard: Mutex::new(()),
        }
    }

    /// Current access token
    pub async fn access_token(&self) -> Option<String> {
        self.tokens.read().await.access.clone()
    }

    /// Current refresh token
    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens.read().await.refresh.clone()
    }

    /// Whether an access token is held
    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.access.is_some()
    }

    /// Replace both tokens, e.g. after login
    pub async fn set_tokens(&self, pair: TokenPair) {
        let mut tokens = self.tokens.write().await;
        tokens.access = Some(pair.access);
        tokens.refresh = Some(pair.refresh);
        debug!("Session tokens stored");
    }

    /// Replace the access token, keeping the refresh token
    pub async fn set_access_token(&self, access: String) {
        self.tokens.write().await.access = Some(access);
    }

    /// Drop both tokens
    pub async fn clear(&self) {
        *self.tokens.write().await = Tokens::default();
        debug!("Session cleared");
    }

    /// Wait for exclusive right to refresh the access token
    pub(crate) async fn lock_refresh(&self) -> MutexGuard<'_, ()> {
        self.refresh_guard.lock().await
    }
}
