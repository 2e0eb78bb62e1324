//! Session refresh routine
//!
//! Exchanges the stored refresh token for a new access token. The routine
//! fails closed: any remote outcome other than a fresh access token clears
//! both stored credentials. A store that cannot be written is an error.

use crate::error::ClientResult;
use crate::store::TokenStore;
use async_trait::async_trait;
use nccms_core::TokenKind;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new access token was stored
    Refreshed,
    /// No refresh token was stored; no request was made
    MissingRefreshToken,
    /// The server answered with a non-success status
    Rejected {
        /// HTTP status code
        status: u16,
    },
    /// The server answered 2xx without a usable `access` field
    Malformed,
    /// The request never got a response
    Unreachable,
}

impl RefreshOutcome {
    /// Whether a new access token is now stored
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Refreshed)
    }
}

impl fmt::Display for RefreshOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refreshed => write!(f, "access token refreshed"),
            Self::MissingRefreshToken => write!(f, "no refresh token stored"),
            Self::Rejected { status } => write!(f, "refresh rejected with HTTP {status}"),
            Self::Malformed => write!(f, "refresh response carried no access token"),
            Self::Unreachable => write!(f, "refresh endpoint unreachable"),
        }
    }
}

/// Anything able to renew the access token
#[async_trait]
pub trait TokenRefresher: Send + Sync + fmt::Debug {
    /// Attempt one refresh
    ///
    /// Only store failures are reported as errors; every remote failure is a
    /// non-success [`RefreshOutcome`].
    async fn refresh(&self) -> ClientResult<RefreshOutcome>;
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}

/// Refresh routine talking to the token refresh endpoint
#[derive(Debug, Clone)]
pub struct SessionRefresher {
    http: reqwest::Client,
    refresh_url: String,
    store: Arc<dyn TokenStore>,
}

impl SessionRefresher {
    /// Create a refresher posting to `refresh_url`
    #[must_use]
    pub fn new(http: reqwest::Client, refresh_url: String, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            refresh_url,
            store,
        }
    }

    async fn exchange(&self, refresh_token: &str) -> ClientResult<RefreshOutcome> {
        let response = match self
            .http
            .post(&self.refresh_url)
            .json(&serde_json::json!({ "refresh": refresh_token }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %self.refresh_url, error = %e, "Token refresh request failed");
                return Ok(RefreshOutcome::Unreachable);
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(RefreshOutcome::Rejected {
                status: status.as_u16(),
            });
        }

        match response.json::<RefreshResponse>().await {
            Ok(RefreshResponse {
                access: Some(access),
            }) if !access.is_empty() => {
                self.store.set(TokenKind::Access, &access)?;
                Ok(RefreshOutcome::Refreshed)
            }
            _ => Ok(RefreshOutcome::Malformed),
        }
    }
}

#[async_trait]
impl TokenRefresher for SessionRefresher {
    async fn refresh(&self) -> ClientResult<RefreshOutcome> {
        let outcome = match self.store.get(TokenKind::Refresh) {
            Some(refresh_token) => self.exchange(&refresh_token).await?,
            None => RefreshOutcome::MissingRefreshToken,
        };

        if outcome.is_success() {
            info!("Access token refreshed");
        } else {
            warn!(%outcome, "Session refresh failed, clearing stored tokens");
            self.store.clear_tokens()?;
        }

        Ok(outcome)
    }
}
