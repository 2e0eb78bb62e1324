//! HTTP client for the NexusCouncil CMS API

use crate::auth::AuthenticatedExecutor;
use crate::error::{ClientError, ClientResult};
use crate::refresh::{RefreshOutcome, SessionRefresher, TokenRefresher};
use crate::store::{TokenStore, open_store};
use futures::future::try_join_all;
use nccms_core::{ApiConfig, Config, Hero, ResourceKind, TokenKind, collection_records};
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// API client for the CMS collection and token endpoints
#[derive(Debug, Clone)]
pub struct CmsClient {
    http: Client,
    api: ApiConfig,
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
    executor: AuthenticatedExecutor,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: Option<String>,
    refresh: Option<String>,
}

impl CmsClient {
    /// Create a client for `api`, keeping the session in `store`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api: ApiConfig, store: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = Self::http_client(&api)?;

        let refresher: Arc<dyn TokenRefresher> = Arc::new(SessionRefresher::new(
            http.clone(),
            api.refresh_url(),
            Arc::clone(&store),
        ));
        Ok(Self::assemble(http, api, store, refresher))
    }

    /// Create a client that renews tokens with `refresher` instead of the
    /// configured refresh endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_refresher(
        api: ApiConfig,
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> ClientResult<Self> {
        let http = Self::http_client(&api)?;
        Ok(Self::assemble(http, api, store, refresher))
    }

    fn http_client(api: &ApiConfig) -> ClientResult<Client> {
        Ok(Client::builder()
            .timeout(api.request_timeout())
            .connect_timeout(api.connect_timeout())
            .user_agent(concat!("nccms/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }

    fn assemble(
        http: Client,
        api: ApiConfig,
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        let executor = AuthenticatedExecutor::new(Arc::clone(&store), Arc::clone(&refresher));
        Self {
            http,
            api,
            store,
            refresher,
            executor,
        }
    }

    /// Create a client from the loaded configuration, opening the configured store
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> ClientResult<Self> {
        Self::new(config.api.clone(), open_store(&config.session))
    }

    /// API endpoints in use
    #[must_use]
    pub const fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// Session token store
    #[must_use]
    pub const fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Whether an access token is currently stored
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.get(TokenKind::Access).is_some()
    }

    /// Obtain a token pair and persist it
    ///
    /// With `remember` the username is kept for the next login prompt,
    /// otherwise any remembered username is forgotten.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::LoginFailed`] for refused credentials, an
    /// unreachable server or a response without both tokens.
    pub async fn login(&self, username: &str, password: &str, remember: bool) -> ClientResult<()> {
        let url = self.api.token_url();
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await
            .map_err(|e| ClientError::LoginFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::LoginFailed {
                reason: format!("token endpoint returned HTTP {}", status.as_u16()),
            });
        }

        let pair: TokenPair = response.json().await.map_err(|e| ClientError::LoginFailed {
            reason: format!("unreadable token response: {e}"),
        })?;
        let (Some(access), Some(refresh)) = (
            pair.access.filter(|t| !t.is_empty()),
            pair.refresh.filter(|t| !t.is_empty()),
        ) else {
            return Err(ClientError::LoginFailed {
                reason: "missing tokens in response".to_string(),
            });
        };

        self.store.set(TokenKind::Access, &access)?;
        self.store.set(TokenKind::Refresh, &refresh)?;
        if remember {
            self.store.set(TokenKind::RememberedUsername, username)?;
        } else {
            self.store.remove(TokenKind::RememberedUsername)?;
        }

        info!(username, remember, "Logged in");
        Ok(())
    }

    /// Forget both tokens; the remembered username survives
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn logout(&self) -> ClientResult<()> {
        self.store.clear_tokens()?;
        info!("Logged out");
        Ok(())
    }

    /// Run the refresh routine on demand
    ///
    /// # Errors
    ///
    /// Returns an error only if the store cannot be written.
    pub async fn refresh_session(&self) -> ClientResult<RefreshOutcome> {
        self.refresher.refresh().await
    }

    /// Send one request and decode its JSON body
    ///
    /// Empty success bodies (e.g. 204 after DELETE) decode as `Value::Null`.
    ///
    /// # Errors
    ///
    /// Maps 401, 404 and 400 onto their dedicated variants and any other
    /// non-success status onto [`ClientError::Api`].
    pub async fn request_json(
        &self,
        method: Method,
        url: &str,
        token: Option<String>,
        body: Option<&Value>,
    ) -> ClientResult<Value> {
        debug!(%method, url, authenticated = token.is_some(), "CMS request");

        let mut request = self.http.request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null);
            return Err(status_error(status, url, &body));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::MalformedResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Collection contents; falls back to an unauthenticated read when the
    /// session cannot be refreshed
    ///
    /// # Errors
    ///
    /// Returns an error if both the authenticated and public reads fail.
    pub async fn list(&self, kind: ResourceKind) -> ClientResult<Value> {
        let url = self.api.collection_url(kind.path());
        let url = url.as_str();
        self.executor
            .execute_with_fallback(
                |token| self.request_json(Method::GET, url, token, None),
                || self.request_json(Method::GET, url, None, None),
            )
            .await
    }

    /// One record; falls back to an unauthenticated read like [`Self::list`]
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for a missing record.
    pub async fn fetch(&self, kind: ResourceKind, id: i64) -> ClientResult<Value> {
        let url = self.api.item_url(kind.path(), id);
        let url = url.as_str();
        self.executor
            .execute_with_fallback(
                |token| self.request_json(Method::GET, url, token, None),
                || self.request_json(Method::GET, url, None, None),
            )
            .await
    }

    /// Create a record
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the server rejects the payload.
    pub async fn create(&self, kind: ResourceKind, payload: &Value) -> ClientResult<Value> {
        let url = self.api.collection_url(kind.path());
        let url = url.as_str();
        let created = self
            .executor
            .execute(|token| self.request_json(Method::POST, url, token, Some(payload)))
            .await?;
        info!(resource = %kind, "Record created");
        Ok(created)
    }

    /// Partially update a record
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when the server rejects the payload.
    pub async fn update(&self, kind: ResourceKind, id: i64, payload: &Value) -> ClientResult<Value> {
        let url = self.api.item_url(kind.path(), id);
        let url = url.as_str();
        let updated = self
            .executor
            .execute(|token| self.request_json(Method::PATCH, url, token, Some(payload)))
            .await?;
        info!(resource = %kind, id, "Record updated");
        Ok(updated)
    }

    /// Delete a record
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, kind: ResourceKind, id: i64) -> ClientResult<()> {
        let url = self.api.item_url(kind.path(), id);
        let url = url.as_str();
        self.executor
            .execute(|token| self.request_json(Method::DELETE, url, token, None))
            .await?;
        info!(resource = %kind, id, "Record deleted");
        Ok(())
    }

    /// All hero sections; records that do not decode as heroes are skipped
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read.
    pub async fn list_heroes(&self) -> ClientResult<Vec<Hero>> {
        let data = self.list(ResourceKind::Hero).await?;
        let heroes = collection_records(&data)
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Hero>(record) {
                Ok(hero) => Some(hero),
                Err(e) => {
                    warn!(error = %e, "Skipping undecodable hero record");
                    None
                }
            })
            .collect();
        Ok(heroes)
    }

    /// One hero section
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] for an unknown id.
    pub async fn get_hero(&self, id: i64) -> ClientResult<Hero> {
        let data = self.fetch(ResourceKind::Hero, id).await?;
        Ok(serde_json::from_value(data)?)
    }

    /// Push every hero's `is_active` flag as one wrapped operation
    ///
    /// The patches are issued concurrently; the operation fails if any of
    /// them fails and is retried as a whole after a refresh.
    ///
    /// # Errors
    ///
    /// Returns the first failing patch's error.
    pub async fn set_active_flags(&self, heroes: &[Hero]) -> ClientResult<()> {
        self.executor
            .execute(|token| {
                let patches: Vec<_> = heroes
                    .iter()
                    .map(|hero| self.patch_active(hero, token.clone()))
                    .collect();
                async move { try_join_all(patches).await.map(|_| ()) }
            })
            .await?;
        info!(count = heroes.len(), "Hero active flags updated");
        Ok(())
    }

    async fn patch_active(&self, hero: &Hero, token: Option<String>) -> ClientResult<Value> {
        let url = self.api.item_url(ResourceKind::Hero.path(), hero.id);
        let body = serde_json::json!({ "is_active": hero.is_active });
        self.request_json(Method::PATCH, &url, token, Some(&body)).await
    }
}

/// First human-readable message in a Django REST error body
///
/// Tries `detail`, then `non_field_errors[0]`, then the first field's first
/// message. Returns the field name alongside field-level messages.
#[must_use]
pub fn extract_error_detail(body: &Value) -> Option<(Option<String>, String)> {
    let map = body.as_object()?;

    if let Some(detail) = map.get("detail").and_then(Value::as_str) {
        return Some((None, detail.to_string()));
    }
    if let Some(first) = map
        .get("non_field_errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(Value::as_str)
    {
        return Some((None, first.to_string()));
    }

    map.iter().find_map(|(field, messages)| {
        let message = match messages {
            Value::Array(items) => items.first().and_then(Value::as_str),
            Value::String(text) => Some(text.as_str()),
            _ => None,
        }?;
        Some((Some(field.clone()), message.to_string()))
    })
}

fn status_error(status: StatusCode, url: &str, body: &Value) -> ClientError {
    let reason = || {
        status
            .canonical_reason()
            .unwrap_or("Unknown status")
            .to_string()
    };

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized {
            url: url.to_string(),
        },
        StatusCode::NOT_FOUND => ClientError::NotFound {
            resource: url.to_string(),
        },
        StatusCode::BAD_REQUEST => {
            let (field, message) = extract_error_detail(body).unwrap_or_else(|| (None, reason()));
            ClientError::Validation { field, message }
        }
        _ => ClientError::Api {
            status: status.as_u16(),
            message: extract_error_detail(body).map_or_else(reason, |(_, message)| message),
        },
    }
}
