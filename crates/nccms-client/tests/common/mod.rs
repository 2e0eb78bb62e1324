//! Shared fixtures for the client integration tests

#![allow(dead_code, clippy::unwrap_used)]

use nccms_client::{CmsClient, MemoryTokenStore, TokenStore};
use nccms_core::{ApiConfig, Session};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::{Match, MockServer, Request};

/// Matches requests sent without an `Authorization` header
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

/// Session holding the given tokens
pub fn session(access: Option<&str>, refresh: Option<&str>) -> Session {
    Session {
        access_token: access.map(str::to_string),
        refresh_token: refresh.map(str::to_string),
        remembered_username: Some("editor".to_string()),
    }
}

/// Client pointed at the mock server, sharing an in-memory store with the test
pub fn client_for(server: &MockServer, session: Session) -> (CmsClient, Arc<dyn TokenStore>) {
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::with_session(session));
    let api = ApiConfig::with_base_url(server.uri());
    let client = CmsClient::new(api, Arc::clone(&store)).unwrap();
    (client, store)
}

/// Hero record as the CMS returns it
pub fn hero_json(id: i64, title: &str, is_active: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "subtitle": null,
        "cta_primary_label": "Learn more",
        "cta_primary_href": "/about",
        "cta_secondary_label": null,
        "cta_secondary_href": null,
        "bg_type": "pattern",
        "bg_media_url": null,
        "is_active": is_active,
        "updated_at": "2024-06-01T09:30:00Z"
    })
}

/// Heroes A (active), B and C
pub fn three_heroes() -> Value {
    json!([
        hero_json(1, "A", true),
        hero_json(2, "B", false),
        hero_json(3, "C", false)
    ])
}
