//! Login, logout and dashboard aggregation against a mock CMS

#![allow(clippy::unwrap_used)]

mod common;

use chrono::{TimeZone, Utc};
use common::{client_for, hero_json, session};
use nccms_client::views::Dashboard;
use nccms_client::{ClientError, CmsClient, FileTokenStore, TokenStore};
use nccms_core::{ApiConfig, FixedClock, ResourceKind, Session, TokenKind};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_token_endpoint(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .and(body_json(json!({"username": "editor", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_stores_tokens_and_remembers_username() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, json!({"access": "a1", "refresh": "r1"})).await;

    let (client, store) = client_for(&server, Session::default());
    client.login("editor", "s3cret", true).await.unwrap();

    assert!(client.is_authenticated());
    assert_eq!(
        store.session(),
        Session {
            access_token: Some("a1".to_string()),
            refresh_token: Some("r1".to_string()),
            remembered_username: Some("editor".to_string()),
        }
    );

    client.logout().unwrap();
    assert!(!client.is_authenticated());
    assert_eq!(store.get(TokenKind::RememberedUsername).as_deref(), Some("editor"));
}

#[tokio::test]
async fn login_without_remember_forgets_username() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, json!({"access": "a1", "refresh": "r1"})).await;

    let (client, store) = client_for(&server, session(None, None));
    client.login("editor", "s3cret", false).await.unwrap();

    assert_eq!(store.get(TokenKind::RememberedUsername), None);
}

#[tokio::test]
async fn login_requires_both_tokens() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, json!({"access": "a1"})).await;

    let (client, store) = client_for(&server, Session::default());
    let err = client.login("editor", "s3cret", true).await.unwrap_err();

    assert!(matches!(err, ClientError::LoginFailed { .. }));
    assert_eq!(store.session(), Session::default());
}

#[tokio::test]
async fn refused_credentials_fail_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "No active account found with the given credentials"})),
        )
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, Session::default());
    let err = client.login("editor", "wrong", false).await.unwrap_err();

    assert_eq!(err.user_message(), "Invalid credentials or server unreachable.");
}

#[tokio::test]
async fn file_session_survives_new_client() {
    let server = MockServer::start().await;
    mount_token_endpoint(&server, json!({"access": "a1", "refresh": "r1"})).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let api = ApiConfig::with_base_url(server.uri());

    let first = CmsClient::new(api.clone(), Arc::new(FileTokenStore::new(&path))).unwrap();
    first.login("editor", "s3cret", true).await.unwrap();

    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&path));
    let second = CmsClient::new(api, Arc::clone(&store)).unwrap();
    assert!(second.is_authenticated());
    assert_eq!(store.get(TokenKind::Refresh).as_deref(), Some("r1"));
}

#[tokio::test]
async fn dashboard_summarises_every_collection() {
    let server = MockServer::start().await;

    let responses = [
        (
            ResourceKind::Hero,
            ResponseTemplate::new(200).set_body_json(json!({
                "count": 7,
                "results": [hero_json(1, "A", true), hero_json(2, "B", false)]
            })),
        ),
        (
            ResourceKind::SiteSettings,
            ResponseTemplate::new(200)
                .set_body_json(json!({"site_name": "NexusCouncil", "updated_at": "2024-06-12T12:00:00Z"})),
        ),
        (
            ResourceKind::NavigationMenu,
            ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "label": "Home", "created_at": "2024-06-15T11:58:00Z"},
                {"id": 2, "label": "About", "created_at": "2024-06-15T11:00:00Z"}
            ])),
        ),
        (ResourceKind::FooterLinks, ResponseTemplate::new(200).set_body_json(json!([]))),
        (
            ResourceKind::PricingPlans,
            ResponseTemplate::new(200).set_body_json(json!({"count": 4})),
        ),
        (ResourceKind::Testimonials, ResponseTemplate::new(500)),
        (
            ResourceKind::FaqItems,
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "updated_at": "garbage"}])),
        ),
    ];
    for (kind, response) in responses {
        Mock::given(method("GET"))
            .and(path(format!("/cms/{}/", kind.path())))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;
    }

    let (client, _) = client_for(&server, session(Some("access"), Some("refresh")));
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap());
    let dashboard = Dashboard::load(&client, &clock).await;

    assert_eq!(dashboard.cards.len(), ResourceKind::ALL.len());

    let hero = dashboard.card(ResourceKind::Hero).unwrap();
    assert_eq!(hero.title, "Hero Blocks");
    assert_eq!(hero.record_label(), "7 Records");
    assert_eq!(hero.meta_label(), "Last updated: 2 weeks ago");

    let settings = dashboard.card(ResourceKind::SiteSettings).unwrap();
    assert_eq!(settings.record_label(), "1 Record");
    assert_eq!(settings.meta_label(), "Last updated: 3 days ago");

    let navigation = dashboard.card(ResourceKind::NavigationMenu).unwrap();
    assert_eq!(navigation.meta_label(), "Last updated: 2 minutes ago");

    let footer = dashboard.card(ResourceKind::FooterLinks).unwrap();
    assert_eq!(footer.record_label(), "0 Records");
    assert_eq!(footer.meta_label(), "Last updated: unknown");

    let pricing = dashboard.card(ResourceKind::PricingPlans).unwrap();
    assert_eq!(pricing.record_label(), "4 Records");
    assert_eq!(pricing.meta_label(), "Last updated: unknown");

    let testimonials = dashboard.card(ResourceKind::Testimonials).unwrap();
    assert_eq!(testimonials.meta_label(), "Unable to load data.");
    assert_eq!(testimonials.record_label(), "\u{2014}");

    let faq = dashboard.card(ResourceKind::FaqItems).unwrap();
    assert_eq!(faq.record_label(), "1 Record");
    assert_eq!(faq.meta_label(), "Last updated: unknown");

    assert_eq!(dashboard.total_records(), 7 + 1 + 2 + 4 + 1);
}
