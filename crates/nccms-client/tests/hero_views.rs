//! Hero list, detail and form views against a mock CMS

#![allow(clippy::unwrap_used)]

mod common;

use common::{NoAuthorization, client_for, hero_json, session, three_heroes};
use nccms_client::ClientError;
use nccms_client::views::{FormMode, HeroDraft, HeroForm, HeroListView, load_hero_detail};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_hero_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cms/hero/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_heroes()))
        .mount(server)
        .await;
}

async fn loaded_view(server: &MockServer) -> HeroListView {
    mount_hero_list(server).await;
    let (client, _) = client_for(server, session(Some("access"), Some("refresh")));
    let mut view = HeroListView::new(client);
    view.load().await.unwrap();
    view
}

fn flags(view: &HeroListView) -> Vec<(i64, bool)> {
    view.heroes()
        .iter()
        .map(|hero| (hero.id, hero.is_active))
        .collect()
}

#[tokio::test]
async fn activate_makes_one_hero_active() {
    let server = MockServer::start().await;
    let mut view = loaded_view(&server).await;
    assert_eq!(view.active_hero_id(), Some(1));

    for (id, active) in [(1, false), (2, true), (3, false)] {
        Mock::given(method("PATCH"))
            .and(path(format!("/cms/hero/{id}/")))
            .and(body_json(json!({"is_active": active})))
            .respond_with(ResponseTemplate::new(200).set_body_json(hero_json(id, "x", active)))
            .expect(1)
            .mount(&server)
            .await;
    }

    view.activate(2).await.unwrap();

    assert_eq!(flags(&view), vec![(1, false), (2, true), (3, false)]);
    assert_eq!(view.active_hero_id(), Some(2));
    assert_eq!(view.error(), None);
}

#[tokio::test]
async fn failed_activation_restores_previous_flags() {
    let server = MockServer::start().await;
    let mut view = loaded_view(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/cms/hero/2/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/cms/hero/[13]/$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = view.activate(2).await.unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 500, .. }));
    assert_eq!(flags(&view), vec![(1, true), (2, false), (3, false)]);
    assert_eq!(view.error(), Some("Failed to update active hero."));
}

#[tokio::test]
async fn delete_removes_row() {
    let server = MockServer::start().await;
    let mut view = loaded_view(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/cms/hero/2/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    view.delete(2).await.unwrap();

    let ids: Vec<i64> = view.heroes().iter().map(|hero| hero.id).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn failed_delete_restores_original_position() {
    let server = MockServer::start().await;
    let mut view = loaded_view(&server).await;

    Mock::given(method("DELETE"))
        .and(path("/cms/hero/2/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    assert!(view.delete(2).await.is_err());

    let ids: Vec<i64> = view.heroes().iter().map(|hero| hero.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(view.error(), Some("Failed to delete hero."));
}

#[tokio::test]
async fn unknown_hero_is_rejected_locally() {
    let server = MockServer::start().await;
    let mut view = loaded_view(&server).await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = view.delete(99).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(view.heroes().len(), 3);
}

#[tokio::test]
async fn public_fallback_puts_list_in_read_only_mode() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cms/hero/"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cms/hero/"))
        .and(NoAuthorization)
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"count": 3, "results": three_heroes()})),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, session(None, None));
    let mut view = HeroListView::new(client);
    view.load().await.unwrap();

    assert!(view.is_read_only());
    assert_eq!(view.heroes().len(), 3);

    let err = view.activate(2).await.unwrap_err();
    assert!(matches!(err, ClientError::ReadOnly { .. }));
    assert_eq!(
        view.error(),
        Some("Read-only mode. Log in to modify hero blocks.")
    );
    assert_eq!(view.active_hero_id(), Some(1));
}

#[tokio::test]
async fn load_failure_sets_banner() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cms/hero/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, session(Some("access"), Some("refresh")));
    let mut view = HeroListView::new(client);

    assert!(view.load().await.is_err());
    assert!(!view.is_loaded());
    assert_eq!(view.error(), Some("Could not load hero records."));
}

#[tokio::test]
async fn hero_detail_maps_not_found_and_invalid_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cms/hero/4/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(hero_json(4, "Open data", false)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cms/hero/404/"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found."})))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, session(Some("access"), Some("refresh")));

    let hero = load_hero_detail(&client, "4").await.unwrap();
    assert_eq!(hero.title, "Open data");

    let missing = load_hero_detail(&client, "404").await.unwrap_err();
    assert!(missing.is_not_found());

    let invalid = load_hero_detail(&client, "four").await.unwrap_err();
    assert_eq!(invalid.to_string(), "Invalid hero ID.");
}

#[tokio::test]
async fn form_create_sends_nulls_and_returns_hero() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cms/hero/"))
        .and(body_json(json!({
            "title": "Budget 2025",
            "subtitle": null,
            "cta_primary_label": "Read",
            "cta_primary_href": "/budget",
            "cta_secondary_label": null,
            "cta_secondary_href": null,
            "bg_type": "pattern",
            "is_active": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(hero_json(12, "Budget 2025", false)))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, session(Some("access"), Some("refresh")));
    let mut form = HeroForm::create();
    form.draft.title = "Budget 2025".to_string();
    form.draft.cta_primary_label = "Read".to_string();
    form.draft.cta_primary_href = "/budget".to_string();

    let hero = form.submit(&client).await.unwrap();
    assert_eq!(hero.id, 12);
    assert_eq!(form.error(), None);
}

#[tokio::test]
async fn form_surfaces_server_validation_message() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/cms/hero/7/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "cta_primary_href": ["Enter a valid URL."]
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, session(Some("access"), Some("refresh")));
    let draft = HeroDraft {
        id: Some(7),
        title: "Transit".to_string(),
        cta_primary_href: "not a url".to_string(),
        ..HeroDraft::default()
    };
    let mut form = HeroForm::with_draft(FormMode::Edit, draft);

    let err = form.submit(&client).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Validation { ref field, .. } if field.as_deref() == Some("cta_primary_href")
    ));
    assert_eq!(form.error(), Some("Enter a valid URL."));
}

#[tokio::test]
async fn form_rejects_locally_before_sending() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server, session(Some("access"), Some("refresh")));

    let draft = HeroDraft {
        title: "No id".to_string(),
        ..HeroDraft::default()
    };
    let mut edit = HeroForm::with_draft(FormMode::Edit, draft);
    assert!(edit.submit(&client).await.is_err());
    assert_eq!(edit.error(), Some("Missing hero identifier."));

    let mut create = HeroForm::create();
    assert!(create.submit(&client).await.is_err());
    assert_eq!(create.error(), Some("Title is required."));
}
