//! HTTP NIM API tests
//!
//! Run the blocking client against a wiremock server. The client is built
//! and driven inside `spawn_blocking` so it never touches the async runtime.

mod common;

use assert_matches::assert_matches;
use common::{shared, Fixture, RecordingUi};
use nimlink::api::{HttpApiLoader, HttpNimApi, NimApi, Query, KEY_HEADER, KEY_REJECTED_MESSAGE};
use nimlink::bootstrap::{Bootstrap, HostApp, ModuleRegistry, API_MODULE, PANEL_MODULE};
use nimlink::panel::{JobsPanel, PanelAction, UserIdentity};
use nimlink::ui::SharedUi;
use nimlink_common::Error;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn query(
    url: String,
    token: &str,
    ui: SharedUi,
    query: Query,
) -> nimlink_common::Result<Value> {
    let token = token.to_string();
    tokio::task::spawn_blocking(move || HttpNimApi::new(url, token, ui).query(&query))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_query_sends_params_and_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nimAPI.php"))
        .and(query_param("q", "getUserJobs"))
        .and(query_param("u", "alice"))
        .and(header(KEY_HEADER, "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "ID": "1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let ui = RecordingUi::new();
    let value = query(
        format!("{}/nimAPI.php", server.uri()),
        "secret",
        shared(&ui),
        Query::new("getUserJobs").with("u", "alice"),
    )
    .await
    .unwrap();

    assert_eq!(value, json!([{ "ID": "1" }]));
    assert_eq!(ui.dialog_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_query_without_token_omits_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "error": "" }])))
        .mount(&server)
        .await;

    let ui = RecordingUi::new();
    query(server.uri(), "", shared(&ui), Query::new("testAPI"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get(KEY_HEADER).is_none());
    assert_eq!(requests[0].url.query(), Some("q=testAPI"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_reports_once_and_returns_sentinel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let ui = RecordingUi::new();
    let value = query(server.uri(), "stale", shared(&ui), Query::new("testAPI"))
        .await
        .unwrap();

    assert_eq!(value, json!("keyError"));
    assert_eq!(ui.alerts(), vec![KEY_REJECTED_MESSAGE]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_key_error_body_reports_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("keyError\n"))
        .mount(&server)
        .await;

    let ui = RecordingUi::new();
    let value = query(server.uri(), "stale", shared(&ui), Query::new("testAPI"))
        .await
        .unwrap();

    assert_eq!(value, json!("keyError"));
    assert_eq!(ui.alerts().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unparsable_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>404</html>"))
        .mount(&server)
        .await;

    let ui = RecordingUi::new();
    let result = query(server.uri(), "", shared(&ui), Query::new("testAPI")).await;
    assert_matches!(result, Err(Error::Decode(_)));
    assert_eq!(ui.dialog_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ui = RecordingUi::new();
    let result = query(server.uri(), "", shared(&ui), Query::new("testAPI")).await;
    assert_matches!(result, Err(Error::Unreachable(_)));
}

#[test]
fn test_connection_refused_is_unreachable() {
    let ui = RecordingUi::new();
    let api = HttpNimApi::new("http://127.0.0.1:1/nimAPI.php", "", shared(&ui));
    assert_matches!(api.query(&Query::new("testAPI")), Err(Error::Unreachable(_)));
    assert_eq!(ui.dialog_count(), 0);
}

fn http_registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(API_MODULE, HttpApiLoader);
    registry.register(PANEL_MODULE, jobs_panel);
    registry
}

fn jobs_panel(
    _: &nimlink::bootstrap::ModuleSource,
    ctx: &nimlink::bootstrap::LoadContext<'_>,
) -> nimlink_common::Result<nimlink::bootstrap::LoadedModule> {
    Ok(nimlink::bootstrap::LoadedModule::Panel(Box::new(
        JobsPanel::new(ctx.ui.clone()),
    )))
}

fn http_fixture(url: &str) -> Fixture {
    let fixture = Fixture::new();
    fixture.write_full_bundle(HostApp::Photoshop);
    fixture.write_valid_prefs(url);
    std::fs::write(&fixture.store.paths().key_file, "secret\r\n").unwrap();
    fixture
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bootstrap_over_http_opens_jobs_panel() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "testAPI"))
        .and(header(KEY_HEADER, "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "error": "" }])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "getUserJobs"))
        .and(query_param("u", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "ID": "7", "number": "16001", "jobname": "Spot" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = http_fixture(&format!("{}/nimAPI.php?", server.uri()));
    let ui = RecordingUi::new();
    let shared_ui = shared(&ui);

    let handle = tokio::task::spawn_blocking(move || {
        let registry = http_registry();
        let bootstrap = Bootstrap::new(&fixture.store, &registry, shared_ui, HostApp::Photoshop);
        bootstrap.run(&UserIdentity::named("alice"), PanelAction::Open)
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(handle.entries, vec!["16001_Spot"]);
    assert_eq!(ui.dialog_count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bootstrap_with_rejected_key_shows_single_alert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let fixture = http_fixture(&server.uri());
    let ui = RecordingUi::new();
    let shared_ui = shared(&ui);

    let handle = tokio::task::spawn_blocking(move || {
        let registry = http_registry();
        let bootstrap = Bootstrap::new(&fixture.store, &registry, shared_ui, HostApp::Photoshop);
        bootstrap.run(&UserIdentity::named("alice"), PanelAction::Open)
    })
    .await
    .unwrap();

    assert!(handle.is_none());
    assert_eq!(ui.alerts(), vec![KEY_REJECTED_MESSAGE]);
    assert!(ui.prompts().is_empty());
}
