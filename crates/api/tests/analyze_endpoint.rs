//! HTTP-level tests for `/analyze`, `/health` and `/stats`.
//!
//! The router is driven with `oneshot` against in-memory service doubles, so
//! no request leaves the process.

use api::{AppConfig, AppState, build_router};
use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use fetch::{ContentFetcher, FetchError};
use pipeline::testing::{ScriptedGenerator, ScriptedSearcher, StaticFetcher, snippet};
use pipeline::{Analyzer, PipelineSettings};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`
use url::Url;

struct Services {
    fetcher: Arc<StaticFetcher>,
    llm: Arc<ScriptedGenerator>,
    searcher: Arc<ScriptedSearcher>,
}

fn app_with(fetcher: StaticFetcher, llm: ScriptedGenerator, searcher: ScriptedSearcher) -> (Router, Services) {
    let services = Services {
        fetcher: Arc::new(fetcher),
        llm: Arc::new(llm),
        searcher: Arc::new(searcher),
    };
    let analyzer = Analyzer::new(
        services.fetcher.clone(),
        services.llm.clone(),
        services.searcher.clone(),
        PipelineSettings::default(),
    );
    let app = build_router(AppState::new(Some(Arc::new(analyzer))));
    (app, services)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn analyze_body() -> Value {
    json!({
        "url": "https://forum.example/topic/istanbul-bridges",
        "query": "when did the bridge open"
    })
}

#[tokio::test]
async fn test_missing_query_is_rejected_before_any_call() {
    let (app, services) = app_with(
        StaticFetcher::with_text("page"),
        ScriptedGenerator::new(),
        ScriptedSearcher::new(),
    );

    let (status, body) = send(
        app,
        post_json("/analyze", json!({"url": "https://forum.example/t"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL and query are required");
    assert!(services.fetcher.calls().is_empty());
    assert_eq!(services.llm.call_count(), 0);
}

#[tokio::test]
async fn test_missing_url_and_bad_body_are_rejected() {
    let (app, services) = app_with(
        StaticFetcher::with_text("page"),
        ScriptedGenerator::new(),
        ScriptedSearcher::new(),
    );

    let (status, _) = send(app.clone(), post_json("/analyze", json!({"query": "q"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app.clone(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL and query are required");

    let (status, body) = send(app, post_json("/analyze", json!({"url": "nope", "query": "q"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL is not valid");

    assert!(services.fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_missing_credentials_is_error_state() {
    let config = AppConfig::from_lookup(|name| match name {
        "FIRECRAWL_API_KEY" => Some("fc".to_string()),
        _ => None,
    })
    .unwrap();
    let app = build_router(AppState::from_config(&config));

    let (status, body) = send(app, post_json("/analyze", analyze_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"status": "error", "message": "API keys are not configured"}));
}

#[tokio::test]
async fn test_fetch_failure_is_error_state() {
    let (app, services) = app_with(
        StaticFetcher::failing(),
        ScriptedGenerator::new(),
        ScriptedSearcher::new(),
    );

    let (status, body) = send(app, post_json("/analyze", analyze_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Content could not be fetched. Please check the URL.");
    assert_eq!(services.llm.call_count(), 0);
    assert!(services.searcher.requests().is_empty());
}

#[tokio::test]
async fn test_no_relevant_entries_is_empty_state() {
    let (app, _services) = app_with(
        StaticFetcher::with_text("page about ferries"),
        ScriptedGenerator::new().reply("[]"),
        ScriptedSearcher::new(),
    );

    let (status, body) = send(app, post_json("/analyze", analyze_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "empty", "message": "No relevant entries were found.", "results": []})
    );
}

#[tokio::test]
async fn test_success_response_shape() {
    let (app, _services) = app_with(
        StaticFetcher::with_text("#1 the bosphorus bridge opened in 1973"),
        ScriptedGenerator::new()
            .reply(r#"[{"entryContent": "the bosphorus bridge opened in 1973", "entryNumber": 1, "entryDate": "03.11.2012"}]"#)
            .reply(r#"{"claim": "The Bosphorus Bridge opened in 1973", "eventDate": "1973-10-30"}"#)
            .reply(r#"{"confidenceScore": 85, "summary": "Confirmed by archives.", "notes": "None."}"#),
        ScriptedSearcher::new().results(vec![snippet(
            "Bosphorus Bridge opens",
            "The bridge opened on 30 October 1973.",
            "https://archive.example/1973/bridge",
        )]),
    );

    let (status, body) = send(app, post_json("/analyze", analyze_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "success",
            "results": [{
                "identifier": 1,
                "date": "03.11.2012",
                "content": "the bosphorus bridge opened in 1973",
                "verification": {
                    "confidenceScore": 85,
                    "summary": "Confirmed by archives.",
                    "notes": "None."
                }
            }]
        })
    );
}

struct PanickingFetcher;

#[async_trait]
impl ContentFetcher for PanickingFetcher {
    async fn fetch(&self, _url: &Url) -> Result<String, FetchError> {
        panic!("scraper exploded");
    }
}

#[tokio::test]
async fn test_unexpected_failure_is_generic_error() {
    let analyzer = Analyzer::new(
        Arc::new(PanickingFetcher),
        Arc::new(ScriptedGenerator::new()),
        Arc::new(ScriptedSearcher::new()),
        PipelineSettings::default(),
    );
    let app = build_router(AppState::new(Some(Arc::new(analyzer))));

    let (status, body) = send(app, post_json("/analyze", analyze_body())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"status": "error", "message": "An error occurred during analysis"}));
}

#[tokio::test]
async fn test_health_and_stats() {
    let (app, _services) = app_with(
        StaticFetcher::with_text("page"),
        ScriptedGenerator::new().reply("no entries"),
        ScriptedSearcher::new(),
    );

    let health = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app.clone(), health).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentials"], "configured");

    send(app.clone(), post_json("/analyze", json!({"query": "q"}))).await;
    send(app.clone(), post_json("/analyze", analyze_body())).await;

    let stats = Request::builder().uri("/stats").body(Body::empty()).unwrap();
    let (status, body) = send(app, stats).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_requests"], 2);
    assert_eq!(body["rejected_requests"], 1);
    assert_eq!(body["empty_requests"], 1);
}
