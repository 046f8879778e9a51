mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use tower::ServiceExt;

use johnny_reports::http::{router, NO_DATA_MESSAGE};
use johnny_reports::render::PDF_SIGNATURE;

use common::{trust_rows, wellness_rows, FakeStore, Harness};

async fn get(harness: &Harness, uri: &str) -> Response {
    router(harness.pipeline.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
        .await
        .expect("router response")
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body")
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

fn header_value<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn wellness_export_is_a_pdf_attachment() {
    let harness = Harness::new(FakeStore::with_rows(wellness_rows()));
    let response = get(&harness, "/api/export").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_value(&response, header::CONTENT_TYPE), "application/pdf");
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"wellness_report.pdf\""
    );
    assert_eq!(header_value(&response, header::CACHE_CONTROL), "no-store");

    let body = body_bytes(response).await;
    assert!(body.starts_with(PDF_SIGNATURE));
}

#[tokio::test]
async fn trust_export_uses_trust_file_name() {
    let harness = Harness::new(FakeStore::with_rows(trust_rows()));
    let response = get(&harness, "/api/trust/export").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_value(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"trust_report.pdf\""
    );
    assert!(body_bytes(response).await.starts_with(PDF_SIGNATURE));
}

#[tokio::test]
async fn empty_table_is_not_found() {
    let harness = Harness::new(FakeStore::with_rows(Vec::new()));
    let response = get(&harness, "/api/trust/export").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({ "message": NO_DATA_MESSAGE }));
    assert_eq!(harness.fonts.calls(), 0);
    assert_eq!(harness.renderer.calls(), 0);
}

#[tokio::test]
async fn store_failure_is_a_json_500() {
    let harness = Harness::new(FakeStore::failing("JWT expired"));
    let response = get(&harness, "/api/export").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await, json!({ "error": "JWT expired" }));
}

#[tokio::test]
async fn render_failure_is_a_json_500() {
    let harness = Harness::with_parts(
        FakeStore::with_rows(wellness_rows()),
        common::unavailable_fonts(),
        common::CountingRenderer::failing(),
    );
    let response = get(&harness, "/api/export").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("simulated writer failure")));
}

#[tokio::test]
async fn wellness_rows_are_served_as_json() {
    let harness = Harness::new(FakeStore::with_rows(wellness_rows()));
    let response = get(&harness, "/api/wellness").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, Value::Array(wellness_rows()));
    assert_eq!(harness.store.queries()[0].table, "wellness");
}

#[tokio::test]
async fn wellness_rows_failure_is_a_json_500() {
    let harness = Harness::new(FakeStore::failing("relation \"wellness\" does not exist"));
    let response = get(&harness, "/api/wellness").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "relation \"wellness\" does not exist" })
    );
}

#[tokio::test]
async fn health_reports_version() {
    let harness = Harness::new(FakeStore::with_rows(Vec::new()));
    let response = get(&harness, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
