//! Integration tests for demands and resource uploads.
//!
//! Workbook decoding is covered by unit tests; here sheets are either
//! rejected at decode time or fed to the ingestion engine directly.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    bytes_request_with_auth, get_request_with_auth, json_request, parse_response_body, TestApp,
};
use domain::models::{IngestStage, Role, Sheet};
use serde_json::{json, Value};

async fn create_demand(app: &TestApp, token: &str) -> Value {
    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/demands",
            json!({ "rrd": " RRD-2041 ", "projectName": "Claims Modernization" }),
            Some(token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_response_body(response).await
}

#[tokio::test]
async fn test_create_demand() {
    let app = TestApp::new();
    let (pmo, token) = app.session("pmo", Role::Pmo).await;

    let demand = create_demand(&app, &token).await;
    assert_eq!(demand["rrd"], "RRD-2041");
    assert_eq!(demand["createdBy"], pmo.id.to_string());
}

#[tokio::test]
async fn test_create_demand_validation() {
    let app = TestApp::new();
    let (_, token) = app.session("pmo", Role::Pmo).await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/demands",
            json!({ "rrd": "   ", "projectName": "Atlas" }),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_demand_routes_require_pmo() {
    let app = TestApp::new();
    let (_, token) = app.session("evaluator", Role::Evaluator).await;

    let response = app
        .send(json_request(
            Method::POST,
            "/api/v1/demands",
            json!({ "rrd": "RRD-1", "projectName": "Atlas" }),
            Some(&token),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(bytes_request_with_auth(
            &format!("/api/v1/demands/{}/resources/upload", uuid::Uuid::new_v4()),
            &token,
            b"irrelevant".to_vec(),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_upload_to_unknown_demand() {
    let app = TestApp::new();
    let (_, token) = app.session("pmo", Role::Pmo).await;

    let response = app
        .send(bytes_request_with_auth(
            &format!("/api/v1/demands/{}/resources/upload", uuid::Uuid::new_v4()),
            &token,
            b"PK".to_vec(),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_rejects_unreadable_workbook() {
    let app = TestApp::new();
    let (_, token) = app.session("pmo", Role::Pmo).await;
    let demand = create_demand(&app, &token).await;
    let uri = format!("/api/v1/demands/{}/resources/upload", demand["id"].as_str().unwrap());

    let response = app
        .send(bytes_request_with_auth(&uri, &token, b"name,email\nJane,j@x".to_vec()))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_response_body(response).await["error"], "validation_error");

    let response = app.send(bytes_request_with_auth(&uri, &token, Vec::new())).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.resources.is_empty());
}

#[tokio::test]
async fn test_upload_over_size_limit() {
    let mut config = common::test_config();
    config.server.max_upload_bytes = 256;
    let app = TestApp::with_config(config);
    let (_, token) = app.session("pmo", Role::Pmo).await;
    let demand = create_demand(&app, &token).await;

    let response = app
        .send(bytes_request_with_auth(
            &format!("/api/v1/demands/{}/resources/upload", demand["id"].as_str().unwrap()),
            &token,
            vec![0u8; 4096],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_ingested_resources_are_listed_newest_first() {
    let app = TestApp::new();
    let (pmo, token) = app.session("pmo", Role::Pmo).await;
    let demand = create_demand(&app, &token).await;
    let demand_id: uuid::Uuid = demand["id"].as_str().unwrap().parse().unwrap();

    let sheet = Sheet::from_text_rows(&[
        &["Personnel No", "Resource Name", "Primary Skill", "Email ID"],
        &["1001", "Jane Doe", "Rust", "jane@x.com"],
        &["1002", "", "Go", "nobody@x.com"],
        &["1003", "Raj Patel", "Java", "raj@x.com"],
    ]);
    let result = app.state.ingestion.ingest(&sheet, demand_id, Some(pmo.id)).await;
    assert_eq!(result.stage, IngestStage::Committed);
    assert_eq!(result.accepted_count, 2);
    assert_eq!(result.skipped_count, 1);

    let response = app
        .send(get_request_with_auth(
            &format!("/api/v1/demands/{}/resources", demand_id),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["demand"]["rrd"], "RRD-2041");
    assert_eq!(body["data"][0]["name"], "Raj Patel");
    assert_eq!(body["data"][1]["personnelNo"], "1001");
    assert_eq!(body["data"][1]["uploadedBy"], pmo.id.to_string());
}

#[tokio::test]
async fn test_list_resources_of_unknown_demand() {
    let app = TestApp::new();
    let (_, token) = app.session("pmo", Role::Pmo).await;

    let response = app
        .send(get_request_with_auth(
            &format!("/api/v1/demands/{}/resources", uuid::Uuid::new_v4()),
            &token,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
