use api_rest::{router, AppState};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use spm_core::store::{FileStore, MemoryStore};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

fn memory_app() -> Router {
    router(AppState::new(Arc::new(MemoryStore::new())))
}

/// An app whose file store root is a regular file, so every store call fails.
fn unreachable_app(temp_dir: &tempfile::TempDir) -> Router {
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    router(AppState::new(Arc::new(FileStore::new(blocker))))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn put_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn register_form(body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

/// Registers a patient and returns the id parsed out of the success message.
async fn register(app: &Router, body: &'static str) -> String {
    let (status, text) = send(app, register_form(body)).await;
    assert_eq!(status, StatusCode::CREATED);

    let message: Value = serde_json::from_str(&text).unwrap();
    let message = message["message"].as_str().unwrap();
    message
        .strip_prefix("Patient Registered! Unique ID: ")
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_register_then_fetch_round_trip() {
    let app = memory_app();
    let id = register(
        &app,
        "name=Asha+Rao&aadhaar=123456789012&age=41&gender=Female&status=inpatient&ward=A",
    )
    .await;

    let (status, text) = send(&app, get(&format!("/patients/{}", id))).await;
    assert_eq!(status, StatusCode::OK);

    let record: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        record,
        json!({
            "patient_id": id,
            "name": "Asha Rao",
            "aadhaar": "123456789012",
            "age": "41",
            "gender": "Female",
            "status": "inpatient",
            "ward": "A",
        })
    );
}

#[tokio::test]
async fn test_register_stores_missing_form_fields_as_null() {
    let app = memory_app();
    let id = register(&app, "name=Ravi").await;

    let (_, text) = send(&app, get(&format!("/patients/{}", id))).await;
    let record: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(record["name"], json!("Ravi"));
    assert_eq!(record["ward"], Value::Null);
    assert_eq!(record["status"], Value::Null);
}

#[tokio::test]
async fn test_list_patients_returns_all_records_without_internal_id() {
    let app = memory_app();
    register(&app, "name=One&status=inpatient&ward=A").await;
    register(&app, "name=Two&status=outpatient&ward=B").await;

    let (status, text) = send(&app, get("/patients")).await;
    assert_eq!(status, StatusCode::OK);

    let records: Vec<Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.get("_id").is_none()));
    assert!(records.iter().all(|r| r["patient_id"].is_string()));
}

#[tokio::test]
async fn test_update_merges_fields() {
    let app = memory_app();
    let id = register(&app, "name=Asha&status=inpatient&ward=A").await;
    let uri = format!("/patients/{}", id);

    let (status, text) = send(&app, put_json(&uri, &json!({"ward": "B", "bed": 7}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&text).unwrap(),
        json!({"message": "Patient record updated successfully"})
    );

    let (_, text) = send(&app, get(&uri)).await;
    let record: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(record["ward"], json!("B"));
    assert_eq!(record["status"], json!("inpatient"));
    assert_eq!(record["bed"], json!(7));
}

#[tokio::test]
async fn test_update_with_malformed_body_is_server_error() {
    let app = memory_app();
    let id = register(&app, "name=Asha").await;

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/patients/{}", id))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("[1, 2, 3]"))
        .unwrap();
    let (status, text) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert!(body["error"].is_string());
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_register_with_non_form_body_is_server_error() {
    let app = memory_app();

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name": "Asha"}"#))
        .unwrap();
    let (status, text) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(body["error"], json!("Failed to read the request body"));
    assert!(body["details"].is_string());

    let (_, text) = send(&app, get("/patients")).await;
    assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!([]));
}

#[tokio::test]
async fn test_delete_twice_is_not_found_the_second_time() {
    let app = memory_app();
    let id = register(&app, "name=Asha").await;
    let uri = format!("/patients/{}", id);

    let (status, text) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&text).unwrap(),
        json!({"message": "Patient record deleted successfully"})
    );

    let (status, text) = send(&app, delete(&uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        serde_json::from_str::<Value>(&text).unwrap(),
        json!({"error": "Patient not found"})
    );
}

#[tokio::test]
async fn test_unknown_id_is_not_found_for_get_update_delete() {
    let app = memory_app();
    let uri = "/patients/00000000-0000-4000-8000-000000000000";

    let (status, _) = send(&app, get(uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, put_json(uri, &json!({"ward": "C"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, delete(uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unreachable_store_gives_500_with_details() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let app = unreachable_app(&temp_dir);
    let uri = "/patients/00000000-0000-4000-8000-000000000000";

    let requests = vec![
        get("/patients"),
        get(uri),
        register_form("name=Asha"),
        put_json(uri, &json!({"ward": "C"})),
        delete(uri),
    ];

    for request in requests {
        let (status, text) = send(&app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["error"], json!("Failed to reach the patient store"));
        assert!(body["details"].as_str().unwrap().contains("blocker"));
    }
}

#[tokio::test]
async fn test_dashboard_renders_counts() {
    let app = memory_app();
    register(&app, "status=inpatient&ward=A").await;
    register(&app, "status=inpatient&ward=A").await;
    register(&app, "status=outpatient&ward=B").await;
    register(&app, "status=unknown").await;

    let (status, html) = send(&app, get("/dashboard")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<div>Total patients</div><div class=\"value\">4</div>"));
    assert!(html.contains("<div>Inpatients</div><div class=\"value\">2</div>"));
    assert!(html.contains("<div>Outpatients</div><div class=\"value\">1</div>"));
    assert!(html.contains("<tr><td>A</td><td>2</td></tr>"));
    assert!(html.contains("<tr><td>B</td><td>1</td></tr>"));
    assert!(html.contains("<tr><td>Unassigned</td><td>1</td></tr>"));
}

#[tokio::test]
async fn test_dashboard_failure_is_plain_text() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let app = unreachable_app(&temp_dir);

    let response = app.clone().oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Error loading dashboard: storage unavailable"));
}

#[tokio::test]
async fn test_home_serves_registration_form() {
    let app = memory_app();
    let (status, html) = send(&app, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<form action=\"/register\" method=\"post\">"));
    for field in ["name", "aadhaar", "age", "gender", "status", "ward"] {
        assert!(html.contains(&format!("name=\"{}\"", field)));
    }
}

#[tokio::test]
async fn test_health_and_openapi() {
    let app = memory_app();

    let (status, text) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        serde_json::from_str::<Value>(&text).unwrap(),
        json!({"ok": true, "message": "SPM is alive"})
    );

    let (status, text) = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert!(doc["paths"]["/patients/{id}"].is_object());
    assert!(doc["paths"]["/register"]["post"].is_object());
}
