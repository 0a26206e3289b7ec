//! API integration tests

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use draftsheet::api::handlers::{
    export, generate, health, inspect, root, version, ExportRequest, GenerateRequest,
    InspectRequest,
};
use draftsheet::api::{build_router, ApiConfig, AppState};
use draftsheet::writer::ExportFormat;
use draftsheet::{Draft, RoleMapping, Templates};
use rust_xlsxwriter::Workbook;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn contacts(dir: &TempDir) -> PathBuf {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Contacts").unwrap();
    let rows = [
        ["Name", "Email", "Plan"],
        ["Ann", "ann@x.com", "Pro"],
        ["Bob", "bob@x.com", "Free"],
    ];
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            sheet.write_string(r as u32, c as u16, *value).unwrap();
        }
    }
    let path = dir.path().join("contacts.xlsx");
    workbook.save(&path).unwrap();
    path
}

fn header_only(dir: &TempDir) -> PathBuf {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Name").unwrap();
    let path = dir.path().join("header-only.xlsx");
    workbook.save(&path).unwrap();
    path
}

fn state() -> Arc<AppState> {
    Arc::new(AppState {
        version: "1.2.3".to_string(),
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIG TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_config_default() {
    let config = ApiConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
}

#[test]
fn test_config_clone() {
    let config = ApiConfig {
        host: "0.0.0.0".to_string(),
        port: 3000,
    };
    let cloned = config.clone();
    assert_eq!(cloned.host, "0.0.0.0");
    assert_eq!(cloned.port, 3000);
}

// ═══════════════════════════════════════════════════════════════════════════
// INFO HANDLER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_health_handler() {
    let response = health().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert!(body["request_id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[tokio::test]
async fn test_root_handler_lists_endpoints() {
    let response = root(State(state())).await.into_response();
    let body = body_json(response).await;

    assert_eq!(body["data"]["version"], "1.2.3");
    let paths: Vec<&str> = body["data"]["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["path"].as_str())
        .collect();
    assert!(paths.contains(&"/api/v1/generate"));
    assert!(paths.contains(&"/api/v1/export"));
}

#[tokio::test]
async fn test_version_handler() {
    let response = version(State(state())).await.into_response();
    let body = body_json(response).await;
    assert_eq!(body["data"]["version"], "1.2.3");
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT HANDLER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_inspect_handler() {
    let dir = TempDir::new().unwrap();
    let req = InspectRequest {
        file_path: contacts(&dir).display().to_string(),
    };
    let response = inspect(Json(req)).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["loaded"], true);
    assert_eq!(body["data"]["sheet_name"], "Contacts");
    assert_eq!(body["data"]["headers"], json!(["Name", "Email", "Plan"]));
    assert_eq!(body["data"]["row_count"], 2);
    assert_eq!(body["data"]["message"], "Loaded 2 rows from Contacts.");
}

#[tokio::test]
async fn test_inspect_handler_header_only() {
    let dir = TempDir::new().unwrap();
    let req = InspectRequest {
        file_path: header_only(&dir).display().to_string(),
    };
    let response = inspect(Json(req)).await.into_response();
    // Still 200 with the failure in the body
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "No rows found in the spreadsheet.");
    assert_eq!(body["data"]["loaded"], false);
}

#[tokio::test]
async fn test_inspect_handler_nonexistent() {
    let req = InspectRequest {
        file_path: "/nonexistent/contacts.xlsx".to_string(),
    };
    let response = inspect(Json(req)).await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.starts_with("Spreadsheet error")));
}

// ═══════════════════════════════════════════════════════════════════════════
// GENERATE HANDLER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_generate_handler() {
    let dir = TempDir::new().unwrap();
    let req = GenerateRequest {
        file_path: contacts(&dir).display().to_string(),
        mapping: RoleMapping::new("Email", "Name", "Plan"),
        templates: Templates::new(
            Some("Your {{Plan}} plan".to_string()),
            Some("{{ name }}Hi {{ Name }}, thanks for choosing {{Plan}}.".to_string()),
        ),
        limit: Some(1),
    };
    let response = generate(Json(req)).await.into_response();
    let body = body_json(response).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["draft_count"], 2);
    assert_eq!(body["data"]["message"], "Generated 2 drafts.");

    let drafts: Vec<Draft> = serde_json::from_value(body["data"]["drafts"].clone()).unwrap();
    assert_eq!(
        drafts,
        vec![Draft::new(
            "ann@x.com",
            "Your Pro plan",
            "Hi Ann, thanks for choosing Pro."
        )]
    );

    let warnings = body["data"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().contains("did you mean 'Name'?"));
    assert!(body["data"]["generated_at"].is_string());
}

#[tokio::test]
async fn test_generate_handler_incomplete_mapping() {
    let dir = TempDir::new().unwrap();
    let req = GenerateRequest {
        file_path: contacts(&dir).display().to_string(),
        mapping: RoleMapping::new("Email", "", "Plan"),
        templates: Templates::default(),
        limit: None,
    };
    let response = generate(Json(req)).await.into_response();
    let body = body_json(response).await;

    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Please map all columns before generating drafts."
    );
    assert_eq!(body["data"]["generated"], false);
    assert_eq!(body["data"]["draft_count"], 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT HANDLER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_export_handler_inline_csv() {
    let dir = TempDir::new().unwrap();
    let req = ExportRequest {
        file_path: contacts(&dir).display().to_string(),
        mapping: RoleMapping::new("Email", "Name", "Plan"),
        templates: Templates::new(Some("{{Name}}, {{Plan}}".to_string()), None),
        format: ExportFormat::Csv,
        output_path: None,
    };
    let response = export(Json(req)).await.into_response();
    let body = body_json(response).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["file_name"], "email-drafts.csv");
    assert_eq!(
        body["data"]["content"],
        "to,subject,body\nann@x.com,\"Ann, Pro\",Pro\nbob@x.com,\"Bob, Free\",Free"
    );
}

#[tokio::test]
async fn test_export_handler_writes_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("drafts.json");
    let req = ExportRequest {
        file_path: contacts(&dir).display().to_string(),
        mapping: RoleMapping::new("Email", "Name", "Plan"),
        templates: Templates::default(),
        format: ExportFormat::Json,
        output_path: Some(output.display().to_string()),
    };
    let response = export(Json(req)).await.into_response();
    let body = body_json(response).await;

    assert_eq!(body["success"], true);
    assert!(body["data"].get("content").is_none());

    let drafts: Vec<Draft> =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[1], Draft::new("bob@x.com", "Bob", "Free"));
}

// ═══════════════════════════════════════════════════════════════════════════
// ROUTER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_router_health() {
    let app = build_router(state());
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_router_generate() {
    let dir = TempDir::new().unwrap();
    let payload = json!({
        "file_path": contacts(&dir).display().to_string(),
        "mapping": {"to": "Email", "subject": "Name", "body": "Plan"},
        "templates": {"subject": "Hello {{Name}}"}
    });

    let app = build_router(state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/generate")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["drafts"][1]["subject"], "Hello Bob");
}

#[tokio::test]
async fn test_router_rejects_unknown_format() {
    let payload = json!({"file_path": "x.xlsx", "format": "xml"});

    let app = build_router(state());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/export")
                .header("content-type", "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_router_unknown_path() {
    let app = build_router(state());
    let response = app
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
