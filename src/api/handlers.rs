//! API request handlers
//!
//! Every request works on its own [`Session`]; nothing is shared between
//! requests. Failures are reported in the response body with status 200,
//! the same way the CLI reports them on the status line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::template_warnings;
use crate::error::{DraftError, DraftResult};
use crate::session::{Session, PREVIEW_LIMIT};
use crate::types::{Draft, RoleMapping, Templates};
use crate::writer::ExportFormat;

use super::server::AppState;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    /// A failed request that still carries what was known at the time
    pub fn failed(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

impl EndpointInfo {
    fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            description: description.to_string(),
        }
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Draftsheet API Server".to_string(),
        version: state.version.clone(),
        description: "Spreadsheet rows to email drafts".to_string(),
        endpoints: vec![
            EndpointInfo::new("/health", "GET", "Health check endpoint"),
            EndpointInfo::new("/version", "GET", "Get server version"),
            EndpointInfo::new(
                "/api/v1/inspect",
                "POST",
                "Read a spreadsheet and list its columns",
            ),
            EndpointInfo::new(
                "/api/v1/generate",
                "POST",
                "Generate drafts and return a preview",
            ),
            EndpointInfo::new(
                "/api/v1/export",
                "POST",
                "Generate drafts and export them as JSON or CSV",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec![
            "inspect".to_string(),
            "generate".to_string(),
            "export".to_string(),
        ],
    }))
}

/// Inspect request
#[derive(Deserialize)]
pub struct InspectRequest {
    pub file_path: String,
}

/// Inspect response
#[derive(Serialize, Default)]
pub struct InspectResponse {
    pub loaded: bool,
    pub file_path: String,
    pub sheet_name: Option<String>,
    pub headers: Vec<String>,
    pub duplicate_headers: Vec<String>,
    pub row_count: usize,
    pub message: String,
}

/// POST /api/v1/inspect - Read a spreadsheet
pub async fn inspect(Json(req): Json<InspectRequest>) -> impl IntoResponse {
    let mut session = Session::new();

    match session.load_file(Path::new(&req.file_path)) {
        Ok(row_count) => Json(ApiResponse::ok(InspectResponse {
            loaded: true,
            file_path: req.file_path,
            sheet_name: session.sheet_name().map(str::to_string),
            headers: session.headers().to_vec(),
            duplicate_headers: session
                .table()
                .map(|t| t.duplicate_headers())
                .unwrap_or_default(),
            row_count,
            message: session.status().to_string(),
        })),
        Err(e) => {
            let message = failure_message(&session, &e);
            Json(ApiResponse::failed(
                InspectResponse {
                    loaded: false,
                    file_path: req.file_path,
                    message: message.clone(),
                    ..Default::default()
                },
                message,
            ))
        }
    }
}

/// Generate request
#[derive(Deserialize)]
pub struct GenerateRequest {
    pub file_path: String,
    #[serde(default)]
    pub mapping: RoleMapping,
    #[serde(default)]
    pub templates: Templates,
    /// Maximum number of drafts returned (default 50)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Generate response
#[derive(Serialize, Default)]
pub struct GenerateResponse {
    pub generated: bool,
    pub file_path: String,
    pub draft_count: usize,
    pub drafts: Vec<Draft>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    pub message: String,
}

/// POST /api/v1/generate - Generate drafts and return a preview
pub async fn generate(Json(req): Json<GenerateRequest>) -> impl IntoResponse {
    let mut session = Session::new();
    let mut warnings = Vec::new();

    let result = load_and_generate(
        &mut session,
        &req.file_path,
        &req.mapping,
        &req.templates,
        &mut warnings,
    );

    match result {
        Ok(draft_count) => Json(ApiResponse::ok(GenerateResponse {
            generated: true,
            file_path: req.file_path,
            draft_count,
            drafts: session
                .preview(req.limit.unwrap_or(PREVIEW_LIMIT))
                .to_vec(),
            warnings,
            generated_at: Some(chrono::Utc::now().to_rfc3339()),
            message: session.status().to_string(),
        })),
        Err(e) => {
            let message = failure_message(&session, &e);
            Json(ApiResponse::failed(
                GenerateResponse {
                    generated: false,
                    file_path: req.file_path,
                    warnings,
                    message: message.clone(),
                    ..Default::default()
                },
                message,
            ))
        }
    }
}

/// Export request
#[derive(Deserialize)]
pub struct ExportRequest {
    pub file_path: String,
    #[serde(default)]
    pub mapping: RoleMapping,
    #[serde(default)]
    pub templates: Templates,
    pub format: ExportFormat,
    /// Write to this path; when absent the content is returned inline
    #[serde(default)]
    pub output_path: Option<String>,
}

/// Export response
#[derive(Serialize, Default)]
pub struct ExportResponse {
    pub exported: bool,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub draft_count: usize,
    pub warnings: Vec<String>,
    pub message: String,
}

/// POST /api/v1/export - Generate and export drafts
pub async fn export(Json(req): Json<ExportRequest>) -> impl IntoResponse {
    let mut session = Session::new();
    let mut warnings = Vec::new();

    let result = load_and_generate(
        &mut session,
        &req.file_path,
        &req.mapping,
        &req.templates,
        &mut warnings,
    )
    .and_then(|count| match &req.output_path {
        Some(path) => session
            .export_to(req.format, &PathBuf::from(path))
            .map(|()| (count, None)),
        None => session.export(req.format).map(|content| (count, Some(content))),
    });

    match result {
        Ok((draft_count, content)) => Json(ApiResponse::ok(ExportResponse {
            exported: true,
            file_path: req.file_path,
            output_path: req.output_path,
            file_name: Some(req.format.default_file_name()),
            content_type: Some(req.format.mime_type().to_string()),
            content,
            draft_count,
            warnings,
            message: session.status().to_string(),
        })),
        Err(e) => {
            let message = failure_message(&session, &e);
            Json(ApiResponse::failed(
                ExportResponse {
                    exported: false,
                    file_path: req.file_path,
                    output_path: req.output_path,
                    warnings,
                    message: message.clone(),
                    ..Default::default()
                },
                message,
            ))
        }
    }
}

fn load_and_generate(
    session: &mut Session,
    file_path: &str,
    mapping: &RoleMapping,
    templates: &Templates,
    warnings: &mut Vec<String>,
) -> DraftResult<usize> {
    session.load_file(Path::new(file_path))?;
    warnings.extend(template_warnings(templates, session.headers())?);
    session.generate(mapping, templates)
}

/// The session's status line for failures it reports, the error text otherwise
fn failure_message(session: &Session, error: &DraftError) -> String {
    match error {
        DraftError::NoData
        | DraftError::IncompleteMapping(_)
        | DraftError::UnknownColumn { .. } => session.status().to_string(),
        other => other.to_string(),
    }
}
