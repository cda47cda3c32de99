use crate::server::{is_safe_file_name, run_translation, run_upload};
use crate::state::AppState;
use crate::translation::RunReport;
use crate::utils::{Result, SheetTranslatorError};
use crate::workbook::FileKind;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/translate", post(translate_handler))
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/download/{filename}", get(download_handler))
        .route(
            "/term_base",
            get(list_terms_handler)
                .post(add_term_handler)
                .delete(remove_term_handler),
        )
        .with_state(state)
}

pub async fn serve(state: AppState, bind_addr: &str, port: u16) -> Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", bind_addr, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HTTP server listening on http://{}", addr);
    tracing::info!("  GET    /health              - Health check");
    tracing::info!("  POST   /translate           - Translate a spreadsheet");
    tracing::info!("  POST   /upload              - Upload and translate a spreadsheet");
    tracing::info!("  GET    /download/{{file}}     - Fetch a translated file");
    tracing::info!("  GET    /term_base           - List terms");
    tracing::info!("  POST   /term_base           - Add a term");
    tracing::info!("  DELETE /term_base           - Remove a term");

    axum::serve(listener, app).await?;
    Ok(())
}

fn status_for(error: &SheetTranslatorError) -> StatusCode {
    match error {
        SheetTranslatorError::UnsupportedFileType(_) | SheetTranslatorError::ValidationError(_) => {
            StatusCode::BAD_REQUEST
        }
        SheetTranslatorError::FileNotFound(_) | SheetTranslatorError::TermNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({ "success": false, "error": message.into() })),
    )
}

fn processed(report: RunReport) -> (StatusCode, Json<Value>) {
    let file_name = std::path::Path::new(&report.output_file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "File processed",
            "output_file": report.output_file,
            "download_url": format!("/download/{}", file_name),
            "stats": report.stats,
            "elapsed_ms": report.elapsed_ms,
        })),
    )
}

/// Output names from requests are bare file names inside the output directory.
fn checked_output_name(name: &str) -> std::result::Result<(), String> {
    if !is_safe_file_name(name) {
        return Err("output_file must be a plain file name".to_string());
    }
    FileKind::from_path(std::path::Path::new(name))
        .map(|_| ())
        .map_err(|e| e.to_string())
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "sheet-translator",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn info(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": "sheet-translator",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.translator.provider_name(),
        "term_base": state.term_store.path().display().to_string(),
        "output_directory": state.config.output.directory.display().to_string(),
    }))
}

async fn translate_handler(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(file_path) = payload["file_path"].as_str().filter(|p| !p.is_empty()) else {
        return failure(StatusCode::BAD_REQUEST, "file_path is required");
    };
    let output_file = match payload["output_file"].as_str() {
        None => None,
        Some(name) => match checked_output_name(name) {
            Ok(()) => Some(state.config.output.directory.join(name)),
            Err(message) => return failure(StatusCode::BAD_REQUEST, message),
        },
    };

    match run_translation(&state, file_path, output_file.as_deref()).await {
        Ok(report) => processed(report),
        Err(e) => {
            tracing::warn!(file = %file_path, error = %e, "Translation request failed");
            failure(status_for(&e), e.to_string())
        }
    }
}

async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((file_name, bytes));
                        break;
                    }
                    Err(e) => return failure(e.status(), e.body_text()),
                }
            }
            Ok(None) => break,
            Err(e) => return failure(e.status(), e.body_text()),
        }
    }

    let Some((raw_name, bytes)) = upload.filter(|(name, _)| !name.is_empty()) else {
        return failure(StatusCode::BAD_REQUEST, "no file selected");
    };

    // Browsers may send a full client-side path.
    let file_name = std::path::Path::new(&raw_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    if !is_safe_file_name(&file_name) {
        return failure(StatusCode::BAD_REQUEST, "invalid file name");
    }

    match run_upload(&state, &file_name, bytes.to_vec()).await {
        Ok(report) => processed(report),
        Err(e) => {
            tracing::warn!(file = %file_name, error = %e, "Upload failed");
            failure(status_for(&e), e.to_string())
        }
    }
}

async fn download_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Response {
    if !is_safe_file_name(&filename) {
        return failure(StatusCode::BAD_REQUEST, "invalid file name").into_response();
    }

    let path = state.config.output.directory.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => failure(StatusCode::NOT_FOUND, format!("file not found: {}", filename))
            .into_response(),
    }
}

async fn list_terms_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.term_store.list())
}

async fn add_term_handler(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let (Some(term), Some(translation)) =
        (payload["term"].as_str(), payload["translation"].as_str())
    else {
        return failure(StatusCode::BAD_REQUEST, "term and translation are required");
    };

    let _guard = state.run_lock.lock().await;
    match state.term_store.add(term, translation) {
        Ok(term_base) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Term added", "terms": term_base.len() })),
        ),
        Err(e) => failure(status_for(&e), e.to_string()),
    }
}

async fn remove_term_handler(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(term) = payload["term"].as_str() else {
        return failure(StatusCode::BAD_REQUEST, "term is required");
    };

    let _guard = state.run_lock.lock().await;
    match state.term_store.remove(term) {
        Ok(term_base) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Term removed", "terms": term_base.len() })),
        ),
        Err(e) => failure(status_for(&e), e.to_string()),
    }
}
