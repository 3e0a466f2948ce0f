//! `POST /api/analyze` — contract upload → fallback chain → risk report.
//!
//! The only caller-visible failures here are the two client errors
//! (oversize upload, missing file field). Everything downstream is
//! absorbed by the fallback chain, so a well-formed request always gets a
//! conformant report back.

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::app_state::AppState;
use crate::config::MAX_UPLOAD_BYTES;
use crate::engine::Attachment;
use crate::fallback::inject_analysis_mode;

/// Receive the uploaded contract and run the producer chain.
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut attachment: Option<Attachment> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let declared_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;

        // Size cap enforced before any analysis is attempted.
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(ApiError::PayloadTooLarge);
        }

        attachment = Some(Attachment {
            mime_type: normalize_mime(declared_type.as_deref(), file_name.as_deref()),
            data: data.to_vec(),
        });
        break;
    }

    let attachment = attachment.ok_or(ApiError::MissingParameter("file"))?;
    tracing::info!(
        mime_type = %attachment.mime_type,
        bytes = attachment.data.len(),
        "Analyzing uploaded contract"
    );

    let (report, mode) = state.orchestrator.analyze(attachment).await;
    Ok(Json(inject_analysis_mode(report, mode)))
}

/// Resolve the attachment MIME type. Browsers frequently send
/// `application/octet-stream`; fall back to the filename extension, then
/// to PDF.
fn normalize_mime(declared: Option<&str>, file_name: Option<&str>) -> String {
    if let Some(declared) = declared {
        if declared != "application/octet-stream" {
            return declared.to_string();
        }
    }
    file_name
        .and_then(|name| mime_guess::from_path(name).first())
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| "application/pdf".to_string())
}
