//! Axum route handler for PDF export.

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::export::sink::{AttachmentSink, SinkError};
use crate::export::{ExportError, ExportRequest};
use crate::render::format::suggested_file_name;
use crate::state::AppState;
use crate::surface::SurfaceId;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportBody {
    /// Download name; defaults to the name suggested from the contact name.
    pub file_name: Option<String>,
}

/// POST /api/v1/export
///
/// Exports the preview surface and returns the PDF as an attachment. The JSON
/// body is optional; an empty body uses the suggested file name.
pub async fn handle_export(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let file_name = parse_export_body(&body)?
        .file_name
        .unwrap_or_else(|| {
            let workspace = state.workspace.read();
            suggested_file_name(&workspace.document().contact_info.name, workspace.template())
        });

    let sink = AttachmentSink::default();
    state
        .exporter
        .export_to_pdf(&ExportRequest::new(SurfaceId::preview(), file_name), &sink)
        .await?;

    let download = sink.take().ok_or_else(|| {
        ExportError::DeliveryFailed(SinkError("no download was delivered".to_string()))
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe_file_name(&download.file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

fn parse_export_body(body: &[u8]) -> Result<ExportBody, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ExportBody::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::Validation(format!("invalid export request body: {e}")))
}

/// ASCII-only, quote-free rendition of a file name for `Content-Disposition`.
fn header_safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
