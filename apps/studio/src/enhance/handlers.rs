//! Axum route handler for AI text enhancement.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::enhance::enhance_section;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub section_text: String,
    /// Human label of the section, e.g. "Professional Summary".
    pub section_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    pub optimized_content: String,
}

/// POST /api/v1/enhance
///
/// Returns a rewritten version of the given text. The workspace is left untouched;
/// the client decides whether to apply the result.
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    let optimized_content = enhance_section(
        state.llm.as_ref(),
        &request.section_text,
        &request.section_type,
    )
    .await?;
    Ok(Json(EnhanceResponse { optimized_content }))
}
