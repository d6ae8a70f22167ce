//! Axum route handlers for the editor API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::editor::{parse_skill_list, photo_from_upload, SectionEntry};
use crate::errors::AppError;
use crate::layout::FontFamily;
use crate::models::personalization::{PersonalizationConfig, TemplateId};
use crate::models::resume::{ContactInfo, EntryId, ResumeDocument, Section};
use crate::state::AppState;

/// Multipart field carrying the photo upload.
const PHOTO_FIELD: &str = "photo";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub summary: String,
}

/// Either an explicit list or a comma-separated `text`; `text` wins when both are sent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SkillsRequest {
    pub skills: Vec<String>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddSkillRequest {
    pub skill: String,
}

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub template: TemplateId,
}

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueItem {
    pub id: &'static str,
    pub display_name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    #[serde(rename = "photoUrl")]
    pub photo_url: Option<String>,
}

fn parse_section(raw: &str) -> Result<Section, AppError> {
    Section::parse(raw).ok_or_else(|| AppError::NotFound(format!("unknown section '{raw}'")))
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/resume
pub async fn handle_get_resume(State(state): State<AppState>) -> Json<ResumeDocument> {
    Json(state.workspace.read().document().clone())
}

/// PUT /api/v1/resume
pub async fn handle_replace_resume(
    State(state): State<AppState>,
    Json(document): Json<ResumeDocument>,
) -> Result<Json<ResumeDocument>, AppError> {
    let document = state.edit(|ws| {
        ws.replace_document(document);
        Ok(ws.document().clone())
    })?;
    Ok(Json(document))
}

/// PUT /api/v1/resume/contact
pub async fn handle_set_contact(
    State(state): State<AppState>,
    Json(contact): Json<ContactInfo>,
) -> Result<Json<ContactInfo>, AppError> {
    let contact = state.edit(|ws| {
        ws.set_contact(contact);
        Ok(ws.document().contact_info.clone())
    })?;
    Ok(Json(contact))
}

/// PUT /api/v1/resume/summary
pub async fn handle_set_summary(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> Result<StatusCode, AppError> {
    state.edit(|ws| {
        ws.set_summary(request.summary);
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// PUT /api/v1/resume/skills
pub async fn handle_set_skills(
    State(state): State<AppState>,
    Json(request): Json<SkillsRequest>,
) -> Result<Json<SkillsResponse>, AppError> {
    let skills = match request.text {
        Some(text) => parse_skill_list(&text),
        None => request.skills,
    };
    let skills = state.edit(|ws| {
        ws.set_skills(skills);
        Ok(ws.document().skills.clone())
    })?;
    Ok(Json(SkillsResponse { skills }))
}

/// POST /api/v1/resume/skills
pub async fn handle_add_skill(
    State(state): State<AppState>,
    Json(request): Json<AddSkillRequest>,
) -> Result<(StatusCode, Json<SkillsResponse>), AppError> {
    let skills = state.edit(|ws| {
        ws.add_skill(&request.skill)?;
        Ok(ws.document().skills.clone())
    })?;
    Ok((StatusCode::CREATED, Json(SkillsResponse { skills })))
}

/// DELETE /api/v1/resume/skills/:index
pub async fn handle_remove_skill(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SkillsResponse>, AppError> {
    let skills = state.edit(|ws| {
        ws.remove_skill(index)?;
        Ok(ws.document().skills.clone())
    })?;
    Ok(Json(SkillsResponse { skills }))
}

// ────────────────────────────────────────────────────────────────────────────
// Repeated sections
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/sections/:section
///
/// Appends an entry; the response carries its generated id.
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path(section): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<SectionEntry>), AppError> {
    let entry = SectionEntry::from_json(parse_section(&section)?, body)?;
    let added = state.edit(|ws| Ok(ws.add_entry(entry)))?;
    tracing::info!(
        section = added.section().as_str(),
        id = added.id().as_str(),
        "entry added"
    );
    Ok((StatusCode::CREATED, Json(added)))
}

/// PUT /api/v1/resume/sections/:section/:id
pub async fn handle_update_entry(
    State(state): State<AppState>,
    Path((section, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<SectionEntry>, AppError> {
    let entry = SectionEntry::from_json(parse_section(&section)?, body)?;
    let id = EntryId::from(id.as_str());
    let updated = state.edit(|ws| ws.update_entry(&id, entry))?;
    Ok(Json(updated))
}

/// DELETE /api/v1/resume/sections/:section/:id
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((section, id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let section = parse_section(&section)?;
    let id = EntryId::from(id.as_str());
    state.edit(|ws| ws.remove_entry(section, &id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Photo
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resume/photo
///
/// Accepts a multipart upload in the `photo` field and stores it inline.
pub async fn handle_upload_photo(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<PhotoResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed upload: {e}")))?
    {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }
        let declared = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("malformed upload: {e}")))?;

        let photo = photo_from_upload(declared.as_deref(), &bytes)?;
        let photo_url = photo.as_str().to_string();
        state.edit(|ws| {
            ws.set_photo(photo);
            Ok(())
        })?;
        tracing::info!(bytes = bytes.len(), "photo uploaded");
        return Ok(Json(PhotoResponse {
            photo_url: Some(photo_url),
        }));
    }
    Err(AppError::Validation(format!(
        "multipart field '{PHOTO_FIELD}' is required"
    )))
}

/// DELETE /api/v1/resume/photo
pub async fn handle_clear_photo(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.edit(|ws| {
        ws.clear_photo();
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Personalization / templates
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/personalization
pub async fn handle_get_personalization(
    State(state): State<AppState>,
) -> Json<PersonalizationConfig> {
    Json(state.workspace.read().personalization().clone())
}

/// PUT /api/v1/personalization
pub async fn handle_set_personalization(
    State(state): State<AppState>,
    Json(personalization): Json<PersonalizationConfig>,
) -> Result<Json<PersonalizationConfig>, AppError> {
    let personalization = state.edit(|ws| {
        ws.set_personalization(personalization);
        Ok(ws.personalization().clone())
    })?;
    Ok(Json(personalization))
}

/// GET /api/v1/fonts
pub async fn handle_list_fonts() -> Json<Vec<CatalogueItem>> {
    Json(
        FontFamily::ALL
            .iter()
            .map(|font| CatalogueItem {
                id: font.id(),
                display_name: font.display_name(),
            })
            .collect(),
    )
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<CatalogueItem>> {
    Json(
        TemplateId::ALL
            .iter()
            .map(|template| CatalogueItem {
                id: template.id(),
                display_name: template.display_name(),
            })
            .collect(),
    )
}

/// PUT /api/v1/template
pub async fn handle_select_template(
    State(state): State<AppState>,
    Json(request): Json<TemplateRequest>,
) -> Result<StatusCode, AppError> {
    state.edit(|ws| {
        ws.select_template(request.template);
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}
