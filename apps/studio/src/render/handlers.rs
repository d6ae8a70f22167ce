//! Axum route handler exposing the preview surface's geometry.

use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::layout::{px_to_mm, Edges};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub surface_id: String,
    pub template: &'static str,
    pub font_family: &'static str,
    pub width_px: f32,
    pub height_px: f32,
    pub width_mm: f32,
    pub height_mm: f32,
    pub content_height_px: f32,
    pub scroll_width_px: f32,
    pub scroll_height_px: f32,
    pub scale: f32,
    pub shadow: bool,
    pub margin: Edges,
    pub padding: Edges,
    pub display_items: usize,
    pub image_count: usize,
    /// Inline presentation attributes keyed by CSS property name.
    pub inline_style: BTreeMap<&'static str, String>,
    pub text: String,
}

/// GET /api/v1/preview
///
/// Lays out the preview (mounting it first if needed) and reports what a
/// capture would see right now.
pub async fn handle_get_preview(State(state): State<AppState>) -> Json<PreviewResponse> {
    let surface = state.preview_surface();
    let template = state.workspace.read().template();

    let mut surface = surface.lock();
    let layout = surface.layout();
    let inline_style = surface
        .inline_style()
        .iter()
        .map(|(attr, value)| (attr.css_name(), value.to_string()))
        .collect();

    Json(PreviewResponse {
        surface_id: surface.id().to_string(),
        template: template.id(),
        font_family: surface.font().id(),
        width_px: layout.width,
        height_px: layout.height,
        width_mm: px_to_mm(layout.width),
        height_mm: px_to_mm(layout.height),
        content_height_px: layout.content_height,
        scroll_width_px: layout.scroll_width,
        scroll_height_px: layout.scroll_height,
        scale: layout.scale,
        shadow: layout.shadow,
        margin: layout.margin,
        padding: layout.padding,
        display_items: layout.items.len(),
        image_count: surface.images().len(),
        inline_style,
        text: surface.root().text_content(),
    })
}
