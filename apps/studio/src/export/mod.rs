//! PDF export of a mounted preview surface.
//!
//! One export: override the surface's presentation attributes for print, wait
//! for its images and font, let the layout settle, rasterize it, place the
//! bitmap on a single A4 page and hand the PDF to a download sink. The prior
//! attributes are restored on every exit path.

pub mod geometry;
pub mod guard;
pub mod handlers;
pub mod pdf;
pub mod raster;
pub mod readiness;
pub mod sink;
pub mod wireframe;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::export::geometry::{PageSize, Placement};
use crate::export::guard::{InFlight, PresentationOverride};
use crate::export::pdf::encode_single_page;
use crate::export::raster::{CaptureError, CaptureOptions, Rasterizer};
use crate::export::readiness::{
    wait_for_font, wait_for_images, BundledFonts, FontReadiness, FONT_READY_TIMEOUT,
};
use crate::export::sink::{Download, DownloadSink, SinkError};
use crate::export::wireframe::WireframeRasterizer;
use crate::surface::style::PresentationAttr;
use crate::surface::{RenderTree, SurfaceId};

pub const DEFAULT_FILE_NAME: &str = "resume.pdf";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// The only export failure text ever shown to a user.
pub const EXPORT_FAILED_MESSAGE: &str = "PDF export failed. Please try again.";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("surface '{0}' is not mounted")]
    SurfaceNotFound(SurfaceId),

    #[error("an export of surface '{0}' is already in progress")]
    AlreadyInProgress(SurfaceId),

    #[error("capture failed: {0}")]
    CaptureFailed(#[from] CaptureError),

    #[error("PDF encoding failed: {0}")]
    EncodingFailed(String),

    #[error("delivery failed: {0}")]
    DeliveryFailed(#[from] SinkError),
}

impl ExportError {
    pub fn user_message(&self) -> &'static str {
        EXPORT_FAILED_MESSAGE
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Options / request / report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Device pixels per surface px in the captured bitmap.
    pub quality_scale: f32,
    /// Pause after images and fonts are ready, before the forced reflow.
    pub settle_delay: Duration,
    pub page: PageSize,
    pub use_cors: bool,
    pub background: [u8; 4],
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            quality_scale: 2.0,
            settle_delay: Duration::from_millis(1500),
            page: PageSize::A4,
            use_cors: true,
            background: [255, 255, 255, 255],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub surface_id: SurfaceId,
    pub file_name: String,
}

impl ExportRequest {
    pub fn new(surface_id: SurfaceId, file_name: impl Into<String>) -> Self {
        Self {
            surface_id,
            file_name: file_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub file_name: String,
    pub size_bytes: usize,
    pub bitmap_width: u32,
    pub bitmap_height: u32,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub placement: Placement,
    pub images_loaded: usize,
    pub images_failed: usize,
}

/// Download name for a requested name: path separators removed, empty → `resume.pdf`.
pub fn resolve_file_name(requested: &str) -> String {
    let cleaned: String = requested
        .chars()
        .filter(|c| !matches!(c, '/' | '\\') && !c.is_control())
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ExportPipeline {
    render_tree: RenderTree,
    rasterizer: Arc<dyn Rasterizer>,
    fonts: Arc<dyn FontReadiness>,
    options: ExportOptions,
    in_flight: Arc<Mutex<HashSet<SurfaceId>>>,
}

impl ExportPipeline {
    pub fn new(render_tree: RenderTree, options: ExportOptions) -> Self {
        Self {
            render_tree,
            rasterizer: Arc::new(WireframeRasterizer),
            fonts: Arc::new(BundledFonts),
            options,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn with_fonts(mut self, fonts: Arc<dyn FontReadiness>) -> Self {
        self.fonts = fonts;
        self
    }

    /// Exports the surface named by `request` and delivers the PDF to `sink`.
    ///
    /// Failures are logged here with their cause; callers should show the user
    /// [`ExportError::user_message`] only.
    pub async fn export_to_pdf(
        &self,
        request: &ExportRequest,
        sink: &dyn DownloadSink,
    ) -> Result<ExportReport, ExportError> {
        let result = self.run(request, sink).await;
        match &result {
            Ok(report) => info!(
                surface = %request.surface_id,
                file = %report.file_name,
                bytes = report.size_bytes,
                width = report.bitmap_width,
                height = report.bitmap_height,
                "PDF exported"
            ),
            Err(e) => error!(surface = %request.surface_id, error = %e, "PDF export failed"),
        }
        result
    }

    async fn run(
        &self,
        request: &ExportRequest,
        sink: &dyn DownloadSink,
    ) -> Result<ExportReport, ExportError> {
        let id = &request.surface_id;
        let surface = self
            .render_tree
            .get(id)
            .ok_or_else(|| ExportError::SurfaceNotFound(id.clone()))?;
        // Declared before the override so restoration finishes before release.
        let _in_flight = InFlight::acquire(&self.in_flight, id)
            .ok_or_else(|| ExportError::AlreadyInProgress(id.clone()))?;
        let file_name = resolve_file_name(&request.file_name);

        let page_width = format!("{}mm", self.options.page.width_mm);
        let _restore = PresentationOverride::apply(
            Arc::clone(&surface),
            &[
                (PresentationAttr::Height, "auto"),
                (PresentationAttr::MaxWidth, page_width.as_str()),
                (PresentationAttr::Transform, "none"),
                (PresentationAttr::TransformOrigin, "initial"),
                (PresentationAttr::BoxShadow, "none"),
                (PresentationAttr::Margin, "0"),
            ],
        );

        let (images, font) = {
            let surface = surface.lock();
            (surface.images(), surface.font())
        };
        let settled = wait_for_images(&images).await;
        if let Err(e) = wait_for_font(self.fonts.as_ref(), font, FONT_READY_TIMEOUT).await {
            warn!(font = font.id(), error = %e, "font not ready, exporting anyway");
        }
        if !self.options.settle_delay.is_zero() {
            tokio::time::sleep(self.options.settle_delay).await;
        }

        let layout = surface.lock().reflow();
        debug!(
            width = layout.scroll_width,
            height = layout.scroll_height,
            "surface reflowed for capture"
        );
        let requested = CaptureOptions {
            scale: self.options.quality_scale,
            width: layout.scroll_width,
            height: layout.scroll_height,
            background: self.options.background,
            use_cors: self.options.use_cors,
        };
        let capture = requested.fit_to_canvas();
        if capture.scale < requested.scale {
            warn!(
                requested = requested.scale,
                effective = capture.scale,
                height = layout.scroll_height,
                "surface exceeds the canvas limit, capturing at a lower scale"
            );
        }
        let bitmap = self.rasterizer.rasterize(layout, capture).await?;
        let (bitmap_width, bitmap_height) = bitmap.dimensions();

        let page = self.options.page;
        let encoded = tokio::task::spawn_blocking(move || encode_single_page(&bitmap, page))
            .await
            .map_err(|e| ExportError::EncodingFailed(e.to_string()))?
            .map_err(|e| ExportError::EncodingFailed(e.to_string()))?;

        let report = ExportReport {
            file_name: file_name.clone(),
            size_bytes: encoded.bytes.len(),
            bitmap_width,
            bitmap_height,
            page_width_pt: encoded.page_width_pt,
            page_height_pt: encoded.page_height_pt,
            placement: encoded.placement,
            images_loaded: settled.loaded,
            images_failed: settled.failed,
        };
        sink.deliver(Download {
            file_name,
            content_type: PDF_CONTENT_TYPE,
            bytes: Bytes::from(encoded.bytes),
        })
        .await?;

        Ok(report)
    }
}
