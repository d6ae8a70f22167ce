//! Capture seam: turns a laid-out surface into a bitmap.

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use thiserror::Error;

use crate::surface::SurfaceLayout;

/// Largest bitmap side we will allocate, in device pixels.
pub const MAX_CANVAS_SIDE: u32 = 16_384;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("surface has no area to capture ({width}x{height})")]
    EmptySurface { width: f32, height: f32 },

    #[error("capture of {width}x{height} px exceeds the 16384 px limit")]
    TooLarge { width: u32, height: u32 },

    #[error("invalid capture scale {0}")]
    InvalidScale(f32),

    #[error("rasterization task failed: {0}")]
    Task(String),
}

/// Parameters for one capture. `width`/`height` are in surface px; the bitmap
/// is `scale` times larger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    pub scale: f32,
    pub width: f32,
    pub height: f32,
    /// Opaque fill painted before any content.
    pub background: [u8; 4],
    /// Paint images fetched from other origins. When off they are left blank.
    pub use_cors: bool,
}

impl CaptureOptions {
    /// Device-pixel size of the bitmap this capture produces.
    pub fn canvas_size(&self) -> Result<(u32, u32), CaptureError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(CaptureError::InvalidScale(self.scale));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(CaptureError::EmptySurface {
                width: self.width,
                height: self.height,
            });
        }
        let width = (self.width * self.scale).round().max(1.0);
        let height = (self.height * self.scale).round().max(1.0);
        if width > MAX_CANVAS_SIDE as f32 || height > MAX_CANVAS_SIDE as f32 {
            return Err(CaptureError::TooLarge {
                width: width as u32,
                height: height as u32,
            });
        }
        Ok((width as u32, height as u32))
    }

    /// Lowers `scale` so the larger bitmap side stays within `MAX_CANVAS_SIDE`.
    /// Options that already fit, or that `canvas_size` rejects anyway, are
    /// returned as is.
    pub fn fit_to_canvas(self) -> Self {
        let largest = self.width.max(self.height);
        if !self.scale.is_finite() || self.scale <= 0.0 || !(largest > 0.0) {
            return self;
        }
        let limit = MAX_CANVAS_SIDE as f32;
        if (largest * self.scale).round() <= limit {
            return self;
        }
        Self {
            scale: limit / largest,
            ..self
        }
    }
}

#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(
        &self,
        layout: Arc<SurfaceLayout>,
        options: CaptureOptions,
    ) -> Result<RgbaImage, CaptureError>;
}
