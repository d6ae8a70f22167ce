//! Waiting for a surface's images and fonts before capture.

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::FontFamily;
use crate::surface::image::{ImageHandle, ImageState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSettleReport {
    pub loaded: usize,
    pub failed: usize,
}

/// Waits until every image slot has settled. Failures are logged and counted,
/// never propagated: a failed image paints as a blank region.
pub async fn wait_for_images(images: &[ImageHandle]) -> ImageSettleReport {
    let states = join_all(images.iter().map(|handle| handle.settled())).await;

    let mut report = ImageSettleReport::default();
    for (handle, state) in images.iter().zip(states) {
        match state {
            ImageState::Loaded(_) => report.loaded += 1,
            ImageState::Failed(reason) => {
                let shown: String = handle.src().chars().take(64).collect();
                warn!(src = %shown, %reason, "image failed to load for export");
                report.failed += 1;
            }
            ImageState::Pending => {}
        }
    }
    debug!(loaded = report.loaded, failed = report.failed, "images settled");
    report
}

/// How long capture waits on the font subsystem before going ahead without it.
pub const FONT_READY_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font '{font}' was not ready after {waited_ms} ms")]
    TimedOut { font: &'static str, waited_ms: u128 },
}

/// Reports when the glyph data for a font is ready to paint with.
#[async_trait]
pub trait FontReadiness: Send + Sync {
    async fn ready(&self, font: FontFamily) -> Result<(), FontError>;
}

/// Waits for `font`, giving up after `limit`.
pub async fn wait_for_font(
    fonts: &dyn FontReadiness,
    font: FontFamily,
    limit: Duration,
) -> Result<(), FontError> {
    match tokio::time::timeout(limit, fonts.ready(font)).await {
        Ok(ready) => ready,
        Err(_) => Err(FontError::TimedOut {
            font: font.id(),
            waited_ms: limit.as_millis(),
        }),
    }
}

/// Fonts whose metric tables are compiled in; always ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledFonts;

#[async_trait]
impl FontReadiness for BundledFonts {
    async fn ready(&self, _font: FontFamily) -> Result<(), FontError> {
        Ok(())
    }
}
