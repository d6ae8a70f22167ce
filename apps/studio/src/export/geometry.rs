//! Fitting a captured bitmap onto a single page.

use serde::Serialize;

/// Page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    /// ISO 216 A4, portrait.
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::A4
    }
}

/// Where the image lands on the page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub x_mm: f32,
    pub y_mm: f32,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// Scales an `image_width` × `image_height` bitmap to the page width, or to the
/// page height when that would overflow the page, keeping its aspect ratio.
/// The result is centred; negative offsets are clamped to zero.
pub fn fit_to_page(image_width: u32, image_height: u32, page: PageSize) -> Placement {
    let aspect = image_width.max(1) as f32 / image_height.max(1) as f32;

    let mut width_mm = page.width_mm;
    let mut height_mm = page.width_mm / aspect;
    if height_mm > page.height_mm {
        height_mm = page.height_mm;
        width_mm = page.height_mm * aspect;
    }

    Placement {
        x_mm: ((page.width_mm - width_mm) / 2.0).max(0.0),
        y_mm: ((page.height_mm - height_mm) / 2.0).max(0.0),
        width_mm,
        height_mm,
    }
}
