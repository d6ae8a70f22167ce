//! Built-in rasterizer that paints a surface's display list.
//!
//! Fills, rules and images are painted exactly. Text is painted as one ink bar
//! per word, positioned and sized from the font metric tables, so the capture
//! keeps the page's geometry without a glyph renderer.

use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::export::raster::{CaptureError, CaptureOptions, Rasterizer};
use crate::surface::flow::{DisplayItem, Rect};
use crate::surface::image::ImageState;
use crate::surface::style::parse_color;
use crate::surface::SurfaceLayout;

/// Width of the drop-shadow halo, in device pixels.
const SHADOW_PX: u32 = 6;
const SHADOW_ALPHA: u32 = 40;

/// Share of the font size covered by an ink bar.
const INK_REGULAR: f32 = 0.4;
const INK_BOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, Default)]
pub struct WireframeRasterizer;

#[async_trait]
impl Rasterizer for WireframeRasterizer {
    async fn rasterize(
        &self,
        layout: Arc<SurfaceLayout>,
        options: CaptureOptions,
    ) -> Result<RgbaImage, CaptureError> {
        let (width, height) = options.canvas_size()?;
        // Painting is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || paint(&layout, &options, width, height))
            .await
            .map_err(|e| CaptureError::Task(e.to_string()))
    }
}

fn paint(layout: &SurfaceLayout, options: &CaptureOptions, width: u32, height: u32) -> RgbaImage {
    let mut canvas = Canvas {
        image: RgbaImage::from_pixel(width, height, Rgba(options.background)),
        scale: options.scale * layout.scale,
        origin: (layout.margin.left, layout.margin.top),
    };

    if layout.shadow {
        canvas.shadow(layout.width, layout.height);
    }

    for item in &layout.items {
        match item {
            DisplayItem::Fill { rect, color } => {
                if let Some(color) = parse_color(color) {
                    canvas.fill(*rect, color);
                }
            }
            DisplayItem::TextLine {
                rect,
                words,
                size_px,
                bold,
                color,
                ..
            } => {
                let Some(color) = parse_color(color) else {
                    continue;
                };
                let ink = if *bold { INK_BOLD } else { INK_REGULAR };
                let top = rect.y + (rect.height - size_px) / 2.0 + size_px * 0.3;
                for word in words {
                    canvas.fill(
                        Rect::new(rect.x + word.x, top, word.width, size_px * ink),
                        color,
                    );
                }
            }
            DisplayItem::Image {
                rect,
                image,
                round,
                ring,
            } => {
                if !options.use_cors && is_remote(image.src()) {
                    debug!("cross-origin image left blank");
                } else if let ImageState::Loaded(bitmap) = image.current() {
                    canvas.draw_image(*rect, &bitmap, *round);
                }
                if let Some((thickness, color)) = ring {
                    if let Some(color) = parse_color(color) {
                        canvas.ring(*rect, *thickness, color, *round);
                    }
                }
            }
        }
    }

    canvas.image
}

fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

struct Canvas {
    image: RgbaImage,
    /// Device pixels per surface px.
    scale: f32,
    /// Surface-px offset of the border box (the surface's margin).
    origin: (f32, f32),
}

impl Canvas {
    fn to_device(&self, x: f32, y: f32) -> (f32, f32) {
        (
            ((x + self.origin.0) * self.scale).round(),
            ((y + self.origin.1) * self.scale).round(),
        )
    }

    /// Device-pixel bounds `(x0, y0, x1, y1)` of a surface rect, clipped to the bitmap.
    fn device_bounds(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let (x0, y0) = self.to_device(rect.x, rect.y);
        let (x1, y1) = self.to_device(rect.x + rect.width, rect.y + rect.height);
        let x0 = x0.max(0.0);
        let y0 = y0.max(0.0);
        let x1 = x1.min(self.image.width() as f32);
        let y1 = y1.min(self.image.height() as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn fill(&mut self, rect: Rect, color: [u8; 4]) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                blend(self.image.get_pixel_mut(x, y), color);
            }
        }
    }

    fn draw_image(&mut self, rect: Rect, bitmap: &RgbaImage, round: bool) {
        let Some((x0, y0, x1, y1)) = self.device_bounds(rect) else {
            return;
        };
        let (left, top) = self.to_device(rect.x, rect.y);
        let w = (rect.width * self.scale).round().max(1.0) as u32;
        let h = (rect.height * self.scale).round().max(1.0) as u32;
        let resized = if bitmap.dimensions() == (w, h) {
            Cow::Borrowed(bitmap)
        } else {
            Cow::Owned(imageops::resize(bitmap, w, h, FilterType::Triangle))
        };

        let (cx, cy) = (w as f32 / 2.0, h as f32 / 2.0);
        let radius = w.min(h) as f32 / 2.0;
        for y in y0..y1 {
            for x in x0..x1 {
                let sx = x as f32 - left;
                let sy = y as f32 - top;
                if sx < 0.0 || sy < 0.0 || sx >= w as f32 || sy >= h as f32 {
                    continue;
                }
                if round {
                    let dx = sx + 0.5 - cx;
                    let dy = sy + 0.5 - cy;
                    if dx * dx + dy * dy > radius * radius {
                        continue;
                    }
                }
                let src = resized.get_pixel(sx as u32, sy as u32).0;
                blend(self.image.get_pixel_mut(x, y), src);
            }
        }
    }

    /// Border of `thickness` px around `rect`, drawn outside it.
    fn ring(&mut self, rect: Rect, thickness: f32, color: [u8; 4], round: bool) {
        if thickness <= 0.0 {
            return;
        }
        let outer = Rect::new(
            rect.x - thickness,
            rect.y - thickness,
            rect.width + 2.0 * thickness,
            rect.height + 2.0 * thickness,
        );

        if !round {
            self.fill(Rect::new(outer.x, outer.y, outer.width, thickness), color);
            self.fill(Rect::new(outer.x, rect.bottom(), outer.width, thickness), color);
            self.fill(Rect::new(outer.x, rect.y, thickness, rect.height), color);
            self.fill(
                Rect::new(rect.x + rect.width, rect.y, thickness, rect.height),
                color,
            );
            return;
        }

        let Some((x0, y0, x1, y1)) = self.device_bounds(outer) else {
            return;
        };
        let (cx, cy) = self.to_device(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0);
        let inner_r = rect.width.min(rect.height) / 2.0 * self.scale;
        let outer_r = inner_r + thickness * self.scale;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d >= inner_r && d <= outer_r {
                    blend(self.image.get_pixel_mut(x, y), color);
                }
            }
        }
    }

    /// Soft grey halo just inside the border box.
    fn shadow(&mut self, width: f32, height: f32) {
        let px = 1.0 / self.scale;
        for i in 0..SHADOW_PX {
            let alpha = (SHADOW_ALPHA * (SHADOW_PX - i) / SHADOW_PX) as u8;
            let color = [0, 0, 0, alpha];
            let inset = i as f32 * px;
            let span_w = width - 2.0 * inset;
            let span_h = height - 2.0 * inset;
            self.fill(Rect::new(inset, inset, span_w, px), color);
            self.fill(Rect::new(inset, height - inset - px, span_w, px), color);
            self.fill(Rect::new(inset, inset + px, px, span_h - 2.0 * px), color);
            self.fill(
                Rect::new(width - inset - px, inset + px, px, span_h - 2.0 * px),
                color,
            );
        }
    }
}

/// Source-over compositing of `color` onto `pixel`.
fn blend(pixel: &mut Rgba<u8>, color: [u8; 4]) {
    let alpha = color[3] as u32;
    if alpha == 0 {
        return;
    }
    if alpha == 255 {
        *pixel = Rgba(color);
        return;
    }
    let inv = 255 - alpha;
    for c in 0..3 {
        pixel.0[c] = ((color[c] as u32 * alpha + pixel.0[c] as u32 * inv) / 255) as u8;
    }
    pixel.0[3] = (alpha + pixel.0[3] as u32 * inv / 255).min(255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FontFamily;
    use crate::surface::image::ImageHandle;
    use crate::surface::node::{ImageBox, Node, TextStyle};
    use crate::surface::style::PresentationAttr;
    use crate::surface::{Surface, SurfaceId};

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const RED: [u8; 4] = [255, 0, 0, 255];

    fn layout_of(root: Node) -> Arc<SurfaceLayout> {
        let mut surface = Surface::new(SurfaceId::new("test"), root, FontFamily::Inter, 200.0);
        surface.set_attr(PresentationAttr::BoxShadow, "none");
        surface.set_attr(PresentationAttr::MinHeight, "0");
        surface.layout()
    }

    fn options_for(layout: &SurfaceLayout, scale: f32, use_cors: bool) -> CaptureOptions {
        CaptureOptions {
            scale,
            width: layout.scroll_width,
            height: layout.scroll_height,
            background: WHITE,
            use_cors,
        }
    }

    fn avatar(src: &str) -> Node {
        let bitmap = RgbaImage::from_pixel(40, 40, Rgba(RED));
        Node::block(vec![Node::image(ImageBox {
            image: ImageHandle::loaded(src, bitmap),
            width: 40.0,
            height: 40.0,
            round: true,
            ring: None,
        })])
    }

    #[tokio::test]
    async fn test_bitmap_matches_scroll_size_times_scale() {
        let layout = layout_of(Node::block(vec![Node::text(
            "Hello",
            TextStyle::new(16.0, "#000000"),
        )]));
        let options = options_for(&layout, 2.0, true);
        let bitmap = WireframeRasterizer
            .rasterize(Arc::clone(&layout), options)
            .await
            .unwrap();
        assert_eq!(bitmap.dimensions(), options.canvas_size().unwrap());
    }

    #[tokio::test]
    async fn test_background_fill_and_text_ink_are_painted() {
        let layout = layout_of(
            Node::block(vec![Node::text(
                "Ink ink ink",
                TextStyle::new(20.0, "#000000").bold(),
            )])
            .background("#003366"),
        );
        let bitmap = WireframeRasterizer
            .rasterize(Arc::clone(&layout), options_for(&layout, 1.0, true))
            .await
            .unwrap();

        assert_eq!(bitmap.get_pixel(150, 2).0, [0x00, 0x33, 0x66, 255]);
        let has_ink = bitmap.pixels().any(|p| p.0 == [0, 0, 0, 255]);
        assert!(has_ink);
    }

    #[tokio::test]
    async fn test_round_image_is_masked_to_circle() {
        let layout = layout_of(avatar("data:image/png;base64,AAAA"));
        let bitmap = WireframeRasterizer
            .rasterize(Arc::clone(&layout), options_for(&layout, 1.0, true))
            .await
            .unwrap();

        assert_eq!(bitmap.get_pixel(20, 20).0, RED);
        assert_eq!(bitmap.get_pixel(1, 1).0, WHITE);
    }

    #[tokio::test]
    async fn test_remote_image_is_blank_without_cors() {
        let layout = layout_of(avatar("https://example.invalid/me.png"));
        let bitmap = WireframeRasterizer
            .rasterize(Arc::clone(&layout), options_for(&layout, 1.0, false))
            .await
            .unwrap();
        assert_eq!(bitmap.get_pixel(20, 20).0, WHITE);
    }

    #[tokio::test]
    async fn test_shadow_darkens_edges_only_when_enabled() {
        let mut surface = Surface::new(
            SurfaceId::new("test"),
            Node::block(Vec::new()),
            FontFamily::Inter,
            100.0,
        );
        surface.set_attr(PresentationAttr::MinHeight, "50px");
        let layout = surface.layout();
        assert!(layout.shadow);

        let bitmap = WireframeRasterizer
            .rasterize(Arc::clone(&layout), options_for(&layout, 1.0, true))
            .await
            .unwrap();
        assert_ne!(bitmap.get_pixel(0, 25).0, WHITE);
        assert_eq!(bitmap.get_pixel(50, 25).0, WHITE);
    }

    #[test]
    fn test_blend_half_alpha_over_white() {
        let mut pixel = Rgba(WHITE);
        blend(&mut pixel, [0, 0, 0, 128]);
        assert_eq!(pixel.0[0], 127);
        assert_eq!(pixel.0[3], 255);
    }
}
