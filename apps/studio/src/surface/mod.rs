//! Retained preview surfaces and the render tree that holds them.
//!
//! A surface is the renderer's node tree plus the host-visible inline presentation
//! attributes. Layout is computed lazily and cached; any attribute or content change
//! invalidates the cache, and `reflow` forces a fresh computation.

pub mod flow;
pub mod image;
pub mod node;
pub mod style;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use crate::layout::{mm_to_px, Edges, FontFamily, Length};
use crate::surface::flow::{layout_flow, DisplayItem};
use crate::surface::image::ImageHandle;
use crate::surface::node::Node;
use crate::surface::style::{InlineStyle, PresentationAttr};

/// Identifier of the resume preview surface mounted by the renderer.
pub const PREVIEW_SURFACE_ID: &str = "resume-preview-content";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(String);

impl SurfaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn preview() -> Self {
        Self::new(PREVIEW_SURFACE_ID)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Class-level styling that applies when no inline attribute overrides it.
#[derive(Debug, Clone)]
pub struct BaseStyle {
    pub max_width: Length,
    pub min_height: Length,
    pub shadow: bool,
}

impl Default for BaseStyle {
    /// A4 sheet: at most 210mm wide, at least 297mm tall, with a drop shadow.
    fn default() -> Self {
        Self {
            max_width: Length::Px(mm_to_px(210.0)),
            min_height: Length::Px(mm_to_px(297.0)),
            shadow: true,
        }
    }
}

/// Computed geometry of a surface, in px.
#[derive(Debug, Clone)]
pub struct SurfaceLayout {
    pub width: f32,
    pub height: f32,
    pub content_height: f32,
    pub scroll_width: f32,
    pub scroll_height: f32,
    /// Uniform scale from an inline `transform: scale(..)`.
    pub scale: f32,
    pub shadow: bool,
    pub margin: Edges,
    pub padding: Edges,
    pub items: Vec<DisplayItem>,
}

pub type SharedSurface = Arc<Mutex<Surface>>;

pub struct Surface {
    id: SurfaceId,
    root: Node,
    font: FontFamily,
    inline: InlineStyle,
    base: BaseStyle,
    viewport_width: f32,
    cached: Option<Arc<SurfaceLayout>>,
}

impl Surface {
    pub fn new(id: SurfaceId, root: Node, font: FontFamily, viewport_width: f32) -> Self {
        Self {
            id,
            root,
            font,
            inline: InlineStyle::default(),
            base: BaseStyle::default(),
            viewport_width,
            cached: None,
        }
    }

    pub fn id(&self) -> &SurfaceId {
        &self.id
    }

    pub fn font(&self) -> FontFamily {
        self.font
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn inline_style(&self) -> &InlineStyle {
        &self.inline
    }

    pub fn attr(&self, attr: PresentationAttr) -> Option<&str> {
        self.inline.get(attr)
    }

    pub fn set_attr(&mut self, attr: PresentationAttr, value: impl Into<String>) {
        self.inline.set(attr, value);
        self.cached = None;
    }

    pub fn remove_attr(&mut self, attr: PresentationAttr) {
        self.inline.remove(attr);
        self.cached = None;
    }

    /// Swaps in freshly rendered content. Inline presentation attributes are kept.
    pub fn replace_content(&mut self, root: Node, font: FontFamily) {
        self.root = root;
        self.font = font;
        self.cached = None;
    }

    pub fn is_layout_stale(&self) -> bool {
        self.cached.is_none()
    }

    pub fn images(&self) -> Vec<ImageHandle> {
        let mut images = Vec::new();
        self.root.collect_images(&mut images);
        images
    }

    /// Current layout, computed on first access after an invalidation.
    pub fn layout(&mut self) -> Arc<SurfaceLayout> {
        if let Some(layout) = &self.cached {
            return Arc::clone(layout);
        }
        let layout = Arc::new(self.compute_layout());
        self.cached = Some(Arc::clone(&layout));
        layout
    }

    /// Discards any cached layout and recomputes it from the current attributes.
    pub fn reflow(&mut self) -> Arc<SurfaceLayout> {
        self.cached = None;
        self.layout()
    }

    fn length(&self, attr: PresentationAttr) -> Option<Length> {
        self.inline.get(attr).and_then(Length::parse)
    }

    fn compute_layout(&self) -> SurfaceLayout {
        let viewport = self.viewport_width.max(0.0);

        let mut width = self
            .length(PresentationAttr::Width)
            .and_then(|w| w.resolve(viewport))
            .unwrap_or(viewport);
        let max_width = self
            .length(PresentationAttr::MaxWidth)
            .unwrap_or(self.base.max_width);
        if let Some(max) = max_width.resolve(viewport) {
            width = width.min(max);
        }
        let width = width.max(0.0);

        let padding = self
            .inline
            .get(PresentationAttr::Padding)
            .and_then(Edges::parse)
            .unwrap_or_default();
        let margin = self
            .inline
            .get(PresentationAttr::Margin)
            .and_then(Edges::parse)
            .unwrap_or_default();

        let flow = layout_flow(
            &self.root,
            padding.left,
            padding.top,
            width - padding.horizontal(),
            self.font,
        );
        let content_height = flow.height + padding.vertical();

        let min_height = self
            .length(PresentationAttr::MinHeight)
            .unwrap_or(self.base.min_height)
            .resolve(0.0)
            .unwrap_or(0.0);
        // Percent heights need a sized container, which the surface never has.
        let height = match self.length(PresentationAttr::Height) {
            Some(Length::Px(px)) => px.max(0.0),
            _ => content_height.max(min_height),
        };

        let shadow = match self.inline.get(PresentationAttr::BoxShadow) {
            Some(value) => !value.trim().eq_ignore_ascii_case("none"),
            None => self.base.shadow,
        };

        SurfaceLayout {
            width,
            height,
            content_height,
            scroll_width: width,
            scroll_height: height.max(content_height),
            scale: self
                .inline
                .get(PresentationAttr::Transform)
                .map(parse_scale)
                .unwrap_or(1.0),
            shadow,
            margin,
            padding,
            items: flow.items,
        }
    }
}

/// Extracts the x factor of `scale(..)`; anything else is treated as identity.
fn parse_scale(transform: &str) -> f32 {
    let transform = transform.trim();
    transform
        .strip_prefix("scale(")
        .and_then(|rest| rest.strip_suffix(')'))
        .and_then(|args| args.split(',').next())
        .and_then(|x| x.trim().parse::<f32>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(1.0)
}

// ────────────────────────────────────────────────────────────────────────────
// Render tree
// ────────────────────────────────────────────────────────────────────────────

/// Registry of mounted surfaces keyed by identifier.
#[derive(Clone, Default)]
pub struct RenderTree {
    surfaces: Arc<RwLock<HashMap<SurfaceId, SharedSurface>>>,
}

impl RenderTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a surface, replacing any surface with the same id.
    pub fn mount(&self, surface: Surface) -> SharedSurface {
        let id = surface.id().clone();
        let shared = Arc::new(Mutex::new(surface));
        self.surfaces.write().insert(id, Arc::clone(&shared));
        shared
    }

    pub fn get(&self, id: &SurfaceId) -> Option<SharedSurface> {
        self.surfaces.read().get(id).cloned()
    }

    pub fn unmount(&self, id: &SurfaceId) -> Option<SharedSurface> {
        self.surfaces.write().remove(id)
    }

    pub fn contains(&self, id: &SurfaceId) -> bool {
        self.surfaces.read().contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::node::TextStyle;

    fn surface_with_lines(lines: usize) -> Surface {
        let text = vec!["line"; lines].join("\n");
        Surface::new(
            SurfaceId::preview(),
            Node::text(text, TextStyle::new(20.0, "#000")),
            FontFamily::Inter,
            900.0,
        )
    }

    #[test]
    fn test_width_is_clamped_to_a4_by_default() {
        let mut surface = surface_with_lines(1);
        let layout = surface.layout();
        assert!((layout.width - 793.7).abs() < 0.1);
    }

    #[test]
    fn test_short_content_uses_min_height() {
        let mut surface = surface_with_lines(1);
        let layout = surface.layout();
        assert!((layout.height - 1122.5).abs() < 0.1);
        assert_eq!(layout.scroll_height, layout.height);
    }

    #[test]
    fn test_fixed_height_keeps_scroll_height_of_content() {
        let mut surface = surface_with_lines(100);
        surface.set_attr(PresentationAttr::Height, "500px");
        let layout = surface.layout();
        assert_eq!(layout.height, 500.0);
        assert_eq!(layout.scroll_height, 3000.0);
    }

    #[test]
    fn test_attribute_change_invalidates_cached_layout() {
        let mut surface = surface_with_lines(1);
        let before = surface.layout();
        assert!(!surface.is_layout_stale());
        surface.set_attr(PresentationAttr::MaxWidth, "100px");
        assert!(surface.is_layout_stale());
        let after = surface.layout();
        assert_eq!(after.width, 100.0);
        assert!(before.width > after.width);
    }

    #[test]
    fn test_shadow_and_scale_follow_inline_style() {
        let mut surface = surface_with_lines(1);
        assert!(surface.layout().shadow);
        surface.set_attr(PresentationAttr::BoxShadow, "none");
        surface.set_attr(PresentationAttr::Transform, "scale(0.5)");
        let layout = surface.layout();
        assert!(!layout.shadow);
        assert_eq!(layout.scale, 0.5);
    }

    #[test]
    fn test_parse_scale_ignores_other_transforms() {
        assert_eq!(parse_scale("none"), 1.0);
        assert_eq!(parse_scale("rotate(10deg)"), 1.0);
        assert_eq!(parse_scale("scale(0.75, 0.75)"), 0.75);
        assert_eq!(parse_scale("scale(-1)"), 1.0);
    }

    #[test]
    fn test_render_tree_mount_and_lookup() {
        let tree = RenderTree::new();
        assert!(tree.get(&SurfaceId::preview()).is_none());
        tree.mount(surface_with_lines(1));
        assert!(tree.contains(&SurfaceId::preview()));
        tree.unmount(&SurfaceId::preview());
        assert!(tree.get(&SurfaceId::preview()).is_none());
    }
}
