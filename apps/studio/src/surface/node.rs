//! Retained node tree the renderer produces and the layout engine consumes.

use crate::layout::{Edges, Length};
use crate::surface::image::ImageHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Start,
    Center,
}

#[derive(Debug, Clone, Default)]
pub struct NodeStyle {
    /// Width relative to the parent's content box; `None` fills it (or shares a row).
    pub width: Option<Length>,
    pub padding: Edges,
    /// Vertical gap before the next sibling in a block.
    pub gap_after: f32,
    pub background: Option<String>,
    /// Thickness (px) and colour of a bottom rule.
    pub border_bottom: Option<(f32, String)>,
    pub align: Align,
}

#[derive(Debug, Clone)]
pub struct TextStyle {
    pub size_px: f32,
    pub bold: bool,
    pub color: String,
}

impl TextStyle {
    pub fn new(size_px: f32, color: impl Into<String>) -> Self {
        Self {
            size_px,
            bold: false,
            color: color.into(),
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ImageBox {
    pub image: ImageHandle,
    pub width: f32,
    pub height: f32,
    pub round: bool,
    /// Thickness (px) and colour of a ring drawn around the image.
    pub ring: Option<(f32, String)>,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Children stacked vertically.
    Block(Vec<Node>),
    /// Children laid out side by side; all stretch to the tallest.
    Row(Vec<Node>),
    Text { text: String, style: TextStyle },
    Image(ImageBox),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub style: NodeStyle,
}

impl Node {
    pub fn block(children: Vec<Node>) -> Self {
        Self::with_kind(NodeKind::Block(children))
    }

    pub fn row(children: Vec<Node>) -> Self {
        Self::with_kind(NodeKind::Row(children))
    }

    pub fn text(text: impl Into<String>, style: TextStyle) -> Self {
        Self::with_kind(NodeKind::Text {
            text: text.into(),
            style,
        })
    }

    pub fn image(image: ImageBox) -> Self {
        Self::with_kind(NodeKind::Image(image))
    }

    fn with_kind(kind: NodeKind) -> Self {
        Self {
            kind,
            style: NodeStyle::default(),
        }
    }

    pub fn width(mut self, width: Length) -> Self {
        self.style.width = Some(width);
        self
    }

    pub fn padding(mut self, padding: Edges) -> Self {
        self.style.padding = padding;
        self
    }

    pub fn gap_after(mut self, px: f32) -> Self {
        self.style.gap_after = px;
        self
    }

    pub fn background(mut self, color: impl Into<String>) -> Self {
        self.style.background = Some(color.into());
        self
    }

    pub fn border_bottom(mut self, px: f32, color: impl Into<String>) -> Self {
        self.style.border_bottom = Some((px, color.into()));
        self
    }

    pub fn centered(mut self) -> Self {
        self.style.align = Align::Center;
        self
    }

    /// Every image handle in the subtree, in document order.
    pub fn collect_images(&self, out: &mut Vec<ImageHandle>) {
        match &self.kind {
            NodeKind::Block(children) | NodeKind::Row(children) => {
                for child in children {
                    child.collect_images(out);
                }
            }
            NodeKind::Image(image) => out.push(image.image.clone()),
            NodeKind::Text { .. } => {}
        }
    }

    /// All text in the subtree joined by newlines.
    pub fn text_content(&self) -> String {
        let mut out = Vec::new();
        self.collect_text(&mut out);
        out.join("\n")
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            NodeKind::Block(children) | NodeKind::Row(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
            NodeKind::Text { text, .. } => out.push(text),
            NodeKind::Image(_) => {}
        }
    }
}
