//! Block/row flow layout: turns a node tree into a display list.
//!
//! Blocks stack children vertically, rows place them side by side and stretch
//! their backgrounds to the tallest child. Text wraps greedily using the static
//! font tables at a fixed 1.5 line height.

use serde::Serialize;

use crate::layout::{get_metrics, FontFamily, FontMetricTable};
use crate::surface::image::ImageHandle;
use crate::surface::node::{Align, ImageBox, Node, NodeKind, TextStyle};

pub const LINE_HEIGHT: f32 = 1.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Horizontal span of one word, relative to its line's rect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InkSpan {
    pub x: f32,
    pub width: f32,
}

/// One paint operation, in surface px. Items are in paint order.
#[derive(Debug, Clone)]
pub enum DisplayItem {
    Fill {
        rect: Rect,
        color: String,
    },
    TextLine {
        rect: Rect,
        text: String,
        words: Vec<InkSpan>,
        size_px: f32,
        bold: bool,
        color: String,
    },
    Image {
        rect: Rect,
        image: ImageHandle,
        round: bool,
        ring: Option<(f32, String)>,
    },
}

impl DisplayItem {
    pub fn rect(&self) -> Rect {
        match self {
            DisplayItem::Fill { rect, .. }
            | DisplayItem::TextLine { rect, .. }
            | DisplayItem::Image { rect, .. } => *rect,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlowResult {
    pub items: Vec<DisplayItem>,
    /// Height of the laid-out content, excluding anything outside the root node.
    pub height: f32,
}

/// Lays out `root` with its top-left corner at `(x, y)` inside `width` px.
pub fn layout_flow(root: &Node, x: f32, y: f32, width: f32, font: FontFamily) -> FlowResult {
    let mut flow = Flow {
        metrics: get_metrics(font),
        items: Vec::new(),
    };
    let placed = flow.place(root, x, y, width.max(0.0));
    FlowResult {
        items: flow.items,
        height: placed.height,
    }
}

struct Flow {
    metrics: &'static FontMetricTable,
    items: Vec<DisplayItem>,
}

struct Placed {
    height: f32,
    background: Option<usize>,
}

impl Flow {
    fn place(&mut self, node: &Node, x: f32, y: f32, width: f32) -> Placed {
        // Backgrounds paint first; the height is patched once the content is known.
        let background = node.style.background.as_ref().map(|color| {
            self.items.push(DisplayItem::Fill {
                rect: Rect::new(x, y, width, 0.0),
                color: color.clone(),
            });
            self.items.len() - 1
        });

        let pad = node.style.padding;
        let inner_x = x + pad.left;
        let inner_y = y + pad.top;
        let inner_w = (width - pad.horizontal()).max(0.0);

        let content_h = match &node.kind {
            NodeKind::Block(children) => self.place_block(children, inner_x, inner_y, inner_w),
            NodeKind::Row(children) => self.place_row(children, inner_x, inner_y, inner_w),
            NodeKind::Text { text, style } => {
                self.place_text(text, style, node.style.align, inner_x, inner_y, inner_w)
            }
            NodeKind::Image(image) => {
                self.place_image(image, node.style.align, inner_x, inner_y, inner_w)
            }
        };

        let mut height = content_h + pad.vertical();
        if let Some((thickness, color)) = &node.style.border_bottom {
            self.items.push(DisplayItem::Fill {
                rect: Rect::new(x, y + height, width, *thickness),
                color: color.clone(),
            });
            height += thickness;
        }

        let placed = Placed { height, background };
        self.stretch(&placed, height);
        placed
    }

    fn stretch(&mut self, placed: &Placed, height: f32) {
        if let Some(idx) = placed.background {
            if let Some(DisplayItem::Fill { rect, .. }) = self.items.get_mut(idx) {
                rect.height = height;
            }
        }
    }

    fn place_block(&mut self, children: &[Node], x: f32, y: f32, width: f32) -> f32 {
        let mut cursor = y;
        for (i, child) in children.iter().enumerate() {
            let child_w = child
                .style
                .width
                .and_then(|w| w.resolve(width))
                .map(|w| w.min(width))
                .unwrap_or(width);
            let child_x = match child.style.align {
                Align::Center => x + (width - child_w) / 2.0,
                Align::Start => x,
            };
            let placed = self.place(child, child_x, cursor, child_w);
            cursor += placed.height;
            if i + 1 < children.len() {
                cursor += child.style.gap_after;
            }
        }
        cursor - y
    }

    fn place_row(&mut self, children: &[Node], x: f32, y: f32, width: f32) -> f32 {
        let fixed: Vec<Option<f32>> = children
            .iter()
            .map(|c| c.style.width.and_then(|w| w.resolve(width)))
            .collect();
        let fixed_total: f32 = fixed.iter().flatten().sum();
        let flexible = fixed.iter().filter(|w| w.is_none()).count();
        let share = if flexible > 0 {
            ((width - fixed_total) / flexible as f32).max(0.0)
        } else {
            0.0
        };

        let mut cursor = x;
        let mut placed = Vec::with_capacity(children.len());
        for (child, fixed_w) in children.iter().zip(&fixed) {
            let child_w = fixed_w.unwrap_or(share);
            placed.push(self.place(child, cursor, y, child_w));
            cursor += child_w;
        }

        let row_h = placed.iter().map(|p| p.height).fold(0.0_f32, f32::max);
        for p in &placed {
            self.stretch(p, row_h);
        }
        row_h
    }

    fn place_text(
        &mut self,
        text: &str,
        style: &TextStyle,
        align: Align,
        x: f32,
        y: f32,
        width: f32,
    ) -> f32 {
        if style.size_px <= 0.0 {
            return 0.0;
        }
        let line_h = style.size_px * LINE_HEIGHT;
        let lines = self
            .metrics
            .wrap(text, width / style.size_px, style.bold);

        for (i, line) in lines.iter().enumerate() {
            let line_w = line.width_em * style.size_px;
            let line_x = match align {
                Align::Center => x + ((width - line_w) / 2.0).max(0.0),
                Align::Start => x,
            };
            self.items.push(DisplayItem::TextLine {
                rect: Rect::new(line_x, y + i as f32 * line_h, line_w, line_h),
                text: line.text.clone(),
                words: line
                    .words
                    .iter()
                    .map(|w| InkSpan {
                        x: w.offset_em * style.size_px,
                        width: w.width_em * style.size_px,
                    })
                    .collect(),
                size_px: style.size_px,
                bold: style.bold,
                color: style.color.clone(),
            });
        }
        lines.len() as f32 * line_h
    }

    fn place_image(&mut self, image: &ImageBox, align: Align, x: f32, y: f32, width: f32) -> f32 {
        let img_x = match align {
            Align::Center => x + ((width - image.width) / 2.0).max(0.0),
            Align::Start => x,
        };
        self.items.push(DisplayItem::Image {
            rect: Rect::new(img_x, y, image.width, image.height),
            image: image.image.clone(),
            round: image.round,
            ring: image.ring.clone(),
        });
        image.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Edges, Length};

    fn body() -> TextStyle {
        TextStyle::new(10.0, "#000000")
    }

    #[test]
    fn test_empty_block_has_padding_height_only() {
        let node = Node::block(vec![]).padding(Edges::all(8.0));
        let result = layout_flow(&node, 0.0, 0.0, 100.0, FontFamily::Inter);
        assert_eq!(result.height, 16.0);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_block_stacks_children_with_gaps() {
        let node = Node::block(vec![
            Node::text("one", body()).gap_after(4.0),
            Node::text("two", body()).gap_after(4.0),
        ]);
        let result = layout_flow(&node, 0.0, 0.0, 200.0, FontFamily::Inter);
        // Two 15px lines and one gap; the last child's gap is not applied.
        assert_eq!(result.height, 34.0);
        let second = result.items[1].rect();
        assert_eq!(second.y, 19.0);
    }

    #[test]
    fn test_row_stretches_backgrounds_to_tallest_child() {
        let node = Node::row(vec![
            Node::block(vec![Node::text("short", body())])
                .width(Length::Percent(35.0))
                .background("#003366"),
            Node::block(vec![Node::text("line\nline\nline", body())]),
        ]);
        let result = layout_flow(&node, 0.0, 0.0, 200.0, FontFamily::Inter);
        assert_eq!(result.height, 45.0);

        let DisplayItem::Fill { rect, .. } = &result.items[0] else {
            panic!("first item should be the sidebar background");
        };
        assert_eq!(rect.width, 70.0);
        assert_eq!(rect.height, 45.0);
    }

    #[test]
    fn test_border_bottom_adds_height_and_rule() {
        let node = Node::text("Title", body()).border_bottom(2.0, "#003366");
        let result = layout_flow(&node, 0.0, 0.0, 200.0, FontFamily::Inter);
        assert_eq!(result.height, 17.0);
        let rule = result.items.last().unwrap().rect();
        assert_eq!((rule.y, rule.height, rule.width), (15.0, 2.0, 200.0));
    }

    #[test]
    fn test_centered_text_is_offset() {
        let node = Node::text("Hi", body()).centered();
        let result = layout_flow(&node, 0.0, 0.0, 200.0, FontFamily::Inter);
        assert!(result.items[0].rect().x > 50.0);
    }

    #[test]
    fn test_narrow_width_wraps_text_taller() {
        let text = "Designed and shipped a resume builder with live preview and PDF export";
        let wide = layout_flow(&Node::text(text, body()), 0.0, 0.0, 1000.0, FontFamily::Inter);
        let narrow = layout_flow(&Node::text(text, body()), 0.0, 0.0, 80.0, FontFamily::Inter);
        assert!(narrow.height > wide.height);
    }
}
