//! CSS-style lengths used by surface presentation attributes.

use serde::Serialize;

pub const PX_PER_INCH: f32 = 96.0;
pub const MM_PER_INCH: f32 = 25.4;
pub const PT_PER_INCH: f32 = 72.0;

pub fn mm_to_px(mm: f32) -> f32 {
    mm * PX_PER_INCH / MM_PER_INCH
}

pub fn px_to_mm(px: f32) -> f32 {
    px * MM_PER_INCH / PX_PER_INCH
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm * PT_PER_INCH / MM_PER_INCH
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Length {
    Px(f32),
    Percent(f32),
    Auto,
}

impl Length {
    /// Parses `auto`, `none`, `initial`, `<n>px`, `<n>mm`, `<n>pt`, `<n>in`, `<n>%` and
    /// unitless numbers (treated as px). `none` and `initial` mean "no constraint".
    pub fn parse(value: &str) -> Option<Length> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "" => return None,
            "auto" | "none" | "initial" | "unset" => return Some(Length::Auto),
            _ => {}
        }

        let split = value
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(value.len());
        let (number, unit) = value.split_at(split);
        let number: f32 = number.parse().ok()?;
        if !number.is_finite() {
            return None;
        }

        match unit.trim() {
            "" | "px" => Some(Length::Px(number)),
            "mm" => Some(Length::Px(mm_to_px(number))),
            "cm" => Some(Length::Px(mm_to_px(number * 10.0))),
            "pt" => Some(Length::Px(number * PX_PER_INCH / PT_PER_INCH)),
            "in" => Some(Length::Px(number * PX_PER_INCH)),
            "%" => Some(Length::Percent(number)),
            _ => None,
        }
    }

    /// Resolves against the containing length; `Auto` yields `None`.
    pub fn resolve(&self, container: f32) -> Option<f32> {
        match self {
            Length::Px(px) => Some(*px),
            Length::Percent(pct) => Some(container * pct / 100.0),
            Length::Auto => None,
        }
    }
}

/// Four-sided box edges in px (margin, padding).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Edges = Edges {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn all(px: f32) -> Self {
        Self::symmetric(px, px)
    }

    pub fn symmetric(vertical: f32, horizontal: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }

    /// Parses the 1–4 value shorthand (`0`, `0 auto`, `1px 2px 3px`, `1px 2px 3px 4px`).
    /// `auto` and percentages resolve to zero. Unparseable input yields `None`.
    pub fn parse(value: &str) -> Option<Edges> {
        let parts = value
            .split_whitespace()
            .map(|part| {
                Length::parse(part).map(|len| match len {
                    Length::Px(px) => px,
                    Length::Percent(_) | Length::Auto => 0.0,
                })
            })
            .collect::<Option<Vec<f32>>>()?;

        match parts.as_slice() {
            [all] => Some(Edges::all(*all)),
            [v, h] => Some(Edges::symmetric(*v, *h)),
            [t, h, b] => Some(Edges {
                top: *t,
                right: *h,
                bottom: *b,
                left: *h,
            }),
            [t, r, b, l] => Some(Edges {
                top: *t,
                right: *r,
                bottom: *b,
                left: *l,
            }),
            _ => None,
        }
    }
}
