//! Inline presentation attributes of a surface and colour parsing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Host-visible presentation attributes that the export path may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresentationAttr {
    Width,
    MaxWidth,
    Height,
    MinHeight,
    Transform,
    TransformOrigin,
    BoxShadow,
    Margin,
    Padding,
}

impl PresentationAttr {
    pub const ALL: [PresentationAttr; 9] = [
        PresentationAttr::Width,
        PresentationAttr::MaxWidth,
        PresentationAttr::Height,
        PresentationAttr::MinHeight,
        PresentationAttr::Transform,
        PresentationAttr::TransformOrigin,
        PresentationAttr::BoxShadow,
        PresentationAttr::Margin,
        PresentationAttr::Padding,
    ];

    pub fn css_name(&self) -> &'static str {
        match self {
            PresentationAttr::Width => "width",
            PresentationAttr::MaxWidth => "max-width",
            PresentationAttr::Height => "height",
            PresentationAttr::MinHeight => "min-height",
            PresentationAttr::Transform => "transform",
            PresentationAttr::TransformOrigin => "transform-origin",
            PresentationAttr::BoxShadow => "box-shadow",
            PresentationAttr::Margin => "margin",
            PresentationAttr::Padding => "padding",
        }
    }
}

/// Inline style of a surface. Absent attributes fall back to the surface's base style.
///
/// Setting an attribute to an empty string removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InlineStyle(BTreeMap<PresentationAttr, String>);

impl InlineStyle {
    pub fn get(&self, attr: PresentationAttr) -> Option<&str> {
        self.0.get(&attr).map(String::as_str)
    }

    pub fn set(&mut self, attr: PresentationAttr, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            self.0.remove(&attr);
        } else {
            self.0.insert(attr, value);
        }
    }

    pub fn remove(&mut self, attr: PresentationAttr) -> Option<String> {
        self.0.remove(&attr)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PresentationAttr, &str)> {
        self.0.iter().map(|(attr, value)| (*attr, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa` and a few keywords into RGBA.
///
/// Anything else yields `None`; painters skip what they cannot parse.
pub fn parse_color(value: &str) -> Option<[u8; 4]> {
    let value = value.trim();
    match value.to_ascii_lowercase().as_str() {
        "white" => return Some([255, 255, 255, 255]),
        "black" => return Some([0, 0, 0, 255]),
        "transparent" => return Some([0, 0, 0, 0]),
        _ => {}
    }

    let hex = value.strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|n| n * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

    match hex.len() {
        3 => Some([nibble(0)?, nibble(1)?, nibble(2)?, 255]),
        4 => Some([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_removes_attribute() {
        let mut style = InlineStyle::default();
        style.set(PresentationAttr::BoxShadow, "0 0 4px black");
        assert_eq!(style.get(PresentationAttr::BoxShadow), Some("0 0 4px black"));
        style.set(PresentationAttr::BoxShadow, "");
        assert_eq!(style.get(PresentationAttr::BoxShadow), None);
        assert!(style.is_empty());
    }

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#003366"), Some([0x00, 0x33, 0x66, 255]));
        assert_eq!(parse_color("#fff"), Some([255, 255, 255, 255]));
        assert_eq!(parse_color("#00000080"), Some([0, 0, 0, 0x80]));
        assert_eq!(parse_color("white"), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_color("not-a-colour"), None);
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("#gggggg"), None);
        assert_eq!(parse_color("#ééé"), None);
    }
}
