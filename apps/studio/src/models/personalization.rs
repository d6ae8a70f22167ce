use serde::{Deserialize, Serialize};

use crate::layout::FontFamily;

/// User-chosen colours and font for the preview.
///
/// Colours are passed through to the renderer verbatim; nothing here validates them.
/// `font_family` is a symbolic name resolved against the bundled font set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationConfig {
    pub primary_color: String,
    pub accent_color: String,
    pub font_family: String,
}

impl Default for PersonalizationConfig {
    fn default() -> Self {
        Self {
            primary_color: "#003366".to_string(),
            accent_color: "#78A7D1".to_string(),
            font_family: FontFamily::GeistSans.id().to_string(),
        }
    }
}

impl PersonalizationConfig {
    /// The font the renderer will actually use (falls back to the default font).
    pub fn resolved_font(&self) -> FontFamily {
        FontFamily::resolve(&self.font_family)
    }
}

/// Closed set of preview layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    #[default]
    Classic,
}

impl TemplateId {
    pub const ALL: [TemplateId; 1] = [TemplateId::Classic];

    pub fn id(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TemplateId::Classic => "Classic Professional",
        }
    }
}
