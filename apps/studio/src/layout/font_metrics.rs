//! Static font-metric tables for the bundled preview fonts.
//!
//! Character widths are in em units (relative to font size). Static tables are an
//! approximation of real glyph advances; they drive line wrapping in the preview
//! layout, which is all the capture path needs to size the surface.
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ────────────────────────────────────────────────────────────────────────────
// Font family enum
// ────────────────────────────────────────────────────────────────────────────

/// The fonts a personalization config may select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// Default UI sans-serif.
    #[default]
    GeistSans,
    Inter,
    /// Serif option.
    Lora,
    /// Monospace option.
    RobotoMono,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [
        FontFamily::GeistSans,
        FontFamily::Inter,
        FontFamily::Lora,
        FontFamily::RobotoMono,
    ];

    /// Stable identifier stored in `PersonalizationConfig.font_family`.
    pub fn id(&self) -> &'static str {
        match self {
            FontFamily::GeistSans => "Geist Sans",
            FontFamily::Inter => "Inter",
            FontFamily::Lora => "Lora",
            FontFamily::RobotoMono => "Roboto Mono",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FontFamily::GeistSans => "Geist Sans (Default)",
            FontFamily::Inter => "Inter (Sans Serif)",
            FontFamily::Lora => "Lora (Serif)",
            FontFamily::RobotoMono => "Roboto Mono (Monospace)",
        }
    }

    /// Resolves a symbolic font name (id or display name). Unknown names fall back
    /// to the default font.
    pub fn resolve(name: &str) -> FontFamily {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.id().eq_ignore_ascii_case(name) || f.display_name() == name)
            .unwrap_or_else(|| {
                debug!(font = name, "unknown font family, using default");
                FontFamily::default()
            })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Bold runs are measured this much wider than regular ones.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

/// Static character-width table for a font family.
///
/// `widths[i]` = width of ASCII character `(i + 32)` at 1em.
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
    pub space_width: f32,
}

/// Horizontal extent of one word inside a wrapped line, in em.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WordSpan {
    pub offset_em: f32,
    pub width_em: f32,
}

/// One printed line produced by `FontMetricTable::wrap`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrappedLine {
    pub text: String,
    pub width_em: f32,
    pub words: Vec<WordSpan>,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }

    fn measure_word(&self, word: &str, bold: bool) -> f32 {
        let width = self.measure_str(word);
        if bold {
            width * BOLD_WIDTH_FACTOR
        } else {
            width
        }
    }

    /// Greedy word wrap at `max_width_em`.
    ///
    /// Explicit newlines start a new paragraph and blank paragraphs keep their empty
    /// line, matching pre-wrap whitespace handling. A single word wider than the line
    /// is placed on its own line and overflows.
    pub fn wrap(&self, text: &str, max_width_em: f32, bold: bool) -> Vec<WrappedLine> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let space_w = if bold {
            self.space_width * BOLD_WIDTH_FACTOR
        } else {
            self.space_width
        };
        let mut lines = Vec::new();

        for paragraph in text.split('\n') {
            let mut current = WrappedLine {
                text: String::new(),
                width_em: 0.0,
                words: Vec::new(),
            };

            for word in paragraph.split_whitespace() {
                let word_w = self.measure_word(word, bold);
                let first_on_line = current.words.is_empty();

                if !first_on_line && current.width_em + space_w + word_w > max_width_em {
                    lines.push(std::mem::replace(
                        &mut current,
                        WrappedLine {
                            text: String::new(),
                            width_em: 0.0,
                            words: Vec::new(),
                        },
                    ));
                }

                if !current.words.is_empty() {
                    current.text.push(' ');
                    current.width_em += space_w;
                }
                current.words.push(WordSpan {
                    offset_em: current.width_em,
                    width_em: word_w,
                });
                current.text.push_str(word);
                current.width_em += word_w;
            }

            lines.push(current);
        }

        lines
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static GEIST_SANS_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.24, 0.29, 0.37, 0.54, 0.54, 0.86, 0.65, 0.21, 0.32, 0.32, 0.38, 0.57, 0.27, 0.32, 0.27, 0.30,
        // 0     1     2     3     4     5     6     7     8     9
        0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54,
        // :     ;     <     =     >     ?     @
        0.27, 0.27, 0.57, 0.57, 0.57, 0.48, 0.99,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.65, 0.59, 0.59, 0.65, 0.54, 0.48, 0.65, 0.65, 0.24, 0.38, 0.59, 0.51, 0.76,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.65, 0.70, 0.54, 0.70, 0.59, 0.48, 0.54, 0.65, 0.65, 0.86, 0.59, 0.59, 0.54,
        // [     \     ]     ^     _     `
        0.27, 0.30, 0.27, 0.46, 0.54, 0.33,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.54, 0.54, 0.48, 0.54, 0.54, 0.30, 0.54, 0.54, 0.21, 0.21, 0.51, 0.21, 0.81,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.54, 0.54, 0.54, 0.54, 0.32, 0.43, 0.38, 0.54, 0.48, 0.70, 0.48, 0.48, 0.43,
        // {     |     }     ~
        0.32, 0.25, 0.32, 0.57,
    ],
    average_char_width: 0.50,
    space_width: 0.24,
};

static INTER_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.26, 0.31, 0.39, 0.57, 0.57, 0.91, 0.68, 0.22, 0.34, 0.34, 0.40, 0.60, 0.29, 0.34, 0.29, 0.32,
        // 0     1     2     3     4     5     6     7     8     9
        0.57, 0.57, 0.57, 0.57, 0.57, 0.57, 0.57, 0.57, 0.57, 0.57,
        // :     ;     <     =     >     ?     @
        0.29, 0.29, 0.60, 0.60, 0.60, 0.51, 1.04,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.68, 0.62, 0.62, 0.68, 0.57, 0.51, 0.68, 0.68, 0.26, 0.40, 0.62, 0.54, 0.80,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.68, 0.73, 0.57, 0.73, 0.62, 0.51, 0.57, 0.68, 0.68, 0.91, 0.62, 0.62, 0.57,
        // [     \     ]     ^     _     `
        0.29, 0.32, 0.29, 0.48, 0.57, 0.35,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.57, 0.57, 0.51, 0.57, 0.57, 0.32, 0.57, 0.57, 0.22, 0.22, 0.54, 0.22, 0.85,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.57, 0.57, 0.57, 0.57, 0.34, 0.45, 0.40, 0.57, 0.51, 0.73, 0.51, 0.51, 0.45,
        // {     |     }     ~
        0.34, 0.27, 0.34, 0.60,
    ],
    average_char_width: 0.53,
    space_width: 0.26,
};

/// Lora runs a little wider than the sans faces at the same size.
static LORA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.24, 0.29, 0.36, 0.54, 0.54, 0.85, 0.64, 0.21, 0.31, 0.31, 0.37, 0.56, 0.27, 0.31, 0.27, 0.29,
        // 0     1     2     3     4     5     6     7     8     9
        0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54, 0.54,
        // :     ;     <     =     >     ?     @
        0.27, 0.27, 0.56, 0.56, 0.56, 0.48, 0.97,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.64, 0.58, 0.58, 0.64, 0.54, 0.48, 0.64, 0.64, 0.24, 0.37, 0.58, 0.50, 0.74,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.64, 0.68, 0.54, 0.68, 0.58, 0.48, 0.54, 0.64, 0.64, 0.85, 0.58, 0.58, 0.54,
        // [     \     ]     ^     _     `
        0.27, 0.29, 0.27, 0.45, 0.54, 0.32,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.54, 0.54, 0.48, 0.54, 0.54, 0.29, 0.54, 0.54, 0.21, 0.21, 0.50, 0.21, 0.80,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.54, 0.54, 0.54, 0.54, 0.31, 0.41, 0.37, 0.54, 0.48, 0.68, 0.48, 0.48, 0.41,
        // {     |     }     ~
        0.31, 0.25, 0.31, 0.56,
    ],
    average_char_width: 0.49,
    space_width: 0.24,
};

static ROBOTO_MONO_TABLE: FontMetricTable = FontMetricTable {
    widths: [0.60; 95],
    average_char_width: 0.60,
    space_width: 0.60,
};

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::GeistSans => &GEIST_SANS_TABLE,
        FontFamily::Inter => &INTER_TABLE,
        FontFamily::Lora => &LORA_TABLE,
        FontFamily::RobotoMono => &ROBOTO_MONO_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_str_empty_returns_zero() {
        assert_eq!(get_metrics(FontFamily::Inter).measure_str(""), 0.0);
    }

    #[test]
    fn test_monospace_widths_are_uniform() {
        let metrics = get_metrics(FontFamily::RobotoMono);
        let a = metrics.measure_str("iiii");
        let b = metrics.measure_str("WWWW");
        assert!((a - b).abs() < 1e-6);
        assert!((a - 2.4).abs() < 1e-4);
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        let metrics = get_metrics(FontFamily::GeistSans);
        let width = metrics.measure_str("é");
        assert!((width - metrics.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_resolve_by_id_is_case_insensitive() {
        assert_eq!(FontFamily::resolve("roboto mono"), FontFamily::RobotoMono);
        assert_eq!(FontFamily::resolve("Inter"), FontFamily::Inter);
        assert_eq!(FontFamily::resolve(""), FontFamily::GeistSans);
    }

    #[test]
    fn test_wrap_empty_text_has_no_lines() {
        let metrics = get_metrics(FontFamily::Inter);
        assert!(metrics.wrap("   ", 40.0, false).is_empty());
    }

    #[test]
    fn test_wrap_short_text_is_one_line() {
        let metrics = get_metrics(FontFamily::Inter);
        let lines = metrics.wrap("Alex Johnson", 40.0, false);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Alex Johnson");
        assert_eq!(lines[0].words.len(), 2);
        assert_eq!(lines[0].words[0].offset_em, 0.0);
    }

    #[test]
    fn test_wrap_breaks_long_text_within_width() {
        let metrics = get_metrics(FontFamily::Inter);
        let text = "word ".repeat(40);
        let lines = metrics.wrap(&text, 10.0, false);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width_em <= 10.0 + 1e-4, "line too wide: {}", line.width_em);
        }
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let metrics = get_metrics(FontFamily::Lora);
        let lines = metrics.wrap("first\n\nthird", 40.0, false);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].words.is_empty());
        assert_eq!(lines[2].text, "third");
    }

    #[test]
    fn test_bold_measures_wider() {
        let metrics = get_metrics(FontFamily::GeistSans);
        let regular = metrics.wrap("Experience", 40.0, false)[0].width_em;
        let bold = metrics.wrap("Experience", 40.0, true)[0].width_em;
        assert!(bold > regular);
    }
}
