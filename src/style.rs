use serde::{Deserialize, Serialize};

use crate::geom::Size;

/// Centralized visual style. Passed down explicitly through `UiContext`
/// at construction time — no global lookup. Widgets read from it when they
/// are built instead of hardcoding colors and metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSheet {
    // -- Palette (sRGB RGBA) --
    pub text_color: [f32; 4],
    pub selected_text_color: [f32; 4],
    pub background_color: [f32; 4],
    pub button_background_color: [f32; 4],
    pub highlight_color: [f32; 4],
    pub outline_color: [f32; 4],
    /// Full-screen fade behind popup screens, used when no fade texture
    /// is available.
    pub fade_color: [f32; 4],

    // -- Font metrics --
    pub font_size: f32,
    /// Approximate advance width as a fraction of font size, used for
    /// label measurement until the renderer supplies real metrics.
    pub glyph_aspect: f32,

    // -- Button metrics --
    pub button_padding: Size,
    pub outline_width: i32,

    // -- Scroll / tree metrics --
    pub scrollbar_width: i32,
    pub tree_indent: i32,
    pub tree_row_height: i32,
    /// Tallest an open dropdown list gets before it scrolls.
    pub dropdown_max_height: i32,

    // -- Transition timings (seconds) --
    pub transition_on_seconds: f32,
    pub transition_off_seconds: f32,
}

const fn hex(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

const fn hex_a(r: u8, g: u8, b: u8, a: f32) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a]
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self {
            text_color: hex(0xF0, 0xE6, 0xD2),
            selected_text_color: hex(0xC8, 0xA8, 0x50),
            background_color: hex_a(0x20, 0x20, 0x28, 0.9),
            button_background_color: hex_a(0x30, 0x30, 0x3C, 0.95),
            highlight_color: hex_a(0xC8, 0xA8, 0x50, 0.35),
            outline_color: hex(0xC8, 0xA8, 0x50),
            fade_color: hex_a(0x00, 0x00, 0x00, 0.66),

            font_size: 14.0,
            glyph_aspect: 0.6,

            button_padding: Size::new(8, 4),
            outline_width: 1,

            scrollbar_width: 6,
            tree_indent: 16,
            tree_row_height: 24,
            dropdown_max_height: 160,

            transition_on_seconds: 0.5,
            transition_off_seconds: 0.5,
        }
    }
}

impl StyleSheet {
    /// Approximate pixel size of a text run at the sheet's font size.
    pub fn measure_text(&self, text: &str) -> Size {
        let width = (text.chars().count() as f32 * self.font_size * self.glyph_aspect) as i32;
        Size::new(width, self.font_size as i32)
    }

    /// Load a style sheet from a RON file. Logs a warning and falls back to
    /// the defaults if the file is missing or malformed.
    pub fn load(path: &str) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("failed to read {}: {}, using default style", path, e);
                return Self::default();
            }
        };
        match ron::from_str::<StyleSheet>(&content) {
            Ok(style) => style,
            Err(e) => {
                log::warn!("failed to parse RON {}: {}, using default style", path, e);
                Self::default()
            }
        }
    }
}
