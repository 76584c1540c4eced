//! Fonts.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    /// Legacy numeric style code (0 regular, 1 bold, 2 italic, 3 both).
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(FontStyle::Regular),
            "1" => Some(FontStyle::Bold),
            "2" => Some(FontStyle::Italic),
            "3" => Some(FontStyle::BoldItalic),
            _ => None,
        }
    }
}

pub const DEFAULT_FONT_SIZE: f64 = 14.0;
pub const DEFAULT_TYPEFACE: &str = "Liberation sans";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub size: Option<f64>,
    pub style: FontStyle,
    pub typeface: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<SmolStr>,
}

impl Font {
    /// Builds a font, filling unset fields with the defaults.
    #[must_use]
    pub fn new(size: Option<f64>, style: Option<FontStyle>, typeface: Option<&str>) -> Self {
        Self {
            size: Some(size.unwrap_or(DEFAULT_FONT_SIZE)),
            style: style.unwrap_or_default(),
            typeface: SmolStr::new(typeface.unwrap_or(DEFAULT_TYPEFACE)),
            name: None,
        }
    }

    #[must_use]
    pub fn with_style(style: FontStyle) -> Self {
        Self::new(None, Some(style), None)
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}
