//! Colors.

use csweb_expr::value::format_number;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ParseError;

/// A CSS color, stored as its CSS text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub color_string: SmolStr,
}

impl Color {
    pub const WHITE: Color = Color::from_static("rgba(255,255,255,1)");
    pub const GREY: Color = Color::from_static("rgba(220,220,220,1)");
    pub const BLACK: Color = Color::from_static("rgba(0,0,0,1)");
    pub const RED: Color = Color::from_static("rgba(255,0,0,1)");
    pub const GREEN: Color = Color::from_static("rgba(0,128,0,1)");
    pub const BLUE: Color = Color::from_static("rgba(0,0,255,1)");
    pub const YELLOW: Color = Color::from_static("rgba(255,255,0,1)");
    pub const PURPLE: Color = Color::from_static("rgba(127,0,127,1)");
    pub const PINK: Color = Color::from_static("rgba(255,192,203,1)");
    pub const ORANGE: Color = Color::from_static("rgba(255,165,0,1)");
    pub const TRANSPARENT: Color = Color::from_static("rgba(0,0,0,0)");

    pub const DISCONNECTED: Color = Color::from_static("var(--disconnected)");
    pub const INVALID: Color = Color::from_static("var(--invalid)");
    pub const WARNING: Color = Color::from_static("var(--warning)");
    pub const ALARM: Color = Color::from_static("var(--alarm)");
    pub const CHANGING: Color = Color::from_static("var(--changing)");
    pub const UNDEFINED: Color = Color::from_static("var(--undefined)");

    const fn from_static(text: &'static str) -> Self {
        Self {
            color_string: SmolStr::new_static(text),
        }
    }

    /// Wraps any CSS color text.
    #[must_use]
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self {
            color_string: text.into(),
        }
    }

    /// Builds an `rgba(r,g,b,a)` color, rejecting channels outside 0..=255.
    pub fn from_rgba(r: i64, g: i64, b: i64, a: f64) -> Result<Self, ParseError> {
        for (channel, value) in [('r', r), ('g', g), ('b', b)] {
            if !(0..=255).contains(&value) {
                return Err(ParseError::ColorOutOfRange {
                    channel,
                    value: SmolStr::new(value.to_string()),
                });
            }
        }
        Ok(Self::new(format!("rgba({r},{g},{b},{})", format_number(a))))
    }

    /// Channels of an `rgba(...)` color, or `None` for other CSS text.
    #[must_use]
    pub fn to_rgba(&self) -> Option<(u8, u8, u8, f64)> {
        let inner = self
            .color_string
            .strip_prefix("rgba(")?
            .strip_suffix(')')?;
        let mut parts = inner.split(',').map(str::trim);
        let r = parts.next()?.parse().ok()?;
        let g = parts.next()?.parse().ok()?;
        let b = parts.next()?.parse().ok()?;
        let a = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((r, g, b, a))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.color_string
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.color_string)
    }
}
