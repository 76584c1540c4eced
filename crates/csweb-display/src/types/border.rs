//! Borders.

use serde::{Deserialize, Serialize};

use super::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BorderStyle {
    #[default]
    None,
    Line,
    Outset,
    Dashed,
    Dotted,
    GroupBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub style: BorderStyle,
    pub color: Color,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl Border {
    pub const NONE: Border = Border {
        style: BorderStyle::None,
        color: Color::BLACK,
        width: 0.0,
        radius: None,
    };

    #[must_use]
    pub fn new(style: BorderStyle, color: Color, width: f64) -> Self {
        Self {
            style,
            color,
            width,
            radius: None,
        }
    }

    #[must_use]
    pub fn with_radius(mut self, radius: Option<f64>) -> Self {
        self.radius = radius;
        self
    }

    /// Dotted border drawn around widgets whose PVs are disconnected.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::new(BorderStyle::Dotted, Color::DISCONNECTED, 3.0)
    }
}
