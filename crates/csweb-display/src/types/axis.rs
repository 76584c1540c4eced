//! Plot axes.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::color::Color;
use super::font::{Font, FontStyle};
use super::props::{PropValue, Props};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub color: Color,
    pub title: SmolStr,
    pub show_grid: bool,
    pub visible: bool,
    pub log_scale: bool,
    pub autoscale: bool,
    pub minimum: f64,
    pub maximum: f64,
    pub title_font: Font,
    pub scale_font: Font,
    pub on_right: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_scale_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_grid_line: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_format: Option<f64>,
}

impl Axis {
    /// Default axis. Untitled axes are labelled "X" or "Y".
    #[must_use]
    pub fn new(x_axis: bool) -> Self {
        Self {
            color: Color::BLACK,
            title: SmolStr::new_static(if x_axis { "X" } else { "Y" }),
            show_grid: false,
            visible: true,
            log_scale: false,
            autoscale: false,
            minimum: 0.0,
            maximum: 100.0,
            title_font: Font::with_style(FontStyle::Bold),
            scale_font: Font::default(),
            on_right: false,
            grid_color: None,
            auto_scale_threshold: None,
            dash_grid_line: None,
            time_format: None,
        }
    }

    #[must_use]
    pub fn from_props(props: &Props, x_axis: bool) -> Self {
        let mut axis = Axis::new(x_axis);
        for (key, value) in props {
            axis.set(key, value);
        }
        if axis.title.is_empty() {
            axis.title = SmolStr::new_static(if x_axis { "X" } else { "Y" });
        }
        axis
    }

    /// Assign one camelCase field, returning false if it does not fit.
    pub fn set(&mut self, key: &str, value: &PropValue) -> bool {
        match (key, value) {
            ("color" | "axisColor", PropValue::Color(color)) => self.color = color.clone(),
            ("gridColor", PropValue::Color(color)) => self.grid_color = Some(color.clone()),
            ("title" | "axisTitle", PropValue::String(text)) => self.title = text.clone(),
            ("showGrid", PropValue::Bool(flag)) => self.show_grid = *flag,
            ("visible", PropValue::Bool(flag)) => self.visible = *flag,
            ("logScale", PropValue::Bool(flag)) => self.log_scale = *flag,
            ("autoscale" | "autoScale", PropValue::Bool(flag)) => self.autoscale = *flag,
            ("onRight", PropValue::Bool(flag)) => self.on_right = *flag,
            // Legacy axes record the opposite side.
            ("leftBottomSide", PropValue::Bool(flag)) => self.on_right = !*flag,
            ("dashGridLine", PropValue::Bool(flag)) => self.dash_grid_line = Some(*flag),
            ("minimum" | "min", PropValue::Number(n)) => self.minimum = *n,
            ("maximum" | "max", PropValue::Number(n)) => self.maximum = *n,
            ("autoScaleThreshold", PropValue::Number(n)) => self.auto_scale_threshold = Some(*n),
            ("timeFormat", PropValue::Number(n)) => self.time_format = Some(*n),
            ("titleFont", PropValue::Font(font)) => self.title_font = font.clone(),
            ("scaleFont", PropValue::Font(font)) => self.scale_font = font.clone(),
            _ => return false,
        }
        true
    }
}

impl Default for Axis {
    fn default() -> Self {
        Self::new(false)
    }
}
