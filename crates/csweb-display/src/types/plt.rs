//! Data browser (`.plt`) configuration.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::axis::Axis;
use super::color::Color;
use super::font::Font;
use super::props::{PropValue, Props};
use super::trace::Trace;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plt {
    pub title: SmolStr,
    pub axes: Vec<Axis>,
    pub pvlist: Vec<Trace>,
    pub background_color: Color,
    pub foreground_color: Color,
    pub scroll: bool,
    pub scroll_step: f64,
    pub update_period: f64,
    pub start: SmolStr,
    pub end: SmolStr,
    pub show_grid: bool,
    pub title_font: Font,
    pub scale_font: Font,
    pub label_font: Font,
    pub legend_font: Font,
}

impl Default for Plt {
    fn default() -> Self {
        Self {
            title: SmolStr::default(),
            axes: vec![Axis::default()],
            pvlist: vec![Trace::default()],
            background_color: Color::WHITE,
            foreground_color: Color::BLACK,
            scroll: true,
            scroll_step: 5.0,
            update_period: 1.0,
            start: SmolStr::new_static("1 minute"),
            end: SmolStr::new_static("now"),
            show_grid: false,
            title_font: Font::default(),
            scale_font: Font::default(),
            label_font: Font::default(),
            legend_font: Font::default(),
        }
    }
}

impl Plt {
    /// Top-level settings from camelCase props; lists are supplied separately.
    #[must_use]
    pub fn from_props(props: &Props, axes: Vec<Axis>, pvlist: Vec<Trace>) -> Self {
        let mut plt = Plt {
            axes,
            pvlist,
            ..Plt::default()
        };
        for (key, value) in props {
            match (key.as_str(), value) {
                ("title", PropValue::String(text)) => plt.title = text.clone(),
                ("start", PropValue::String(text)) => plt.start = text.clone(),
                ("end", PropValue::String(text)) => plt.end = text.clone(),
                ("background", PropValue::Color(color)) => plt.background_color = color.clone(),
                ("foreground", PropValue::Color(color)) => plt.foreground_color = color.clone(),
                ("scroll", PropValue::Bool(flag)) => plt.scroll = *flag,
                ("grid", PropValue::Bool(flag)) => plt.show_grid = *flag,
                ("scrollStep", PropValue::Number(n)) => plt.scroll_step = *n,
                ("updatePeriod", PropValue::Number(n)) => plt.update_period = *n,
                ("titleFont", PropValue::Font(font)) => plt.title_font = font.clone(),
                ("scaleFont", PropValue::Font(font)) => plt.scale_font = font.clone(),
                ("labelFont", PropValue::Font(font)) => plt.label_font = font.clone(),
                ("legendFont", PropValue::Font(font)) => plt.legend_font = font.clone(),
                _ => {}
            }
        }
        plt
    }
}
