//! Plot traces.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::color::Color;
use super::props::{PropValue, Props};

/// Archiver Appliance source for data browser traces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archiver {
    pub name: SmolStr,
    pub url: SmolStr,
}

/// One plotted PV of a strip chart, XY plot or data browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub name: SmolStr,
    pub axis: f64,
    pub line_width: f64,
    pub line_style: f64,
    pub trace_type: f64,
    pub color: Color,
    pub point_type: f64,
    pub point_size: f64,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_pv: Option<SmolStr>,
    pub y_pv: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_mode: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_delay: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anti_alias: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concatenate_data: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<Archiver>,
}

impl Default for Trace {
    fn default() -> Self {
        Self {
            name: SmolStr::default(),
            axis: 0.0,
            line_width: 0.0,
            line_style: 0.0,
            trace_type: 2.0,
            color: Color::BLUE,
            point_type: 0.0,
            point_size: 1.0,
            visible: true,
            x_pv: None,
            y_pv: SmolStr::default(),
            buffer_size: None,
            update_mode: None,
            update_delay: None,
            anti_alias: None,
            concatenate_data: None,
            archive: None,
        }
    }
}

impl Trace {
    /// Build a trace from camelCase child properties, keeping defaults for
    /// anything absent or of the wrong type.
    #[must_use]
    pub fn from_props(props: &Props) -> Self {
        let mut trace = Trace::default();
        for (key, value) in props {
            trace.set(key, value);
        }
        if trace.name.is_empty() {
            trace.name = trace.y_pv.clone();
        }
        trace
    }

    /// Assign one camelCase field. Returns false when the name or value type
    /// does not fit a trace field.
    pub fn set(&mut self, key: &str, value: &PropValue) -> bool {
        match (key, value) {
            ("name", PropValue::String(text)) => self.name = text.clone(),
            ("xPv", PropValue::String(text)) => {
                self.x_pv = (!text.is_empty()).then(|| text.clone());
            }
            ("yPv", PropValue::String(text)) => self.y_pv = text.clone(),
            ("axis" | "yAxisIndex", PropValue::Number(n)) => self.axis = *n,
            ("lineWidth", PropValue::Number(n)) => self.line_width = *n,
            ("lineStyle", PropValue::Number(n)) => self.line_style = *n,
            ("traceType", PropValue::Number(n)) => self.trace_type = *n,
            ("pointType" | "pointStyle", PropValue::Number(n)) => self.point_type = *n,
            ("pointSize", PropValue::Number(n)) => self.point_size = *n,
            ("bufferSize", PropValue::Number(n)) => self.buffer_size = Some(*n),
            ("updateMode", PropValue::Number(n)) => self.update_mode = Some(*n),
            ("updateDelay", PropValue::Number(n)) => self.update_delay = Some(*n),
            ("color" | "traceColor", PropValue::Color(color)) => self.color = color.clone(),
            ("visible", PropValue::Bool(flag)) => self.visible = *flag,
            ("antiAlias", PropValue::Bool(flag)) => self.anti_alias = Some(*flag),
            ("concatenateData", PropValue::Bool(flag)) => self.concatenate_data = Some(*flag),
            ("archive", PropValue::Archiver(archive)) => self.archive = Some(archive.clone()),
            _ => return false,
        }
        true
    }
}
