//! Typed property values carried by a widget description.

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;

use super::actions::WidgetActions;
use super::axis::Axis;
use super::border::Border;
use super::color::Color;
use super::file::OpiFile;
use super::font::Font;
use super::plt::Plt;
use super::points::Points;
use super::position::Position;
use super::pv::Pv;
use super::rules::{Rule, Script};
use super::trace::{Archiver, Trace};
use crate::macros::MacroMap;

/// Ordered property map, keyed by canonical camelCase name.
pub type Props = IndexMap<String, PropValue>;

/// One PV a widget needs subscribed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PvMetadata {
    pub pv_name: Pv,
}

/// A tab of a tab container, with its own parsed widgets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    #[serde(flatten)]
    pub props: Props,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<super::widget::WidgetDescription>,
}

/// A parsed property value.
///
/// Serialized without a tag so the output has the plain shape of each value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    String(SmolStr),
    StringList(Vec<SmolStr>),
    Color(Color),
    Font(Font),
    Border(Border),
    Position(Position),
    Points(Points),
    Pv(Pv),
    PvMetadataList(Vec<PvMetadata>),
    Macros(MacroMap),
    File(OpiFile),
    Actions(WidgetActions),
    Rules(Vec<Rule>),
    Scripts(Vec<Script>),
    Traces(Vec<Trace>),
    Axes(Vec<Axis>),
    Axis(Box<Axis>),
    Plt(Box<Plt>),
    Archiver(Archiver),
    Tabs(Vec<Tab>),
    Map(Props),
    Raw(serde_json::Value),
}

impl PropValue {
    #[must_use]
    pub fn string(text: impl Into<SmolStr>) -> Self {
        PropValue::String(text.into())
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(text) => Some(text),
            PropValue::Raw(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            PropValue::Raw(value) => value.as_f64(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(flag) => Some(*flag),
            PropValue::Raw(value) => value.as_bool(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_color(&self) -> Option<&Color> {
        match self {
            PropValue::Color(color) => Some(color),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_font(&self) -> Option<&Font> {
        match self {
            PropValue::Font(font) => Some(font),
            _ => None,
        }
    }

    /// Name of the value's variant, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PropValue::Bool(_) => "bool",
            PropValue::Number(_) => "number",
            PropValue::String(_) => "string",
            PropValue::StringList(_) => "string list",
            PropValue::Color(_) => "color",
            PropValue::Font(_) => "font",
            PropValue::Border(_) => "border",
            PropValue::Position(_) => "position",
            PropValue::Points(_) => "points",
            PropValue::Pv(_) => "pv",
            PropValue::PvMetadataList(_) => "pv metadata",
            PropValue::Macros(_) => "macros",
            PropValue::File(_) => "file",
            PropValue::Actions(_) => "actions",
            PropValue::Rules(_) => "rules",
            PropValue::Scripts(_) => "scripts",
            PropValue::Traces(_) => "traces",
            PropValue::Axes(_) => "axes",
            PropValue::Axis(_) => "axis",
            PropValue::Plt(_) => "plt",
            PropValue::Archiver(_) => "archiver",
            PropValue::Tabs(_) => "tabs",
            PropValue::Map(_) => "map",
            PropValue::Raw(_) => "raw",
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Number(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(SmolStr::new(value))
    }
}

impl From<Color> for PropValue {
    fn from(value: Color) -> Self {
        PropValue::Color(value)
    }
}

impl From<Border> for PropValue {
    fn from(value: Border) -> Self {
        PropValue::Border(value)
    }
}

impl From<Font> for PropValue {
    fn from(value: Font) -> Self {
        PropValue::Font(value)
    }
}

impl From<Position> for PropValue {
    fn from(value: Position) -> Self {
        PropValue::Position(value)
    }
}

impl From<Pv> for PropValue {
    fn from(value: Pv) -> Self {
        PropValue::Pv(value)
    }
}

/// Convert an expression result into a property value.
impl From<csweb_expr::Value> for PropValue {
    fn from(value: csweb_expr::Value) -> Self {
        use csweb_expr::Value;
        match value {
            Value::Undefined | Value::Null => PropValue::Raw(serde_json::Value::Null),
            Value::Bool(flag) => PropValue::Bool(flag),
            Value::Number(n) => PropValue::Number(n),
            Value::String(text) => PropValue::String(text),
        }
    }
}
