//! Value types produced by the parsers.

pub mod actions;
pub mod axis;
pub mod border;
pub mod color;
pub mod file;
pub mod font;
pub mod plt;
pub mod points;
pub mod position;
pub mod props;
pub mod pv;
pub mod rules;
pub mod trace;
pub mod widget;

pub use actions::{DynamicInfo, WidgetAction, WidgetActions};
pub use axis::Axis;
pub use border::{Border, BorderStyle};
pub use color::Color;
pub use file::OpiFile;
pub use font::{Font, FontStyle};
pub use plt::Plt;
pub use points::{Point, Points};
pub use position::{BoxConstraints, Position, PositionType};
pub use props::{PropValue, Props, PvMetadata, Tab};
pub use pv::Pv;
pub use rules::{Expression, Rule, RulePv, Script};
pub use trace::{Archiver, Trace};
pub use widget::WidgetDescription;
