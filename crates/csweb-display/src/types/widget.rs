//! The widget description tree.

use serde::Serialize;
use smol_str::SmolStr;

use super::actions::WidgetActions;
use super::border::Border;
use super::position::Position;
use super::props::{PropValue, Props, PvMetadata};
use super::rules::Rule;

/// One parsed widget and its subtree.
///
/// Serializes as a flat object: `type`, then each property in the order it
/// was parsed, then `children`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetDescription {
    #[serde(rename = "type")]
    pub widget_type: SmolStr,
    #[serde(flatten)]
    pub props: Props,
    pub children: Vec<WidgetDescription>,
}

impl WidgetDescription {
    #[must_use]
    pub fn new(widget_type: impl Into<SmolStr>) -> Self {
        Self {
            widget_type: widget_type.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(name.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.props.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<PropValue>) {
        self.props.insert(name.to_string(), value.into());
    }

    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        match self.props.get("position") {
            Some(PropValue::Position(position)) => Some(position),
            _ => None,
        }
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        match self.props.get("rules") {
            Some(PropValue::Rules(rules)) => rules,
            _ => &[],
        }
    }

    #[must_use]
    pub fn actions(&self) -> Option<&WidgetActions> {
        match self.props.get("actions") {
            Some(PropValue::Actions(actions)) => Some(actions),
            _ => None,
        }
    }

    #[must_use]
    pub fn pv_metadata_list(&self) -> &[PvMetadata] {
        match self.props.get("pvMetadataList") {
            Some(PropValue::PvMetadataList(list)) => list,
            _ => &[],
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.props.get("text").and_then(PropValue::as_str)
    }

    #[must_use]
    pub fn border(&self) -> Option<&Border> {
        match self.props.get("border") {
            Some(PropValue::Border(border)) => Some(border),
            _ => None,
        }
    }

    /// Depth-first iterator over this widget and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &WidgetDescription> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}
