//! Shared helpers for display parsing tests.
#![allow(dead_code, unused_imports)]

use std::collections::HashMap;

pub use csweb_display::types::{
    Axis, Border, BorderStyle, Color, DynamicInfo, Font, FontStyle, OpiFile, Point, Points,
    Position, Pv, RulePv, WidgetAction, WidgetActions,
};
pub use csweb_display::{
    evaluate_rules, parse_bob, parse_display_file, parse_json, parse_opi, FileLoadError,
    FileLoader, MacroMap, ParseOptions, PropValue, PvState, PvValue, StaticPvSource,
    WidgetDescription, WidgetRegistry,
};

pub const BOB_PATH: &str = "/opi/screens/main.bob";
pub const OPI_PATH: &str = "/opi/screens/main.opi";
pub const JSON_PATH: &str = "/opi/screens/main.json";

pub fn bob_document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<display version="2.0.0">
  <name>Main</name>
  {body}
</display>"#
    )
}

pub fn opi_document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<display typeId="org.csstudio.opibuilder.Display" version="1.0.0">
  <width>800</width>
  <height>600</height>
  {body}
</display>"#
    )
}

/// Parse a BOB display whose `<display>` contains `body`.
pub fn bob(body: &str) -> WidgetDescription {
    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry);
    parse_bob(&bob_document(body), BOB_PATH, &options).expect("bob display parses")
}

/// The first widget of a BOB display.
pub fn bob_widget(body: &str) -> WidgetDescription {
    first_child(bob(body))
}

pub fn opi(body: &str) -> WidgetDescription {
    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry);
    parse_opi(&opi_document(body), OPI_PATH, &options).expect("opi display parses")
}

pub fn opi_widget(body: &str) -> WidgetDescription {
    first_child(opi(body))
}

pub fn json(contents: &str) -> WidgetDescription {
    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry);
    parse_json(contents, JSON_PATH, &options).expect("json display parses")
}

pub fn first_child(mut display: WidgetDescription) -> WidgetDescription {
    assert!(!display.children.is_empty(), "display has no children");
    display.children.remove(0)
}

pub fn absolute(x: &str, y: &str, width: &str, height: &str) -> Position {
    Position::absolute(x, y, width, height).expect("complete position")
}

/// In-memory files keyed by path.
#[derive(Debug, Default)]
pub struct MapLoader {
    pub files: HashMap<String, String>,
}

impl MapLoader {
    pub fn with(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.to_string(), contents.to_string());
        self
    }
}

impl FileLoader for MapLoader {
    fn load(&self, path: &str) -> Result<String, FileLoadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| FileLoadError::NotFound(path.into()))
    }
}
