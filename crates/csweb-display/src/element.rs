//! Compact element trees.
//!
//! XML is converted into the compact JSON shape the parser tables work on:
//! attributes live under `_attributes`, text under `_text`, CDATA under
//! `_cdata`, and each child element under its tag name. Repeated child names
//! collapse into an array in document order.

use serde_json::{Map, Value};
use smol_str::SmolStr;

use crate::error::{FileLoadError, ParseError};

/// A raw element, attribute set or text node in compact form.
pub type Fragment = Value;

pub const ATTRIBUTES: &str = "_attributes";
pub const TEXT: &str = "_text";
pub const CDATA: &str = "_cdata";

/// Parse XML text into a compact tree keyed by the root element name.
pub fn xml_to_compact(text: &str, path: &str) -> Result<Fragment, FileLoadError> {
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    };
    let document = roxmltree::Document::parse_with_options(text, options).map_err(|error| {
        FileLoadError::Malformed {
            format: "XML",
            path: SmolStr::new(path),
            message: SmolStr::new(error.to_string()),
        }
    })?;
    let root = document.root_element();
    let mut top = Map::new();
    top.insert(root.tag_name().name().to_string(), convert(root, text));
    Ok(Value::Object(top))
}

fn convert(node: roxmltree::Node<'_, '_>, source: &str) -> Fragment {
    let mut object = Map::new();
    let attributes: Map<String, Value> = node
        .attributes()
        .map(|attribute| {
            (
                attribute.name().to_string(),
                Value::String(attribute.value().to_string()),
            )
        })
        .collect();
    if !attributes.is_empty() {
        object.insert(ATTRIBUTES.to_string(), Value::Object(attributes));
    }
    let mut text = String::new();
    let mut cdata = String::new();
    for child in node.children() {
        if child.is_element() {
            let name = child.tag_name().name().to_string();
            let value = convert(child, source);
            match object.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    object.insert(name, value);
                }
            }
        } else if child.is_text() {
            let raw = &source[child.range()];
            let content = child.text().unwrap_or_default();
            if raw.contains("<![CDATA[") {
                cdata.push_str(content);
            } else if !content.trim().is_empty() {
                text.push_str(content);
            }
        }
    }
    if !text.is_empty() {
        object.insert(TEXT.to_string(), Value::String(text));
    }
    if !cdata.is_empty() {
        object.insert(CDATA.to_string(), Value::String(cdata));
    }
    Value::Object(object)
}

/// Normalize a missing, single or repeated child into a slice of fragments.
#[must_use]
pub fn to_array(fragment: Option<&Fragment>) -> Vec<&Fragment> {
    match fragment {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// True for `{}`, `null`, and anything without own keys.
#[must_use]
pub fn is_empty(fragment: &Fragment) -> bool {
    match fragment {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(text) => text.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[must_use]
pub fn child<'a>(fragment: &'a Fragment, name: &str) -> Option<&'a Fragment> {
    fragment.as_object()?.get(name)
}

/// The `_text` payload of a fragment.
#[must_use]
pub fn text(fragment: &Fragment) -> Option<&str> {
    fragment.as_object()?.get(TEXT)?.as_str()
}

/// The `_text` payload of a named child.
#[must_use]
pub fn child_text<'a>(fragment: &'a Fragment, name: &str) -> Option<&'a str> {
    child(fragment, name).and_then(text)
}

#[must_use]
pub fn attribute<'a>(fragment: &'a Fragment, name: &str) -> Option<&'a str> {
    fragment.as_object()?.get(ATTRIBUTES)?.get(name)?.as_str()
}

/// `_text` of a fragment, or an error naming what was found instead.
pub fn require_text(fragment: &Fragment) -> Result<&str, ParseError> {
    text(fragment).ok_or_else(|| ParseError::MissingText(describe(fragment)))
}

/// Required named child.
pub fn require_child<'a>(fragment: &'a Fragment, name: &str) -> Result<&'a Fragment, ParseError> {
    child(fragment, name).ok_or_else(|| ParseError::MissingField(SmolStr::new(name)))
}

/// Short rendering of a fragment for error messages.
#[must_use]
pub fn describe(fragment: &Fragment) -> SmolStr {
    match fragment {
        Value::Object(map) => match map.get(TEXT) {
            Some(Value::String(text)) => SmolStr::new(text),
            _ => SmolStr::new("undefined"),
        },
        Value::String(text) => SmolStr::new(text),
        Value::Null => SmolStr::new_static("undefined"),
        other => SmolStr::new(other.to_string()),
    }
}

/// Build a `{"_text": text}` fragment.
#[must_use]
pub fn text_fragment(text: &str) -> Fragment {
    let mut map = Map::new();
    map.insert(TEXT.to_string(), Value::String(text.to_string()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    #[test]
    fn compact_shape() {
        let xml = r#"<display version="2.0.0">
  <name>Main</name>
  <widget type="label"><text>A</text></widget>
  <widget type="led"/>
  <script><![CDATA[print(1)]]></script>
  <empty></empty>
</display>"#;
        let tree = xml_to_compact(xml, "main.bob").unwrap();
        expect![[r#"{"display":{"_attributes":{"version":"2.0.0"},"name":{"_text":"Main"},"widget":[{"_attributes":{"type":"label"},"text":{"_text":"A"}},{"_attributes":{"type":"led"}}],"script":{"_cdata":"print(1)"},"empty":{}}}"#]]
            .assert_eq(&tree.to_string());
    }

    #[test]
    fn malformed_xml_is_reported() {
        let error = xml_to_compact("<display><widget></display>", "x.bob").unwrap_err();
        assert!(matches!(error, FileLoadError::Malformed { format: "XML", .. }));
    }

    #[test]
    fn accessors() {
        let tree = xml_to_compact(r#"<w a="1"><t>x</t></w>"#, "").unwrap();
        let widget = child(&tree, "w").unwrap();
        assert_eq!(attribute(widget, "a"), Some("1"));
        assert_eq!(child_text(widget, "t"), Some("x"));
        assert_eq!(to_array(child(widget, "t")).len(), 1);
        assert!(to_array(child(widget, "missing")).is_empty());
        assert!(is_empty(&serde_json::json!({})));
    }
}
