//! Format-agnostic widget tree parser.
//!
//! Each dialect supplies a table of simple parsers (one raw field to one
//! canonical property), a table of complex parsers (the whole element to one
//! property), a widget kind resolver and a list of patch functions. The
//! generic walker in this module drives them over a compact element tree.

mod bob;
mod json;
mod opi;
mod patch;
mod plt;
mod rules;
pub mod values;

use indexmap::IndexMap;
use rayon::prelude::*;
use smol_str::SmolStr;
use tracing::{debug, warn};

pub use bob::{parse_bob, BOB_DEFAULT_SIZES};
pub use json::{parse_json, parse_object};
pub use opi::parse_opi;
pub use patch::normalise_path;
pub use plt::parse_plt;

use crate::element::{self, Fragment};
use crate::error::{ParseError, StructuralError};
use crate::load::FileLoader;
use crate::macros::{MacroMap, MacroResolver};
use crate::registry::{PropSchema, WidgetRegistry};
use crate::types::{Position, PropValue, Props, Pv, PvMetadata, WidgetDescription};

/// Raw property names for which an empty element means `""`.
pub const PARSE_EMPTY_STRINGS: &[&str] = &["text", "label", "on_label", "off_label", "title"];

pub type SimpleParseFn = fn(&Fragment, &ParseContext<'_>) -> Result<PropValue, ParseError>;

/// Complex parsers see the whole element. `Ok(None)` means the element
/// carries nothing for this property.
pub type ComplexParseFn =
    fn(&Fragment, &ParseContext<'_>) -> Result<Option<PropValue>, StructuralError>;

/// Post-processing applied to every parsed widget, in order.
pub type PatchFn = fn(WidgetDescription, &ParseContext<'_>, &PropSchema) -> WidgetDescription;

#[derive(Clone, Copy)]
pub struct SimpleParser {
    pub raw_name: &'static str,
    pub parse: SimpleParseFn,
}

impl std::fmt::Debug for SimpleParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleParser")
            .field("raw_name", &self.raw_name)
            .finish_non_exhaustive()
    }
}

/// Canonical property name to simple parser.
pub type SimpleTable = IndexMap<&'static str, SimpleParser>;
/// Canonical property name to complex parser.
pub type ComplexTable = IndexMap<&'static str, ComplexParseFn>;

pub(crate) fn simple(raw_name: &'static str, parse: SimpleParseFn) -> SimpleParser {
    SimpleParser { raw_name, parse }
}

/// Everything that distinguishes one file format from another.
pub struct Dialect {
    pub name: &'static str,
    pub simple: &'static SimpleTable,
    pub complex: &'static ComplexTable,
    /// Raw widget kind, already mapped through the format's type table.
    pub resolve_kind: fn(&Fragment) -> SmolStr,
    pub child_field: &'static str,
    /// Copy properties without a parser through unchanged.
    pub pass_through: bool,
    pub patches: &'static [PatchFn],
}

impl Dialect {
    /// First simple parser reading `raw_name` whose canonical name the
    /// schema allows.
    #[must_use]
    pub fn simple_by_raw_name(
        &self,
        raw_name: &str,
        allowed: &PropSchema,
    ) -> Option<(&'static str, SimpleParser)> {
        self.simple
            .iter()
            .find(|(name, parser)| parser.raw_name == raw_name && allowed.contains(name))
            .map(|(name, parser)| (*name, *parser))
    }
}

impl std::fmt::Debug for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("child_field", &self.child_field)
            .field("pass_through", &self.pass_through)
            .finish_non_exhaustive()
    }
}

/// Per-parse inputs shared by every widget of one file.
#[derive(Clone, Copy)]
pub struct ParseContext<'a> {
    pub dialect: &'a Dialect,
    pub registry: &'a WidgetRegistry,
    pub default_protocol: &'a str,
    /// Path or URL of the file being parsed; relative paths resolve against it.
    pub file_path: &'a str,
    pub macros: &'a MacroMap,
    pub macro_resolver: &'a dyn MacroResolver,
    pub file_loader: Option<&'a dyn FileLoader>,
}

impl<'a> ParseContext<'a> {
    #[must_use]
    pub fn with_dialect(self, dialect: &'a Dialect) -> Self {
        Self { dialect, ..self }
    }
}

/// Parse one element and its subtree.
///
/// Property failures are logged and the property omitted. Children are parsed
/// in parallel and collected in document order.
#[must_use]
pub fn parse_widget(element: &Fragment, ctx: &ParseContext<'_>) -> WidgetDescription {
    let raw_kind = (ctx.dialect.resolve_kind)(element);
    let (kind, schema) = ctx.registry.resolve(&raw_kind);
    let empty = PropSchema::default();
    let schema = schema.unwrap_or(&empty);

    let mut widget = WidgetDescription::new(kind);
    let names = std::iter::once("position").chain(schema.iter().filter(|name| *name != "position"));
    for name in names {
        parse_prop(name, element, ctx, &mut widget.props);
    }
    derive_pv_metadata(&mut widget.props, ctx.default_protocol);

    for patch in ctx.dialect.patches {
        widget = patch(widget, ctx, schema);
    }

    widget.children = element::to_array(element.get(ctx.dialect.child_field))
        .par_iter()
        .map(|child| parse_widget(child, ctx))
        .collect();

    if !widget.props.contains_key("precision") {
        widget.set("precisionFromPv", true);
    }
    for name in ["showUnits", "wrapWords"] {
        if !widget.props.contains_key(name) {
            widget.set(name, true);
        }
    }
    widget
}

fn parse_prop(name: &str, element: &Fragment, ctx: &ParseContext<'_>, props: &mut Props) {
    let dialect = ctx.dialect;
    if let Some(parser) = dialect.simple.get(name) {
        let Some(raw) = element.get(parser.raw_name) else {
            return;
        };
        if !element::is_empty(raw) {
            match (parser.parse)(raw, ctx) {
                Ok(value) => {
                    props.insert(name.to_string(), value);
                }
                Err(error) => {
                    warn!(prop = name, raw = %raw, %error, "could not convert simple prop");
                }
            }
        } else if PARSE_EMPTY_STRINGS.contains(&parser.raw_name) {
            props.insert(name.to_string(), PropValue::String(SmolStr::default()));
        }
    } else if let Some(parse) = dialect.complex.get(name) {
        match parse(element, ctx) {
            Ok(Some(value)) => {
                props.insert(name.to_string(), value);
            }
            Ok(None) => {}
            Err(error) => warn!(prop = name, %error, "could not convert complex prop"),
        }
    } else if dialect.pass_through {
        if let Some(raw) = element.get(name) {
            props.insert(name.to_string(), PropValue::Raw(raw.clone()));
        }
    }
}

/// The root of a display fills its container.
pub(crate) fn relative_root(widget: &mut WidgetDescription) {
    if let Some(PropValue::Position(position)) = widget.props.get_mut("position") {
        *position = position.clone().into_relative();
    } else {
        widget.set("position", Position::relative("", ""));
    }
}

/// Plot widgets bind their PVs through traces rather than a `pvName`.
fn derive_pv_metadata(props: &mut Props, default_protocol: &str) {
    let traces = match props.get("traces") {
        Some(PropValue::Traces(traces)) => traces.as_slice(),
        _ => match props.get("plt") {
            Some(PropValue::Plt(plt)) => plt.pvlist.as_slice(),
            _ => return,
        },
    };
    let list = traces
        .iter()
        .map(|trace| PvMetadata {
            pv_name: Pv::parse(&trace.y_pv, default_protocol),
        })
        .collect();
    props.insert("pvMetadataList".to_string(), PropValue::PvMetadataList(list));
}

/// Parse the children of a nested element by camelCased name against a table.
///
/// Unparseable entries are skipped.
#[must_use]
pub fn parse_child_props(
    fragment: &Fragment,
    table: &SimpleTable,
    ctx: &ParseContext<'_>,
) -> Props {
    let mut props = Props::new();
    let Some(object) = fragment.as_object() else {
        return props;
    };
    for (key, value) in object {
        let Some(name) = crate::util::snake_case_to_camel_case(key, 0, None) else {
            continue;
        };
        let Some(parser) = table.get(name.as_str()) else {
            continue;
        };
        if element::is_empty(value) && PARSE_EMPTY_STRINGS.contains(&key.as_str()) {
            props.insert(name, PropValue::String(SmolStr::default()));
            continue;
        }
        match (parser.parse)(value, ctx) {
            Ok(parsed) => {
                props.insert(name, parsed);
            }
            Err(error) => debug!(prop = key.as_str(), %error, "skipping child prop"),
        }
    }
    props
}
