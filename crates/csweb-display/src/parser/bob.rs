//! Phoebus `.bob` files.
//!
//! BOB shares most property names with OPI; this module overrides the ones
//! that differ and adds the Phoebus-only widgets' properties.

use csweb_expr::value::format_number;
use once_cell::sync::Lazy;
use rayon::prelude::*;
use serde_json::{Map, Value};
use smol_str::SmolStr;
use tracing::{debug, warn};

use super::opi::{opi_complex_parsers, opi_simple_parsers};
use super::patch::XML_PATCHES;
use super::plt::load_plt;
use super::rules::{parse_rules, parse_scripts};
use super::values::{
    self, bool_prop, color_prop, macros_prop, number_prop, pv_metadata_prop, pv_name_prop,
    string_prop,
};
use super::{
    parse_child_props, parse_widget, relative_root, simple, ComplexTable, Dialect, ParseContext,
    SimpleTable,
};
use crate::element::{self, Fragment};
use crate::error::{FileLoadError, ParseError, StructuralError};
use crate::load::ParseOptions;
use crate::types::actions::{OpenWebpageInfo, WritePvInfo};
use crate::types::{
    Axis, Border, BorderStyle, Color, DynamicInfo, Font, FontStyle, OpiFile, Point, Points,
    Position, PropValue, Tab, Trace, WidgetAction, WidgetActions, WidgetDescription,
};

const BOB_WIDGET_MAPPING: &[(&str, &str)] = &[
    ("action_button", "actionbutton"),
    ("arc", "arc"),
    ("bool_button", "boolbutton"),
    ("byte_monitor", "bytemonitor"),
    ("checkbox", "checkbox"),
    ("combo", "menubutton"),
    ("databrowser", "databrowser"),
    ("display", "display"),
    ("ellipse", "ellipse"),
    ("embedded", "embeddedDisplay"),
    ("group", "groupbox"),
    ("label", "label"),
    ("led", "led"),
    ("linearmeter", "linearmeter"),
    ("textupdate", "readback"),
    ("textentry", "input"),
    ("picture", "image"),
    ("image", "demoImage"),
    ("polygon", "polygon"),
    ("polyline", "line"),
    ("progressbar", "progressbar"),
    ("rectangle", "shape"),
    ("tank", "tank"),
    ("navtabs", "navigationtabs"),
    ("tabs", "tabcontainer"),
    ("thermometer", "thermometer"),
    ("meter", "meter"),
    ("choice", "choicebutton"),
    ("scaledslider", "slidecontrol"),
    ("stripchart", "stripchart"),
    ("symbol", "symbol"),
    ("xyplot", "xyplot"),
];

/// Phoebus default width and height of each widget type.
pub const BOB_DEFAULT_SIZES: &[(&str, (u32, u32))] = &[
    ("action_button", (100, 30)),
    ("arc", (100, 100)),
    ("bool_button", (100, 30)),
    ("byte_monitor", (160, 20)),
    ("checkbox", (100, 20)),
    ("choice", (100, 43)),
    ("combo", (100, 30)),
    ("databrowser", (400, 300)),
    ("display", (800, 800)),
    ("ellipse", (100, 50)),
    ("embedded", (400, 300)),
    ("group", (300, 200)),
    ("label", (100, 20)),
    ("led", (20, 20)),
    ("linearmeter", (120, 120)),
    ("textupdate", (100, 20)),
    ("textentry", (100, 20)),
    ("picture", (150, 100)),
    ("polygon", (100, 20)),
    ("polyline", (100, 20)),
    ("progressbar", (100, 20)),
    ("rectangle", (100, 20)),
    ("tank", (150, 200)),
    ("navtabs", (500, 300)),
    ("tabs", (400, 300)),
    ("thermometer", (40, 160)),
    ("meter", (240, 120)),
    ("scaledslider", (400, 55)),
    ("stripchart", (400, 300)),
    ("symbol", (100, 100)),
    ("xyplot", (400, 300)),
];

fn raw_type(element: &Fragment) -> &str {
    element::attribute(element, "type").unwrap_or_default()
}

fn bob_kind(element: &Fragment) -> SmolStr {
    let raw = raw_type(element);
    BOB_WIDGET_MAPPING
        .iter()
        .find(|(name, _)| *name == raw)
        .map_or_else(|| SmolStr::new(raw), |(_, kind)| SmolStr::new_static(kind))
}

fn font_style(name: &str) -> Option<FontStyle> {
    match name {
        "REGULAR" => Some(FontStyle::Regular),
        "BOLD" => Some(FontStyle::Bold),
        "ITALIC" => Some(FontStyle::Italic),
        "BOLD_ITALIC" => Some(FontStyle::BoldItalic),
        _ => None,
    }
}

/// `<font><font family="Liberation Sans" style="BOLD" size="14.0"/></font>`
pub(crate) fn parse_bob_font(fragment: &Fragment) -> Result<Font, ParseError> {
    let font = element::require_child(fragment, "font")?;
    let size = element::attribute(font, "size").map(csweb_expr::value::string_to_number);
    let style = element::attribute(font, "style").and_then(font_style);
    Ok(Font::new(size, style, element::attribute(font, "family")))
}

fn font_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    parse_bob_font(fragment).map(PropValue::Font)
}

fn items_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let items = element::to_array(element::child(fragment, "item"))
        .into_iter()
        .filter_map(element::text)
        .map(SmolStr::new)
        .collect();
    Ok(PropValue::StringList(items))
}

fn attribute_number(point: &Fragment, name: &'static str) -> Result<f64, ParseError> {
    let text = element::attribute(point, name)
        .ok_or(ParseError::MissingField(SmolStr::new_static(name)))?;
    let value = csweb_expr::value::string_to_number(text);
    if value.is_nan() {
        return Err(ParseError::InvalidNumber(SmolStr::new(text)));
    }
    Ok(value)
}

/// BOB points are already relative to the widget.
fn points_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let values = element::to_array(element::child(fragment, "point"))
        .into_iter()
        .map(|point| {
            Ok(Point {
                x: attribute_number(point, "x")?,
                y: attribute_number(point, "y")?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    Ok(PropValue::Points(Points::new(values)))
}

fn resize_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let behaviour = values::lookup(
        fragment,
        "resize",
        &[
            (1, "size-content"),
            (2, "crop-widget"),
            (3, "stretch-content"),
            (4, "crop-content"),
        ],
    )
    .unwrap_or("scroll-content");
    Ok(behaviour.into())
}

fn format_type_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    values::lookup(
        fragment,
        "format",
        &[(0, "default"), (1, "decimal"), (2, "exponential"), (6, "string")],
    )
    .map(PropValue::from)
}

/// A list of `<symbol>` paths, or a single path as text.
fn symbols_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    if let Some(symbols) = element::child(fragment, "symbol") {
        let symbols = element::to_array(Some(symbols))
            .into_iter()
            .filter_map(|symbol| symbol.as_str().or_else(|| element::text(symbol)))
            .map(SmolStr::new)
            .collect();
        return Ok(PropValue::StringList(symbols));
    }
    match element::text(fragment) {
        Some(text) if !text.is_empty() => Ok(PropValue::string(text)),
        _ => Ok(PropValue::StringList(Vec::new())),
    }
}

pub(crate) fn bob_simple_parsers() -> SimpleTable {
    let mut table = opi_simple_parsers();
    for (name, parser) in [
        ("font", simple("font", font_prop)),
        ("items", simple("items", items_prop)),
        ("imageFile", simple("file", string_prop)),
        ("points", simple("points", points_prop)),
        ("resize", simple("resize", resize_prop)),
        ("square", simple("square", bool_prop)),
        ("formatType", simple("format", format_type_prop)),
        ("stretchToFit", simple("stretch_image", bool_prop)),
        ("macros", simple("macros", macros_prop)),
        ("symbols", simple("symbols", symbols_prop)),
        ("initialIndex", simple("initial_index", number_prop)),
        ("showIndex", simple("show_index", bool_prop)),
        ("showValue", simple("show_value", bool_prop)),
        ("fallbackSymbol", simple("fallback_symbol", string_prop)),
        ("rotation", simple("rotation", number_prop)),
        ("styleOpt", simple("style", number_prop)),
        ("lineColor", simple("line_color", color_prop)),
        ("rotationStep", simple("rotation_step", number_prop)),
        ("levelHihi", simple("level_hihi", number_prop)),
        ("levelHigh", simple("level_high", number_prop)),
        ("levelLolo", simple("level_lolo", number_prop)),
        ("levelLow", simple("level_low", number_prop)),
        ("showLimits", simple("show_limits", bool_prop)),
        ("showScale", simple("show_scale", bool_prop)),
        ("showHihi", simple("show_hihi", bool_prop)),
        ("showHigh", simple("show_high", bool_prop)),
        ("showLolo", simple("show_lolo", bool_prop)),
        ("showLow", simple("show_low", bool_prop)),
        ("increment", simple("increment", number_prop)),
        ("multiLine", simple("multi_line", bool_prop)),
        ("lineStyle", simple("line_style", number_prop)),
        ("majorTickStepHint", simple("major_tick_step_hint", number_prop)),
        ("maximum", simple("maximum", number_prop)),
        ("minimum", simple("minimum", number_prop)),
        ("format", simple("format", number_prop)),
        ("emptyColor", simple("empty_color", color_prop)),
        ("knobColor", simple("knob_color", color_prop)),
        ("normalStatusColor", simple("normal_status_color", color_prop)),
        ("minorWarningColor", simple("minor_warning_color", color_prop)),
        ("majorWarningColor", simple("major_warning_color", color_prop)),
        (
            "isHighlightingOfActiveRegionsEnabled",
            simple("is_highlighting_of_active_regions_enabled", bool_prop),
        ),
        ("needleWidth", simple("needle_width", number_prop)),
        ("knobSize", simple("knob_size", number_prop)),
        ("displayHorizontal", simple("displayHorizontal", bool_prop)),
        ("xPv", simple("xPv", string_prop)),
        ("yPv", simple("yPv", string_prop)),
        ("axis", simple("axis", number_prop)),
        ("pointType", simple("point_type", number_prop)),
        ("pointStyle", simple("point_style", number_prop)),
        ("color", simple("color", color_prop)),
        ("traceType", simple("trace_type", number_prop)),
        ("onRight", simple("on_right", bool_prop)),
        ("titleFont", simple("title_font", font_prop)),
        ("scaleFont", simple("scale_font", font_prop)),
        ("start", simple("start", string_prop)),
        ("end", simple("end", string_prop)),
        ("arrayIndex", simple("array_index", number_prop)),
        ("direction", simple("direction", number_prop)),
        ("tabWidth", simple("tab_width", number_prop)),
        ("tabHeight", simple("tab_height", number_prop)),
        ("tabSpacing", simple("tab_spacing", number_prop)),
        ("activeTab", simple("active_tab", number_prop)),
        ("autoscale", simple("autoscale", bool_prop)),
        ("showGrid", simple("show_grid", bool_prop)),
    ] {
        table.insert(name, parser);
    }
    table
}

static BOB_NESTED: Lazy<SimpleTable> = Lazy::new(bob_simple_parsers);

fn description(action: &Fragment) -> Option<SmolStr> {
    element::child_text(action, "description")
        .filter(|text| !text.is_empty())
        .map(SmolStr::new)
}

fn parse_action(
    action: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<WidgetAction>, ParseError> {
    let kind = element::attribute(action, "type")
        .unwrap_or("undefined")
        .to_ascii_lowercase();
    let parsed = match kind.as_str() {
        "write_pv" => {
            let pv = values::parse_pv_name(
                element::require_child(action, "pv_name")?,
                ctx.default_protocol,
            )?;
            let value = element::require_text(element::require_child(action, "value")?)?;
            WidgetAction::WritePv {
                write_pv_info: WritePvInfo {
                    pv_name: SmolStr::new(pv.qualified_name()),
                    value: SmolStr::new(value),
                    description: description(action),
                },
            }
        }
        "open_webpage" => WidgetAction::OpenWebpage {
            open_webpage_info: OpenWebpageInfo {
                url: values::parse_string(element::require_child(action, "url")?)?,
                description: description(action),
            },
        },
        "open_display" => {
            let path = values::parse_string(element::require_child(action, "file")?)?;
            let target = element::require_text(element::require_child(action, "target")?)?;
            let location = match target {
                "tab" => element::child_text(action, "name").unwrap_or("main"),
                _ => "main",
            };
            let macros = match element::child(action, "macros") {
                Some(macros) => values::parse_macros(macros)?,
                None => Default::default(),
            };
            let dynamic_info = DynamicInfo {
                name: path.clone(),
                location: SmolStr::new(location),
                description: description(action),
                file: OpiFile::new(path, macros),
            };
            if target == "replace" {
                WidgetAction::OpenPage { dynamic_info }
            } else {
                WidgetAction::OpenTab { dynamic_info }
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(parsed))
}

fn actions_prop(fragment: &Fragment, ctx: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let mut actions = WidgetActions {
        execute_as_one: element::attribute(fragment, "execute_as_one") == Some("true"),
        actions: Vec::new(),
    };
    for action in element::to_array(element::child(fragment, "action")) {
        match parse_action(action, ctx) {
            Ok(Some(parsed)) => actions.actions.push(parsed),
            Ok(None) => debug!(action = %action, "unsupported action type"),
            Err(error) => warn!(%error, "could not convert action"),
        }
    }
    Ok(PropValue::Actions(actions))
}

static BOB_SIMPLE: Lazy<SimpleTable> = Lazy::new(|| {
    let mut table = bob_simple_parsers();
    table.insert("pvName", simple("pv_name", pv_name_prop));
    table.insert("pvMetadataList", simple("pv_name", pv_metadata_prop));
    table.insert("actions", simple("actions", actions_prop));
    table
});

fn default_size(raw: &str) -> Option<(u32, u32)> {
    BOB_DEFAULT_SIZES
        .iter()
        .find(|(name, _)| *name == raw)
        .map(|(_, size)| *size)
}

/// Number of a child element; absent or non-numeric is `None`.
fn optional_number(element: &Fragment, name: &str) -> Option<f64> {
    element::child(element, name).and_then(|fragment| values::parse_number(fragment).ok())
}

fn position_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let raw = raw_type(element);
    let size = default_size(raw);
    let dimension = |name: &str, pick: fn((u32, u32)) -> u32| -> Result<String, StructuralError> {
        match optional_number(element, name) {
            Some(value) => Ok(format_number(value)),
            None => size
                .map(|size| pick(size).to_string())
                .ok_or_else(|| StructuralError::MissingDefaultSize(SmolStr::new(raw))),
        }
    };
    let x = format_number(optional_number(element, "x").unwrap_or(0.0));
    let y = format_number(optional_number(element, "y").unwrap_or(0.0));
    let width = dimension("width", |(width, _)| width)?;
    let height = dimension("height", |(_, height)| height)?;
    let position = Position::absolute(
        format!("{x}px"),
        format!("{y}px"),
        format!("{width}px"),
        format!("{height}px"),
    )?;
    Ok(Some(position.into()))
}

fn border_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let width = optional_number(element, "border_width").unwrap_or(0.0);
    let color = element::child(element, "border_color")
        .and_then(|fragment| values::parse_color(fragment).ok())
        .unwrap_or(Color::BLACK);
    let border = if width > 0.0 {
        Border::new(BorderStyle::Line, color, width)
    } else {
        Border::NONE
    };
    Ok(Some(border.into()))
}

fn alarm_sensitive_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let sensitive = match element::child(element, "border_alarm_sensitive") {
        Some(fragment) => values::parse_bool(fragment)?,
        None => true,
    };
    Ok(Some(sensitive.into()))
}

fn file_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let Some(file) = element::child(element, "file") else {
        return Ok(None);
    };
    let path = values::parse_string(file)?;
    let macros = match element::child(element, "macros") {
        Some(macros) => values::parse_macros(macros)?,
        None => Default::default(),
    };
    Ok(Some(PropValue::File(OpiFile::new(path, macros))))
}

fn x_axis_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let Some(axis) = element::child(element, "x_axis") else {
        return Ok(None);
    };
    let props = parse_child_props(axis, &BOB_NESTED, ctx);
    Ok(Some(PropValue::Axis(Box::new(Axis::from_props(&props, true)))))
}

fn traces_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let traces = element::child(element, "traces")
        .map(|traces| element::to_array(element::child(traces, "trace")))
        .unwrap_or_default()
        .into_iter()
        .map(|trace| Trace::from_props(&parse_child_props(trace, &BOB_NESTED, ctx)))
        .collect();
    Ok(Some(PropValue::Traces(traces)))
}

fn axes_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let axes = element::child(element, "y_axes")
        .map(|axes| element::to_array(element::child(axes, "y_axis")))
        .unwrap_or_default()
        .into_iter()
        .map(|axis| Axis::from_props(&parse_child_props(axis, &BOB_NESTED, ctx), false))
        .collect();
    Ok(Some(PropValue::Axes(axes)))
}

fn plt_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let path = element::child_text(element, "file").filter(|_| raw_type(element) == "databrowser");
    let plt = match path {
        Some(path) => load_plt(path, ctx)?,
        None => Default::default(),
    };
    Ok(Some(PropValue::Plt(Box::new(plt))))
}

fn colors_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    Ok(element::child(element, "colors")
        .map(|colors| PropValue::Map(parse_child_props(colors, &BOB_NESTED, ctx))))
}

static TAB_PROPS: Lazy<SimpleTable> = Lazy::new(|| {
    let mut table = SimpleTable::new();
    table.insert("file", simple("file", string_prop));
    table.extend(bob_simple_parsers());
    table
});

/// Each `<tab>` carries its own props and a `<children>` list of widgets.
fn tabs_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let Some(tabs) = element::child(element, "tabs") else {
        return Ok(None);
    };
    let tabs = element::to_array(element::child(tabs, "tab"))
        .into_iter()
        .map(|tab| {
            let widgets = element::child(tab, "children")
                .map(|children| {
                    element::to_array(element::child(children, ctx.dialect.child_field))
                })
                .unwrap_or_default();
            Tab {
                props: parse_child_props(tab, &TAB_PROPS, ctx),
                children: widgets.par_iter().map(|child| parse_widget(child, ctx)).collect(),
            }
        })
        .collect();
    Ok(Some(PropValue::Tabs(tabs)))
}

fn rules_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    parse_rules(element, ctx, false).map(|rules| Some(PropValue::Rules(rules)))
}

fn scripts_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    parse_scripts(element, ctx, false).map(|scripts| Some(PropValue::Scripts(scripts)))
}

static BOB_COMPLEX: Lazy<ComplexTable> = Lazy::new(|| {
    let mut table = opi_complex_parsers();
    table.insert("position", position_prop);
    table.insert("border", border_prop);
    table.insert("alarmSensitive", alarm_sensitive_prop);
    table.insert("file", file_prop);
    table.insert("xAxis", x_axis_prop);
    table.insert("rules", rules_prop);
    table.insert("scripts", scripts_prop);
    table.insert("traces", traces_prop);
    table.insert("axes", axes_prop);
    table.insert("plt", plt_prop);
    table.insert("colors", colors_prop);
    table.insert("tabs", tabs_prop);
    table
});

pub(crate) static BOB: Lazy<Dialect> = Lazy::new(|| Dialect {
    name: "bob",
    simple: &BOB_SIMPLE,
    complex: &BOB_COMPLEX,
    resolve_kind: bob_kind,
    child_field: "widget",
    pass_through: false,
    patches: XML_PATCHES,
});

/// Parse the text of a `.bob` file.
pub fn parse_bob(
    contents: &str,
    file_path: &str,
    options: &ParseOptions<'_>,
) -> Result<WidgetDescription, FileLoadError> {
    let mut tree = element::xml_to_compact(contents, file_path)?;
    let display = tree
        .get_mut("display")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| FileLoadError::MissingRoot(SmolStr::new_static("display")))?;
    let attributes = display
        .entry(element::ATTRIBUTES)
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(attributes) = attributes.as_object_mut() {
        attributes.insert("type".to_string(), Value::String("display".to_string()));
    }

    let ctx = options.context(&BOB, file_path);
    let mut widget = parse_widget(&tree["display"], &ctx);
    relative_root(&mut widget);
    Ok(widget)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_mapped_type_with_a_size() {
        for (raw, _) in BOB_WIDGET_MAPPING {
            if *raw != "image" {
                assert!(default_size(raw).is_some(), "{raw}");
            }
        }
    }

    #[test]
    fn fonts_read_nested_attributes() {
        let fragment = json!({"font": {"_attributes": {
            "family": "Liberation Sans", "style": "BOLD_ITALIC", "size": "18.0"
        }}});
        assert_eq!(
            parse_bob_font(&fragment).unwrap(),
            Font::new(Some(18.0), Some(FontStyle::BoldItalic), Some("Liberation Sans"))
        );
    }

    #[test]
    fn symbols_accept_list_or_text() {
        let registry = crate::registry::WidgetRegistry::standard();
        let options = ParseOptions::new(&registry);
        let ctx = options.context(&BOB, "");
        let list = json!({"symbol": [{"_text": "a.png"}, {"_text": "b.png"}]});
        assert_eq!(
            symbols_prop(&list, &ctx).unwrap(),
            PropValue::StringList(vec!["a.png".into(), "b.png".into()])
        );
        assert_eq!(
            symbols_prop(&json!({"_text": "c.png"}), &ctx).unwrap(),
            PropValue::string("c.png")
        );
        assert_eq!(symbols_prop(&json!({}), &ctx).unwrap(), PropValue::StringList(Vec::new()));
    }
}
