//! CS-Studio BOY `.opi` files.

use csweb_expr::value::format_number;
use once_cell::sync::Lazy;
use serde_json::Value;
use smol_str::SmolStr;
use tracing::{debug, warn};

use super::patch::XML_PATCHES;
use super::rules::{parse_rules, parse_scripts};
use super::values::{
    self, bool_prop, color_prop, horizontal_alignment_prop, macros_prop, number_prop,
    opi_font_prop, pv_metadata_prop, pv_name_prop, string_prop, vertical_alignment_prop,
};
use super::{parse_widget, relative_root, simple, ComplexTable, Dialect, ParseContext, SimpleTable};
use crate::element::{self, Fragment};
use crate::error::{FileLoadError, ParseError, StructuralError};
use crate::load::ParseOptions;
use crate::types::{
    Axis, Border, BorderStyle, Color, DynamicInfo, OpiFile, Point, Points, Position, PropValue,
    Trace, WidgetAction, WidgetActions, WidgetDescription,
};
use crate::types::actions::{OpenWebpageInfo, WritePvInfo};
use crate::util::snake_case_to_camel_case;

const DISPLAY_TYPE_ID: &str = "org.csstudio.opibuilder.Display";
const WIDGET_TYPE_PREFIX: &str = "org.csstudio.opibuilder.widgets.";

/// Widget type ids, without [`WIDGET_TYPE_PREFIX`], to registered kinds.
const OPI_WIDGET_MAPPING: &[(&str, &str)] = &[
    ("arc", "arc"),
    ("bytemonitor", "bytemonitor"),
    ("Ellipse", "ellipse"),
    ("TextUpdate", "readback"),
    ("TextInput", "input"),
    ("Label", "label"),
    ("groupingContainer", "groupingcontainer"),
    ("Rectangle", "shape"),
    ("RoundedRectangle", "shape"),
    ("ActionButton", "actionbutton"),
    ("BoolButton", "boolbutton"),
    ("MenuButton", "menubutton"),
    ("combo", "menubutton"),
    ("checkbox", "checkbox"),
    ("choiceButton", "choicebutton"),
    ("linkingContainer", "embeddedDisplay"),
    ("polyline", "line"),
    ("polygon", "polygon"),
    ("symbol.multistate.MultistateMonitorWidget", "symbol"),
    ("progressbar", "progressbar"),
    ("LED", "led"),
    ("Image", "image"),
    ("edm.symbolwidget", "pngsymbol"),
    ("detailpanel", "device"),
    ("dawn.xygraph", "xyplot"),
    ("xyGraph", "xyplot"),
];

/// Registered kind for a `typeId`, or the raw id when unmapped.
fn opi_kind(element: &Fragment) -> SmolStr {
    let Some(type_id) = element::attribute(element, "typeId") else {
        return SmolStr::default();
    };
    if type_id == DISPLAY_TYPE_ID {
        return SmolStr::new_static("display");
    }
    type_id
        .strip_prefix(WIDGET_TYPE_PREFIX)
        .and_then(|name| OPI_WIDGET_MAPPING.iter().find(|(raw, _)| *raw == name))
        .map_or_else(|| SmolStr::new(type_id), |(_, kind)| SmolStr::new_static(kind))
}

fn format_type_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    values::lookup(
        fragment,
        "format type",
        &[(0, "default"), (1, "decimal"), (2, "exponential"), (4, "string")],
    )
    .map(PropValue::from)
}

fn label_position_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let position = values::lookup(
        fragment,
        "label position",
        &[
            (1, "top"),
            (2, "left"),
            (3, "center"),
            (4, "right"),
            (5, "bottom"),
            (6, "top left"),
            (7, "top right"),
            (8, "bottom left"),
            (9, "bottom right"),
        ],
    )
    .unwrap_or("top");
    Ok(position.into())
}

/// `<items><s>one</s><s>two</s></items>`
fn items_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let items = element::to_array(element::child(fragment, "s"))
        .into_iter()
        .filter_map(element::text)
        .map(SmolStr::new)
        .collect();
    Ok(PropValue::StringList(items))
}

fn resize_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let behaviour = values::lookup(
        fragment,
        "resize behaviour",
        &[
            (0, "size-content"),
            (1, "size-widget"),
            (2, "crop-content"),
            (3, "scroll-content"),
        ],
    )
    .unwrap_or("size-widget");
    Ok(behaviour.into())
}

fn description(action: &Fragment) -> Option<SmolStr> {
    element::child_text(action, "description")
        .filter(|text| !text.is_empty())
        .map(SmolStr::new)
}

/// Display location of an open-display action: `mode` wins over `Position`.
fn action_location(action: &Fragment) -> &'static str {
    match element::child_text(action, "mode") {
        Some("1") => "main",
        Some("3") => "details",
        _ => match element::child_text(action, "Position") {
            Some("1") => "details",
            _ => "main",
        },
    }
}

fn parse_action(
    action: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<WidgetAction>, ParseError> {
    let kind = element::attribute(action, "type").unwrap_or_default();
    let parsed = match kind {
        "WRITE_PV" => {
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
        "OPEN_WEBPAGE" => WidgetAction::OpenWebpage {
            open_webpage_info: OpenWebpageInfo {
                url: values::parse_string(element::require_child(action, "hyperlink")?)?,
                description: description(action),
            },
        },
        "OPEN_DISPLAY" | "OPEN_OPI_IN_VIEW" => {
            let path = values::parse_string(element::require_child(action, "path")?)?;
            WidgetAction::OpenTab {
                dynamic_info: DynamicInfo {
                    name: path.clone(),
                    location: SmolStr::new_static(action_location(action)),
                    description: description(action),
                    file: OpiFile::new(path, Default::default()),
                },
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(parsed))
}

/// `<actions hook="false" hook_all="false">` with one `<action type="...">` per action.
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

/// Simple parsers shared by OPI and, with overrides, BOB.
pub(crate) fn opi_simple_parsers() -> SimpleTable {
    let mut table = SimpleTable::new();
    for (name, parser) in [
        ("text", simple("text", string_prop)),
        ("name", simple("name", string_prop)),
        ("textAlign", simple("horizontal_alignment", horizontal_alignment_prop)),
        ("textAlignV", simple("vertical_alignment", vertical_alignment_prop)),
        ("backgroundColor", simple("background_color", color_prop)),
        ("foregroundColor", simple("foreground_color", color_prop)),
        ("onColor", simple("on_color", color_prop)),
        ("offColor", simple("off_color", color_prop)),
        ("fillColor", simple("fill_color", color_prop)),
        ("precision", simple("precision", number_prop)),
        ("formatType", simple("format_type", format_type_prop)),
        ("precisionFromPv", simple("precision_from_pv", bool_prop)),
        ("visible", simple("visible", bool_prop)),
        ("showUnits", simple("show_units", bool_prop)),
        ("transparent", simple("transparent", bool_prop)),
        ("horizontal", simple("horizontal", bool_prop)),
        ("wrapWords", simple("wrap_words", bool_prop)),
        ("logScale", simple("log_scale", bool_prop)),
        ("font", simple("font", opi_font_prop)),
        ("macroMap", simple("macros", macros_prop)),
        ("imageFile", simple("image_file", string_prop)),
        ("imageIndex", simple("image_index", number_prop)),
        ("image", simple("image", string_prop)),
        ("showBooleanLabel", simple("show_boolean_label", bool_prop)),
        ("showLabel", simple("show_label", bool_prop)),
        ("labelPosition", simple("boolean_label_position", label_position_prop)),
        ("tooltip", simple("tooltip", string_prop)),
        ("stretchToFit", simple("stretch_to_fit", bool_prop)),
        ("lineWidth", simple("line_width", number_prop)),
        ("width", simple("width", number_prop)),
        ("height", simple("height", number_prop)),
        ("label", simple("label", string_prop)),
        ("opiFile", simple("opi_file", string_prop)),
        ("rotationAngle", simple("rotation_angle", number_prop)),
        ("rotation", simple("degree", number_prop)),
        ("flipHorizontal", simple("flip_horizontal", bool_prop)),
        ("flipVertical", simple("flip_vertical", bool_prop)),
        ("bit", simple("bit", number_prop)),
        ("actionsFromPv", simple("actions_from_pv", bool_prop)),
        ("itemsFromPv", simple("items_from_pv", bool_prop)),
        ("items", simple("items", items_prop)),
        ("deviceName", simple("device_name", string_prop)),
        ("autoZoomToFit", simple("auto_zoom_to_fit_all", bool_prop)),
        ("plotBackgroundColor", simple("plot_area_background_color", color_prop)),
        ("title", simple("title", string_prop)),
        ("titleFont", simple("title_font", opi_font_prop)),
        ("showLegend", simple("show_legend", bool_prop)),
        ("showPlotBorder", simple("show_plot_area_border", bool_prop)),
        ("showToolbar", simple("show_toolbar", bool_prop)),
        ("bgGradientColor", simple("bg_gradient_color", color_prop)),
        ("fgGradientColor", simple("fg_gradient_color", color_prop)),
        ("gradient", simple("gradient", bool_prop)),
        ("fillLevel", simple("fill_level", number_prop)),
        ("horizontalFill", simple("horizontal_fill", bool_prop)),
        ("fill", simple("fill", bool_prop)),
        ("lineColor", simple("line_color", color_prop)),
        ("onLabel", simple("on_label", string_prop)),
        ("offLabel", simple("off_label", string_prop)),
        ("onState", simple("on_state", number_prop)),
        ("offState", simple("off_state", number_prop)),
        ("startAngle", simple("start_angle", number_prop)),
        ("totalAngle", simple("total_angle", number_prop)),
        ("numBits", simple("numBits", number_prop)),
        ("startBit", simple("startBit", number_prop)),
        ("ledBorder", simple("led_border", number_prop)),
        ("ledBorderColor", simple("led_border_color", color_prop)),
        ("bitReverse", simple("bitReverse", bool_prop)),
        ("squareLed", simple("square_led", bool_prop)),
        ("squareButton", simple("square_button", bool_prop)),
        ("effect3d", simple("effect_3d", bool_prop)),
        ("showLed", simple("show_led", bool_prop)),
        ("cornerWidth", simple("corner_width", string_prop)),
        ("cornerHeight", simple("corner_height", string_prop)),
        ("arrows", simple("arrows", number_prop)),
        ("arrowLength", simple("arrow_length", number_prop)),
        ("fillArrow", simple("fill_arrow", bool_prop)),
        ("selectedColor", simple("selected_color", color_prop)),
        ("enabled", simple("enabled", bool_prop)),
        ("resize", simple("resize_behaviour", resize_prop)),
        ("labelsFromPv", simple("labels_from_pv", bool_prop)),
    ] {
        table.insert(name, parser);
    }
    table
}

static OPI_SIMPLE: Lazy<SimpleTable> = Lazy::new(|| {
    let mut table = opi_simple_parsers();
    table.insert("pvName", simple("pv_name", pv_name_prop));
    table.insert("pvMetadataList", simple("pv_name", pv_metadata_prop));
    table.insert("actions", simple("actions", actions_prop));
    table
});

fn pixels(element: &Fragment, name: &'static str) -> Result<SmolStr, ParseError> {
    let value = values::parse_number(element::require_child(element, name)?)?;
    Ok(SmolStr::new(format!("{}px", format_number(value))))
}

fn position_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let position = Position::absolute(
        pixels(element, "x")?,
        pixels(element, "y")?,
        pixels(element, "width")?,
        pixels(element, "height")?,
    )?;
    Ok(Some(position.into()))
}

fn child_number(element: &Fragment, name: &'static str) -> Result<f64, ParseError> {
    values::parse_number(element::require_child(element, name)?)
}

fn child_color(element: &Fragment, name: &'static str) -> Result<Color, ParseError> {
    values::parse_color(element::require_child(element, name)?)
}

fn border_style(code: f64) -> BorderStyle {
    [
        (1.0, BorderStyle::Line),
        (2.0, BorderStyle::Outset),
        (8.0, BorderStyle::Dotted),
        (9.0, BorderStyle::Dashed),
        (13.0, BorderStyle::GroupBox),
    ]
    .into_iter()
    .find_map(|(value, style)| (value == code).then_some(style))
    .unwrap_or_default()
}

/// Style, width and colour are read in order; the first failure keeps the
/// defaults for it and everything after it.
fn border_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let mut style = BorderStyle::None;
    let mut width = 0.0;
    let mut color = Color::BLACK;
    let mut line_color = None;
    let read = (|| -> Result<(), ParseError> {
        style = border_style(child_number(element, "border_style")?);
        width = child_number(element, "border_width")?;
        color = child_color(element, "border_color")?;
        line_color = Some(child_color(element, "line_color")?);
        Ok(())
    })();
    if let Err(error) = read {
        debug!(%error, "incomplete border, keeping defaults for the remaining fields");
    }
    if style == BorderStyle::Outset {
        width = 1.0;
        color = Color::GREY;
    }
    let border = match line_color {
        Some(line_color) if width < 2.0 => Border::new(BorderStyle::Line, line_color, width),
        _ => Border::new(style, color, width),
    };
    Ok(Some(border.into()))
}

fn file_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let Some(file) = element::child(element, "opi_file") else {
        return Ok(None);
    };
    let path = values::parse_string(file)?;
    let macros = match element::child(element, "macros") {
        Some(macros) => values::parse_macros(macros)?,
        None => Default::default(),
    };
    Ok(Some(PropValue::File(OpiFile::new(path, macros))))
}

fn alarm_sensitive_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let Some(fragment) = element::child(element, "border_alarm_sensitive") else {
        return Ok(None);
    };
    Ok(Some(values::parse_bool(fragment)?.into()))
}

/// How an indexed trace or axis field is read, keyed by its camelCase name.
#[derive(Clone, Copy)]
enum FieldKind {
    Bool,
    Number,
    String,
    Color,
    Font,
}

fn field_kind(name: &str) -> Option<FieldKind> {
    let kind = match name {
        "visible" | "antiAlias" | "concatenateData" | "autoScale" | "showGrid"
        | "dashGridLine" | "logScale" | "leftBottomSide" => FieldKind::Bool,
        "lineWidth" | "pointSize" | "traceType" | "pointStyle" | "yAxisIndex" | "bufferSize"
        | "updateMode" | "updateDelay" | "autoScaleThreshold" | "timeFormat" | "maximum"
        | "minimum" => FieldKind::Number,
        "name" | "xPv" | "yPv" | "axisTitle" => FieldKind::String,
        "traceColor" | "axisColor" | "gridColor" => FieldKind::Color,
        "scaleFont" | "titleFont" => FieldKind::Font,
        _ => return None,
    };
    Some(kind)
}

fn parse_field(kind: FieldKind, fragment: &Fragment) -> Result<PropValue, ParseError> {
    Ok(match kind {
        FieldKind::Bool => values::parse_bool(fragment)?.into(),
        FieldKind::Number => values::parse_number(fragment)?.into(),
        FieldKind::String => PropValue::String(values::parse_string(fragment)?),
        FieldKind::Color => values::parse_color(fragment)?.into(),
        FieldKind::Font => values::parse_opi_font(fragment)?.into(),
    })
}

/// Collect `{group}_{index}_{field}` elements as camelCase field values.
///
/// Empty or malformed fields are skipped.
fn indexed_fields<'a>(
    element: &'a Fragment,
    group: &'a str,
    index: usize,
) -> impl Iterator<Item = (String, PropValue)> + 'a {
    let prefix = format!("{group}_{index}_");
    element
        .as_object()
        .into_iter()
        .flatten()
        .filter(move |(key, _)| key.starts_with(&prefix))
        .filter_map(|(key, fragment)| {
            let name = snake_case_to_camel_case(key, 2, None)?;
            let value = parse_field(field_kind(&name)?, fragment).ok()?;
            Some((name, value))
        })
}

fn count(element: &Fragment, name: &'static str) -> Result<Option<usize>, ParseError> {
    let Some(fragment) = element::child(element, name) else {
        return Ok(None);
    };
    let count = values::parse_number(fragment)?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = count.max(0.0) as usize;
    Ok(Some(count))
}

fn traces_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let Some(count) = count(element, "trace_count")? else {
        return Ok(None);
    };
    let traces = (0..count)
        .map(|index| {
            let mut trace = Trace::default();
            for (name, value) in indexed_fields(element, "trace", index) {
                trace.set(&name, &value);
            }
            if trace.name.is_empty() {
                trace.name = trace.y_pv.clone();
            }
            trace
        })
        .collect();
    Ok(Some(PropValue::Traces(traces)))
}

fn axes_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let Some(count) = count(element, "axis_count")? else {
        return Ok(None);
    };
    let axes = (0..count)
        .map(|index| {
            let mut axis = Axis::new(index == 0);
            for (name, value) in indexed_fields(element, "axis", index) {
                axis.set(&name, &value);
            }
            axis
        })
        .collect();
    Ok(Some(PropValue::Axes(axes)))
}

fn point_coordinate(point: &Fragment, name: &'static str) -> Result<f64, ParseError> {
    let text = element::attribute(point, name)
        .ok_or(ParseError::MissingField(SmolStr::new_static(name)))?;
    let value = csweb_expr::value::string_to_number(text);
    if value.is_nan() {
        return Err(ParseError::InvalidNumber(SmolStr::new(text)));
    }
    Ok(value)
}

/// OPI points are absolute; they are stored relative to the widget origin.
fn points_prop(
    element: &Fragment,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let Some(points) = element::child(element, "points") else {
        return Ok(None);
    };
    let x = child_number(element, "x")?;
    let y = child_number(element, "y")?;
    let values = element::to_array(element::child(points, "point"))
        .into_iter()
        .map(|point| {
            Ok(Point {
                x: point_coordinate(point, "x")? - x,
                y: point_coordinate(point, "y")? - y,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    Ok(Some(PropValue::Points(Points::new(values))))
}

fn rules_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    parse_rules(element, ctx, true).map(|rules| Some(PropValue::Rules(rules)))
}

fn scripts_prop(
    element: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    parse_scripts(element, ctx, true).map(|scripts| Some(PropValue::Scripts(scripts)))
}

/// Complex parsers shared by OPI and, with overrides, BOB.
pub(crate) fn opi_complex_parsers() -> ComplexTable {
    let mut table = ComplexTable::new();
    table.insert("position", position_prop);
    table.insert("border", border_prop);
    table.insert("file", file_prop);
    table.insert("alarmSensitive", alarm_sensitive_prop);
    table.insert("traces", traces_prop);
    table.insert("axes", axes_prop);
    table.insert("points", points_prop);
    table.insert("rules", rules_prop);
    table.insert("scripts", scripts_prop);
    table
}

static OPI_COMPLEX: Lazy<ComplexTable> = Lazy::new(opi_complex_parsers);

pub(crate) static OPI: Lazy<Dialect> = Lazy::new(|| Dialect {
    name: "opi",
    simple: &OPI_SIMPLE,
    complex: &OPI_COMPLEX,
    resolve_kind: opi_kind,
    child_field: "widget",
    pass_through: false,
    patches: XML_PATCHES,
});

/// Parse the text of an `.opi` file.
///
/// The display itself is placed at the origin and given a relative position.
pub fn parse_opi(
    contents: &str,
    file_path: &str,
    options: &ParseOptions<'_>,
) -> Result<WidgetDescription, FileLoadError> {
    let mut tree = element::xml_to_compact(contents, file_path)?;
    let display = tree
        .get_mut("display")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| FileLoadError::MissingRoot(SmolStr::new_static("display")))?;
    display.insert("x".to_string(), element::text_fragment("0"));
    display.insert("y".to_string(), element::text_fragment("0"));

    let ctx = options.context(&OPI, file_path);
    let mut widget = parse_widget(&tree["display"], &ctx);
    relative_root(&mut widget);
    Ok(widget)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn kinds_map_from_type_ids() {
        let label = json!({"_attributes": {"typeId": "org.csstudio.opibuilder.widgets.Label"}});
        assert_eq!(opi_kind(&label), "label");
        let display = json!({"_attributes": {"typeId": DISPLAY_TYPE_ID}});
        assert_eq!(opi_kind(&display), "display");
        let other = json!({"_attributes": {"typeId": "org.example.Gauge"}});
        assert_eq!(opi_kind(&other), "org.example.Gauge");
        assert_eq!(opi_kind(&json!({})), "");
    }

    #[test]
    fn unknown_border_codes_are_unstyled() {
        assert_eq!(border_style(2.0), BorderStyle::Outset);
        assert_eq!(border_style(13.0), BorderStyle::GroupBox);
        assert_eq!(border_style(5.0), BorderStyle::None);
    }

    #[test]
    fn indexed_fields_are_typed_by_name() {
        let element = json!({
            "trace_0_y_pv": {"_text": "SR:X"},
            "trace_0_line_width": {"_text": "3"},
            "trace_0_visible": {"_text": "nope"},
            "trace_1_y_pv": {"_text": "SR:Y"},
            "trace_10_y_pv": {"_text": "SR:Z"},
        });
        let fields: Vec<_> = indexed_fields(&element, "trace", 1).collect();
        assert_eq!(fields, [("yPv".to_string(), PropValue::string("SR:Y"))]);
        let fields: Vec<_> = indexed_fields(&element, "trace", 0).map(|(name, _)| name).collect();
        assert_eq!(fields, ["yPv", "lineWidth"]);
    }
}
