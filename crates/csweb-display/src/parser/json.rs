//! Native JSON display descriptions.
//!
//! JSON files already use canonical property names, so only a handful of
//! typed values are converted and everything else passes through.

use csweb_expr::value::format_number;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::Value;
use smol_str::SmolStr;
use tracing::warn;

use super::{parse_widget, simple, ComplexTable, Dialect, ParseContext, SimpleTable};
use crate::error::{FileLoadError, ParseError, StructuralError};
use crate::load::ParseOptions;
use crate::types::{
    Border, BorderStyle, BoxConstraints, Color, Expression, Font, FontStyle, OpiFile, Position,
    PropValue, Pv, Rule, RulePv, WidgetActions, WidgetDescription,
};

fn shape(what: &'static str) -> ParseError {
    ParseError::UnexpectedShape(SmolStr::new_static(what))
}

fn field<'a>(value: &'a Value, name: &'static str) -> Result<&'a Value, ParseError> {
    value
        .get(name)
        .ok_or(ParseError::MissingField(SmolStr::new_static(name)))
}

fn string_field<'a>(value: &'a Value, name: &'static str) -> Result<&'a str, ParseError> {
    field(value, name)?.as_str().ok_or_else(|| shape(name))
}

/// `"red"` or `{"colorString": "red"}`.
fn parse_json_color(value: &Value) -> Result<Color, ParseError> {
    match value {
        Value::String(text) => Ok(Color::new(text.as_str())),
        Value::Object(_) => string_field(value, "colorString").map(Color::new),
        _ => Err(shape("color")),
    }
}

fn parse_json_font(value: &Value) -> Result<Font, ParseError> {
    let style = match value.get("style").and_then(Value::as_str) {
        Some("italic") => Some(FontStyle::Italic),
        Some("bold") => Some(FontStyle::Bold),
        Some("bold italic") => Some(FontStyle::BoldItalic),
        _ => None,
    };
    let mut font = Font::new(
        value.get("size").and_then(Value::as_f64),
        style,
        value.get("typeface").and_then(Value::as_str),
    );
    font.name = value.get("name").and_then(Value::as_str).map(SmolStr::new);
    Ok(font)
}

fn parse_json_border(value: &Value) -> Result<Border, ParseError> {
    let style = string_field(value, "style")?;
    let style = match style.to_ascii_lowercase().as_str() {
        "none" => BorderStyle::None,
        "line" => BorderStyle::Line,
        "dashed" => BorderStyle::Dashed,
        "dotted" => BorderStyle::Dotted,
        "groupbox" => BorderStyle::GroupBox,
        _ => {
            return Err(ParseError::UnknownCode {
                table: "border style",
                code: SmolStr::new(style),
            })
        }
    };
    let width = field(value, "width")?.as_f64().ok_or_else(|| shape("width"))?;
    let color = parse_json_color(field(value, "color")?)?;
    Ok(Border::new(style, color, width).with_radius(value.get("radius").and_then(Value::as_f64)))
}

fn deserialize<T: DeserializeOwned>(value: &Value, what: &'static str) -> Result<T, ParseError> {
    serde_json::from_value(value.clone()).map_err(|error| {
        tracing::debug!(what, %error, "could not deserialize");
        shape(what)
    })
}

fn color_prop(value: &Value, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    parse_json_color(value).map(PropValue::Color)
}

fn font_prop(value: &Value, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    parse_json_font(value).map(PropValue::Font)
}

fn border_prop(value: &Value, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    parse_json_border(value).map(PropValue::Border)
}

fn pv_name_prop(value: &Value, ctx: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let name = value.as_str().ok_or_else(|| shape("pvName"))?;
    Ok(PropValue::Pv(Pv::parse(name, ctx.default_protocol)))
}

fn actions_prop(value: &Value, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    deserialize::<WidgetActions>(value, "actions").map(PropValue::Actions)
}

fn file_prop(value: &Value, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    deserialize::<OpiFile>(value, "file").map(PropValue::File)
}

fn parse_rule_pv(value: &Value, ctx: &ParseContext<'_>) -> Result<RulePv, ParseError> {
    Ok(RulePv {
        pv_name: Pv::parse(string_field(value, "pvName")?, ctx.default_protocol),
        trigger: value.get("trigger").and_then(Value::as_bool).unwrap_or(true),
    })
}

/// Expression values are converted with the parser of the rule's target
/// when there is one, and kept as written otherwise.
fn parse_rule(value: &Value, ctx: &ParseContext<'_>) -> Result<Rule, ParseError> {
    let prop = string_field(value, "prop")?;
    let parser = ctx.dialect.simple.get(prop);
    let pvs = value
        .get("pvs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|pv| parse_rule_pv(pv, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    let expressions = value
        .get("expressions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .map(|exp| -> Result<Expression, ParseError> {
            let raw = exp.get("value").cloned().unwrap_or_default();
            let converted = match parser {
                Some(parser) => (parser.parse)(&raw, ctx)?,
                None => PropValue::Raw(raw.clone()),
            };
            let mut expression = Expression::new(string_field(exp, "boolExp")?, raw);
            expression.converted_value = Some(converted);
            Ok(expression)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Rule {
        name: SmolStr::new(value.get("name").and_then(Value::as_str).unwrap_or_default()),
        prop: SmolStr::new(prop),
        out_exp: value.get("outExp").and_then(Value::as_bool).unwrap_or(false),
        pvs,
        expressions,
    })
}

/// One rule failing to parse drops the whole `rules` prop.
fn rules_prop(value: &Value, ctx: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let rules = value.as_array().ok_or_else(|| shape("rules"))?;
    rules
        .iter()
        .map(|rule| {
            parse_rule(rule, ctx).inspect_err(|error| {
                let name = rule.get("name").and_then(Value::as_str).unwrap_or_default();
                warn!(rule = name, %error, "could not parse rule, dropping all rules");
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(PropValue::Rules)
}

static JSON_SIMPLE: Lazy<SimpleTable> = Lazy::new(|| {
    [
        ("backgroundColor", simple("backgroundColor", color_prop)),
        ("foregroundColor", simple("foregroundColor", color_prop)),
        ("font", simple("font", font_prop)),
        ("border", simple("border", border_prop)),
        ("pvName", simple("pvName", pv_name_prop)),
        ("rules", simple("rules", rules_prop)),
        ("actions", simple("actions", actions_prop)),
        ("file", simple("file", file_prop)),
    ]
    .into_iter()
    .collect()
});

/// Numbers are written without a unit, as `10` rather than `10px`.
fn text_of(object: &Value, name: &str) -> SmolStr {
    match object.get(name) {
        Some(Value::String(text)) => SmolStr::new(text),
        Some(Value::Number(number)) => number
            .as_f64()
            .map_or_else(|| SmolStr::new(number.to_string()), |n| SmolStr::new(format_number(n))),
        _ => SmolStr::default(),
    }
}

fn position_prop(
    object: &Value,
    _: &ParseContext<'_>,
) -> Result<Option<PropValue>, StructuralError> {
    let constraints = BoxConstraints {
        margin: text_of(object, "margin"),
        padding: text_of(object, "padding"),
        min_width: text_of(object, "minWidth"),
        max_width: text_of(object, "maxWidth"),
        min_height: text_of(object, "minHeight"),
    };
    let position = if object.get("position").and_then(Value::as_str) == Some("absolute") {
        Position::absolute_with(
            text_of(object, "x"),
            text_of(object, "y"),
            text_of(object, "width"),
            text_of(object, "height"),
            constraints,
        )?
    } else {
        Position::relative_with(text_of(object, "width"), text_of(object, "height"), constraints)
    };
    Ok(Some(position.into()))
}

static JSON_COMPLEX: Lazy<ComplexTable> = Lazy::new(|| {
    let mut table = ComplexTable::new();
    table.insert("position", position_prop);
    table
});

fn json_kind(object: &Value) -> SmolStr {
    SmolStr::new(object.get("type").and_then(Value::as_str).unwrap_or_default())
}

pub(crate) static JSON: Lazy<Dialect> = Lazy::new(|| Dialect {
    name: "json",
    simple: &JSON_SIMPLE,
    complex: &JSON_COMPLEX,
    resolve_kind: json_kind,
    child_field: "children",
    pass_through: true,
    patches: &[],
});

/// Parse an already-decoded JSON description.
#[must_use]
pub fn parse_object(
    object: &Value,
    file_path: &str,
    options: &ParseOptions<'_>,
) -> WidgetDescription {
    let ctx = options.context(&JSON, file_path);
    parse_widget(object, &ctx)
}

/// Parse the text of a `.json` display file.
pub fn parse_json(
    contents: &str,
    file_path: &str,
    options: &ParseOptions<'_>,
) -> Result<WidgetDescription, FileLoadError> {
    let object: Value = serde_json::from_str(contents).map_err(|error| FileLoadError::Malformed {
        format: "JSON",
        path: SmolStr::new(file_path),
        message: SmolStr::new(error.to_string()),
    })?;
    Ok(parse_object(&object, file_path, options))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn colors_accept_both_shapes() {
        assert_eq!(parse_json_color(&json!("red")).unwrap(), Color::new("red"));
        assert_eq!(
            parse_json_color(&json!({"colorString": "rgba(0,0,255,1)"})).unwrap(),
            Color::BLUE
        );
        assert!(parse_json_color(&json!(3)).is_err());
    }

    #[test]
    fn border_styles_ignore_case() {
        let value = json!({"style": "DOTTED", "width": 2, "color": "red", "radius": 4});
        let border = parse_json_border(&value).unwrap();
        assert_eq!(border.style, BorderStyle::Dotted);
        assert_eq!(border.width, 2.0);
        assert_eq!(border.radius, Some(4.0));
        assert!(parse_json_border(&json!({"style": "wavy", "width": 1, "color": "red"})).is_err());
    }

    #[test]
    fn numeric_positions_become_text() {
        let object =
            json!({"position": "absolute", "x": 10, "y": "5px", "width": 1.5, "height": "2em"});
        assert_eq!(text_of(&object, "x"), "10");
        assert_eq!(text_of(&object, "width"), "1.5");
        assert_eq!(text_of(&object, "margin"), "");
    }
}
