//! Value parsers shared by the XML dialects.

use csweb_expr::value::string_to_number;
use smol_str::SmolStr;

use super::ParseContext;
use crate::element::{self, Fragment};
use crate::error::ParseError;
use crate::macros::MacroMap;
use crate::types::{Color, Font, FontStyle, PropValue, Pv};

/// The fragment's text.
pub fn parse_string(fragment: &Fragment) -> Result<SmolStr, ParseError> {
    element::require_text(fragment).map(SmolStr::new)
}

/// Literal `true` or `false`.
pub fn parse_bool(fragment: &Fragment) -> Result<bool, ParseError> {
    match element::text(fragment) {
        Some("true") => Ok(true),
        Some("false") => Ok(false),
        _ => Err(ParseError::InvalidBoolean(element::describe(fragment))),
    }
}

/// A number. Text that does not convert is an error rather than `NaN`.
pub fn parse_number(fragment: &Fragment) -> Result<f64, ParseError> {
    let value = element::text(fragment).map_or(f64::NAN, string_to_number);
    if value.is_nan() {
        return Err(ParseError::InvalidNumber(element::describe(fragment)));
    }
    Ok(value)
}

/// Leading-integer conversion of attribute text, as `parseInt` does.
pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|byte| !byte.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn channel(attributes: &Fragment, name: &'static str, code: char) -> Result<i64, ParseError> {
    let text = attributes
        .get(name)
        .and_then(Fragment::as_str)
        .ok_or(ParseError::MissingField(SmolStr::new_static(name)))?;
    parse_int(text).ok_or_else(|| ParseError::ColorOutOfRange {
        channel: code,
        value: SmolStr::new(text),
    })
}

/// `<color red green blue alpha?/>` nested under the property element.
///
/// Alpha is given in 0..=255 and scaled to 0..=1.
pub fn parse_color(fragment: &Fragment) -> Result<Color, ParseError> {
    let color = element::require_child(fragment, "color")?;
    let attributes = color
        .get(element::ATTRIBUTES)
        .ok_or(ParseError::MissingField(SmolStr::new_static("color")))?;
    let red = channel(attributes, "red", 'r')?;
    let green = channel(attributes, "green", 'g')?;
    let blue = channel(attributes, "blue", 'b')?;
    let alpha = match attributes.get("alpha").and_then(Fragment::as_str) {
        Some(text) => {
            let alpha = parse_int(text).ok_or_else(|| ParseError::ColorOutOfRange {
                channel: 'a',
                value: SmolStr::new(text),
            })?;
            if !(0..=255).contains(&alpha) {
                return Err(ParseError::ColorOutOfRange {
                    channel: 'a',
                    value: SmolStr::new(text),
                });
            }
            #[allow(clippy::cast_precision_loss)]
            let alpha = alpha as f64 / 255.0;
            alpha
        }
        None => 1.0,
    };
    Color::from_rgba(red, green, blue, alpha)
}

/// `<fontdata>` or `<opifont.name>` with `fontName`, `height` and a numeric style.
pub fn parse_opi_font(fragment: &Fragment) -> Result<Font, ParseError> {
    let data = element::child(fragment, "fontdata")
        .or_else(|| element::child(fragment, "opifont.name"))
        .ok_or(ParseError::MissingField(SmolStr::new_static("fontdata")))?;
    let size = element::attribute(data, "height").map(string_to_number);
    let style = element::attribute(data, "style").and_then(FontStyle::from_code);
    let typeface = element::attribute(data, "fontName");
    Ok(Font::new(size, style, typeface))
}

/// Each child element becomes a macro; empty elements map to `""`.
pub fn parse_macros(fragment: &Fragment) -> Result<MacroMap, ParseError> {
    let object = fragment
        .as_object()
        .ok_or_else(|| ParseError::UnexpectedShape(SmolStr::new_static("macros")))?;
    Ok(object
        .iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, value)| {
            let text = element::text(value).unwrap_or_default().to_string();
            (key.clone(), text)
        })
        .collect())
}

pub fn parse_pv_name(fragment: &Fragment, default_protocol: &str) -> Result<Pv, ParseError> {
    let raw = element::require_text(fragment)?;
    Ok(Pv::parse(raw, default_protocol))
}

/// Map a numeric code through a fixed table.
pub(crate) fn lookup<T: Copy>(
    fragment: &Fragment,
    table: &'static str,
    entries: &[(i64, T)],
) -> Result<T, ParseError> {
    let number = parse_number(fragment)?;
    entries
        .iter()
        .find(|(code, _)| {
            #[allow(clippy::cast_precision_loss)]
            let code = *code as f64;
            code == number
        })
        .map(|(_, value)| *value)
        .ok_or_else(|| ParseError::UnknownCode {
            table,
            code: element::describe(fragment),
        })
}

pub(crate) fn horizontal_alignment(fragment: &Fragment) -> Result<&'static str, ParseError> {
    lookup(
        fragment,
        "horizontal alignment",
        &[(0, "left"), (1, "center"), (2, "right")],
    )
}

pub(crate) fn vertical_alignment(fragment: &Fragment) -> Result<&'static str, ParseError> {
    lookup(
        fragment,
        "vertical alignment",
        &[(0, "top"), (1, "center"), (2, "bottom")],
    )
}

// Simple-table adapters with the common signature.

pub(crate) fn string_prop(
    fragment: &Fragment,
    _: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    parse_string(fragment).map(PropValue::String)
}

pub(crate) fn bool_prop(
    fragment: &Fragment,
    _: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    parse_bool(fragment).map(PropValue::Bool)
}

pub(crate) fn number_prop(
    fragment: &Fragment,
    _: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    parse_number(fragment).map(PropValue::Number)
}

pub(crate) fn color_prop(
    fragment: &Fragment,
    _: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    parse_color(fragment).map(PropValue::Color)
}

pub(crate) fn opi_font_prop(
    fragment: &Fragment,
    _: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    parse_opi_font(fragment).map(PropValue::Font)
}

pub(crate) fn macros_prop(
    fragment: &Fragment,
    _: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    parse_macros(fragment).map(PropValue::Macros)
}

pub(crate) fn horizontal_alignment_prop(
    fragment: &Fragment,
    _: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    horizontal_alignment(fragment).map(PropValue::from)
}

pub(crate) fn vertical_alignment_prop(
    fragment: &Fragment,
    _: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    vertical_alignment(fragment).map(PropValue::from)
}

pub(crate) fn pv_name_prop(
    fragment: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    parse_pv_name(fragment, ctx.default_protocol).map(PropValue::Pv)
}

pub(crate) fn pv_metadata_prop(
    fragment: &Fragment,
    ctx: &ParseContext<'_>,
) -> Result<PropValue, ParseError> {
    let pv_name = parse_pv_name(fragment, ctx.default_protocol)?;
    Ok(PropValue::PvMetadataList(vec![crate::types::PvMetadata {
        pv_name,
    }]))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn strings_need_text() {
        assert_eq!(parse_string(&json!({"_text": "a"})).unwrap(), "a");
        assert_eq!(
            parse_string(&json!({})),
            Err(ParseError::MissingText("undefined".into()))
        );
    }

    #[test]
    fn booleans_are_literal() {
        assert_eq!(parse_bool(&json!({"_text": "true"})), Ok(true));
        assert_eq!(parse_bool(&json!({"_text": "false"})), Ok(false));
        assert!(parse_bool(&json!({"_text": "True"})).is_err());
        assert!(parse_bool(&json!({"_text": "1"})).is_err());
    }

    #[test]
    fn numbers_reject_nan() {
        assert_eq!(parse_number(&json!({"_text": " 3.5 "})), Ok(3.5));
        assert_eq!(parse_number(&json!({"_text": ""})), Ok(0.0));
        assert!(parse_number(&json!({"_text": "3px"})).is_err());
        assert!(parse_number(&json!({})).is_err());
    }

    #[test]
    fn colors_with_and_without_alpha() {
        let fragment = json!({"color": {"_attributes": {"red": "255", "green": "0", "blue": "0"}}});
        assert_eq!(parse_color(&fragment), Ok(Color::RED));
        let fragment = json!({"color": {"_attributes": {
            "name": "Clear", "red": "0", "green": "0", "blue": "0", "alpha": "0"
        }}});
        assert_eq!(parse_color(&fragment), Ok(Color::TRANSPARENT));
        let fragment = json!({"color": {"_attributes": {"red": "256", "green": "0", "blue": "0"}}});
        assert!(matches!(
            parse_color(&fragment),
            Err(ParseError::ColorOutOfRange { channel: 'r', .. })
        ));
    }

    #[test]
    fn opi_fonts() {
        let fragment = json!({"opifont.name": {"_attributes": {
            "fontName": "Liberation Sans", "height": "15", "style": "1"
        }}});
        let font = parse_opi_font(&fragment).unwrap();
        assert_eq!(font, Font::new(Some(15.0), Some(FontStyle::Bold), Some("Liberation Sans")));
    }

    #[test]
    fn parse_int_stops_at_first_non_digit() {
        assert_eq!(parse_int("12abc"), Some(12));
        assert_eq!(parse_int(" -3"), Some(-3));
        assert_eq!(parse_int("x1"), None);
    }
}
