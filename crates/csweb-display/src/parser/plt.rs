//! Data browser `.plt` files referenced by BOB databrowser widgets.

use once_cell::sync::Lazy;
use smol_str::SmolStr;
use tracing::debug;

use super::bob::BOB;
use super::patch::normalise_path;
use super::values::{self, bool_prop, number_prop, string_prop};
use super::{parse_child_props, simple, ParseContext, SimpleTable};
use crate::element::{self, Fragment};
use crate::error::{FileLoadError, ParseError};
use crate::load::ParseOptions;
use crate::types::{Archiver, Axis, Color, Font, FontStyle, Plt, PropValue, Props, Trace};

fn channel(fragment: &Fragment, name: &'static str) -> Result<i64, ParseError> {
    let text = element::require_text(element::require_child(fragment, name)?)?;
    values::parse_int(text).ok_or_else(|| ParseError::InvalidNumber(SmolStr::new(text)))
}

fn color_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let color = Color::from_rgba(
        channel(fragment, "red")?,
        channel(fragment, "green")?,
        channel(fragment, "blue")?,
        1.0,
    )?;
    Ok(PropValue::Color(color))
}

/// `Liberation Sans|20|1`: typeface, size and style code.
pub(crate) fn parse_plt_font(text: &str) -> Font {
    let mut fields = text.rsplit('|');
    let style = fields.next().and_then(|code| match code.trim() {
        "0" => Some(FontStyle::Regular),
        "1" => Some(FontStyle::Bold),
        "2" => Some(FontStyle::Italic),
        "3" => Some(FontStyle::BoldItalic),
        _ => None,
    });
    let size = fields
        .next()
        .map(csweb_expr::value::string_to_number)
        .filter(|size| !size.is_nan());
    Font::new(size, style, fields.next())
}

fn font_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    element::require_text(fragment).map(|text| PropValue::Font(parse_plt_font(text)))
}

fn point_type_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let code = match element::text(fragment).unwrap_or("NONE") {
        "NONE" => 0.0,
        "SQUARES" => 1.0,
        "CIRCLES" => 2.0,
        "DIAMONDS" => 3.0,
        "XMARKS" => 4.0,
        "TRIANGLES" => 5.0,
        other => {
            return Err(ParseError::UnknownCode {
                table: "point type",
                code: SmolStr::new(other),
            })
        }
    };
    Ok(PropValue::Number(code))
}

/// Archive references are always requested over plain HTTP.
fn archive_prop(fragment: &Fragment, _: &ParseContext<'_>) -> Result<PropValue, ParseError> {
    let url = values::parse_string(element::require_child(fragment, "url")?)?;
    let host = url.split_once("://").map_or(url.as_str(), |(_, rest)| rest);
    Ok(PropValue::Archiver(Archiver {
        name: values::parse_string(element::require_child(fragment, "name")?)?,
        url: SmolStr::new(format!("http://{host}")),
    }))
}

static PLT_PARSERS: Lazy<SimpleTable> = Lazy::new(|| {
    [
        ("title", simple("title", string_prop)),
        ("start", simple("start", string_prop)),
        ("end", simple("end", string_prop)),
        ("grid", simple("grid", bool_prop)),
        ("scroll", simple("scroll", bool_prop)),
        ("scrollStep", simple("scroll_step", number_prop)),
        ("updatePeriod", simple("update_period", number_prop)),
        ("background", simple("background", color_prop)),
        ("foreground", simple("foreground", color_prop)),
        ("color", simple("color", color_prop)),
        ("traceType", simple("trace_type", string_prop)),
        ("useAxisName", simple("use_axis_name", bool_prop)),
        ("useTraceNames", simple("use_trace_names", bool_prop)),
        ("right", simple("right", bool_prop)),
        ("displayName", simple("display_name", string_prop)),
        ("waveformIndex", simple("waveform_index", number_prop)),
        ("period", simple("period", number_prop)),
        ("linewidth", simple("linewidth", number_prop)),
        ("pointType", simple("point_type", point_type_prop)),
        ("name", simple("name", string_prop)),
        ("ringSize", simple("ring_size", number_prop)),
        ("request", simple("request", string_prop)),
        ("archive", simple("archive", archive_prop)),
        ("titleFont", simple("title_font", font_prop)),
        ("scaleFont", simple("scale_font", font_prop)),
        ("labelFont", simple("label_font", font_prop)),
        ("legendFont", simple("legend_font", font_prop)),
        ("min", simple("min", number_prop)),
        ("max", simple("max", number_prop)),
        ("axis", simple("axis", number_prop)),
    ]
    .into_iter()
    .collect()
});

fn rename(props: &mut Props, from: &str, to: &str) {
    if let Some(value) = props.get(from).cloned() {
        props.insert(to.to_string(), value);
    }
}

fn parse_pvlist(databrowser: &Fragment, ctx: &ParseContext<'_>) -> Vec<Trace> {
    let pvs = element::child(databrowser, "pvlist").and_then(|list| element::child(list, "pv"));
    element::to_array(pvs)
        .into_iter()
        .map(|pv| {
            let mut props = parse_child_props(pv, &PLT_PARSERS, ctx);
            rename(&mut props, "name", "yPv");
            rename(&mut props, "linewidth", "lineWidth");
            Trace::from_props(&props)
        })
        .collect()
}

fn parse_axes(databrowser: &Fragment, ctx: &ParseContext<'_>) -> Vec<Axis> {
    let axes = element::child(databrowser, "axes").and_then(|axes| element::child(axes, "axis"));
    element::to_array(axes)
        .into_iter()
        .map(|axis| {
            let mut props = parse_child_props(axis, &PLT_PARSERS, ctx);
            rename(&mut props, "grid", "showGrid");
            rename(&mut props, "right", "onRight");
            rename(&mut props, "labelFont", "titleFont");
            let title = match props.get("useAxisName") {
                Some(PropValue::Bool(true)) => props.get("name").cloned(),
                _ => None,
            };
            props.insert(
                "title".to_string(),
                title.unwrap_or_else(|| PropValue::string("")),
            );
            Axis::from_props(&props, false)
        })
        .collect()
}

/// Parse the text of a `.plt` file.
pub fn parse_plt(
    contents: &str,
    path: &str,
    options: &ParseOptions<'_>,
) -> Result<Plt, FileLoadError> {
    parse_databrowser(contents, path, &options.context(&BOB, path))
}

fn parse_databrowser(
    contents: &str,
    path: &str,
    ctx: &ParseContext<'_>,
) -> Result<Plt, FileLoadError> {
    let tree = element::xml_to_compact(contents, path)?;
    let databrowser = element::child(&tree, "databrowser")
        .ok_or_else(|| FileLoadError::MissingRoot(SmolStr::new_static("databrowser")))?;
    let props = parse_child_props(databrowser, &PLT_PARSERS, ctx);
    Ok(Plt::from_props(
        &props,
        parse_axes(databrowser, ctx),
        parse_pvlist(databrowser, ctx),
    ))
}

/// Load a `.plt` file named relative to the display being parsed.
///
/// Without a file loader the default settings are used.
pub(crate) fn load_plt(path: &str, ctx: &ParseContext<'_>) -> Result<Plt, FileLoadError> {
    let path = normalise_path(&ctx.macro_resolver.resolve_macros(path, ctx.macros), ctx.file_path);
    let Some(loader) = ctx.file_loader else {
        debug!(path = %path, "no file loader, using default plot settings");
        return Ok(Plt::default());
    };
    let contents = loader.load(&path)?;
    parse_databrowser(&contents, &path, ctx)
}
