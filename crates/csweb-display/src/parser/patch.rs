//! Post-processing run on every widget parsed from an XML dialect.
//!
//! Order is significant: paths are resolved after rule values are
//! converted, and the exit action is added last.

use serde_json::{Map, Value};
use smol_str::SmolStr;
use tracing::{debug, warn};

use super::{ParseContext, PatchFn};
use crate::registry::PropSchema;
use crate::types::{PropValue, Rule, WidgetAction, WidgetActions, WidgetDescription};
use crate::util::{build_url, is_fully_qualified_url, parent_dir, parse_array_string};

pub(crate) const XML_PATCHES: &[PatchFn] = &[patch_rules, patch_paths, patch_actions];

/// Properties holding a path or list of paths relative to the display.
const PATH_PROPS: &[&str] = &["file", "imageFile", "image", "symbols"];

/// Convert each rule's expression values with the parser of its target.
///
/// Rule targets are raw property names. A simple parser reading that name
/// wins, and the target is renamed to the canonical property. Otherwise a
/// complex parser of the same name is tried on a one-field element.
pub(crate) fn patch_rules(
    mut widget: WidgetDescription,
    ctx: &ParseContext<'_>,
    schema: &PropSchema,
) -> WidgetDescription {
    if let Some(PropValue::Rules(rules)) = widget.props.get_mut("rules") {
        for rule in rules.iter_mut() {
            convert_rule(rule, ctx, schema);
        }
    }
    widget
}

/// Output-expression rules are renamed but keep their values as source text.
fn convert_rule(rule: &mut Rule, ctx: &ParseContext<'_>, schema: &PropSchema) {
    let indexed = parse_array_string(Some(&rule.prop));
    let base = indexed.as_ref().map_or(rule.prop.as_str(), |(name, _)| name.as_str());

    if let Some((canonical, parser)) = ctx.dialect.simple_by_raw_name(base, schema) {
        if !rule.out_exp {
            for expression in &mut rule.expressions {
                match (parser.parse)(&expression.value, ctx) {
                    Ok(value) => expression.converted_value = Some(value),
                    Err(error) => {
                        warn!(rule = %rule.name, prop = canonical, %error, "could not convert rule value");
                    }
                }
            }
        }
        rule.prop = match &indexed {
            Some((_, index)) => SmolStr::new(format!("{canonical}[{index}]")),
            None => SmolStr::new_static(canonical),
        };
    } else if rule.out_exp {
        debug!(rule = %rule.name, prop = base, "output expression kept as written");
    } else if let Some(parse) = ctx.dialect.complex.get(base) {
        for expression in &mut rule.expressions {
            let mut fields = Map::new();
            fields.insert(base.to_string(), expression.value.clone());
            match parse(&Value::Object(fields), ctx) {
                Ok(value) => expression.converted_value = value,
                Err(error) => {
                    warn!(rule = %rule.name, prop = base, %error, "could not convert rule value");
                }
            }
        }
    } else {
        debug!(rule = %rule.name, prop = base, "no parser for rule target");
    }
}

/// Resolve `path` against the directory of `file_path`.
///
/// URLs and absolute paths are returned unchanged, as is everything when the
/// display has no directory. Each leading `../` drops one directory.
#[must_use]
pub fn normalise_path(path: &str, file_path: &str) -> String {
    if is_fully_qualified_url(path) || path.starts_with('/') {
        return path.to_string();
    }
    let mut prefix = parent_dir(file_path);
    if prefix.is_empty() {
        return path.to_string();
    }
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix("../") {
        rest = stripped;
        prefix = parent_dir(prefix);
    }
    build_url(prefix, rest)
}

fn resolve(path: &str, ctx: &ParseContext<'_>) -> SmolStr {
    let substituted = ctx.macro_resolver.resolve_macros(path, ctx.macros);
    let resolved = normalise_path(&substituted, ctx.file_path);
    if resolved != path {
        debug!(from = path, to = %resolved, "corrected path");
    }
    SmolStr::new(resolved)
}

fn resolve_value(value: &mut PropValue, ctx: &ParseContext<'_>) {
    match value {
        PropValue::File(file) => file.path = resolve(&file.path, ctx),
        PropValue::String(path) if !path.is_empty() => *path = resolve(path, ctx),
        PropValue::StringList(paths) => {
            for path in paths.iter_mut().filter(|path| !path.is_empty()) {
                *path = resolve(path, ctx);
            }
        }
        _ => {}
    }
}

/// Resolve relative file, image and symbol paths, including those inside
/// actions and converted rule values.
pub(crate) fn patch_paths(
    mut widget: WidgetDescription,
    ctx: &ParseContext<'_>,
    _: &PropSchema,
) -> WidgetDescription {
    for name in PATH_PROPS {
        if let Some(value) = widget.props.get_mut(*name) {
            resolve_value(value, ctx);
        }
    }
    if let Some(PropValue::Actions(actions)) = widget.props.get_mut("actions") {
        for info in actions.actions.iter_mut().filter_map(WidgetAction::dynamic_info_mut) {
            info.file.path = resolve(&info.file.path, ctx);
        }
    }
    if let Some(PropValue::Rules(rules)) = widget.props.get_mut("rules") {
        for rule in rules.iter_mut() {
            let base = parse_array_string(Some(&rule.prop))
                .map_or_else(|| rule.prop.to_string(), |(name, _)| name);
            if !PATH_PROPS.contains(&base.as_str()) {
                continue;
            }
            for value in rule
                .expressions
                .iter_mut()
                .filter_map(|expression| expression.converted_value.as_mut())
            {
                resolve_value(value, ctx);
            }
        }
    }
    widget
}

/// Buttons labelled "Exit" with no actions exit the application.
pub(crate) fn patch_actions(
    mut widget: WidgetDescription,
    _: &ParseContext<'_>,
    _: &PropSchema,
) -> WidgetDescription {
    let is_exit = widget.widget_type == "actionbutton"
        && widget.text().is_some_and(|text| text.eq_ignore_ascii_case("exit"));
    if is_exit && widget.actions().map_or(true, WidgetActions::is_empty) {
        widget.set(
            "actions",
            PropValue::Actions(WidgetActions {
                execute_as_one: false,
                actions: vec![WidgetAction::exit()],
            }),
        );
    }
    widget
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_follow_the_display() {
        assert_eq!(normalise_path("a.bob", "/opi/main/screen.bob"), "/opi/main/a.bob");
        assert_eq!(normalise_path("../a.bob", "/opi/main/screen.bob"), "/opi/a.bob");
        assert_eq!(normalise_path("../../a.bob", "/opi/main/screen.bob"), "/a.bob");
        assert_eq!(
            normalise_path("./img/x.png", "http://host/dir/screen.opi"),
            "http://host/dir/img/x.png"
        );
    }

    #[test]
    fn absolute_paths_are_kept() {
        assert_eq!(normalise_path("https://host/a.bob", "/opi/screen.bob"), "https://host/a.bob");
        assert_eq!(normalise_path("/data/a.bob", "/opi/screen.bob"), "/data/a.bob");
        assert_eq!(normalise_path("a.bob", "screen.bob"), "a.bob");
    }
}
