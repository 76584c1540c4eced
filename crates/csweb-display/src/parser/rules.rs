//! `<rules>` and `<scripts>` of the XML dialects.
//!
//! OPI files list PVs as `<pv trig="true">`; BOB files use `<pv_name>` and
//! every PV triggers.

use smol_str::SmolStr;

use super::values::parse_pv_name;
use super::ParseContext;
use crate::element::{self, Fragment};
use crate::error::StructuralError;
use crate::types::{Expression, Rule, RulePv, Script};

fn parse_pvs(
    parent: &Fragment,
    ctx: &ParseContext<'_>,
    is_opi: bool,
) -> Result<Vec<RulePv>, StructuralError> {
    let field = if is_opi { "pv" } else { "pv_name" };
    element::to_array(element::child(parent, field))
        .into_iter()
        .map(|pv| -> Result<RulePv, StructuralError> {
            Ok(RulePv {
                pv_name: parse_pv_name(pv, ctx.default_protocol)?,
                trigger: !is_opi || element::attribute(pv, "trig") == Some("true"),
            })
        })
        .collect()
}

fn parse_rule(
    rule: &Fragment,
    ctx: &ParseContext<'_>,
    is_opi: bool,
) -> Result<Rule, StructuralError> {
    let attribute = |name: &str| SmolStr::new(element::attribute(rule, name).unwrap_or_default());
    let expressions = element::to_array(element::child(rule, "exp"))
        .into_iter()
        .map(|exp| {
            Expression::new(
                element::attribute(exp, "bool_exp").unwrap_or_default(),
                element::child(exp, "value").cloned().unwrap_or_default(),
            )
        })
        .collect();
    Ok(Rule {
        name: attribute("name"),
        prop: attribute("prop_id"),
        out_exp: element::attribute(rule, "out_exp") == Some("true"),
        pvs: parse_pvs(rule, ctx, is_opi)?,
        expressions,
    })
}

/// Rules of a widget element, in declaration order. No `<rules>` is an
/// empty list.
pub(crate) fn parse_rules(
    element: &Fragment,
    ctx: &ParseContext<'_>,
    is_opi: bool,
) -> Result<Vec<Rule>, StructuralError> {
    let Some(rules) = element::child(element, "rules") else {
        return Ok(Vec::new());
    };
    element::to_array(element::child(rules, "rule"))
        .into_iter()
        .map(|rule| parse_rule(rule, ctx, is_opi))
        .collect()
}

/// Scripts of a widget element. Inline text comes from CDATA when present.
pub(crate) fn parse_scripts(
    element: &Fragment,
    ctx: &ParseContext<'_>,
    is_opi: bool,
) -> Result<Vec<Script>, StructuralError> {
    let mut scripts = Vec::new();
    for group in element::to_array(element::child(element, "scripts")) {
        for script in element::to_array(element::child(group, "script")) {
            let file = element::attribute(script, "file")
                .or_else(|| element::attribute(script, "path"))
                .map(SmolStr::new);
            let text = element::child(script, "text")
                .and_then(|text| {
                    text.get(element::CDATA)
                        .and_then(Fragment::as_str)
                        .or_else(|| element::text(text))
                })
                .unwrap_or_default();
            scripts.push(Script {
                file,
                text: SmolStr::new(text),
                pvs: parse_pvs(script, ctx, is_opi)?,
            });
        }
    }
    Ok(scripts)
}
