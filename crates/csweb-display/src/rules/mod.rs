//! Rule evaluation.
//!
//! Rules rewrite a widget's props from the current state of their PVs. Each
//! rule sees its own PVs as `pv{i}`, `pvStr{i}`, `pvInt{i}` and `pvSev{i}`;
//! the first expression that evaluates truthy is applied and the rest of the
//! rule is skipped.

pub mod pv;

use csweb_expr::{evaluate, Scope, Value};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

pub use pv::{
    AlarmQuality, PvSource, PvState, PvValue, StaticPvSource, Subscription, SubscriptionType,
};

use crate::element;
use crate::error::{ParseError, RuleError};
use crate::parser::values::parse_color;
use crate::types::{Border, BorderStyle, Color, Expression, PropValue, Props, Rule};
use crate::util::parse_array_string;

/// Apply the rules in `props` to a copy of `props`.
///
/// All PVs of all rules are subscribed to under `widget_id` and read from
/// one snapshot. A failing rule is logged and has no effect. If any PV is
/// disconnected the border is replaced by [`Border::disconnected`].
#[must_use]
pub fn evaluate_rules(widget_id: &str, props: &Props, source: &dyn PvSource) -> Props {
    let mut new_props = props.clone();
    let rules = match props.get("rules") {
        Some(PropValue::Rules(rules)) if !rules.is_empty() => rules,
        _ => return new_props,
    };

    let pv_names: Vec<String> = rules
        .iter()
        .flat_map(|rule| rule.pvs.iter().map(|pv| pv.pv_name.qualified_name()))
        .collect();
    let types = vec![SubscriptionType::BOTH; pv_names.len()];
    source.subscribe(widget_id, &pv_names, &types);
    let snapshot = source.snapshot(&pv_names);

    let mut disconnected = false;
    for rule in rules {
        let scope = rule_scope(rule, &snapshot, &mut disconnected);
        if let Err(error) = apply_rule(rule, &scope, &mut new_props) {
            warn!(rule = %rule.name, %error, "failed to evaluate rule");
        }
    }
    if disconnected {
        new_props.insert("border".to_string(), PropValue::Border(Border::disconnected()));
    }
    new_props
}

fn rule_scope(
    rule: &Rule,
    snapshot: &FxHashMap<String, PvState>,
    disconnected: &mut bool,
) -> Scope {
    let mut scope = Scope::new();
    for (index, pv) in rule.pvs.iter().enumerate() {
        let name = pv.pv_name.qualified_name();
        let state = snapshot.get(&name);
        if !state.is_some_and(|state| state.connected) {
            debug!(rule = %rule.name, pv = %name, "pv not connected");
            *disconnected = true;
        }
        let (mut value, mut string, mut int, mut severity) =
            (Value::Undefined, Value::Undefined, Value::Undefined, Value::Undefined);
        if let Some(pv_value) = state.and_then(|state| state.value.as_ref()) {
            let text = pv_value.coerce_string();
            if let Some(text) = &text {
                string = Value::String(text.clone());
            }
            if let Some(double) = pv_value.double {
                int = Value::Number((double + 0.5).floor());
                value = Value::Number(double);
            } else {
                value = string.clone();
            }
            severity = Value::Number(f64::from(pv_value.alarm.severity()));
        }
        scope.insert(format!("pv{index}"), value);
        scope.insert(format!("pvStr{index}"), string);
        scope.insert(format!("pvInt{index}"), int);
        scope.insert(format!("pvSev{index}"), severity);
    }
    scope
}

fn eval(source: &str, scope: &Scope) -> Result<Value, RuleError> {
    evaluate(source, scope).map_err(|error| RuleError::Expression {
        source_text: SmolStr::new(source),
        error,
    })
}

fn apply_rule(rule: &Rule, scope: &Scope, props: &mut Props) -> Result<(), RuleError> {
    for expression in &rule.expressions {
        if !eval(&expression.bool_exp, scope)?.is_truthy() {
            continue;
        }
        debug!(rule = %rule.name, expression = %expression.bool_exp, "expression matched");
        if rule.out_exp {
            let source = output_source(expression).ok_or_else(|| RuleError::Value {
                prop: rule.prop.clone(),
                error: ParseError::MissingText(element::describe(&expression.value)),
            })?;
            let result = eval(source, scope)?;
            props.insert(rule.prop.to_string(), result.into());
        } else {
            set_value(&rule.prop, expression, props)?;
        }
        break;
    }
    Ok(())
}

/// Output expressions are the converted value when it is text, else the
/// raw value's text.
fn output_source(expression: &Expression) -> Option<&str> {
    expression
        .converted_value
        .as_ref()
        .and_then(PropValue::as_str)
        .or_else(|| element::text(&expression.value))
        .or_else(|| expression.value.as_str())
}

fn raw_text<'a>(prop: &str, expression: &'a Expression) -> Result<&'a str, RuleError> {
    element::require_text(&expression.value).map_err(|error| RuleError::Value {
        prop: SmolStr::new(prop),
        error,
    })
}

fn set_value(prop: &str, expression: &Expression, props: &mut Props) -> Result<(), RuleError> {
    match prop {
        "border_width" => {
            let width = csweb_expr::value::string_to_number(raw_text(prop, expression)?);
            match props.get_mut("border") {
                Some(PropValue::Border(border)) => border.width = width,
                _ => set(props, "border", Border::new(BorderStyle::None, Color::BLACK, width)),
            }
        }
        "border_color" => {
            let color = parse_color(&expression.value).map_err(|error| RuleError::Value {
                prop: SmolStr::new(prop),
                error,
            })?;
            match props.get_mut("border") {
                Some(PropValue::Border(border)) => border.color = color,
                _ => set(props, "border", Border::new(BorderStyle::None, color, 0.0)),
            }
        }
        "x" | "y" => {
            let pixels = SmolStr::new(format!("{}px", raw_text(prop, expression)?));
            let Some(PropValue::Position(position)) = props.get_mut("position") else {
                return Err(RuleError::MissingTarget(SmolStr::new(prop)));
            };
            if prop == "x" {
                position.x = pixels;
            } else {
                position.y = pixels;
            }
        }
        "file" => {
            let path = match &expression.converted_value {
                Some(PropValue::File(file)) => file.path.clone(),
                Some(PropValue::String(path)) => path.clone(),
                _ => return Err(RuleError::MissingTarget(SmolStr::new(prop))),
            };
            let Some(PropValue::File(file)) = props.get_mut("file") else {
                return Err(RuleError::MissingTarget(SmolStr::new(prop)));
            };
            file.path = path;
        }
        _ => match parse_array_string(Some(prop)) {
            Some((name, index)) => {
                set_element(props, &name, index, expression.converted_value.as_ref())
            }
            None => match &expression.converted_value {
                Some(value) => {
                    props.insert(prop.to_string(), value.clone());
                }
                None => {
                    debug!(prop, "rule value was not converted, clearing prop");
                    props.shift_remove(prop);
                }
            },
        },
    }
    Ok(())
}

fn set(props: &mut Props, name: &str, value: impl Into<PropValue>) {
    props.insert(name.to_string(), value.into());
}

/// Overwrite one slot of an existing list prop. Out-of-range indices and
/// props that are not lists are left alone.
fn set_element(props: &mut Props, name: &str, index: usize, value: Option<&PropValue>) {
    match (props.get_mut(name), value) {
        (Some(PropValue::StringList(items)), Some(value)) if index < items.len() => {
            if let Some(text) = value.as_str() {
                items[index] = SmolStr::new(text);
            }
        }
        (Some(PropValue::Raw(serde_json::Value::Array(items))), Some(value))
            if index < items.len() =>
        {
            if let Ok(value) = serde_json::to_value(value) {
                items[index] = value;
            }
        }
        _ => debug!(prop = name, index, "no list slot for rule value"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::{Pv, RulePv};

    fn rule(prop: &str, expressions: Vec<Expression>) -> Rule {
        Rule {
            name: SmolStr::new("test"),
            prop: SmolStr::new(prop),
            out_exp: false,
            pvs: vec![RulePv {
                pv_name: Pv::new("A", "ca"),
                trigger: true,
            }],
            expressions,
        }
    }

    fn converted(bool_exp: &str, value: impl Into<PropValue>) -> Expression {
        let mut expression = Expression::new(bool_exp, json!(null));
        expression.converted_value = Some(value.into());
        expression
    }

    fn connected(value: f64) -> StaticPvSource {
        StaticPvSource::new().with("ca://A", PvState::connected(PvValue::number(value)))
    }

    #[test]
    fn integer_and_severity_variables() {
        let source = StaticPvSource::new().with(
            "ca://A",
            PvState::connected(PvValue::number(2.5).with_alarm(AlarmQuality::Alarm)),
        );
        let snapshot = source.snapshot(&["ca://A".to_string()]);
        let mut disconnected = false;
        let scope = rule_scope(&rule("text", Vec::new()), &snapshot, &mut disconnected);
        assert!(!disconnected);
        assert_eq!(scope.get("pvInt0"), Some(&Value::Number(3.0)));
        assert_eq!(scope.get("pvSev0"), Some(&Value::Number(1.0)));
        assert_eq!(scope.get("pvStr0"), Some(&Value::from("2.5")));
    }

    #[test]
    fn list_slots_are_overwritten_in_place() {
        let mut props = Props::new();
        props.insert(
            "symbols".into(),
            PropValue::StringList(vec!["a.png".into(), "b.png".into()]),
        );
        set_element(&mut props, "symbols", 1, Some(&PropValue::string("c.png")));
        set_element(&mut props, "symbols", 5, Some(&PropValue::string("d.png")));
        assert_eq!(
            props["symbols"],
            PropValue::StringList(vec!["a.png".into(), "c.png".into()])
        );
    }

    #[test]
    fn output_expressions_compute_values() {
        let mut output = rule(
            "text",
            vec![Expression::new("true", json!({"_text": "'v=' + pv0 * 2"}))],
        );
        output.out_exp = true;
        let mut props = Props::new();
        props.insert("rules".into(), PropValue::Rules(vec![output]));
        let props = evaluate_rules("w1", &props, &connected(4.0));
        assert_eq!(props["text"], PropValue::string("v=8"));
    }

    #[test]
    fn failing_rules_are_skipped() {
        let broken = rule("text", vec![converted("pv0 >", "never")]);
        let working = rule("visible", vec![converted("pv0 > 1", false)]);
        let mut props = Props::new();
        props.insert("rules".into(), PropValue::Rules(vec![broken, working]));
        let props = evaluate_rules("w1", &props, &connected(4.0));
        assert!(!props.contains_key("text"));
        assert_eq!(props["visible"], PropValue::Bool(false));
    }
}
