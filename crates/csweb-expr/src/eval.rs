//! Expression evaluation over an explicit scope.
//!
//! Evaluation only sees the names placed in the [`Scope`] plus a fixed set of
//! builtins (`Math`, `Number`, `String`, ...). Nothing else is reachable.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::ast::{Expr, MAX_DEPTH};
use crate::error::ExprError;
use crate::ops::{apply_binary, apply_unary, LogicalOp};
use crate::parser::parse;
use crate::value::Value;

/// Variables visible to an expression.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    vars: FxHashMap<SmolStr, Value>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<SmolStr>, value: impl Into<Value>) {
        self.vars.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// A parsed expression that can be evaluated against many scopes.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    source: SmolStr,
    expr: Expr,
}

impl CompiledExpr {
    pub fn compile(source: &str) -> Result<Self, ExprError> {
        Ok(Self {
            source: SmolStr::new(source),
            expr: parse(source)?,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn eval(&self, scope: &Scope) -> Result<Value, ExprError> {
        eval_expr(scope, &self.expr)
    }
}

/// Parse and evaluate `source` in one step.
pub fn evaluate(source: &str, scope: &Scope) -> Result<Value, ExprError> {
    let expr = parse(source)?;
    eval_expr(scope, &expr)
}

/// Evaluate an expression to a value.
///
/// Trees nested deeper than [`MAX_DEPTH`] fail with [`ExprError::TooDeep`].
pub fn eval_expr(scope: &Scope, expr: &Expr) -> Result<Value, ExprError> {
    eval_at(scope, expr, 0)
}

fn eval_at(scope: &Scope, expr: &Expr, depth: u32) -> Result<Value, ExprError> {
    if depth > MAX_DEPTH {
        return Err(ExprError::TooDeep(MAX_DEPTH));
    }
    let depth = depth + 1;
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Name(name) => read_name(scope, name),
        Expr::Member { target, property } => read_member(scope, target, property, depth),
        Expr::Call { target, args } => {
            let args = args
                .iter()
                .map(|arg| eval_at(scope, arg, depth))
                .collect::<Result<Vec<_>, _>>()?;
            call(scope, target, &args)
        }
        Expr::Unary { op, expr } => {
            let value = eval_at(scope, expr, depth)?;
            Ok(apply_unary(*op, &value))
        }
        Expr::Binary { op, left, right } => {
            let left = eval_at(scope, left, depth)?;
            let right = eval_at(scope, right, depth)?;
            Ok(apply_binary(*op, &left, &right))
        }
        Expr::Logical { op, left, right } => {
            let left = eval_at(scope, left, depth)?;
            let short_circuit = match op {
                LogicalOp::And => !left.is_truthy(),
                LogicalOp::Or => left.is_truthy(),
                LogicalOp::Nullish => !left.is_nullish(),
            };
            if short_circuit {
                Ok(left)
            } else {
                eval_at(scope, right, depth)
            }
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if eval_at(scope, test, depth)?.is_truthy() {
                eval_at(scope, consequent, depth)
            } else {
                eval_at(scope, alternate, depth)
            }
        }
    }
}

fn read_name(scope: &Scope, name: &SmolStr) -> Result<Value, ExprError> {
    if let Some(value) = scope.get(name) {
        return Ok(value.clone());
    }
    match name.as_str() {
        "NaN" => Ok(Value::Number(f64::NAN)),
        "Infinity" => Ok(Value::Number(f64::INFINITY)),
        _ => Err(ExprError::UndefinedVariable(name.clone())),
    }
}

fn read_member(
    scope: &Scope,
    target: &Expr,
    property: &SmolStr,
    depth: u32,
) -> Result<Value, ExprError> {
    if is_math(scope, target) {
        return Ok(math_constant(property).map_or(Value::Undefined, Value::Number));
    }
    let value = eval_at(scope, target, depth)?;
    match (&value, property.as_str()) {
        (Value::Undefined | Value::Null, _) => Err(ExprError::NullProperty {
            property: property.clone(),
            target: SmolStr::new(value.to_string()),
        }),
        #[allow(clippy::cast_precision_loss)]
        (Value::String(text), "length") => Ok(Value::Number(text.encode_utf16().count() as f64)),
        _ => Ok(Value::Undefined),
    }
}

fn is_math(scope: &Scope, expr: &Expr) -> bool {
    matches!(expr, Expr::Name(name) if name == "Math" && scope.get("Math").is_none())
}

fn math_constant(name: &str) -> Option<f64> {
    let value = match name {
        "PI" => std::f64::consts::PI,
        "E" => std::f64::consts::E,
        "LN2" => std::f64::consts::LN_2,
        "LN10" => std::f64::consts::LN_10,
        "LOG2E" => std::f64::consts::LOG2_E,
        "LOG10E" => std::f64::consts::LOG10_E,
        "SQRT2" => std::f64::consts::SQRT_2,
        "SQRT1_2" => std::f64::consts::FRAC_1_SQRT_2,
        _ => return None,
    };
    Some(value)
}

fn call(scope: &Scope, target: &Expr, args: &[Value]) -> Result<Value, ExprError> {
    match target {
        Expr::Member {
            target: object,
            property,
        } if is_math(scope, object) => call_math(property, args),
        Expr::Name(name) if scope.get(name).is_none() => call_global(name, args),
        Expr::Name(name) => Err(ExprError::NotCallable(name.clone())),
        Expr::Member { property, .. } => Err(ExprError::NotCallable(property.clone())),
        _ => Err(ExprError::NotCallable(SmolStr::new_static("expression"))),
    }
}

fn number_arg(args: &[Value], index: usize) -> f64 {
    args.get(index).map_or(f64::NAN, Value::to_number)
}

fn call_math(name: &SmolStr, args: &[Value]) -> Result<Value, ExprError> {
    let x = number_arg(args, 0);
    let value = match name.as_str() {
        "abs" => x.abs(),
        "round" => js_round(x),
        "floor" => x.floor(),
        "ceil" => x.ceil(),
        "trunc" => x.trunc(),
        "sign" => {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "sqrt" => x.sqrt(),
        "cbrt" => x.cbrt(),
        "exp" => x.exp(),
        "log" => x.ln(),
        "log10" => x.log10(),
        "log2" => x.log2(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "asin" => x.asin(),
        "acos" => x.acos(),
        "atan" => x.atan(),
        "atan2" => x.atan2(number_arg(args, 1)),
        "pow" => apply_binary(
            crate::ops::BinaryOp::Pow,
            &Value::Number(x),
            &Value::Number(number_arg(args, 1)),
        )
        .to_number(),
        "hypot" => args
            .iter()
            .map(Value::to_number)
            .fold(0.0_f64, f64::hypot),
        "max" => fold_extreme(args, f64::NEG_INFINITY, |a, b| b > a),
        "min" => fold_extreme(args, f64::INFINITY, |a, b| b < a),
        _ => {
            return Err(ExprError::UndefinedFunction(SmolStr::new(format!(
                "Math.{name}"
            ))))
        }
    };
    Ok(Value::Number(value))
}

/// Rounds half-way values towards positive infinity.
fn js_round(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    (x + 0.5).floor()
}

fn fold_extreme(args: &[Value], start: f64, better: fn(f64, f64) -> bool) -> f64 {
    let mut result = start;
    for arg in args {
        let value = arg.to_number();
        if value.is_nan() {
            return f64::NAN;
        }
        if better(result, value) {
            result = value;
        }
    }
    result
}

fn call_global(name: &SmolStr, args: &[Value]) -> Result<Value, ExprError> {
    let first = args.first().cloned().unwrap_or_default();
    let value = match name.as_str() {
        "Number" => Value::Number(if args.is_empty() { 0.0 } else { first.to_number() }),
        "String" => {
            if args.is_empty() {
                Value::string("")
            } else {
                Value::String(SmolStr::new(first.to_string()))
            }
        }
        "Boolean" => Value::Bool(first.is_truthy()),
        "isNaN" => Value::Bool(first.to_number().is_nan()),
        "isFinite" => Value::Bool(first.to_number().is_finite()),
        "parseFloat" => Value::Number(parse_float(&first.to_string())),
        "parseInt" => {
            let radix = args.get(1).map(Value::to_int32).unwrap_or(0);
            Value::Number(parse_int(&first.to_string(), radix))
        }
        _ => return Err(ExprError::UndefinedFunction(name.clone())),
    };
    Ok(value)
}

/// Longest numeric prefix of `text`, or `NaN`.
fn parse_float(text: &str) -> f64 {
    let trimmed = text.trim_start();
    let (sign, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    if body.starts_with("Infinity") {
        return sign * f64::INFINITY;
    }
    let bytes = body.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        seen_digit = true;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return f64::NAN;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    body[..end]
        .parse::<f64>()
        .map_or(f64::NAN, |value| sign * value)
}

/// Integer prefix of `text` in `radix` (0 means auto-detect), or `NaN`.
#[allow(clippy::cast_sign_loss)]
fn parse_int(text: &str, radix: i32) -> f64 {
    let trimmed = text.trim_start();
    let (sign, mut body) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let mut radix = radix as u32;
    if radix == 0 || radix == 16 {
        if let Some(rest) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
            body = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }
    let mut result = 0.0_f64;
    let mut any = false;
    for ch in body.chars() {
        let Some(digit) = ch.to_digit(radix) else {
            break;
        };
        result = result * f64::from(radix) + f64::from(digit);
        any = true;
    }
    if any {
        sign * result
    } else {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{format_number, string_to_number};

    #[test]
    fn parse_float_takes_numeric_prefix() {
        assert_eq!(parse_float("3.5px"), 3.5);
        assert_eq!(parse_float("  -2e3x"), -2000.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert!(parse_float("px").is_nan());
    }

    #[test]
    fn parse_int_detects_hex() {
        assert_eq!(parse_int("0x1f", 0), 31.0);
        assert_eq!(parse_int("12.9", 10), 12.0);
        assert_eq!(parse_int("-101", 2), -5.0);
        assert!(parse_int("z", 10).is_nan());
    }

    fn negations(depth: usize) -> Expr {
        (0..depth).fold(Expr::Literal(Value::Number(1.0)), |expr, _| Expr::Unary {
            op: crate::ops::UnaryOp::Neg,
            expr: Box::new(expr),
        })
    }

    #[test]
    fn deep_trees_are_rejected() {
        let scope = Scope::new();
        assert_eq!(eval_expr(&scope, &negations(10)), Ok(Value::Number(1.0)));
        assert_eq!(
            eval_expr(&scope, &negations(MAX_DEPTH as usize + 1)),
            Err(ExprError::TooDeep(MAX_DEPTH))
        );
    }

    #[test]
    fn number_string_round_trip_in_scope() {
        let scope = Scope::new().with("pv0", 2.5);
        assert_eq!(
            evaluate("String(pv0) + '!'", &scope).unwrap(),
            Value::from(format!("{}!", format_number(2.5)))
        );
        assert_eq!(string_to_number("2.5"), 2.5);
    }
}
