//! Operator implementations.

#![allow(missing_docs)]

use smol_str::SmolStr;

use crate::value::Value;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
    BitNot,
    TypeOf,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    Ne,
    StrictEq,
    StrictNe,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Short-circuiting operators. These return one of their operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

#[must_use]
pub fn apply_unary(op: UnaryOp, value: &Value) -> Value {
    match op {
        UnaryOp::Neg => Value::Number(-value.to_number()),
        UnaryOp::Pos => Value::Number(value.to_number()),
        UnaryOp::Not => Value::Bool(!value.is_truthy()),
        UnaryOp::BitNot => Value::Number(f64::from(!value.to_int32())),
        UnaryOp::TypeOf => Value::String(SmolStr::new_static(value.type_name())),
    }
}

#[must_use]
pub fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Mod => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Pow => Value::Number(pow(left.to_number(), right.to_number())),
        BinaryOp::Shl => {
            let shift = right.to_uint32() & 0x1f;
            Value::Number(f64::from(left.to_int32().wrapping_shl(shift)))
        }
        BinaryOp::Shr => {
            let shift = right.to_uint32() & 0x1f;
            Value::Number(f64::from(left.to_int32() >> shift))
        }
        BinaryOp::UShr => {
            let shift = right.to_uint32() & 0x1f;
            Value::Number(f64::from(left.to_uint32() >> shift))
        }
        BinaryOp::BitAnd => Value::Number(f64::from(left.to_int32() & right.to_int32())),
        BinaryOp::BitOr => Value::Number(f64::from(left.to_int32() | right.to_int32())),
        BinaryOp::BitXor => Value::Number(f64::from(left.to_int32() ^ right.to_int32())),
        BinaryOp::Eq => Value::Bool(left.loose_eq(right)),
        BinaryOp::Ne => Value::Bool(!left.loose_eq(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_eq(right)),
        BinaryOp::StrictNe => Value::Bool(!left.strict_eq(right)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => compare(op, left, right),
    }
}

fn add(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::String(a), b) => Value::String(SmolStr::new(format!("{a}{b}"))),
        (a, Value::String(b)) => Value::String(SmolStr::new(format!("{a}{b}"))),
        _ => Value::Number(left.to_number() + right.to_number()),
    }
}

fn pow(base: f64, exponent: f64) -> f64 {
    // `powf` treats 1 ** NaN as 1.
    if exponent.is_nan() {
        return f64::NAN;
    }
    base.powf(exponent)
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Value {
    if let (Value::String(a), Value::String(b)) = (left, right) {
        let result = match op {
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Ge => a >= b,
            _ => false,
        };
        return Value::Bool(result);
    }
    let a = left.to_number();
    let b = right.to_number();
    // Any comparison involving NaN is false.
    let result = match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::Ge => a >= b,
        _ => false,
    };
    Value::Bool(result)
}
