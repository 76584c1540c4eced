//! Expression syntax tree.

#![allow(missing_docs)]

use smol_str::SmolStr;

use crate::ops::{BinaryOp, LogicalOp, UnaryOp};
use crate::value::Value;

/// Deepest nesting of expression nodes accepted by the parser and evaluator.
pub const MAX_DEPTH: u32 = 256;

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name(SmolStr),
    Member {
        target: Box<Expr>,
        property: SmolStr,
    },
    Call {
        target: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
}

impl Expr {
    /// Names referenced anywhere in the expression, in first-use order.
    #[must_use]
    pub fn free_names(&self) -> Vec<SmolStr> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, names: &mut Vec<SmolStr>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Name(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Expr::Member { target, .. } => target.collect_names(names),
            Expr::Call { target, args } => {
                target.collect_names(names);
                for arg in args {
                    arg.collect_names(names);
                }
            }
            Expr::Unary { expr, .. } => expr.collect_names(names),
            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                left.collect_names(names);
                right.collect_names(names);
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                test.collect_names(names);
                consequent.collect_names(names);
                alternate.collect_names(names);
            }
        }
    }
}
