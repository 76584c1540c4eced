//! `csweb-expr` - sandboxed expression language for display rules.
//!
//! Rule expressions in legacy display files are small JavaScript snippets
//! such as `pv0 > 5 && pvSev0 == 0`. This crate lexes, parses and evaluates
//! them against an explicit [`Scope`] of PV-derived variables, with the
//! coercion and short-circuit behaviour the snippets were written for.
//!
//! ```
//! use csweb_expr::{evaluate, Scope, Value};
//!
//! let scope = Scope::new().with("pv0", 3.0);
//! assert_eq!(evaluate("pv0 > 2 ? 'high' : 'low'", &scope).unwrap(), Value::from("high"));
//! ```

pub mod ast;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod value;

pub use ast::Expr;
pub use error::ExprError;
pub use eval::{eval_expr, evaluate, CompiledExpr, Scope};
pub use parser::parse;
pub use value::Value;
