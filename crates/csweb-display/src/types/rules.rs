//! Rules and scripts bound to PVs.

use serde::Serialize;
use smol_str::SmolStr;

use super::props::PropValue;
use super::pv::Pv;
use crate::element::Fragment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePv {
    pub pv_name: Pv,
    pub trigger: bool,
}

/// One condition of a rule and the value it applies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
    pub bool_exp: SmolStr,
    /// Raw value fragment as written in the file.
    pub value: Fragment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_value: Option<PropValue>,
}

impl Expression {
    #[must_use]
    pub fn new(bool_exp: impl Into<SmolStr>, value: Fragment) -> Self {
        Self {
            bool_exp: bool_exp.into(),
            value,
            converted_value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub name: SmolStr,
    /// Target property. May be in `name[index]` form.
    pub prop: SmolStr,
    pub out_exp: bool,
    pub pvs: Vec<RulePv>,
    pub expressions: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Script {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<SmolStr>,
    pub text: SmolStr,
    pub pvs: Vec<RulePv>,
}
