use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::pv::DEFAULT_PROTOCOL;
use crate::macros::MacroMap;

/// Reference to another display file, with the macros it is opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpiFile {
    pub path: SmolStr,
    #[serde(default)]
    pub macros: MacroMap,
    #[serde(default = "default_protocol")]
    pub default_protocol: SmolStr,
}

fn default_protocol() -> SmolStr {
    SmolStr::new_static(DEFAULT_PROTOCOL)
}

impl OpiFile {
    #[must_use]
    pub fn new(path: impl Into<SmolStr>, macros: MacroMap) -> Self {
        Self {
            path: path.into(),
            macros,
            default_protocol: default_protocol(),
        }
    }
}
