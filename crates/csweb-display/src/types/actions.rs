//! Widget actions.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use super::file::OpiFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritePvInfo {
    pub pv_name: SmolStr,
    pub value: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<SmolStr>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenWebpageInfo {
    pub url: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<SmolStr>,
}

/// Target of an open-display action: a file shown at a named location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicInfo {
    pub name: SmolStr,
    pub location: SmolStr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<SmolStr>,
    pub file: OpiFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitInfo {
    pub description: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WidgetAction {
    #[serde(rename_all = "camelCase")]
    WritePv { write_pv_info: WritePvInfo },
    #[serde(rename_all = "camelCase")]
    OpenWebpage { open_webpage_info: OpenWebpageInfo },
    #[serde(rename_all = "camelCase")]
    OpenTab { dynamic_info: DynamicInfo },
    #[serde(rename_all = "camelCase")]
    OpenPage { dynamic_info: DynamicInfo },
    #[serde(rename_all = "camelCase")]
    Exit { exit_info: ExitInfo },
}

impl WidgetAction {
    #[must_use]
    pub fn exit() -> Self {
        WidgetAction::Exit {
            exit_info: ExitInfo {
                description: SmolStr::new_static("Exit"),
            },
        }
    }

    /// The display target of open-tab and open-page actions.
    #[must_use]
    pub fn dynamic_info_mut(&mut self) -> Option<&mut DynamicInfo> {
        match self {
            WidgetAction::OpenTab { dynamic_info } | WidgetAction::OpenPage { dynamic_info } => {
                Some(dynamic_info)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetActions {
    #[serde(default)]
    pub execute_as_one: bool,
    pub actions: Vec<WidgetAction>,
}

impl WidgetActions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
