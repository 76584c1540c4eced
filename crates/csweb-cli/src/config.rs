//! Settings loaded from `csweb.toml`.

use csweb_display::MacroMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

pub(crate) const CONFIG_FILE: &str = "csweb.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parser: ParserSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParserSection {
    /// Protocol for PV names written without one.
    pub default_protocol: String,
    /// Macros available to every parsed display.
    pub macros: MacroMap,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            default_protocol: "ca".to_string(),
            macros: MacroMap::new(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Outcome of reading the configuration. Warnings are returned instead of
/// logged since the subscriber is installed from the loaded level.
#[derive(Debug)]
pub struct Loaded {
    pub config: Config,
    pub path: Option<PathBuf>,
    pub warning: Option<String>,
}

impl Config {
    /// Load `explicit`, or `csweb.toml` in the working directory if it exists.
    pub fn load(explicit: Option<&Path>) -> Loaded {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(CONFIG_FILE);
                if !path.is_file() {
                    return Loaded {
                        config: Config::default(),
                        path: None,
                        warning: None,
                    };
                }
                path
            }
        };
        let (config, warning) = match std::fs::read_to_string(&path) {
            Ok(contents) => match Config::from_contents(&contents) {
                Ok(config) => (config, None),
                Err(err) => (
                    Config::default(),
                    Some(format!("Failed to parse csweb config at {}: {err}", path.display())),
                ),
            },
            Err(err) => (
                Config::default(),
                Some(format!("Failed to read csweb config at {}: {err}", path.display())),
            ),
        };
        Loaded {
            config,
            path: Some(path),
            warning,
        }
    }

    pub fn from_contents(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

impl Loaded {
    /// Log the deferred warning, if any.
    pub fn report(&self) {
        if let Some(warning) = &self.warning {
            warn!("{warning}; using defaults");
        }
    }
}
