//! Loading display files and choosing their format.

use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::FileLoadError;
use crate::macros::{MacroMap, MacroResolver, SimpleMacroResolver};
use crate::parser::{parse_bob, parse_json, parse_opi, Dialect, ParseContext};
use crate::registry::{WidgetRegistry, FALLBACK_KIND};
use crate::types::{Color, Position, WidgetDescription};
use crate::types::pv::DEFAULT_PROTOCOL;

/// Fetches files referenced from a display, such as `.plt` settings.
pub trait FileLoader: Sync {
    fn load(&self, path: &str) -> Result<String, FileLoadError>;
}

/// Reads paths from the local file system, optionally below a root directory.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    root: Option<PathBuf>,
}

impl FsLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve paths below `root`; a leading `/` is taken relative to it.
    #[must_use]
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl FileLoader for FsLoader {
    fn load(&self, path: &str) -> Result<String, FileLoadError> {
        let full = match &self.root {
            Some(root) => root.join(path.trim_start_matches('/')),
            None => PathBuf::from(path),
        };
        fs::read_to_string(&full).map_err(|err| FileLoadError::Io {
            path: SmolStr::new(path),
            message: SmolStr::new(err.to_string()),
        })
    }
}

static EMPTY_MACROS: Lazy<MacroMap> = Lazy::new(MacroMap::new);

/// Inputs shared by every file parsed with the same settings.
#[derive(Clone, Copy)]
pub struct ParseOptions<'a> {
    pub registry: &'a WidgetRegistry,
    pub default_protocol: &'a str,
    pub macros: &'a MacroMap,
    pub macro_resolver: &'a dyn MacroResolver,
    pub file_loader: Option<&'a dyn FileLoader>,
}

impl<'a> ParseOptions<'a> {
    /// `ca` PVs, no macros and $(NAME) substitution.
    #[must_use]
    pub fn new(registry: &'a WidgetRegistry) -> Self {
        Self {
            registry,
            default_protocol: DEFAULT_PROTOCOL,
            macros: &EMPTY_MACROS,
            macro_resolver: &SimpleMacroResolver,
            file_loader: None,
        }
    }

    #[must_use]
    pub fn with_protocol(mut self, default_protocol: &'a str) -> Self {
        self.default_protocol = default_protocol;
        self
    }

    #[must_use]
    pub fn with_macros(mut self, macros: &'a MacroMap) -> Self {
        self.macros = macros;
        self
    }

    #[must_use]
    pub fn with_macro_resolver(mut self, resolver: &'a dyn MacroResolver) -> Self {
        self.macro_resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_file_loader(mut self, loader: &'a dyn FileLoader) -> Self {
        self.file_loader = Some(loader);
        self
    }

    pub(crate) fn context(&self, dialect: &'a Dialect, file_path: &'a str) -> ParseContext<'a> {
        ParseContext {
            dialect,
            registry: self.registry,
            default_protocol: self.default_protocol,
            file_path,
            macros: self.macros,
            macro_resolver: self.macro_resolver,
            file_loader: self.file_loader,
        }
    }
}

impl std::fmt::Debug for ParseOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseOptions")
            .field("default_protocol", &self.default_protocol)
            .field("macros", &self.macros)
            .field("has_file_loader", &self.file_loader.is_some())
            .finish_non_exhaustive()
    }
}

/// The description of a file with no contents.
#[must_use]
pub fn empty_widget() -> WidgetDescription {
    let mut widget = WidgetDescription::new(FALLBACK_KIND);
    if let Ok(position) = Position::absolute("0", "0", "0", "0") {
        widget.set("position", position);
    }
    widget
}

/// Placeholder shown in place of a display that failed to load.
#[must_use]
pub fn error_widget(message: &str) -> WidgetDescription {
    WidgetDescription::new("label")
        .with_prop("position", Position::relative("100%", ""))
        .with_prop("text", message)
        .with_prop("foregroundColor", Color::RED)
}

fn extension(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map_or("", |(_, ext)| ext)
}

/// Parse display file `contents` loaded from `path`, choosing the format from
/// the extension.
pub fn parse_display_file(
    path: &str,
    contents: &str,
    options: &ParseOptions<'_>,
) -> Result<WidgetDescription, FileLoadError> {
    if contents.starts_with("<!DOCTYPE html>") {
        return Err(FileLoadError::NotFound(SmolStr::new(path)));
    }
    if contents.is_empty() {
        debug!(path, "empty display file");
        return Ok(empty_widget());
    }
    match extension(path) {
        "bob" => parse_bob(contents, path, options),
        "opi" => parse_opi(contents, path, options),
        "json" => parse_json(contents, path, options),
        other => {
            warn!(path, extension = other, "unsupported display format");
            Err(FileLoadError::UnsupportedFormat(SmolStr::new(other)))
        }
    }
}

/// Load `path` with `loader` and parse it.
pub fn load_display_file(
    path: &str,
    loader: &dyn FileLoader,
    options: &ParseOptions<'_>,
) -> Result<WidgetDescription, FileLoadError> {
    let contents = loader.load(path)?;
    parse_display_file(path, &contents, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_ignore_queries_and_directories() {
        assert_eq!(extension("/opi/main.bob"), "bob");
        assert_eq!(extension("http://host/a.b/screen.opi?v=2"), "opi");
        assert_eq!(extension("/dir.d/README"), "");
    }

    #[test]
    fn fs_loader_reports_missing_files() {
        let loader = FsLoader::with_root(std::env::temp_dir());
        let error = loader.load("/csweb-display-missing-file.bob").unwrap_err();
        assert!(matches!(error, FileLoadError::Io { .. }));
    }
}
