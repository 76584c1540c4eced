//! `csweb` - parse display files and evaluate their rules from the command line.

mod cli;
mod config;

use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;
use csweb_display::{
    evaluate_rules, parse_display_file, FsLoader, MacroMap, ParseOptions, StaticPvSource,
    WidgetDescription, WidgetRegistry,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = Config::load(cli.config.as_deref());
    init_logging(&loaded.config.log.level);
    loaded.report();
    if let Some(path) = &loaded.path {
        debug!(path = %path.display(), "loaded config");
    }
    let config = loaded.config;

    match cli.command {
        Command::Parse {
            file,
            protocol,
            macros,
            pretty,
        } => {
            let protocol = protocol.unwrap_or_else(|| config.parser.default_protocol.clone());
            let mut all_macros = config.parser.macros.clone();
            all_macros.extend(macros);
            let display = parse_file(&file, &protocol, &all_macros)?;
            let output = if pretty {
                serde_json::to_string_pretty(&display)?
            } else {
                serde_json::to_string(&display)?
            };
            println!("{output}");
        }
        Command::Rules {
            file,
            snapshot,
            widget_id,
        } => {
            let display = parse_file(
                &file,
                &config.parser.default_protocol,
                &config.parser.macros,
            )?;
            let contents = std::fs::read_to_string(&snapshot)
                .with_context(|| format!("failed to read snapshot {}", snapshot.display()))?;
            let source: StaticPvSource = serde_json::from_str(&contents)
                .with_context(|| format!("invalid snapshot {}", snapshot.display()))?;
            let results = evaluate_display(&display, &source, widget_id.as_deref());
            if let Some(id) = widget_id {
                if results.is_empty() {
                    bail!("no widget with id '{id}' has rules");
                }
            }
            info!(widgets = results.len(), "evaluated rules");
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_file(path: &Path, protocol: &str, macros: &MacroMap) -> anyhow::Result<WidgetDescription> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let display_path = path.to_string_lossy();
    let loader = FsLoader::new();
    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry)
        .with_protocol(protocol)
        .with_macros(macros)
        .with_file_loader(&loader);
    debug!(path = %display_path, protocol, "parsing display");
    parse_display_file(&display_path, &contents, &options)
        .with_context(|| format!("failed to parse {}", path.display()))
}

#[derive(Debug, Serialize)]
struct RuleResult<'a> {
    id: String,
    #[serde(rename = "type")]
    widget_type: &'a str,
    props: csweb_display::Props,
}

/// Widgets are identified as `<type>-<n>` in depth-first document order.
fn widget_ids(display: &WidgetDescription) -> impl Iterator<Item = (String, &WidgetDescription)> {
    display
        .walk()
        .enumerate()
        .map(|(index, widget)| (format!("{}-{index}", widget.widget_type), widget))
}

fn evaluate_display<'a>(
    display: &'a WidgetDescription,
    source: &StaticPvSource,
    only: Option<&str>,
) -> Vec<RuleResult<'a>> {
    widget_ids(display)
        .filter(|(id, widget)| {
            !widget.rules().is_empty() && only.is_none_or(|only| only == id)
        })
        .map(|(id, widget)| RuleResult {
            props: evaluate_rules(&id, &widget.props, source),
            widget_type: widget.widget_type.as_str(),
            id,
        })
        .collect()
}
