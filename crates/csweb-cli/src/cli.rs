//! CLI definitions for csweb.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "csweb",
    version,
    about = "Parse control system display files into widget descriptions",
    infer_subcommands = true,
    after_help = "Examples:\n  csweb parse screens/main.bob --pretty\n  csweb parse main.opi --macro P=SR --protocol pva\n  csweb rules main.bob --snapshot pvs.json"
)]
pub struct Cli {
    /// Configuration file (defaults to ./csweb.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a .bob, .opi or .json display and print its description as JSON.
    Parse {
        /// Display file to parse.
        file: PathBuf,
        /// Protocol for PV names without one (overrides the config).
        #[arg(long)]
        protocol: Option<String>,
        /// Macro definition NAME=VALUE; may be repeated.
        #[arg(long = "macro", value_name = "NAME=VALUE", value_parser = parse_macro)]
        macros: Vec<(String, String)>,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Evaluate the rules of a display against a PV snapshot.
    #[command(
        after_help = "The snapshot maps qualified PV names to states:\n  {\"ca://SR:X\": {\"connected\": true, \"value\": {\"double\": 1.0}}}"
    )]
    Rules {
        /// Display file to parse.
        file: PathBuf,
        /// JSON file with PV states.
        #[arg(long)]
        snapshot: PathBuf,
        /// Only evaluate the widget with this id.
        #[arg(long)]
        widget_id: Option<String>,
    },
}

fn parse_macro(text: &str) -> Result<(String, String), String> {
    match text.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{text}'")),
    }
}
