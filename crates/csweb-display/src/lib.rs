//! `csweb-display` - parser and rule engine for control system displays.
//!
//! Phoebus `.bob`, CS-Studio `.opi` and native `.json` display files are
//! parsed into one [`WidgetDescription`] tree with canonical camelCase
//! properties. [`evaluate_rules`] then rewrites a widget's properties from
//! the live state of the PVs its rules reference.
//!
//! ```
//! use csweb_display::{parse_display_file, ParseOptions, WidgetRegistry};
//!
//! let registry = WidgetRegistry::standard();
//! let options = ParseOptions::new(&registry);
//! let bob = r#"<display version="2.0.0">
//!   <widget type="label"><name>Title</name><text>Hello</text></widget>
//! </display>"#;
//! let display = parse_display_file("/screens/main.bob", bob, &options).unwrap();
//! assert_eq!(display.widget_type, "display");
//! assert_eq!(display.children[0].text(), Some("Hello"));
//! ```

pub mod element;
pub mod error;
pub mod load;
pub mod macros;
pub mod parser;
pub mod registry;
pub mod rules;
pub mod types;
pub mod util;

pub use error::{FileLoadError, ParseError, RuleError, StructuralError};
pub use load::{
    empty_widget, error_widget, load_display_file, parse_display_file, FileLoader, FsLoader,
    ParseOptions,
};
pub use macros::{MacroMap, MacroResolver, SimpleMacroResolver};
pub use parser::{parse_bob, parse_json, parse_object, parse_opi, parse_plt};
pub use registry::WidgetRegistry;
pub use rules::{evaluate_rules, PvSource, PvState, PvValue, StaticPvSource};
pub use types::{PropValue, Props, WidgetDescription};
