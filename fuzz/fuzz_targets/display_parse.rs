#![no_main]

use csweb_display::{parse_display_file, ParseOptions, WidgetRegistry};
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 16 * 1024;
const PATHS: [&str; 3] = ["/opi/fuzz.bob", "/opi/fuzz.opi", "/opi/fuzz.json"];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let capped = &rest[..rest.len().min(MAX_SOURCE_BYTES)];
    let contents = String::from_utf8_lossy(capped);
    let path = PATHS[usize::from(selector) % PATHS.len()];

    let registry = WidgetRegistry::standard();
    let options = ParseOptions::new(&registry);
    if let Ok(display) = parse_display_file(path, &contents, &options) {
        for widget in display.walk() {
            assert!(!widget.widget_type.is_empty());
        }
    }
});
