#![no_main]

use csweb_expr::{evaluate, parse, Scope, Value};
use libfuzzer_sys::fuzz_target;

const MAX_SOURCE_BYTES: usize = 1024;

fn rule_scope(seed: u8) -> Scope {
    let value = f64::from(seed) - 128.0;
    Scope::new()
        .with("pv0", value)
        .with("pvInt0", value)
        .with("pvStr0", Value::string("TRIP"))
        .with("pvSev0", f64::from(seed % 3))
}

fuzz_target!(|data: &[u8]| {
    let Some((&seed, rest)) = data.split_first() else {
        return;
    };
    let capped = &rest[..rest.len().min(MAX_SOURCE_BYTES)];
    let source = String::from_utf8_lossy(capped);

    let parsed = parse(&source);
    let evaluated = evaluate(&source, &rule_scope(seed));
    if parsed.is_err() {
        assert!(evaluated.is_err(), "evaluated unparsable source {source:?}");
    }
});
