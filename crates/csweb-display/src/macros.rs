//! Macro maps and substitution.

use indexmap::IndexMap;

/// Macro name to substitution text, in declaration order.
pub type MacroMap = IndexMap<String, String>;

/// Substitutes macros into text.
pub trait MacroResolver: Sync {
    fn resolve_macros(&self, text: &str, macros: &MacroMap) -> String;
}

/// Resolves `$(NAME)` and `${NAME}` references.
///
/// `$(NAME=default)` falls back to `default` when `NAME` is not defined.
/// Unknown macros without a default are left in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMacroResolver;

impl MacroResolver for SimpleMacroResolver {
    fn resolve_macros(&self, text: &str, macros: &MacroMap) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('$') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            let close = match tail.as_bytes().get(1) {
                Some(b'(') => ')',
                Some(b'{') => '}',
                _ => {
                    out.push('$');
                    rest = &tail[1..];
                    continue;
                }
            };
            let Some(end) = tail.find(close) else {
                out.push_str(tail);
                return out;
            };
            let body = &tail[2..end];
            let (name, fallback) = match body.split_once('=') {
                Some((name, fallback)) => (name, Some(fallback)),
                None => (body, None),
            };
            match macros.get(name.trim()).map(String::as_str).or(fallback) {
                Some(value) => out.push_str(value),
                None => out.push_str(&tail[..=end]),
            }
            rest = &tail[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn macros() -> MacroMap {
        let mut macros = MacroMap::new();
        macros.insert("P".into(), "SR-DI".into());
        macros.insert("DIR".into(), "screens".into());
        macros
    }

    #[test]
    fn substitutes_both_bracket_styles() {
        let resolved = SimpleMacroResolver.resolve_macros("$(P):${DIR}/x", &macros());
        assert_eq!(resolved, "SR-DI:screens/x");
    }

    #[test]
    fn unknown_macros_are_kept() {
        let resolved = SimpleMacroResolver.resolve_macros("$(Q) costs $5 ${R", &macros());
        assert_eq!(resolved, "$(Q) costs $5 ${R");
    }

    #[test]
    fn default_applies_only_when_undefined() {
        let resolved = SimpleMacroResolver.resolve_macros("$(Q=1)-$(P=2)", &macros());
        assert_eq!(resolved, "1-SR-DI");
    }
}
