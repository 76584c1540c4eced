//! Process variable references.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub const DELIMITER: &str = "://";
pub const DEFAULT_PROTOCOL: &str = "ca";

/// A PV name with its protocol, e.g. `ca://SR-DI-DCCT-01:SIGNAL`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pv {
    pub name: SmolStr,
    pub protocol: SmolStr,
}

impl Pv {
    #[must_use]
    pub fn new(name: impl Into<SmolStr>, protocol: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            protocol: protocol.into(),
        }
    }

    /// Split a raw PV name into protocol and name.
    ///
    /// A leading `=` marks a formula PV. Otherwise the text is split at the
    /// last `://`; without a delimiter `default_protocol` applies.
    #[must_use]
    pub fn parse(text: &str, default_protocol: &str) -> Self {
        if let Some(formula) = text.strip_prefix('=') {
            return Self::new(formula, "eq");
        }
        match text.rfind(DELIMITER) {
            Some(index) if !text.contains('\n') => Self::new(
                &text[index + DELIMITER.len()..],
                &text[..index],
            ),
            _ => Self::new(text, default_protocol),
        }
    }

    /// Full `protocol://name` form.
    ///
    /// Names that already carry a delimiter (from macro substitution) are
    /// returned unchanged unless they embed a quoted nested PV.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let name = self.name.as_str();
        if name.contains(DELIMITER) && !name.contains('`') && !name.contains('\'') {
            name.to_string()
        } else if name.starts_with("eq://") {
            name.to_string()
        } else if let Some(formula) = name.strip_prefix('=') {
            format!("eq://{formula}")
        } else {
            format!("{}{DELIMITER}{name}", self.protocol)
        }
    }
}

impl std::fmt::Display for Pv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_uses_default_protocol() {
        assert_eq!(Pv::parse("abc", "xxx").qualified_name(), "xxx://abc");
        assert_eq!(Pv::parse("loc://x", "ca"), Pv::new("x", "loc"));
        assert_eq!(Pv::parse("=pv0+1", "ca"), Pv::new("pv0+1", "eq"));
    }

    #[test]
    fn qualification_is_idempotent() {
        for text in [
            "abc",
            "loc://abc",
            "=1+2",
            "=`ca://a` + 1",
            "eq://'sim://ramp' * 2",
            "pva://x://y",
        ] {
            let once = Pv::parse(text, "ca").qualified_name();
            let twice = Pv::parse(&once, "ca").qualified_name();
            assert_eq!(once, twice, "{text}");
        }
    }
}
