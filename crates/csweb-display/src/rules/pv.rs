//! PV states seen by the rule engine.

use csweb_expr::value::format_number;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmQuality {
    #[default]
    Valid,
    Alarm,
    Warning,
    Invalid,
    Undefined,
    Changing,
}

impl AlarmQuality {
    /// Severity as exposed to rule expressions as `pvSev{i}`.
    #[must_use]
    pub fn severity(self) -> i32 {
        match self {
            AlarmQuality::Valid => 0,
            AlarmQuality::Alarm => 1,
            AlarmQuality::Warning => 2,
            AlarmQuality::Invalid | AlarmQuality::Undefined | AlarmQuality::Changing => -1,
        }
    }
}

/// Latest value of a PV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PvValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string: Option<SmolStr>,
    #[serde(default)]
    pub alarm: AlarmQuality,
}

impl PvValue {
    #[must_use]
    pub fn number(value: f64) -> Self {
        Self {
            double: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(value: impl Into<SmolStr>) -> Self {
        Self {
            string: Some(value.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_alarm(mut self, alarm: AlarmQuality) -> Self {
        self.alarm = alarm;
        self
    }

    /// String form: the string value, else the formatted number.
    #[must_use]
    pub fn coerce_string(&self) -> Option<SmolStr> {
        self.string
            .clone()
            .or_else(|| self.double.map(|value| SmolStr::new(format_number(value))))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PvState {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub value: Option<PvValue>,
}

impl PvState {
    #[must_use]
    pub fn connected(value: PvValue) -> Self {
        Self {
            connected: true,
            value: Some(value),
        }
    }
}

/// Value representations a subscriber asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionType {
    pub string: bool,
    pub double: bool,
}

impl SubscriptionType {
    pub const BOTH: SubscriptionType = SubscriptionType {
        string: true,
        double: true,
    };
}

/// PV subscription service the rule engine reads from.
pub trait PvSource: Sync {
    /// Register interest of `widget_id` in `pv_names`; repeated calls with the
    /// same names are harmless.
    fn subscribe(&self, widget_id: &str, pv_names: &[String], types: &[SubscriptionType]);

    /// Current states of `pv_names`, keyed by qualified name. Unknown PVs may
    /// be left out.
    fn snapshot(&self, pv_names: &[String]) -> FxHashMap<String, PvState>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub widget_id: SmolStr,
    pub pv_names: Vec<String>,
}

/// Fixed PV states, e.g. loaded from a JSON snapshot file.
///
/// Subscriptions are recorded and can be inspected with
/// [`StaticPvSource::subscriptions`].
#[derive(Debug, Default, Deserialize)]
pub struct StaticPvSource {
    #[serde(flatten)]
    states: FxHashMap<String, PvState>,
    #[serde(skip)]
    subscriptions: Mutex<Vec<Subscription>>,
}

impl StaticPvSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StaticPvSource::set`].
    #[must_use]
    pub fn with(mut self, pv_name: impl Into<String>, state: PvState) -> Self {
        self.set(pv_name, state);
        self
    }

    pub fn set(&mut self, pv_name: impl Into<String>, state: PvState) {
        self.states.insert(pv_name.into(), state);
    }

    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.lock().clone()
    }
}

impl PvSource for StaticPvSource {
    fn subscribe(&self, widget_id: &str, pv_names: &[String], _: &[SubscriptionType]) {
        self.subscriptions.lock().push(Subscription {
            widget_id: SmolStr::new(widget_id),
            pv_names: pv_names.to_vec(),
        });
    }

    fn snapshot(&self, pv_names: &[String]) -> FxHashMap<String, PvState> {
        pv_names
            .iter()
            .filter_map(|name| Some((name.clone(), self.states.get(name)?.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_follow_legacy_numbering() {
        let codes: Vec<_> = [
            AlarmQuality::Valid,
            AlarmQuality::Alarm,
            AlarmQuality::Warning,
            AlarmQuality::Invalid,
            AlarmQuality::Undefined,
            AlarmQuality::Changing,
        ]
        .into_iter()
        .map(AlarmQuality::severity)
        .collect();
        assert_eq!(codes, [0, 1, 2, -1, -1, -1]);
    }

    #[test]
    fn snapshots_deserialize_from_a_pv_map() {
        let source: StaticPvSource = serde_json::from_str(
            r#"{"ca://A": {"connected": true, "value": {"double": 2.5, "alarm": "WARNING"}},
                "ca://B": {"connected": false}}"#,
        )
        .unwrap();
        let names = vec!["ca://A".to_string(), "ca://B".to_string(), "ca://C".to_string()];
        let snapshot = source.snapshot(&names);
        assert_eq!(snapshot.len(), 2);
        let a = snapshot["ca://A"].value.clone().unwrap();
        assert_eq!(a.alarm, AlarmQuality::Warning);
        assert_eq!(a.coerce_string().as_deref(), Some("2.5"));
        assert!(!snapshot["ca://B"].connected);
    }
}
