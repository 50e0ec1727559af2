use anyhow::{Context, Result};
use cogex_core::Key;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What the participant or the media does at a point in the trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptAction {
    Play,
    Pause,
    Ended,
    KeyDown { key: Key },
    KeyUp { key: Key },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEvent {
    /// Milliseconds after the trial started.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// Host events replayed against a trial, e.g.
/// `[{"at_ms": 0, "event": "play"}, {"at_ms": 850, "event": "key_down", "key": "f"}]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub events: Vec<ScriptEvent>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read event script {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("invalid event script {}", path.display()))
    }

    /// Events in time order; events at the same time keep their file order.
    pub fn ordered(&self) -> Vec<ScriptEvent> {
        let mut events = self.events.clone();
        events.sort_by_key(|e| e.at_ms);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::{Script, ScriptAction, ScriptEvent};
    use cogex_core::Key;

    #[test]
    fn parses_tagged_events() {
        let script: Script = serde_json::from_str(
            r#"[
                {"at_ms": 0, "event": "play"},
                {"at_ms": 900, "event": "key_down", "key": "F"},
                {"at_ms": 950, "event": "key_up", "key": "f"},
                {"at_ms": 4000, "event": "ended"}
            ]"#,
        )
        .unwrap();
        assert_eq!(script.events.len(), 4);
        assert_eq!(
            script.events[1],
            ScriptEvent {
                at_ms: 900,
                action: ScriptAction::KeyDown { key: Key::new("f") },
            }
        );
        assert_eq!(script.events[3].action, ScriptAction::Ended);
    }

    #[test]
    fn unknown_event_is_rejected() {
        let err = serde_json::from_str::<Script>(r#"[{"at_ms": 0, "event": "seek"}]"#);
        assert!(err.is_err());
    }

    #[test]
    fn ordering_is_stable_by_time() {
        let script = Script {
            events: vec![
                ScriptEvent {
                    at_ms: 500,
                    action: ScriptAction::Ended,
                },
                ScriptEvent {
                    at_ms: 100,
                    action: ScriptAction::Pause,
                },
                ScriptEvent {
                    at_ms: 100,
                    action: ScriptAction::Play,
                },
            ],
        };
        let actions: Vec<_> = script.ordered().into_iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            [ScriptAction::Pause, ScriptAction::Play, ScriptAction::Ended]
        );
    }
}
