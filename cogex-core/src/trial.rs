use crate::key::Key;
use serde::{Deserialize, Serialize};

/// Accepted keypress reported by the response capture service.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyResponse {
    /// Reaction time in milliseconds.
    pub rt: f64,
    pub key: Key,
}

/// Response recorded so far. The first accepted response wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseState {
    pub rt: Option<f64>,
    pub key: Option<Key>,
}

impl ResponseState {
    /// Stores `response` unless a key is already recorded. Returns whether it was stored.
    pub fn record(&mut self, response: KeyResponse) -> bool {
        if self.key.is_some() {
            return false;
        }
        self.rt = Some(response.rt);
        self.key = Some(response.key);
        true
    }

    pub fn has_response(&self) -> bool {
        self.key.is_some()
    }
}

/// Record emitted once per trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// JSON array of the source references, e.g. `["a.webm"]`.
    pub stimulus: String,
    pub rt: Option<f64>,
    pub key_press: Option<Key>,
}

impl TrialResult {
    pub fn new(sources: &[String], response: &ResponseState) -> Self {
        let stimulus = serde_json::Value::from(sources.to_vec()).to_string();
        Self {
            stimulus,
            rt: response.rt,
            key_press: response.key.clone(),
        }
    }
}
