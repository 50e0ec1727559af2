use anyhow::{Context, Result};
use cogex_core::{TrialResult, TrialSink};
use std::path::Path;
use tracing::warn;

/// Keeps the trial's record for writing out as JSON.
#[derive(Debug, Default)]
pub struct JsonSink {
    result: Option<TrialResult>,
}

impl JsonSink {
    pub fn result(&self) -> Option<&TrialResult> {
        self.result.as_ref()
    }

    pub fn into_result(self) -> Option<TrialResult> {
        self.result
    }

    pub fn to_json(result: &TrialResult) -> Result<String> {
        serde_json::to_string_pretty(result).context("cannot serialize trial result")
    }

    pub fn save(result: &TrialResult, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("cannot create result file {}", path.display()))?;
        serde_json::to_writer_pretty(file, result)
            .with_context(|| format!("cannot write result file {}", path.display()))
    }
}

impl TrialSink for JsonSink {
    fn accept(&mut self, result: TrialResult) {
        if self.result.is_some() {
            warn!("trial reported more than one result, keeping the first");
            return;
        }
        self.result = Some(result);
    }
}
