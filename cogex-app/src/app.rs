use crate::host::{KeyboardCapture, ScriptedDisplay};
use crate::runtime::Runtime;
use crate::script::Script;
use crate::sink::JsonSink;
use anyhow::{Context, Result};
use clap::Args;
use cogex_cache::PreloadCache;
use cogex_core::{strip_query, TrialResult};
use cogex_experiment::{TrialConfig, TrialController, PRELOAD};
use cogex_timing::{HighPrecisionTimer, Timer, TimerQueue, VirtualClock};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Trial configuration (JSON).
    pub trial: PathBuf,
    /// Host events to replay (JSON array). Without it only autoplay happens.
    #[arg(short, long)]
    pub script: Option<PathBuf>,
    /// Load the source files into memory before the trial starts.
    #[arg(long)]
    pub preload: bool,
    /// Wait in wall-clock time instead of jumping between events.
    #[arg(long)]
    pub realtime: bool,
    /// Write the result here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub struct App {
    config: TrialConfig,
    base_dir: PathBuf,
    script: Script,
    preload: bool,
    realtime: bool,
    output: Option<PathBuf>,
}

impl App {
    pub fn new(args: RunArgs) -> Result<Self> {
        let config = TrialConfig::load(&args.trial)?;
        let script = match &args.script {
            Some(path) => Script::load(path)?,
            None => Script::default(),
        };
        let base_dir = args
            .trial
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            config,
            base_dir,
            script,
            preload: args.preload,
            realtime: args.realtime,
            output: args.output,
        })
    }

    pub fn run(self) -> Result<TrialResult> {
        info!(
            trial = TrialConfig::NAME,
            sources = ?self.config.sources,
            events = self.script.events.len(),
            realtime = self.realtime,
            "running trial"
        );

        let cache = if self.preload {
            self.preload_sources()
        } else {
            PreloadCache::new()
        };

        let result = if self.realtime {
            self.run_with(HighPrecisionTimer::new(), cache)?
        } else {
            self.run_with(VirtualClock::new(), cache)?
        };

        match &self.output {
            Some(path) => {
                JsonSink::save(&result, path)?;
                println!("Results saved to {}", path.display());
            }
            None => println!("{}", JsonSink::to_json(&result)?),
        }
        Ok(result)
    }

    fn run_with<C: Timer<Timestamp = u64>>(&self, clock: C, cache: PreloadCache) -> Result<TrialResult> {
        let mut trial = TrialController::new(
            self.config.clone(),
            ScriptedDisplay::default(),
            cache,
            TimerQueue::new(clock.clone()),
            KeyboardCapture::new(clock.clone()),
            JsonSink::default(),
        )?;
        trial.start()?;

        let mut runtime = Runtime::new(clock, &self.script, self.config.autoplay);
        runtime.run(&mut trial)?;
        info!(elapsed_ms = runtime.elapsed_ms(), "trial complete");

        let (.., sink) = trial.into_parts();
        sink.into_result()
            .context("trial finished without reporting a result")
    }

    /// Loads the media the trial declares for preloading. References that do not
    /// resolve to a local file fall back to `<source>` tags.
    fn preload_sources(&self) -> PreloadCache {
        let (parameter, kind) = PRELOAD;
        let references = self.config.preload_references();
        debug!(parameter, ?kind, count = references.len(), "preloading");

        let mut cache = PreloadCache::new();
        for reference in references {
            let path = self.base_dir.join(strip_query(reference));
            match cache.load_file(reference, &path) {
                Ok(buffer) => info!(reference, bytes = buffer.len(), "preloaded"),
                Err(err) => warn!(reference, path = %path.display(), %err, "preload failed"),
            }
        }
        cache
    }
}

#[cfg(test)]
mod tests {
    use super::{App, RunArgs};
    use cogex_core::Key;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn args(trial: PathBuf, script: Option<PathBuf>, output: Option<PathBuf>) -> RunArgs {
        RunArgs {
            trial,
            script,
            preload: false,
            realtime: false,
            output,
        }
    }

    #[test]
    fn runs_trial_from_files_and_saves_result() {
        let dir = tempfile::tempdir().unwrap();
        let trial = write(
            &dir,
            "trial.json",
            br#"{"sources": ["clip.mp4"], "choices": ["f", "j"], "stop": 4.0}"#,
        );
        let script = write(
            &dir,
            "script.json",
            br#"[{"at_ms": 800, "event": "key_down", "key": "f"}]"#,
        );
        let output = dir.path().join("result.json");

        let result = App::new(args(trial, Some(script), Some(output.clone())))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(result.key_press, Some(Key::new("f")));
        assert_eq!(result.rt, Some(800.0));

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(saved["stimulus"], "[\"clip.mp4\"]");
        assert_eq!(saved["key_press"], "f");
    }

    #[test]
    fn preload_loads_sources_next_to_config() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir, "clip.webm", b"not really webm");
        let trial = write(
            &dir,
            "trial.json",
            br#"{"sources": ["clip.webm?v=1", "missing.mp4"]}"#,
        );
        let app = App::new(RunArgs {
            preload: true,
            ..args(trial, None, None)
        })
        .unwrap();

        let cache = app.preload_sources();
        assert!(cache.contains("clip.webm?v=1"));
        assert!(!cache.contains("missing.mp4"));
    }

    #[test]
    fn stalled_trial_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let trial = write(
            &dir,
            "trial.json",
            br#"{"sources": ["clip.mp4"], "choices": "none"}"#,
        );
        let err = App::new(args(trial, None, None)).unwrap().run().unwrap_err();
        assert!(err.to_string().contains("stalled"));
    }

    #[test]
    fn missing_config_fails_early() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("trial.json");
        assert!(App::new(args(missing, None, None)).is_err());
    }
}
