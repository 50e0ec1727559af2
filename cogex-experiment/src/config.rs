use cogex_core::KeyChoices;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read trial config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid trial config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("trial config has no sources")]
    EmptySources,
}

/// Options of a single video keyboard-response trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Video file references, primary first.
    pub sources: Vec<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
    #[serde(default)]
    pub controls: bool,
    #[serde(default)]
    pub prompt: Option<String>,
    /// Seconds into the clip to seek to before playing.
    #[serde(default)]
    pub start: Option<f64>,
    /// Seconds into the clip at which the trial ends.
    #[serde(default)]
    pub stop: Option<f64>,
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub choices: KeyChoices,
}

fn default_autoplay() -> bool {
    true
}

impl TrialConfig {
    /// Config with every option at its default.
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            width: None,
            height: None,
            autoplay: default_autoplay(),
            controls: false,
            prompt: None,
            start: None,
            stop: None,
            rate: None,
            choices: KeyChoices::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.check_sources()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn primary_source(&self) -> Option<&str> {
        self.sources.first().map(String::as_str)
    }

    /// Values of the parameter named by [`PRELOAD`].
    pub fn preload_references(&self) -> &[String] {
        &self.sources
    }

    fn check_sources(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::EmptySources);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Video,
    Int,
    Bool,
    String,
    Float,
    Keycode,
}

/// Describes one recognized trial option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub pretty_name: &'static str,
    pub kind: ParameterKind,
    pub array: bool,
    /// Default as a JSON literal; `None` when the option is required.
    pub default: Option<&'static str>,
    pub description: &'static str,
}

/// Media a host should preload before the trial: parameter name and kind.
pub const PRELOAD: (&str, ParameterKind) = ("sources", ParameterKind::Video);

impl TrialConfig {
    pub const NAME: &'static str = "video-keyboard-response";

    pub const PARAMETERS: &'static [ParameterInfo] = &[
        ParameterInfo {
            name: "sources",
            pretty_name: "Sources",
            kind: ParameterKind::Video,
            array: true,
            default: None,
            description: "The video file to play.",
        },
        ParameterInfo {
            name: "width",
            pretty_name: "Width",
            kind: ParameterKind::Int,
            array: false,
            default: Some("null"),
            description: "The width of the video in pixels.",
        },
        ParameterInfo {
            name: "height",
            pretty_name: "Height",
            kind: ParameterKind::Int,
            array: false,
            default: Some("null"),
            description: "The height of the video display in pixels.",
        },
        ParameterInfo {
            name: "autoplay",
            pretty_name: "Autoplay",
            kind: ParameterKind::Bool,
            array: false,
            default: Some("true"),
            description: "If true, the video will begin playing as soon as it has loaded.",
        },
        ParameterInfo {
            name: "controls",
            pretty_name: "Controls",
            kind: ParameterKind::Bool,
            array: false,
            default: Some("false"),
            description: "If true, the subject will be able to pause the video or move the playback to any point in the video.",
        },
        ParameterInfo {
            name: "prompt",
            pretty_name: "Prompt",
            kind: ParameterKind::String,
            array: false,
            default: Some("null"),
            description: "Any content here will be displayed below the video content.",
        },
        ParameterInfo {
            name: "start",
            pretty_name: "Start",
            kind: ParameterKind::Float,
            array: false,
            default: Some("null"),
            description: "Time to start the clip.",
        },
        ParameterInfo {
            name: "stop",
            pretty_name: "Stop",
            kind: ParameterKind::Float,
            array: false,
            default: Some("null"),
            description: "Time to stop the clip.",
        },
        ParameterInfo {
            name: "rate",
            pretty_name: "Rate",
            kind: ParameterKind::Float,
            array: false,
            default: Some("null"),
            description: "The playback rate of the video. 1 is normal, <1 is slower, >1 is faster.",
        },
        ParameterInfo {
            name: "choices",
            pretty_name: "Choices",
            kind: ParameterKind::Keycode,
            array: true,
            default: Some("\"allkeys\""),
            description: "The keys the subject is allowed to press to respond to the stimulus.",
        },
    ];

    pub fn parameter(name: &str) -> Option<&'static ParameterInfo> {
        Self::PARAMETERS.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ParameterKind, TrialConfig, PRELOAD};
    use cogex_core::{Key, KeyChoices};

    #[test]
    fn minimal_config_takes_defaults() {
        let config = TrialConfig::from_json_str(r#"{"sources": ["a.mp4"]}"#).unwrap();
        assert_eq!(config, TrialConfig::new(["a.mp4"]));
        assert!(config.autoplay);
        assert!(!config.controls);
        assert_eq!(config.choices, KeyChoices::AllKeys);
        assert_eq!(config.start, None);
        assert_eq!(config.stop, None);
    }

    #[test]
    fn full_config_parses() {
        let config = TrialConfig::from_json_str(
            r#"{
                "type": "video-keyboard-response",
                "sources": ["clip.mp4", "clip.webm"],
                "width": 640,
                "height": 360,
                "autoplay": false,
                "controls": true,
                "prompt": "<p>Press F</p>",
                "start": 1.0,
                "stop": 3.5,
                "rate": 1.5,
                "choices": ["f", "J"]
            }"#,
        )
        .unwrap();
        assert_eq!(config.primary_source(), Some("clip.mp4"));
        assert_eq!(config.width, Some(640));
        assert_eq!(config.stop, Some(3.5));
        assert_eq!(config.rate, Some(1.5));
        assert!(config.choices.accepts(&Key::new("j")));
    }

    #[test]
    fn no_keys_sentinel_parses() {
        let config =
            TrialConfig::from_json_str(r#"{"sources": ["a.webm"], "choices": "none"}"#).unwrap();
        assert_eq!(config.choices, KeyChoices::NoKeys);
    }

    #[test]
    fn empty_sources_are_rejected() {
        let err = TrialConfig::from_json_str(r#"{"sources": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySources));
    }

    #[test]
    fn missing_sources_is_a_parse_error() {
        let err = TrialConfig::from_json_str(r#"{"width": 10}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TrialConfig::load(std::path::Path::new("/nonexistent/trial.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/trial.json"));
    }

    #[test]
    fn every_field_has_a_parameter_entry() {
        let names: Vec<_> = TrialConfig::PARAMETERS.iter().map(|p| p.name).collect();
        assert_eq!(
            names,
            [
                "sources", "width", "height", "autoplay", "controls", "prompt", "start", "stop",
                "rate", "choices"
            ]
        );
        assert_eq!(TrialConfig::parameter("sources").unwrap().default, None);
        assert_eq!(PRELOAD, ("sources", ParameterKind::Video));
    }

    #[test]
    fn preload_references_follow_declaration() {
        let config = TrialConfig::new(["a.mp4?v=1", "a.webm"]);
        let declared = serde_json::to_value(&config).unwrap();
        assert_eq!(declared[PRELOAD.0], serde_json::json!(config.preload_references()));
        assert_eq!(config.preload_references(), ["a.mp4?v=1", "a.webm"]);
    }

    #[test]
    fn parameter_defaults_match_serde_defaults() {
        let config = TrialConfig::new(["a.mp4"]);
        let json = serde_json::to_value(&config).unwrap();
        for param in TrialConfig::PARAMETERS {
            let Some(default) = param.default else { continue };
            let expected: serde_json::Value = serde_json::from_str(default).unwrap();
            assert_eq!(json[param.name], expected, "default of {}", param.name);
        }
    }
}
