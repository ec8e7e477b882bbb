use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::annotations::codec::ANNOTATION_EXTENSION;
use crate::annotations::Intensity;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Extension of the annotation file written next to the audio file.
    pub annotation_extension: String,
    /// Samples visible when a file is first opened.
    pub initial_window: usize,
    /// Intensity used when a mark command does not name one.
    pub default_intensity: Intensity,
    /// Point budget for the whole-file overview.
    pub overview_points: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            annotation_extension: ANNOTATION_EXTENSION.to_string(),
            initial_window: 10_000,
            default_intensity: Intensity::Low,
            overview_points: 2_000,
        }
    }
}

impl ViewerConfig {
    /// Reads a JSON config file. Omitted keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn annotation_path(&self, audio_path: &Path) -> PathBuf {
        audio_path.with_extension(&self.annotation_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ViewerConfig =
            serde_json::from_str(r#"{ "default_intensity": "very-high" }"#).unwrap();
        assert_eq!(cfg.default_intensity, Intensity::VeryHigh);
        assert_eq!(cfg.initial_window, 10_000);
        assert_eq!(cfg.annotation_extension, "marks");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(serde_json::from_str::<ViewerConfig>(r#"{ "zoom": 3 }"#).is_err());
    }

    #[test]
    fn annotation_path_uses_configured_extension() {
        let cfg = ViewerConfig {
            annotation_extension: "csv".into(),
            ..ViewerConfig::default()
        };
        assert_eq!(
            cfg.annotation_path(Path::new("takes/vocal.wav")),
            PathBuf::from("takes/vocal.csv")
        );
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(
            ViewerConfig::load_or_default(None).unwrap(),
            ViewerConfig::default()
        );
    }
}
