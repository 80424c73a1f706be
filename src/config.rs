use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::paint::context::{
    DisplayOptions, FrameOptions, ObjectTypes, ScrollDetail, SizeMultipliers,
};
use crate::paint::layer::{DETAIL_MAX, DETAIL_MIN};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn default_true() -> bool {
    true
}

fn default_font_size() -> f32 {
    12.0
}

fn default_object_types() -> Vec<String> {
    vec!["all".to_string()]
}

/// Label and decoration toggles
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub airway_labels: bool,
    pub ring_labels: bool,
    pub hold_labels: bool,
    pub flightplan_labels: bool,
    pub procedure_extension: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            airway_labels: true,
            ring_labels: true,
            hold_labels: true,
            flightplan_labels: true,
            procedure_extension: true,
        }
    }
}

impl DisplayConfig {
    pub fn options(&self) -> DisplayOptions {
        let mut options = DisplayOptions::NONE;
        options.set(DisplayOptions::AIRWAY_LABELS, self.airway_labels);
        options.set(DisplayOptions::RING_LABELS, self.ring_labels);
        options.set(DisplayOptions::HOLD_LABELS, self.hold_labels);
        options.set(DisplayOptions::FLIGHTPLAN_LABELS, self.flightplan_labels);
        options.set(DisplayOptions::PROCEDURE_EXTENSION, self.procedure_extension);
        options
    }
}

/// Chart settings as read from the TOML file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartConfig {
    /// Reduce detail while the map is dragged or zoomed
    #[serde(default = "default_true")]
    pub draw_fast_when_moving: bool,
    #[serde(default)]
    pub scroll_detail: ScrollDetail,
    /// Level of detail shift, -2 (less) to 2 (more)
    #[serde(default)]
    pub detail: i32,
    #[serde(default = "default_object_types")]
    pub object_types: Vec<String>,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub sizes: SizeMultipliers,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            draw_fast_when_moving: true,
            scroll_detail: ScrollDetail::default(),
            detail: 0,
            object_types: default_object_types(),
            display: DisplayConfig::default(),
            sizes: SizeMultipliers::default(),
            font_size: default_font_size(),
        }
    }
}

impl ChartConfig {
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded chart config from {path:?}");
        Ok(config)
    }

    /// Defaults if no path is given or the file does not exist
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                warn!("Config file {path:?} not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn detail(&self) -> i32 {
        self.detail.clamp(DETAIL_MIN, DETAIL_MAX)
    }

    /// Unknown names are ignored, an empty list draws nothing
    pub fn object_types(&self) -> ObjectTypes {
        let mut types = ObjectTypes::NONE;
        for name in &self.object_types {
            match ObjectTypes::from_name(name) {
                Some(t) => types |= t,
                None => warn!("Unknown object type {name:?} in config"),
            }
        }
        types
    }

    /// Read-only copy of the settings for one frame
    pub fn snapshot(&self, moving: bool) -> FrameOptions {
        FrameOptions {
            draw_fast: moving && self.draw_fast_when_moving,
            object_types: self.object_types(),
            scroll_detail: self.scroll_detail,
            display_options: self.display.options(),
            sizes: self.sizes.clamped(),
            default_font_size: if self.font_size.is_finite() {
                self.font_size.max(1.0)
            } else {
                default_font_size()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ChartConfig::parse("").unwrap();
        assert_eq!(config, ChartConfig::default());
        assert_eq!(config.snapshot(false), FrameOptions::default());
    }

    #[test]
    fn test_parse_full_config() {
        let config = ChartConfig::parse(
            r#"
            draw_fast_when_moving = false
            scroll_detail = "higher"
            detail = 5
            object_types = ["airways", "holds", "volcanoes"]

            [display]
            ring_labels = false

            [sizes]
            thickness_flightplan = 2.5
            text_size_navaid = -1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.detail(), DETAIL_MAX);
        assert_eq!(config.scroll_detail, ScrollDetail::Higher);

        let options = config.snapshot(true);
        assert!(!options.draw_fast);
        assert!(options.object_types.contains(ObjectTypes::AIRWAY));
        assert!(options.object_types.contains(ObjectTypes::HOLD));
        assert!(!options.object_types.contains(ObjectTypes::FLIGHTPLAN));
        assert!(!options.display_options.contains(DisplayOptions::RING_LABELS));
        assert!(options.display_options.contains(DisplayOptions::AIRWAY_LABELS));
        assert_eq!(options.sizes.thickness_flightplan, 2.5);
        assert_eq!(options.sizes.text_size_navaid, 0.0);
    }

    #[test]
    fn test_moving_snapshot() {
        let config = ChartConfig::default();
        assert!(config.snapshot(true).draw_fast);
        assert!(!config.snapshot(false).draw_fast);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ChartConfig::parse("detail = \"lots\"").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = Path::new("/nonexistent/tui-navmap.toml");
        let config = ChartConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(config, ChartConfig::default());
        assert!(matches!(ChartConfig::load(path), Err(ConfigError::Io { .. })));
    }
}
