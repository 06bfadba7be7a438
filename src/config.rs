//! Settings file for the viewer.
//!
//! Every field has a default, so a config file only needs to name what it
//! changes:
//!
//! ```json
//! { "image_path": "Crab_Nebula.jpg", "storage": "file", "marker": { "size": 16 } }
//! ```

use crate::store::StorageType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "click-annotate.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub image_path: Option<PathBuf>,
    pub storage: StorageType,
    pub marker: MarkerStyle,
    pub scatter: ScatterConfig,
    /// Screen pixels around the cursor that still count as a hit on a dot.
    pub hit_tolerance: f32,
    /// Default `env_logger` filter; `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_path: None,
            storage: StorageType::Memory,
            marker: MarkerStyle::default(),
            scatter: ScatterConfig::default(),
            hit_tolerance: 20.0,
            log_level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Diameter in surface pixels.
    pub size: f32,
    pub color: [u8; 3],
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            color: [255, 0, 127],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    pub seed: u64,
    pub count: usize,
    /// Inclusive range for both coordinates.
    pub min: i64,
    pub max: i64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            count: 100,
            min: 1,
            max: 100,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&data)?;
        // Relative image paths are relative to the config file.
        if let (Some(image), Some(dir)) = (&config.image_path, path.parent()) {
            if image.is_relative() {
                config.image_path = Some(dir.join(image));
            }
        }
        Ok(config)
    }

    /// Explicit path must exist; otherwise fall back to the default file,
    /// then to built-in defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            Self::load(default)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.scatter.min > self.scatter.max {
            return Err(ConfigError::Invalid(format!(
                "scatter.min ({}) is greater than scatter.max ({})",
                self.scatter.min, self.scatter.max
            )));
        }
        if self.marker.size.is_nan() || self.marker.size <= 0.0 {
            return Err(ConfigError::Invalid("marker.size must be positive".into()));
        }
        if self.hit_tolerance < 0.0 {
            return Err(ConfigError::Invalid("hit_tolerance must not be negative".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_json(
            r#"{ "storage": "file", "marker": { "size": 16 }, "scatter": { "seed": 7 } }"#,
        )
        .unwrap();
        assert_eq!(config.storage, StorageType::File);
        assert_eq!(config.marker.size, 16.0);
        assert_eq!(config.marker.color, [255, 0, 127]);
        assert_eq!(config.scatter.seed, 7);
        assert_eq!(config.scatter.count, 100);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "scatter": { "min": 10, "max": 1 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{ "marker": { "size": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AppConfig::from_json(r#"{ "storage": "cloud" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn image_path_is_relative_to_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "image_path": "nebula.jpg" }"#).unwrap();
        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.image_path, Some(dir.path().join("nebula.jpg")));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            AppConfig::discover(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }
}
