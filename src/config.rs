//! Store configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!   "object_file": "object.json",
//!   "validate_attributes": false,
//!   "verify_checksums": true,
//!   "log_level": "warn"
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{SlicerError, SlicerResult};
use crate::observability::{Event, Logger, Severity};
use crate::storage::layout::{self, TOMBSTONE_FILE};
use crate::storage::DEFAULT_OBJECT_FILE;

/// Store behavior switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlicerConfig {
    /// File name used by the generic JSON object codec
    #[serde(default = "default_object_file")]
    pub object_file: String,

    /// Check each supplied attribute against its column domain on insert
    #[serde(default)]
    pub validate_attributes: bool,

    /// Verify metadata checksums from the manifest on open
    #[serde(default = "default_verify_checksums")]
    pub verify_checksums: bool,

    /// Minimum log severity: trace, info, warn, error or fatal
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_object_file() -> String {
    DEFAULT_OBJECT_FILE.to_string()
}
fn default_verify_checksums() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            object_file: default_object_file(),
            validate_attributes: false,
            verify_checksums: default_verify_checksums(),
            log_level: default_log_level(),
        }
    }
}

impl SlicerConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> SlicerResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SlicerError::invalid_config(format!(
                "Failed to read config '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: SlicerConfig = serde_json::from_str(&content)
            .map_err(|e| SlicerError::invalid_config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        let path_str = path.display().to_string();
        Logger::info(Event::ConfigLoaded.as_str(), &[("path", path_str.as_str())]);
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> SlicerResult<()> {
        layout::check_entry_name(&self.object_file).map_err(|reason| {
            SlicerError::invalid_config(format!("object_file {}, got '{}'", reason, self.object_file))
        })?;
        if self.object_file == TOMBSTONE_FILE {
            return Err(SlicerError::invalid_config(format!(
                "object_file must not be the reserved name '{}'",
                TOMBSTONE_FILE
            )));
        }

        self.severity()?;
        Ok(())
    }

    /// Returns the parsed log level
    pub fn severity(&self) -> SlicerResult<Severity> {
        self.log_level
            .parse::<Severity>()
            .map_err(SlicerError::invalid_config)
    }

    /// Applies the log level to the process-wide logger
    pub fn apply_log_level(&self) -> SlicerResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SlicerErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_from_empty_object() {
        let config: SlicerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SlicerConfig::default());
        assert_eq!(config.object_file, "object.json");
        assert!(!config.validate_attributes);
        assert!(config.verify_checksums);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{"validate_attributes": true, "object_file": "payload.json"}"#,
        )
        .unwrap();

        let config = SlicerConfig::load(&path).unwrap();
        assert!(config.validate_attributes);
        assert_eq!(config.object_file, "payload.json");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_invalid_json_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let err = SlicerConfig::load(&path).unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::InvalidConfig);
    }

    #[test]
    fn test_object_file_must_be_plain_name() {
        let config = SlicerConfig {
            object_file: "../escape.json".to_string(),
            ..SlicerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_object_file_reserved_names_rejected() {
        for name in ["tombstone", ".", "..", ""] {
            let config = SlicerConfig {
                object_file: name.to_string(),
                ..SlicerConfig::default()
            };
            let err = config.validate().unwrap_err();
            assert_eq!(err.code(), SlicerErrorCode::InvalidConfig, "{:?}", name);
        }
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let config = SlicerConfig {
            log_level: "loud".to_string(),
            ..SlicerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.code(), SlicerErrorCode::InvalidConfig);
    }
}
