//! Editor session configuration
//!
//! Stored as JSON. Missing fields take their defaults, so an empty object is
//! a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clipboard::GRAPH_MIME_TYPE;
use crate::error::Result;

fn default_undo_limit() -> usize {
    100
}

fn default_clipboard_mime() -> String {
    GRAPH_MIME_TYPE.to_string()
}

/// Settings for one [`EditorSession`](crate::session::EditorSession)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Maximum number of undo entries kept
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,
    /// MIME format used for copied subgraphs
    #[serde(default = "default_clipboard_mime")]
    pub clipboard_mime: String,
    /// Allow connections that close a cycle
    #[serde(default)]
    pub loops_enabled: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_limit: default_undo_limit(),
            clipboard_mime: default_clipboard_mime(),
            loops_enabled: false,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load configuration from disk, defaults if the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Save configuration to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Configuration saved to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeEditorError;

    #[test]
    fn test_missing_fields_default() {
        let config = EditorConfig::from_json_str(r#"{"loops_enabled": true}"#).unwrap();
        assert!(config.loops_enabled);
        assert_eq!(config.undo_limit, 100);
        assert_eq!(config.clipboard_mime, GRAPH_MIME_TYPE);

        assert_eq!(EditorConfig::from_json_str("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_malformed_config() {
        let result = EditorConfig::from_json_str(r#"{"undo_limit": "many"}"#);
        assert!(matches!(result, Err(NodeEditorError::Serialization(_))));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("editor").join("config.json");

        // Missing file falls back to defaults
        assert_eq!(EditorConfig::load(&path).unwrap(), EditorConfig::default());

        let config = EditorConfig {
            undo_limit: 7,
            clipboard_mime: "application/x-test".to_string(),
            loops_enabled: true,
        };
        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }
}
