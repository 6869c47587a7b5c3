//! Configuration system

use std::path::{Path, PathBuf};

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

enum ConfigFormat {
    Toml,
    Ron,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Default name of the per-directory material script
pub const DEFAULT_SCRIPT_FILE_NAME: &str = "materials.cs";

/// # Registry Configuration
///
/// Ordered list of material sources. Later sources override earlier ones by
/// material name, so put level-wide scripts first and object scripts last.
///
/// ```toml
/// sources = ["levels/drivebuild/art/materials.cs", "levels/drivebuild/art/objects"]
/// script_file_name = "materials.cs"
/// recursive = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Script files or level directories, in load order
    pub sources: Vec<PathBuf>,
    /// File name matched when scanning a directory source
    pub script_file_name: String,
    /// Whether directory sources are scanned recursively
    pub recursive: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            script_file_name: DEFAULT_SCRIPT_FILE_NAME.to_string(),
            recursive: true,
        }
    }
}

impl Config for RegistryConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> RegistryConfig {
        RegistryConfig {
            sources: vec![
                PathBuf::from("levels/drivebuild/art/materials.cs"),
                PathBuf::from("levels/drivebuild/art/objects"),
            ],
            script_file_name: "materials.cs".to_string(),
            recursive: false,
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.toml");

        sample().save_to_file(&path).unwrap();
        assert_eq!(RegistryConfig::load_from_file(&path).unwrap(), sample());
    }

    #[test]
    fn test_ron_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("registry.ron");

        sample().save_to_file(&path).unwrap();
        assert_eq!(RegistryConfig::load_from_file(&path).unwrap(), sample());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("partial.toml");
        std::fs::write(&path, "sources = [\"art\"]\n").unwrap();

        let config = RegistryConfig::load_from_file(&path).unwrap();
        assert_eq!(config.sources, vec![PathBuf::from("art")]);
        assert_eq!(config.script_file_name, DEFAULT_SCRIPT_FILE_NAME);
        assert!(config.recursive);
    }

    #[test]
    fn test_unsupported_format() {
        let err = RegistryConfig::default().save_to_file("registry.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        std::fs::write(&path, "sources = [").unwrap();

        let err = RegistryConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
