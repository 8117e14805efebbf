//! File-backed settings
//!
//! Renderer and application settings are plain serde structs. [`Config`]
//! gives them TOML and RON persistence, picking the format from the file
//! extension.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// On-disk settings format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Format for `path`, by extension
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        match Path::new(path).extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_string())),
        }
    }

    fn parse<T: for<'de> Deserialize<'de>>(self, text: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    fn render<T: Serialize>(self, value: &T) -> Result<String, ConfigError> {
        match self {
            Self::Toml => {
                toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// Settings that can be read from and written to a `.toml` or `.ron` file
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Read settings from `path`
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path)?;
        format.parse(&text)
    }

    /// Read settings from `path`, or the defaults if there is no such file
    fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if Path::new(path).exists() {
            Self::load_from_file(path)
        } else {
            log::info!("Config file {path} not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Write settings to `path`
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let text = ConfigFormat::from_path(path)?.render(self)?;
        std::fs::write(path, text)?;
        log::debug!("Saved config to {path}");
        Ok(())
    }
}

/// Failure to read, write or accept settings
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File contents do not match the settings type
    #[error("Parse error: {0}")]
    Parse(String),

    /// Settings could not be encoded
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Extension is neither `.toml` nor `.ron`
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside the range the renderer accepts
    #[error("Invalid configuration: {0}")]
    Validation(String),
}
