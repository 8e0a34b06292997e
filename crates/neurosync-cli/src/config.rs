//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use neurosync_ai::API_KEY_ENV_VAR;

/// Configuration for neurosync
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model override
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Voice interface settings
    #[serde(default)]
    pub voice: VoiceConfig,
    /// API keys (alternative to environment variables)
    #[serde(default)]
    pub api_keys: ApiKeys,
}

/// Voice interface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Whether speech output and capture are enabled
    pub enabled: bool,
    /// Speech-to-text program to look up on $PATH
    pub recognizer: Option<String>,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recognizer: None,
        }
    }
}

/// API key configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub groq: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("neurosync")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for NEUROSYNC_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("NEUROSYNC_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from file
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            model: Some(neurosync_ai::DEFAULT_MODEL.to_string()),
            temperature: None,
            voice: VoiceConfig::default(),
            api_keys: ApiKeys::default(),
        };

        default_config.save()?;
        Ok(path)
    }

    /// Get the Groq API key, checking config then environment
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_keys.groq {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var(API_KEY_ENV_VAR).ok()
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# neurosync configuration file
# Place at ~/.config/neurosync/config.toml (Linux/Mac) or %APPDATA%\neurosync\config.toml (Windows)

# Model to use
model = "llama-3.3-70b-versatile"

# Sampling temperature (optional)
# temperature = 0.7

[voice]
# Whether replies are spoken and voice capture is offered (on by default)
enabled = true

# Speech-to-text program to use for voice capture (optional)
# recognizer = "hear"

# API keys (optional - can also use environment variables)
# It's recommended to use environment variables instead for security
[api_keys]
# groq = "gsk_..."
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            model = "llama-3.1-8b-instant"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.as_deref(), Some("llama-3.1-8b-instant"));
        assert_eq!(config.temperature, None);
        assert!(config.voice.enabled);
        assert!(config.voice.recognizer.is_none());
        assert!(config.api_keys.groq.is_none());
    }

    #[test]
    fn test_voice_section_parses() {
        let config: Config = toml::from_str(
            r#"
            temperature = 0.2

            [voice]
            enabled = false
            recognizer = "whisper-stream"

            [api_keys]
            groq = "gsk_test"
            "#,
        )
        .unwrap();

        assert_eq!(config.temperature, Some(0.2));
        assert!(!config.voice.enabled);
        assert_eq!(config.voice.recognizer.as_deref(), Some("whisper-stream"));
        assert_eq!(config.api_keys.groq.as_deref(), Some("gsk_test"));
    }

    #[test]
    fn test_example_config_is_valid_toml() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.model.as_deref(), Some("llama-3.3-70b-versatile"));
        assert!(config.voice.enabled);
    }

    #[test]
    fn test_config_key_takes_precedence_over_env() {
        let config = Config {
            api_keys: ApiKeys {
                groq: Some("gsk_from_config".to_string()),
            },
            ..Default::default()
        };
        assert_eq!(config.get_api_key().as_deref(), Some("gsk_from_config"));
    }
}
