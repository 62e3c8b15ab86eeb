//! Configuration file support

use parlor_client::DEFAULT_ENDPOINT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default cap on composer growth, in text rows
pub const DEFAULT_MAX_INPUT_LINES: u16 = 8;

/// Configuration for parlor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the chat backend
    pub endpoint: String,
    /// Interpret bot replies as Markdown
    pub markdown: bool,
    /// Color theme: "dark" or "light"
    pub theme: String,
    /// Bot greeting shown after the conversation is reset
    pub welcome_message: Option<String>,
    /// How many rows the composer may grow to
    pub max_input_lines: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            markdown: true,
            theme: "dark".to_string(),
            welcome_message: None,
            max_input_lines: DEFAULT_MAX_INPUT_LINES,
        }
    }
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parlor")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for PARLOR_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("PARLOR_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
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

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        fs::write(&path, example_config())?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# parlor configuration file
# Place at ~/.config/parlor/config.toml (Linux) or set PARLOR_CONFIG_PATH

# Base URL of the chat backend. Messages are POSTed to "<endpoint>/",
# and the conversation is reset with "<endpoint>/clear".
endpoint = "http://127.0.0.1:5000"

# Render bot replies as Markdown (headings, emphasis, lists, code, links)
markdown = true

# Color theme: "dark" or "light"
theme = "dark"

# Greeting shown after the conversation is reset (optional)
# welcome_message = "Hello! How can I help you today?"

# Maximum rows the message box grows to before scrolling
max_input_lines = 8
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(config, Config::default());
        assert_eq!(config.endpoint, "http://127.0.0.1:5000");
        assert!(config.markdown);
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = \"http://chat.local:8080\"\nmarkdown = false\n").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.endpoint, "http://chat.local:8080");
        assert!(!config.markdown);
        assert_eq!(config.max_input_lines, DEFAULT_MAX_INPUT_LINES);
    }

    #[test]
    fn test_written_config_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            theme: "light".into(),
            welcome_message: Some("Hi there".into()),
            ..Config::default()
        };
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = [").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }
}
