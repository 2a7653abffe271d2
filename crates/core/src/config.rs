//! Application configuration handling.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_DIR: &str = "valuesort";
const CONFIG_FILE: &str = "config.toml";

const DEFAULT_CONFIG: &str = r#"# valuesort configuration
#
# Directory where the save file is kept. Defaults to the platform config
# directory, e.g. ~/.config/valuesort on Linux.
# data_root = "/home/user/.config/valuesort"

# Path to a cards JSON file ({ "cards": [{ "name", "description" }, ...] })
# overriding the built-in value set.
# dataset_path = "/path/to/cards.json"

# URL to fetch the cards JSON from once at startup. Takes precedence over
# dataset_path.
# dataset_url = "https://example.com/data/cards.json"
"#;

/// User-tunable settings loaded from `config.toml` and the
/// `VALUESORT_*` environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the save file.
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    /// Optional path to a local cards JSON file.
    #[serde(default)]
    pub dataset_path: Option<PathBuf>,
    /// Optional URL to fetch the cards JSON from at startup.
    #[serde(default)]
    pub dataset_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            dataset_path: None,
            dataset_url: None,
        }
    }
}

impl AppConfig {
    /// Location of the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Load configuration from disk and environment, falling back to
    /// defaults for anything unset.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut builder = config::Config::builder();
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("VALUESORT"))
            .build()
            .context("failed to assemble configuration")?;
        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse {}", path.display()))
    }
}

/// Write a commented default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn default_data_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(input: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(input, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.data_root, default_data_root());
        assert!(config.dataset_path.is_none());
        assert!(config.dataset_url.is_none());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = parse(
            r#"
data_root = "/tmp/valuesort"
dataset_url = "https://example.com/cards.json"
"#,
        );
        assert_eq!(config.data_root, PathBuf::from("/tmp/valuesort"));
        assert_eq!(
            config.dataset_url.as_deref(),
            Some("https://example.com/cards.json")
        );
    }

    #[test]
    fn default_config_template_parses() {
        let config = parse(DEFAULT_CONFIG);
        assert!(config.dataset_path.is_none());
    }
}
