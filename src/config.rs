//! Configuration for the planning schema tools
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (planning-spec.toml)
//! - Environment variables (PLANNING_SPEC__*)
//!
//! ## Example config file (planning-spec.toml):
//! ```toml
//! [store]
//! path = "./data/specification.json"
//!
//! [output]
//! format = "pretty"
//!
//! [validation]
//! check_formats = false
//!
//! [schema]
//! dialect = "https://json-schema.org/draft/2020-12/schema"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::schema::DEFAULT_DIALECT;
use crate::validate::ValidatorOptions;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpecConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub schema: SchemaConfig,
}

/// Where the record bundle lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// JSON or TOML record bundle
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationConfig {
    /// Check `format` annotations when validating
    #[serde(default)]
    pub check_formats: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// `$schema` URI for generated application schemas
    #[serde(default = "default_dialect")]
    pub dialect: String,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("specification.json")
}

fn default_dialect() -> String {
    DEFAULT_DIALECT.to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
        }
    }
}

impl OutputFormat {
    /// Render a serializable value in this format
    pub fn render<T: Serialize>(&self, value: &T) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

impl ValidationConfig {
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            check_formats: self.check_formats,
        }
    }
}

impl SpecConfig {
    /// Load configuration, layering an explicit file over the defaults.
    /// `None` reads the default locations only.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_locations = [
            "planning-spec.toml",
            ".planning-spec.toml",
            "config/planning-spec.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("uk", "planning", "planning-spec") {
            let xdg_config = config_dir.config_dir().join("planning-spec.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("PLANNING_SPEC")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }

    /// Store path, resolved against the working directory
    pub fn store_path(&self) -> PathBuf {
        if self.store.path.is_absolute() {
            self.store.path.clone()
        } else {
            std::env::current_dir()
                .unwrap_or_default()
                .join(&self.store.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SpecConfig::default();
        assert_eq!(config.output.format, OutputFormat::Pretty);
        assert!(!config.validation.check_formats);
        assert_eq!(config.schema.dialect, DEFAULT_DIALECT);
    }

    #[test]
    fn test_serialize_config() {
        let config = SpecConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[validation]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[store]\npath = \"/srv/spec.json\"\n\n[output]\nformat = \"compact\"\n\n[validation]\ncheck_formats = true\n",
        )
        .unwrap();

        let config = SpecConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.store_path(), PathBuf::from("/srv/spec.json"));
        assert_eq!(config.output.format, OutputFormat::Compact);
        assert!(config.validation.validator_options().check_formats);
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = SpecConfig::default();
        config.output.format = OutputFormat::Compact;
        config.save(&path).unwrap();

        let loaded = SpecConfig::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.output.format, OutputFormat::Compact);
    }
}
