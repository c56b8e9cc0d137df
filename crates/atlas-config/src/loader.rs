//! Configuration loading with environment variable overrides.

use crate::schema::Config;
use atlas_common::{AtlasError, LogFormat, Result as AtlasResult};
use atlas_i18n::Locale;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "ATLAS_CONFIG_PATH";

/// Files checked, in order, when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["atlas.yaml", "atlas.yml", "atlas.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// File extension is neither YAML nor TOML
    #[error("Unsupported configuration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {message}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// What was wrong with the value
        message: String,
    },
}

impl From<ConfigError> for AtlasError {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        AtlasError::config_with_source(message, err)
    }
}

/// File syntax, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl ConfigFormat {
    /// Detects the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses configuration text without overrides or validation.
    pub fn parse_str(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
        Ok(match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        })
    }

    /// Loads a file, applies environment overrides and validates the result.
    pub fn load_config<P: AsRef<Path>>(path: P) -> AtlasResult<Config> {
        Self::load_config_with(path, |var| env::var(var).ok())
    }

    /// Like [`ConfigLoader::load_config`], reading overrides from `lookup`.
    pub fn load_config_with<P, F>(path: P, lookup: F) -> AtlasResult<Config>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let content = std::fs::read_to_string(path).map_err(ConfigError::from)?;
        let mut config = Self::parse_str(&content, format)?;
        debug!(path = %path.display(), ?format, "Parsed configuration file");

        Self::apply_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from `ATLAS_CONFIG_PATH`, then the default file names, then
    /// built-in defaults. Overrides and validation apply in every case.
    pub fn load() -> AtlasResult<Config> {
        match Self::resolve_path() {
            Some(path) => Self::load_config(path),
            None => Self::load_defaults_with(|var| env::var(var).ok()),
        }
    }

    /// The file [`ConfigLoader::load`] would read, if any.
    pub fn resolve_path() -> Option<PathBuf> {
        Self::resolve_path_with(|var| env::var(var).ok())
    }

    /// Like [`ConfigLoader::resolve_path`], reading `ATLAS_CONFIG_PATH`
    /// through `lookup`.
    pub fn resolve_path_with<F>(lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(config_path) = lookup(CONFIG_PATH_VAR) {
            debug!(path = %config_path, "Configuration path taken from {}", CONFIG_PATH_VAR);
            return Some(PathBuf::from(config_path));
        }

        DEFAULT_CONFIG_FILES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Built-in defaults with overrides from `lookup`, validated.
    pub fn load_defaults_with<F>(lookup: F) -> AtlasResult<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        Self::apply_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `ATLAS_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ATLAS_CASES_PATH") {
            config.sources.cases_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("ATLAS_POLYGONS_PATH") {
            config.sources.polygons_path = PathBuf::from(path);
        }

        if let Some(max_date) = lookup("ATLAS_MAX_DATE") {
            config.filter.max_date = max_date;
        }

        // An empty value disables the exclusion.
        if let Some(prefix) = lookup("ATLAS_EXCLUDED_PREFIX") {
            config.filter.excluded_code_prefix = Some(prefix);
        }

        if let Some(palette) = lookup("ATLAS_PALETTE") {
            config.choropleth.palette = palette;
        }

        if let Some(language) = lookup("ATLAS_LANGUAGE") {
            config.display.language =
                Locale::from_code(&language).ok_or_else(|| ConfigError::EnvParseError {
                    var: "ATLAS_LANGUAGE".to_string(),
                    message: format!("unsupported language '{language}'"),
                })?;
        }

        if let Some(directory) = lookup("ATLAS_OUTPUT_DIR") {
            config.output.directory = PathBuf::from(directory);
        }

        if let Some(level) = lookup("ATLAS_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(format) = lookup("ATLAS_LOG_FORMAT") {
            config.logging.format = match format.to_ascii_lowercase().as_str() {
                "pretty" => LogFormat::Pretty,
                "compact" => LogFormat::Compact,
                "json" => LogFormat::Json,
                _ => {
                    return Err(ConfigError::EnvParseError {
                        var: "ATLAS_LOG_FORMAT".to_string(),
                        message: format!("expected pretty, compact or json, got '{format}'"),
                    })
                }
            };
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_common::test_utils::{config_fixtures, write_temp_file};
    use atlas_common::JoinKeyNormalization;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_load_minimal_yaml_uses_defaults() {
        let file = write_temp_file(config_fixtures::minimal_config_yaml().as_bytes(), ".yaml");
        let config = ConfigLoader::load_config_with(file.path(), no_env).unwrap();

        assert_eq!(config.filter.max_date, "2024-01-03");
        assert_eq!(config.filter.excluded_prefix(), Some("OWID"));
        assert_eq!(config.choropleth.palette, "YlOrRd_09");
        assert_eq!(config.display.language, Locale::Spanish);
    }

    #[test]
    fn test_load_full_yaml() {
        let file = write_temp_file(config_fixtures::full_config_yaml().as_bytes(), ".yml");
        let config = ConfigLoader::load_config_with(file.path(), no_env).unwrap();

        assert_eq!(config.sources.cases_path, PathBuf::from("datos/owid-covid-data.zip"));
        assert_eq!(config.choropleth.palette, "Blues_09");
        assert_eq!(
            config.choropleth.legend_caption.as_deref(),
            Some("Total cases by country")
        );
        assert_eq!(
            config.choropleth.join_key_normalization,
            JoinKeyNormalization::TrimUppercase
        );
        assert_eq!(config.display.language, Locale::English);
        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn test_load_toml_with_custom_palette() {
        let file = write_temp_file(config_fixtures::custom_palette_toml().as_bytes(), ".toml");
        let config = ConfigLoader::load_config_with(file.path(), no_env).unwrap();

        assert!(config.choropleth.uses_custom_palette());
        assert_eq!(
            config.choropleth.custom_palette,
            Some(vec!["#ffffff".to_string(), "#ff0000".to_string()])
        );
    }

    #[test]
    fn test_invalid_yaml() {
        let file = write_temp_file("filter:\n  max_date: [unclosed".as_bytes(), ".yaml");
        let err = ConfigLoader::load_config_with(file.path(), no_env).unwrap_err();
        assert!(matches!(err, AtlasError::Config { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp_file("{}".as_bytes(), ".json");
        let err = ConfigLoader::load_config_with(file.path(), no_env).unwrap_err();
        assert!(err.to_string().contains("Unsupported configuration format"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = ConfigLoader::load_config_with("/nonexistent/path/atlas.yaml", no_env).unwrap_err();
        assert!(matches!(err, AtlasError::Config { .. }));
    }

    #[test]
    fn test_validation_runs_after_parse() {
        let file = write_temp_file("filter:\n  max_date: \"yesterday\"\n".as_bytes(), ".yaml");
        let err = ConfigLoader::load_config_with(file.path(), no_env).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_environment_overrides() {
        let file = write_temp_file(config_fixtures::full_config_yaml().as_bytes(), ".yaml");
        let lookup = env_from(&[
            ("ATLAS_CASES_PATH", "other.csv"),
            ("ATLAS_MAX_DATE", "2023-12-31"),
            ("ATLAS_EXCLUDED_PREFIX", ""),
            ("ATLAS_PALETTE", "Reds_09"),
            ("ATLAS_LANGUAGE", "es"),
            ("ATLAS_OUTPUT_DIR", "elsewhere"),
            ("ATLAS_LOG_LEVEL", "trace"),
        ]);
        let config = ConfigLoader::load_config_with(file.path(), lookup).unwrap();

        assert_eq!(config.sources.cases_path, PathBuf::from("other.csv"));
        assert_eq!(config.filter.max_date, "2023-12-31");
        assert_eq!(config.filter.excluded_prefix(), None);
        assert_eq!(config.choropleth.palette, "Reds_09");
        assert_eq!(config.display.language, Locale::Spanish);
        assert_eq!(config.output.directory, PathBuf::from("elsewhere"));
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_env_parse_error() {
        let mut config = Config::default();
        let err = ConfigLoader::apply_overrides(&mut config, env_from(&[("ATLAS_LANGUAGE", "fr")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref var, .. } if var == "ATLAS_LANGUAGE"));
    }

    #[test]
    fn test_overridden_palette_is_validated() {
        let err = ConfigLoader::load_defaults_with(env_from(&[("ATLAS_PALETTE", "Rainbow")]))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_config_path_variable_wins() {
        let path = ConfigLoader::resolve_path_with(env_from(&[(CONFIG_PATH_VAR, "custom.toml")]));
        assert_eq!(path, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.YAML")), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), Some(ConfigFormat::Toml));
        assert_eq!(ConfigFormat::from_path(Path::new("a")), None);
    }
}
