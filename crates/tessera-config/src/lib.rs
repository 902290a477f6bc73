use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static TAG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9-]*$").expect("tag name pattern compiles"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid tag name {name:?} in [{section}].{field}")]
    InvalidTagName {
        section: &'static str,
        field: &'static str,
        name: String,
    },
}

/// Overrides applied on top of plain HTML block/inline rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Tags rendered as blocks in addition to the HTML ones.
    pub block_tags: Vec<String>,
    /// Tags rendered inline even if HTML treats them as blocks.
    pub inline_tags: Vec<String>,
    /// Tags that never take children.
    pub self_closing_tags: Vec<String>,
}

/// Which nodes deletion must keep or must not merge across.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Elements with one of these classes are cleared instead of removed.
    pub unremovable_classes: Vec<String>,
    /// Elements with one of these classes are never merged with a sibling.
    pub unbreakable_classes: Vec<String>,
    pub unbreakable_tags: Vec<String>,
    /// Elements with one of these classes are deleted as a whole.
    pub non_editable_classes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema: SchemaConfig,
    pub policy: PolicyConfig,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/tessera");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Reject tag names the markup notation could never produce.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tag_lists: [(&'static str, &'static str, &[String]); 4] = [
            ("schema", "block_tags", &self.schema.block_tags),
            ("schema", "inline_tags", &self.schema.inline_tags),
            ("schema", "self_closing_tags", &self.schema.self_closing_tags),
            ("policy", "unbreakable_tags", &self.policy.unbreakable_tags),
        ];
        for (section, field, names) in tag_lists {
            if let Some(name) = names.iter().find(|name| !TAG_NAME.is_match(name)) {
                return Err(ConfigError::InvalidTagName {
                    section,
                    field,
                    name: name.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> Config {
        Config {
            schema: SchemaConfig {
                block_tags: vec!["note".to_string()],
                inline_tags: vec!["li".to_string()],
                self_closing_tags: vec!["x-embed".to_string()],
            },
            policy: PolicyConfig {
                unremovable_classes: vec!["cell".to_string()],
                unbreakable_classes: vec!["locked".to_string()],
                unbreakable_tags: vec!["td".to_string(), "th".to_string()],
                non_editable_classes: vec!["widget".to_string()],
            },
        }
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/tessera/config.toml"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let config: Config = toml::from_str("[policy]\nunbreakable_tags = [\"td\"]\n").unwrap();

        assert_eq!(config.schema, SchemaConfig::default());
        assert_eq!(config.policy.unbreakable_tags, vec!["td".to_string()]);
        assert!(config.policy.unremovable_classes.is_empty());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let config = sample();

        config.save_to_path(&config_file).unwrap();
        let loaded = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[schema\nblock_tags = 1").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_invalid_tag_name_is_rejected_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "[schema]\nblock_tags = [\"Note\"]\n").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        match err {
            ConfigError::InvalidTagName {
                section,
                field,
                name,
            } => {
                assert_eq!((section, field, name.as_str()), ("schema", "block_tags", "Note"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_accepts_custom_elements() {
        let mut config = sample();
        config.policy.unbreakable_tags.push("my-cell2".to_string());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_checks_policy_tags() {
        let mut config = sample();
        config.policy.unbreakable_tags.push("2td".to_string());

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTagName {
                field: "unbreakable_tags",
                ..
            })
        ));
    }
}
