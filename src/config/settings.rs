use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::exec::ToolPrograms;
use crate::security::{ProtectedResourceSet, DEFAULT_PROTECTED_RESOURCES};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "GW_CONFIG";

pub const DEFAULT_RATE_LIMIT_WARN_THRESHOLD: u64 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Config directory not found")]
    DirectoryNotFound,

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Process-wide settings. Loaded once at startup and never mutated after.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub safety: SafetyConfig,
    pub execution: ExecutionConfig,
    pub github: GithubConfig,
    pub tools: ToolsConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SafetyConfig {
    pub protected_resources: Vec<String>,
    pub rate_limit_warn_threshold: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct ExecutionConfig {
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GithubConfig {
    /// `owner/name`, passed to gh as `--repo`
    pub repo: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    pub git: String,
    pub gh: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            protected_resources: DEFAULT_PROTECTED_RESOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rate_limit_warn_threshold: DEFAULT_RATE_LIMIT_WARN_THRESHOLD,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let programs = ToolPrograms::default();
        Self {
            git: programs.git,
            gh: programs.gh,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::DirectoryNotFound)?;
        Ok(PathBuf::from(home).join(".config").join("gw"))
    }

    /// Get the config file path, honouring `GW_CONFIG`
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// A missing file is not an error: gw runs on defaults until the user
    /// writes one.
    pub fn load() -> Result<Self, ConfigError> {
        let path = match Self::config_path() {
            Ok(path) => path,
            Err(ConfigError::DirectoryNotFound) => return Ok(Self::default_config()),
            Err(e) => return Err(e),
        };

        if !path.exists() {
            return Ok(Self::default_config());
        }

        Self::load_from(&path)
    }

    /// Load and validate a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config {
            safety: SafetyConfig::default(),
            execution: ExecutionConfig::default(),
            github: GithubConfig::default(),
            tools: ToolsConfig::default(),
            audit: AuditConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(name) = self
            .safety
            .protected_resources
            .iter()
            .find(|name| name.trim().is_empty() || name.trim() != name.as_str())
        {
            return Err(ConfigError::InvalidValue(format!(
                "protected resource names must be non-empty with no surrounding whitespace: {:?}",
                name
            )));
        }

        if self.execution.timeout_seconds == Some(0) {
            return Err(ConfigError::InvalidValue(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.tools.git.trim().is_empty() || self.tools.gh.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "tool programs must not be empty".to_string(),
            ));
        }

        if let Some(repo) = &self.github.repo {
            let valid = repo
                .split_once('/')
                .is_some_and(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'));
            if !valid {
                return Err(ConfigError::InvalidValue(format!(
                    "github.repo must look like owner/name, got: {}",
                    repo
                )));
            }
        }

        Ok(())
    }

    pub fn protected_set(&self) -> ProtectedResourceSet {
        ProtectedResourceSet::new(self.safety.protected_resources.iter().cloned())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.execution.timeout_seconds.map(Duration::from_secs)
    }

    pub fn tool_programs(&self) -> ToolPrograms {
        ToolPrograms {
            git: self.tools.git.clone(),
            gh: self.tools.gh.clone(),
        }
    }

    /// Audit log location, or None when auditing is switched off
    pub fn audit_log_path(&self) -> Option<PathBuf> {
        if !self.audit.enabled {
            return None;
        }
        match &self.audit.path {
            Some(path) => Some(path.clone()),
            None => Self::config_dir().ok().map(|dir| dir.join("history.log")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(
            config.safety.protected_resources,
            vec!["main", "master", "production", "staging"]
        );
        assert_eq!(config.safety.rate_limit_warn_threshold, 100);
        assert_eq!(config.timeout(), None);
        assert!(config.audit.enabled);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default_config().validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::from_toml(
            r#"
            [safety]
            protected_resources = ["release"]
            "#,
        )
        .unwrap();

        assert_eq!(config.safety.protected_resources, vec!["release"]);
        assert_eq!(config.safety.rate_limit_warn_threshold, 100);
        assert_eq!(config.tools.gh, "gh");
        assert!(config.protected_set().is_protected("release"));
        assert!(!config.protected_set().is_protected("main"));
    }

    #[test]
    fn test_full_file() {
        let config = Config::from_toml(
            r#"
            [safety]
            protected_resources = ["main", "production"]
            rate_limit_warn_threshold = 250

            [execution]
            timeout_seconds = 600

            [github]
            repo = "acme/site"

            [tools]
            git = "/usr/bin/git"
            gh = "gh"

            [audit]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.safety.rate_limit_warn_threshold, 250);
        assert_eq!(config.timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.github.repo.as_deref(), Some("acme/site"));
        assert_eq!(config.tool_programs().git, "/usr/bin/git");
        assert_eq!(config.audit_log_path(), None);
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default_config();
        config.execution.timeout_seconds = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_blank_protected_name() {
        let mut config = Config::default_config();
        config.safety.protected_resources.push("  ".to_string());
        assert!(config.validate().is_err());

        let mut config = Config::default_config();
        config.safety.protected_resources.push("main ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_repo_format() {
        let mut config = Config::default_config();
        config.github.repo = Some("just-a-name".to_string());
        assert!(config.validate().is_err());

        config.github.repo = Some("a/b/c".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Config::from_toml("[safety\nprotected_resources = 1"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[safety]\nrate_limit_warn_threshold = 42\n\n[tools]\ngh = \"/opt/gh\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();

        let mut expected = Config::default_config();
        expected.safety.rate_limit_warn_threshold = 42;
        expected.tools.gh = "/opt/gh".to_string();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_explicit_audit_path() {
        let mut config = Config::default_config();
        config.audit.path = Some(PathBuf::from("/tmp/gw-audit.log"));
        assert_eq!(config.audit_log_path(), Some(PathBuf::from("/tmp/gw-audit.log")));
    }
}
