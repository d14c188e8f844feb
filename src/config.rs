use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-user and per-project config directory
pub const CONFIG_DIR: &str = ".jobdesk";

const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace", "off"];

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Where the session is persisted
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SessionConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Activity journal settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JournalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// One config file as written on disk: every field optional so that a layer
/// only overrides what it mentions
#[derive(Debug, Clone, Deserialize, Default)]
struct ConfigLayer {
    #[serde(default)]
    api: ApiLayer,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    journal: JournalLayer,
    #[serde(default)]
    log: LogLayer,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct ApiLayer {
    base_url: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct JournalLayer {
    enabled: Option<bool>,
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct LogLayer {
    level: Option<String>,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.jobdesk/config.local.toml) > project (.jobdesk/config.toml) > user (~/.jobdesk/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            config.merge_file(&home.join(CONFIG_DIR).join("config.toml"))?;
        }

        config.merge_file(&Path::new(CONFIG_DIR).join("config.toml"))?;

        // Local overrides, should be gitignored
        config.merge_file(&Path::new(CONFIG_DIR).join("config.local.toml"))?;

        Ok(config)
    }

    /// Load configuration from a specific path on top of the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        let content = std::fs::read_to_string(path)?;
        config.merge_str(&content)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        tracing::debug!(path = %path.display(), "loading config layer");
        let content = std::fs::read_to_string(path)?;
        self.merge_str(&content)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
    }

    /// Merge a TOML layer into this config (the layer takes priority)
    pub fn merge_str(&mut self, content: &str) -> Result<()> {
        let layer: ConfigLayer = toml::from_str(content)?;

        if let Some(base_url) = layer.api.base_url {
            self.api.base_url = base_url;
        }
        if let Some(timeout_ms) = layer.api.timeout_ms {
            self.api.timeout_ms = timeout_ms;
        }
        if layer.session.path.is_some() {
            self.session.path = layer.session.path;
        }
        if let Some(enabled) = layer.journal.enabled {
            self.journal.enabled = enabled;
        }
        if layer.journal.dir.is_some() {
            self.journal.dir = layer.journal.dir;
        }
        if let Some(level) = layer.log.level {
            self.log.level = level;
        }
        Ok(())
    }

    /// Session file, falling back to ~/.jobdesk/session.json
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session
            .path
            .clone()
            .or_else(crate::session::FileStorage::default_path)
    }

    /// Journal directory, falling back to .jobdesk/journal under the working directory
    pub fn journal_dir(&self, root: &Path) -> PathBuf {
        self.journal
            .dir
            .clone()
            .unwrap_or_else(|| root.join(CONFIG_DIR).join("journal"))
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let base_url = self.api.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            errors.push(ValidationError {
                field: "api.base_url".to_string(),
                message: format!("Must start with http:// or https://, got '{}'", base_url),
            });
        }

        if self.api.timeout_ms == 0 {
            errors.push(ValidationError {
                field: "api.timeout_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.log.level.to_lowercase().as_str()) {
            errors.push(ValidationError {
                field: "log.level".to_string(),
                message: format!(
                    "Unknown level '{}', expected one of: {}",
                    self.log.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api");
        assert_eq!(config.api.timeout_ms, 30_000);
        assert!(config.journal.enabled);
        assert_eq!(config.log.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_layer_overrides_only_mentioned_fields() {
        let mut config = Config::default();
        config
            .merge_str("[api]\nbase_url = \"https://jobs.example.com/api\"\n")
            .unwrap();
        config.merge_str("[journal]\nenabled = false\n").unwrap();

        assert_eq!(config.api.base_url, "https://jobs.example.com/api");
        assert_eq!(config.api.timeout_ms, 30_000);
        assert!(!config.journal.enabled);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[api]
timeout_ms = 5000

[session]
path = "/tmp/jobdesk-session.json"

[log]
level = "debug"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api.timeout_ms, 5000);
        assert_eq!(
            config.session_path(),
            Some(PathBuf::from("/tmp/jobdesk-session.json"))
        );
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut config = Config::default();
        assert!(config.merge_str("[api\nbase_url = 1").is_err());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = Config::default();
        config.api.base_url = "localhost:8080".to_string();
        config.api.timeout_ms = 0;
        config.log.level = "loud".to_string();
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].field.contains("base_url"));
        assert!(errors[1].message.contains("greater than 0"));
        assert!(errors[2].to_string().starts_with("[log.level]"));
    }

    #[test]
    fn test_journal_dir_default() {
        let config = Config::default();
        assert_eq!(
            config.journal_dir(Path::new("/work")),
            PathBuf::from("/work/.jobdesk/journal")
        );
    }
}
