//! Client config load/save for `~/.ask-chat/config.yaml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::view::WidgetLayout;
use crate::widget::{SubmissionPolicy, WidgetOptions};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Server section (base_url, timeout_secs).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ServerSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Widget section (header, placeholder, labels, submission policy).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct WidgetSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionPolicy>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub widget: WidgetSection,
}

impl Config {
    pub fn base_url(&self) -> &str {
        self.server.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    /// `None` means requests never time out.
    pub fn timeout(&self) -> Option<Duration> {
        self.server.timeout_secs.map(Duration::from_secs)
    }

    /// Widget options with unset fields filled from the defaults.
    pub fn widget_options(&self) -> WidgetOptions {
        let defaults = WidgetLayout::default();
        let w = &self.widget;
        WidgetOptions {
            layout: WidgetLayout {
                header: w.header.clone().unwrap_or(defaults.header),
                placeholder: w.placeholder.clone().unwrap_or(defaults.placeholder),
                user_label: w.user_label.clone().unwrap_or(defaults.user_label),
                bot_label: w.bot_label.clone().unwrap_or(defaults.bot_label),
            },
            policy: w.submission.unwrap_or_default(),
        }
    }
}

/// Returns the default config file path: `~/.ask-chat/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    let home = home_dir()?;
    Some(home.join(".ask-chat").join("config.yaml"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents)
}

/// Like [`load`], but a missing file yields the default config.
pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }
    load(path)
}

pub fn parse(contents: &str) -> Result<Config, ConfigError> {
    // An empty file parses as YAML null rather than an empty mapping.
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(contents)?)
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    std::fs::write(path, contents).map_err(io_err)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
