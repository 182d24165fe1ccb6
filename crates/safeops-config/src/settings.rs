//! Run settings.
//!
//! Settings are read from a YAML file (by default `.safeops/config.yml`):
//!
//! ```yaml
//! logging:
//!   enable_local_files: true
//!   directory: .safeops/logs
//! workflows_dir: workflows
//! temp_root: .
//! ```
//!
//! A missing file yields the defaults: local log files disabled, workflows
//! looked up by the caller's default, ephemeral artifacts under the current
//! directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors that can occur while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
  /// The settings file exists but could not be read.
  #[error("failed to read settings file '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The settings file is not valid YAML for [`Settings`].
  #[error("failed to parse settings file '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },
}

/// Persistent log file configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
  /// Write the run log and step artifacts into `directory`.
  pub enable_local_files: bool,
  /// Directory for the run log. Ignored unless `enable_local_files` is set.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub directory: Option<PathBuf>,
}

/// Settings for a SafeOps run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub logging: LoggingSettings,
  /// Directory searched for `<name>.json` workflow files.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub workflows_dir: Option<PathBuf>,
  /// Root under which ephemeral run directories are created.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub temp_root: Option<PathBuf>,
}

impl Settings {
  /// Load settings from a YAML file, falling back to defaults if it does not exist.
  pub async fn load(path: &Path) -> Result<Self, SettingsError> {
    let content = match tokio::fs::read_to_string(path).await {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
      Err(source) => {
        return Err(SettingsError::Read {
          path: path.to_path_buf(),
          source,
        });
      }
    };

    Self::from_yaml(&content).map_err(|source| SettingsError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Parse settings from a YAML string. An empty document yields the defaults.
  pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
    if content.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(content)
  }

  /// Apply command line logging flags on top of the file settings.
  pub fn with_log_overrides(mut self, enable: bool, directory: Option<PathBuf>) -> Self {
    self.logging.enable_local_files |= enable;
    if directory.is_some() {
      self.logging.directory = directory;
    }
    self
  }

  /// The persistent log directory, if local log files are enabled.
  /// Falls back to `default` when no directory is configured.
  pub fn log_dir_or(&self, default: impl FnOnce() -> PathBuf) -> Option<PathBuf> {
    if !self.logging.enable_local_files {
      return None;
    }
    Some(self.logging.directory.clone().unwrap_or_else(default))
  }
}
