use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::constants;

/// User preferences persisted in `prefs.toml` under the platform config dir.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq, Eq)]
pub struct Config {
  pub theme_name: Option<String>,
  pub api_url: Option<String>,
  pub debounce_ms: Option<u64>,
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "vedstream")
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file)
        && let Ok(config) = toml::from_str(&content)
      {
        return config;
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }
}

/// Where the rolling log file lives. Falls back to the temp dir when no home is known.
pub fn log_dir() -> PathBuf {
  project_dirs().map(|d| d.data_local_dir().join("logs")).unwrap_or_else(|| std::env::temp_dir().join("vedstream"))
}

/// Effective runtime settings after layering CLI/env over preferences over built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
  pub api_url: String,
  pub debounce: Duration,
}

impl Settings {
  pub fn resolve(cli_api_url: Option<String>, cli_debounce_ms: Option<u64>, config: &Config) -> Self {
    let api_url = cli_api_url
      .or_else(|| config.api_url.clone())
      .filter(|u| !u.trim().is_empty())
      .unwrap_or_else(|| constants().default_api_url.clone());
    let debounce = cli_debounce_ms.or(config.debounce_ms).map(Duration::from_millis).unwrap_or(constants().debounce());
    Self { api_url, debounce }
  }
}
