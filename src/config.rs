//! Configuration loading and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name searched for from the current directory upwards
pub const CONFIG_FILE_NAME: &str = "pipeboard.toml";

/// Project configuration (pipeboard.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Config file this was read from, or where `init` will write it
    #[serde(skip)]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project_name")]
    pub name: String,
}

fn default_project_name() -> String {
    "pipeline-onboarding".to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_project_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Backing JSON document
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data.json")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

impl Config {
    /// Load config from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(PathBuf::from)
            .or_else(Self::find_config)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        if !config_path.exists() {
            // Defaults, rooted where the config would live
            return Ok(Config {
                file: config_path,
                ..Config::default()
            });
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", config_path.display()))?;
        tracing::debug!(path = %config_path.display(), "loaded config");
        config.file = config_path;
        Ok(config)
    }

    /// Find config file by walking up directory tree
    fn find_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let config_path = current.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Location of this project's config file
    pub fn config_path(&self) -> PathBuf {
        if self.file.as_os_str().is_empty() {
            PathBuf::from(CONFIG_FILE_NAME)
        } else {
            self.file.clone()
        }
    }

    /// Directory relative paths resolve against
    pub fn root(&self) -> PathBuf {
        self.file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Resolved backing document path
    pub fn data_path(&self) -> PathBuf {
        self.root().join(&self.paths.data_file)
    }

    /// Generate default config TOML
    pub fn default_toml() -> &'static str {
        r#"[project]
name = "pipeline-onboarding"

[paths]
# Backing JSON document, relative to this file
data_file = "data.json"
"#
    }
}
