use crate::error::{AutoGitError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub git: GitConfig,
    pub settings: SettingsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_url: String,
    /// Request timeout in seconds; unset means the request may wait forever.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GitConfig {
    pub branch: String,
    pub remote_name: String,
    pub commit_message: String,
    pub author_name: String,
    pub author_email: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsConfig {
    pub remember_username: bool,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
            remote_name: "origin".to_string(),
            commit_message: "Initial commit".to_string(),
            author_name: "AutoGit".to_string(),
            author_email: "autogit@localhost".to_string(),
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            remember_username: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(AutoGitError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| AutoGitError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| AutoGitError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["autogit.toml", ".autogit.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref api_url) = cli_args.api_url {
            self.github.api_url = api_url.clone();
        }

        if let Some(ref branch) = cli_args.branch {
            self.git.branch = branch.clone();
        }

        if cli_args.forget_username {
            self.settings.remember_username = false;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| AutoGitError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| AutoGitError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let api_url = Url::parse(&self.github.api_url).map_err(|e| AutoGitError::Config {
            message: format!("Invalid GitHub API URL '{}': {}", self.github.api_url, e),
        })?;

        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(AutoGitError::Config {
                message: format!("GitHub API URL must use http or https: {}", api_url),
            });
        }

        if self.github.timeout_secs == Some(0) {
            return Err(AutoGitError::Config {
                message: "GitHub timeout must be greater than 0".to_string(),
            });
        }

        if self.git.branch.trim().is_empty() {
            return Err(AutoGitError::Config {
                message: "Git branch name must not be empty".to_string(),
            });
        }

        if self.git.remote_name.trim().is_empty() {
            return Err(AutoGitError::Config {
                message: "Git remote name must not be empty".to_string(),
            });
        }

        if self.git.commit_message.trim().is_empty() {
            return Err(AutoGitError::Config {
                message: "Commit message must not be empty".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub branch: Option<String>,
    pub forget_username: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_forget_username(mut self, forget: bool) -> Self {
        self.forget_username = forget;
        self
    }
}
