//! Layered configuration.
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults.
//! 2. A TOML file: `config.toml` in the platform config directory, or an
//!    explicit path.
//! 3. Environment variables prefixed `GALLERY_`, with `__` separating nested
//!    keys (`GALLERY_GITHUB__TOKEN` sets `github.token`).

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "GALLERY_";
pub const FILE_NAME: &str = "config.toml";

/// Largest file the hosting contents API accepts in one write.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub github: GithubConfig,
    pub repository: RepositoryConfig,
    pub upload: UploadConfig,
}

/// Where the hosting service lives and who to talk to it as.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
    pub raw_base: String,
    pub web_base: String,
    pub username: Option<String>,
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            web_base: "https://github.com".to_string(),
            username: None,
            token: None,
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_base", &self.api_base)
            .field("raw_base", &self.raw_base)
            .field("web_base", &self.web_base)
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    pub name: String,
    /// Only used when the repository has to be created.
    pub description: String,
    pub branch: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            name: "github-media-gallery".to_string(),
            description: "Repository for storing media from GitHub Media Gallery".to_string(),
            branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Bytes.
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

/// `config.toml` in the platform config directory, if the platform has one.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "gallery").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

impl Config {
    /// Load and validate configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if a file is there and skipped otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::Invalid(format!("config file {} does not exist", path.display())));
                }
                tracing::debug!(path = %path.display(), "Reading configuration file");
                figment = figment.merge(Toml::file(path));
            },
            None => {
                if let Some(path) = default_path().filter(|path| path.is_file()) {
                    tracing::debug!(path = %path.display(), "Reading configuration file");
                    figment = figment.merge(Toml::file(path));
                }
            },
        }
        let config: Self = figment.merge(Env::prefixed(ENV_PREFIX).split("__")).extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("github.api_base", &self.github.api_base),
            ("github.raw_base", &self.github.raw_base),
            ("github.web_base", &self.github.web_base),
            ("repository.name", &self.repository.name),
            ("repository.branch", &self.repository.branch),
        ] {
            if value.trim().is_empty() {
                exn::bail!(ErrorKind::Invalid(format!("{key} must not be empty")));
            }
        }
        if self.repository.name.contains('/') {
            exn::bail!(ErrorKind::Invalid("repository.name is a name, not a path".to_string()));
        }
        if self.github.timeout_secs == 0 {
            exn::bail!(ErrorKind::Invalid("github.timeout_secs must be at least 1".to_string()));
        }
        if self.upload.max_file_size == 0 {
            exn::bail!(ErrorKind::Invalid("upload.max_file_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
