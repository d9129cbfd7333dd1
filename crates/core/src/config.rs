//! Application configuration loaded from `config.toml` and the environment.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Directory under the user's config directory used for all lvl state.
pub const APP_DIR: &str = "lvl";
/// File name of the catalog database.
pub const DATABASE_FILE: &str = "steam_games.db";
/// File name of the optional configuration file.
pub const CONFIG_FILE: &str = "config.toml";
/// Public Steam Web API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.steampowered.com";
/// Prefix for environment overrides, e.g. `LVL_DATABASE_PATH`.
pub const ENV_PREFIX: &str = "LVL";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# lvl configuration
#
# Every key may also be set through the environment, e.g. LVL_VERIFY_ONLINE=true.

# Location of the catalog database. Defaults to <config dir>/lvl/steam_games.db.
# database_path = "/home/me/.config/lvl/steam_games.db"

# Steam Web API host.
api_base_url = "https://api.steampowered.com"

# Seconds to wait for a Steam Web API response.
request_timeout_secs = 30

# Ask Steam to confirm the account exists before syncing.
verify_online = false

# What a re-sync does with games already in the catalog:
#   "keep-first" leaves the stored name and playtime untouched
#   "refresh"    overwrites them with the values Steam reports now
playtime_policy = "keep-first"
"#;

/// How a re-sync treats Steam games already present in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaytimePolicy {
    /// Insert-or-ignore: the first synchronisation of an app id wins.
    #[default]
    KeepFirst,
    /// Overwrite name and playtime with the latest reported values.
    Refresh,
}

/// Runtime settings for the catalog and the Steam client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path of the SQLite catalog.
    pub database_path: PathBuf,
    /// Base URL of the Steam Web API.
    pub api_base_url: String,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Whether to run the live account lookup before syncing.
    pub verify_online: bool,
    /// Re-sync behaviour for existing Steam rows.
    pub playtime_policy: PlaytimePolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_online: false,
            playtime_policy: PlaytimePolicy::KeepFirst,
        }
    }
}

impl AppConfig {
    /// Load the configuration file (if any) followed by `LVL_*` environment overrides.
    pub fn load() -> Result<Self, Error> {
        Self::build(&config_file_path(), true)
    }

    /// Load a specific configuration file without consulting the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        Self::build(path.as_ref(), false)
    }

    fn build(path: &Path, with_env: bool) -> Result<Self, Error> {
        let defaults = Self::default();
        let mut builder = config::Config::builder()
            .set_default(
                "database_path",
                defaults.database_path.to_string_lossy().to_string(),
            )?
            .set_default("api_base_url", defaults.api_base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("verify_online", defaults.verify_online)?
            .set_default("playtime_policy", "keep-first")?
            .add_source(config::File::from(path).required(false));

        if with_env {
            builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
        }

        let config: Self = builder.build()?.try_deserialize()?;
        if config.api_base_url.trim().is_empty() {
            return Err(Error::Config("api_base_url must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Root directory for lvl state, honouring `XDG_CONFIG_HOME`.
pub fn config_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Location of `config.toml`.
pub fn config_file_path() -> PathBuf {
    config_root().join(CONFIG_FILE)
}

/// Default location of the catalog database.
pub fn default_database_path() -> PathBuf {
    config_root().join(DATABASE_FILE)
}

/// Directory the front end writes log files into.
pub fn log_dir() -> PathBuf {
    config_root().join("logs")
}

/// Write a commented default `config.toml` unless one already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = config_file_path();
    write_default_config(&path)?;
    Ok(path)
}

fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_template_parses_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);
        write_default_config(&path)?;
        assert!(path.is_file());

        let config = AppConfig::from_file(&path)?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn existing_config_is_not_overwritten() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "verify_online = true\n")?;
        write_default_config(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "verify_online = true\n");
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        let db = dir.path().join("catalog.db");
        fs::write(
            &path,
            format!(
                "database_path = {:?}\nrequest_timeout_secs = 5\nplaytime_policy = \"refresh\"\n",
                db.to_string_lossy()
            ),
        )?;

        let config = AppConfig::from_file(&path)?;
        assert_eq!(config.database_path, db);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.playtime_policy, PlaytimePolicy::Refresh);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        Ok(())
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let config = AppConfig::from_file(dir.path().join("absent.toml"))?;
        assert_eq!(config.database_path, default_database_path());
        assert!(config.database_path.ends_with("lvl/steam_games.db"));
        Ok(())
    }

    #[test]
    fn empty_base_url_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "api_base_url = \"  \"\n")?;
        let err = AppConfig::from_file(&path).expect_err("blank base url must fail");
        assert!(matches!(err, Error::Config(_)));
        Ok(())
    }
}
