use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use easy_config_store::ConfigStore;
use eyre::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

pub type Config = Arc<ConfigInner>;

pub fn config(path: PathBuf) -> Result<Config> {
    let config_store = ConfigStore::<ConfigInner>::read(path, "config".to_string())?;
    let mut inner = (*config_store).clone();

    if inner.github.token.is_none()
        && let Ok(token) = std::env::var(TOKEN_ENV_VAR)
        && !token.trim().is_empty()
    {
        debug!("using github token from {}", TOKEN_ENV_VAR);
        inner.github.token = Some(token.trim().to_string());
    }

    info!("config parsing successful");
    debug!("loaded configuration:\n{}", toml::to_string_pretty(&inner.redacted())?);

    Ok(Arc::new(inner))
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct ConfigInner {
    pub github: GithubConfig,
    #[serde(default)]
    pub packages: PackagesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl ConfigInner {
    fn redacted(&self) -> ConfigInner {
        let mut copy = self.clone();
        if copy.github.token.is_some() {
            copy.github.token = Some("<redacted>".to_string());
        }
        copy
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct GithubConfig {
    pub token: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_github_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_max_contributor_pages")]
    pub max_contributor_pages: u32,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct PackagesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_npm_registry_url")]
    pub npm_registry_url: String,
    #[serde(default = "default_npm_downloads_url")]
    pub npm_downloads_url: String,
    #[serde(default = "default_pypi_url")]
    pub pypi_url: String,
    #[serde(default = "default_package_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    "repo-health".to_string()
}

fn default_github_timeout() -> u64 {
    10
}

fn default_max_retries() -> usize {
    3
}

fn default_max_contributor_pages() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

fn default_npm_registry_url() -> String {
    "https://registry.npmjs.org".to_string()
}

fn default_npm_downloads_url() -> String {
    "https://api.npmjs.org/downloads".to_string()
}

fn default_pypi_url() -> String {
    "https://pypi.org/pypi".to_string()
}

fn default_package_timeout() -> u64 {
    5
}

fn default_cache_ttl() -> u64 {
    600
}

impl Default for PackagesConfig {
    fn default() -> Self {
        PackagesConfig {
            enabled: true,
            npm_registry_url: default_npm_registry_url(),
            npm_downloads_url: default_npm_downloads_url(),
            pypi_url: default_pypi_url(),
            timeout_secs: default_package_timeout(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl Default for ConfigInner {
    fn default() -> Self {
        let cfg = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.default.toml",));

        toml::from_str(cfg).unwrap() // should be okay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_embedded_default_parses() {
        let config = ConfigInner::default();
        assert_eq!(config.github.token, None);
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.cache.ttl(), Duration::from_secs(600));
        assert!(config.packages.enabled);
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: ConfigInner = toml::from_str("[github]\ntoken = \"abc\"\n").unwrap();
        assert_eq!(config.github.token.as_deref(), Some("abc"));
        assert_eq!(config.github.timeout_secs, 10);
        assert_eq!(config.github.max_contributor_pages, 100);
        assert_eq!(config.packages, PackagesConfig::default());
        assert_eq!(config.cache.ttl_secs, 600);
    }

    #[test]
    fn test_redacted_hides_token() {
        let mut config = ConfigInner::default();
        config.github.token = Some("ghp_secret".to_string());
        let rendered = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!rendered.contains("ghp_secret"));
    }
}
