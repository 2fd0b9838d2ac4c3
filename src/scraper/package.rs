use std::time::Duration;

use eyre::Result;
use log::{debug, info};
use reqwest::StatusCode;

use crate::models::package::{
    NpmDocument, NpmDownloadPoint, NpmPackage, PackageInfo, PypiDocument, PypiPackage,
};
use crate::scraper::github::decode;
use crate::scraper::{FetchError, PackageSource};
use crate::utils::config::Config;

/// Looks a repository name up on npm and PyPI.
pub struct PackageScraper {
    config: Config,
    client: reqwest::Client,
}

impl PackageScraper {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.github.user_agent.as_str())
            .timeout(Duration::from_secs(config.packages.timeout_secs))
            .build()?;

        Ok(PackageScraper { config, client })
    }

    /// `Ok(None)` when the registry has no such package.
    async fn fetch_optional<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<Option<T>, FetchError> {
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                endpoint: url,
                message: status.canonical_reason().unwrap_or("unknown error").to_string(),
            });
        }

        decode(&url, response).await.map(Some)
    }

    pub async fn get_npm_package(&self, name: &str) -> Result<Option<NpmPackage>, FetchError> {
        let url = format!(
            "{}/{}",
            self.config.packages.npm_registry_url.trim_end_matches('/'),
            name
        );
        let document: Option<NpmDocument> = self.fetch_optional(url).await?;
        Ok(document.map(NpmPackage::from))
    }

    /// Last month's downloads; zero when npm cannot say.
    pub async fn get_npm_downloads(&self, name: &str) -> u64 {
        let url = format!(
            "{}/point/last-month/{}",
            self.config.packages.npm_downloads_url.trim_end_matches('/'),
            name
        );
        match self.fetch_optional::<NpmDownloadPoint>(url).await {
            Ok(point) => point.map_or(0, |p| p.downloads),
            Err(e) => {
                debug!("could not fetch npm downloads for {}: {}", name, e);
                0
            }
        }
    }

    pub async fn get_pypi_package(&self, name: &str) -> Result<Option<PypiPackage>, FetchError> {
        let url = format!(
            "{}/{}/json",
            self.config.packages.pypi_url.trim_end_matches('/'),
            name
        );
        let document: Option<PypiDocument> = self.fetch_optional(url).await?;
        Ok(document.map(PypiPackage::from))
    }

    pub async fn get_package_info(&self, name: &str) -> Result<Option<PackageInfo>, FetchError> {
        let mut info = PackageInfo::default();

        match self.get_npm_package(name).await {
            Ok(Some(package)) => {
                let downloads = self.get_npm_downloads(name).await;
                info.downloads.npm = downloads;
                info.downloads.total += downloads;
                info.npm = Some(package);
            }
            Ok(None) => debug!("no npm package named {}", name),
            Err(e) => info!("npm lookup for {} failed: {}", name, e),
        }

        match self.get_pypi_package(name).await {
            Ok(Some(package)) => info.pypi = Some(package),
            Ok(None) => debug!("no pypi package named {}", name),
            Err(e) => info!("pypi lookup for {} failed: {}", name, e),
        }

        Ok(if info.is_empty() { None } else { Some(info) })
    }
}

impl PackageSource for PackageScraper {
    async fn package_info(&self, name: &str) -> Result<Option<PackageInfo>, FetchError> {
        if !self.config.packages.enabled {
            return Ok(None);
        }
        self.get_package_info(name).await
    }
}
