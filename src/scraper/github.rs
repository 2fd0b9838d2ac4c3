use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use eyre::Result;
use log::{debug, error, info, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::models::github::{
    Contributor, ContributorStats, Issue, PullRequest, Release, Repository, SearchResponse,
    SecurityAdvisory, TrendingRepository,
};
use crate::scraper::{FetchError, RepositorySource};
use crate::utils::config::Config;

const PER_PAGE: usize = 100;
const RELEASES_PER_PAGE: usize = 30;
const TRENDING_RESULTS: usize = 10;
/// Pause after every this many contributor pages to stay under the
/// secondary rate limit.
const PAGES_BETWEEN_PAUSES: u32 = 10;

type Query<'a> = &'a [(&'a str, String)];

pub struct GitHubScraper {
    config: Config,
    client: reqwest::Client,
}

impl GitHubScraper {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.github.user_agent.as_str())
            .timeout(Duration::from_secs(config.github.timeout_secs))
            .build()?;

        match &config.github.token {
            Some(_) => info!("github client initialized with authentication"),
            None => warn!("no github token configured, api rate limits will be severely restricted"),
        }

        Ok(GitHubScraper { config, client })
    }

    fn request(&self, endpoint: &str, query: Query<'_>) -> reqwest::RequestBuilder {
        let mut req = self
            .client
            .get(format!(
                "{}{}",
                self.config.github.api_url.trim_end_matches('/'),
                endpoint
            ))
            .header("Accept", "application/vnd.github+json")
            .query(query);

        if let Some(token) = &self.config.github.token {
            req = req.header("Authorization", format!("token {}", token));
        }

        req
    }

    async fn send(&self, endpoint: &str, query: Query<'_>) -> Result<reqwest::Response, FetchError> {
        let attempt = || async {
            let response = self.request(endpoint, query).send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("message")?.as_str().map(str::to_string))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

            Err(FetchError::Status {
                status,
                endpoint: endpoint.to_string(),
                message,
            })
        };

        attempt
            .retry(ExponentialBuilder::default().with_max_times(self.config.github.max_retries))
            .when(FetchError::is_retryable)
            .notify(|e, after| debug!("retrying {} in {:?}: {}", endpoint, after, e))
            .await
            .inspect_err(|e| log_failure(endpoint, e))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Query<'_>,
    ) -> Result<T, FetchError> {
        let response = self.send(endpoint, query).await?;
        decode(endpoint, response).await
    }

    /// Like [`get_json`](Self::get_json) for list endpoints, where GitHub
    /// answers 204 for "nothing here" and 202 for "still computing".
    async fn get_list<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Query<'_>,
    ) -> Result<Vec<T>, FetchError> {
        let response = self.send(endpoint, query).await?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(Vec::new()),
            StatusCode::ACCEPTED => {
                info!("{} is still being computed upstream, treating as empty", endpoint);
                Ok(Vec::new())
            }
            _ => decode(endpoint, response).await,
        }
    }

    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository, FetchError> {
        self.get_json(&format!("/repos/{}/{}", owner, repo), &[]).await
    }

    pub async fn get_contributors(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Contributor>, FetchError> {
        let endpoint = format!("/repos/{}/{}/contributors", owner, repo);
        let max_pages = self.config.github.max_contributor_pages;
        let mut contributors = Vec::new();

        info!("fetching all contributors for {}/{}", owner, repo);

        for page in 1..=max_pages {
            let query = [
                ("page", page.to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("anon", "true".to_string()),
            ];
            let batch: Vec<Contributor> = self.get_list(&endpoint, &query).await?;
            let last_page = batch.len() < PER_PAGE;
            contributors.extend(batch);

            debug!(
                "contributors page {}: {} so far",
                page,
                contributors.len()
            );

            if last_page {
                break;
            }
            if page == max_pages {
                warn!(
                    "stopped after {} contributor pages ({} contributors)",
                    max_pages,
                    contributors.len()
                );
                break;
            }
            if page % PAGES_BETWEEN_PAUSES == 0 {
                debug!("pausing after {} contributor pages", page);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }

        info!("fetched {} contributors for {}/{}", contributors.len(), owner, repo);
        Ok(contributors)
    }

    pub async fn get_contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<ContributorStats>, FetchError> {
        let stats: Vec<ContributorStats> = self
            .get_list(&format!("/repos/{}/{}/stats/contributors", owner, repo), &[])
            .await?;
        debug!("fetched detailed stats for {} contributors", stats.len());
        Ok(stats)
    }

    pub async fn get_issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>, FetchError> {
        self.get_list(
            &format!("/repos/{}/{}/issues", owner, repo),
            &recently_updated_query(),
        )
        .await
    }

    pub async fn get_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, FetchError> {
        self.get_list(
            &format!("/repos/{}/{}/pulls", owner, repo),
            &recently_updated_query(),
        )
        .await
    }

    pub async fn get_releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, FetchError> {
        let query = [
            ("page", "1".to_string()),
            ("per_page", RELEASES_PER_PAGE.to_string()),
        ];
        self.get_list(&format!("/repos/{}/{}/releases", owner, repo), &query)
            .await
    }

    /// The advisories endpoint is unavailable for many repositories, so any
    /// failure simply means "none known".
    pub async fn get_security_advisories(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<SecurityAdvisory>, FetchError> {
        match self
            .get_list(&format!("/repos/{}/{}/security-advisories", owner, repo), &[])
            .await
        {
            Ok(advisories) => Ok(advisories),
            Err(e) => {
                info!("no security advisories available for {}/{}: {}", owner, repo, e);
                Ok(Vec::new())
            }
        }
    }

    pub async fn get_trending(
        &self,
        language: Option<&str>,
    ) -> Result<Vec<TrendingRepository>, FetchError> {
        let q = match language {
            Some(language) => format!("language:{}", language),
            None => "stars:>1".to_string(),
        };
        let query = [
            ("q", q),
            ("sort", "stars".to_string()),
            ("order", "desc".to_string()),
            ("per_page", TRENDING_RESULTS.to_string()),
        ];

        let response: SearchResponse<TrendingRepository> =
            self.get_json("/search/repositories", &query).await?;
        Ok(response.items)
    }
}

impl RepositorySource for GitHubScraper {
    async fn repository(&self, owner: &str, repo: &str) -> Result<Repository, FetchError> {
        self.get_repository(owner, repo).await
    }

    async fn contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>, FetchError> {
        self.get_contributors(owner, repo).await
    }

    async fn contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<ContributorStats>, FetchError> {
        self.get_contributor_stats(owner, repo).await
    }

    async fn issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>, FetchError> {
        self.get_issues(owner, repo).await
    }

    async fn pull_requests(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>, FetchError> {
        self.get_pull_requests(owner, repo).await
    }

    async fn releases(&self, owner: &str, repo: &str) -> Result<Vec<Release>, FetchError> {
        self.get_releases(owner, repo).await
    }

    async fn security_advisories(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<SecurityAdvisory>, FetchError> {
        self.get_security_advisories(owner, repo).await
    }
}

fn recently_updated_query() -> [(&'static str, String); 5] {
    [
        ("state", "all".to_string()),
        ("page", "1".to_string()),
        ("per_page", PER_PAGE.to_string()),
        ("sort", "updated".to_string()),
        ("direction", "desc".to_string()),
    ]
}

pub(crate) async fn decode<T: DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, FetchError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn log_failure(endpoint: &str, e: &FetchError) {
    if e.is_forbidden() {
        if e.to_string().contains("rate limit") {
            error!("{} forbidden: rate limit exceeded, consider configuring a token", endpoint);
        } else {
            error!(
                "{} forbidden: repository may be private or token lacks permissions",
                endpoint
            );
        }
    } else if e.is_not_found() {
        debug!("{} not found", endpoint);
    } else {
        debug!("{} failed: {}", endpoint, e);
    }
}
