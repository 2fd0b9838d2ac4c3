pub mod github;
pub mod orchestrator;
pub mod package;

use std::future::Future;

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::github::{
    Contributor, ContributorStats, Issue, PullRequest, Release, Repository, SecurityAdvisory,
};
use crate::models::package::PackageInfo;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        status: StatusCode,
        endpoint: String,
        message: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport(e) => e.status(),
            FetchError::Decode { .. } => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Server errors, throttling and dropped connections are worth another
    /// attempt; anything else will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            FetchError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Decode { .. } => false,
        }
    }
}

/// Everything the orchestrator needs from a code host.
pub trait RepositorySource: Send + Sync {
    fn repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Repository, FetchError>> + Send;

    fn contributors(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<Contributor>, FetchError>> + Send;

    fn contributor_stats(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<ContributorStats>, FetchError>> + Send;

    fn issues(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<Issue>, FetchError>> + Send;

    fn pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<PullRequest>, FetchError>> + Send;

    fn releases(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<Release>, FetchError>> + Send;

    fn security_advisories(
        &self,
        owner: &str,
        repo: &str,
    ) -> impl Future<Output = Result<Vec<SecurityAdvisory>, FetchError>> + Send;
}

/// Package registries, looked up by repository name.
pub trait PackageSource: Send + Sync {
    fn package_info(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<PackageInfo>, FetchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: StatusCode) -> FetchError {
        FetchError::Status {
            status,
            endpoint: "/repos/acme/widget".to_string(),
            message: "nope".to_string(),
        }
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(status_error(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(status_error(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!status_error(StatusCode::NOT_FOUND).is_retryable());
        assert!(!status_error(StatusCode::FORBIDDEN).is_retryable());
    }

    #[test]
    fn test_status_classification() {
        assert!(status_error(StatusCode::FORBIDDEN).is_forbidden());
        assert!(status_error(StatusCode::NOT_FOUND).is_not_found());
        assert!(!status_error(StatusCode::NOT_FOUND).is_forbidden());
    }

    #[test]
    fn test_error_message_names_endpoint() {
        let message = status_error(StatusCode::NOT_FOUND).to_string();
        assert!(message.contains("/repos/acme/widget"));
        assert!(message.contains("404"));
    }
}
