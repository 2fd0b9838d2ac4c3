use std::sync::Arc;

use log::{debug, info};

use crate::analysis::AnalysisError;
use crate::models::bundle::{ContributorDataSource, RawBundle, SourceOutcome};
use crate::models::github::Issue;
use crate::scraper::{PackageSource, RepositorySource};

/// Fans out every upstream request for one repository and settles them
/// into a [`RawBundle`]. Only the repository record is mandatory.
pub struct FetchOrchestrator<R, P> {
    repositories: Arc<R>,
    packages: Arc<P>,
}

impl<R: RepositorySource, P: PackageSource> FetchOrchestrator<R, P> {
    pub fn new(repositories: Arc<R>, packages: Arc<P>) -> Self {
        FetchOrchestrator {
            repositories,
            packages,
        }
    }

    pub async fn fetch(&self, owner: &str, repo: &str) -> Result<RawBundle, AnalysisError> {
        info!("fetching data for {}/{}", owner, repo);

        let host = &self.repositories;
        let (repository, contributors, stats, issues, pull_requests, releases, security, package) = tokio::join!(
            host.repository(owner, repo),
            host.contributors(owner, repo),
            host.contributor_stats(owner, repo),
            host.issues(owner, repo),
            host.pull_requests(owner, repo),
            host.releases(owner, repo),
            host.security_advisories(owner, repo),
            self.packages.package_info(repo),
        );

        let slug = format!("{}/{}", owner, repo);
        let repository = repository.map_err(|e| {
            if e.is_forbidden() {
                AnalysisError::AccessDenied { slug: slug.clone() }
            } else {
                AnalysisError::NotFound {
                    slug: slug.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        let mut degraded = Vec::new();
        let contributors = SourceOutcome::settle("contributors", contributors).or_default(&mut degraded);
        let stats = SourceOutcome::settle("contributor_stats", stats).or_default(&mut degraded);
        let issues: Vec<Issue> = SourceOutcome::settle("issues", issues).or_default(&mut degraded);
        let pull_requests = SourceOutcome::settle("pull_requests", pull_requests).or_default(&mut degraded);
        let releases = SourceOutcome::settle("releases", releases).or_default(&mut degraded);
        let security = SourceOutcome::settle("security", security).or_default(&mut degraded);
        let package_info = SourceOutcome::settle("package", package).or_default(&mut degraded);

        let (pr_shaped, issues): (Vec<Issue>, Vec<Issue>) =
            issues.into_iter().partition(Issue::is_pull_request);
        let pull_request_comments = pr_shaped.iter().map(|pr| pr.comments).sum();
        let contributors = ContributorDataSource::resolve(contributors, stats);

        debug!(
            "bundle for {}: {} issues, {} pull requests, {} releases, {} advisories, detailed contributors: {}",
            slug,
            issues.len(),
            pull_requests.len(),
            releases.len(),
            security.len(),
            contributors.is_detailed()
        );

        Ok(RawBundle {
            contributors,
            issues,
            pull_requests,
            releases,
            security,
            package_info,
            pull_request_comments,
            degraded_sources: degraded,
            ..RawBundle::new(repository)
        })
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::StatusCode;

    use crate::models::github::{
        Contributor, ContributorStats, Issue, PullRequest, Release, Repository, SecurityAdvisory,
    };
    use crate::models::package::PackageInfo;
    use crate::scraper::{FetchError, PackageSource, RepositorySource};

    /// In-memory code host. Sources named in `failing` answer HTTP 500.
    #[derive(Default)]
    pub struct FakeHost {
        pub repository: Option<Repository>,
        pub repository_status: Option<StatusCode>,
        pub contributors: Vec<Contributor>,
        pub stats: Vec<ContributorStats>,
        pub issues: Vec<Issue>,
        pub pull_requests: Vec<PullRequest>,
        pub releases: Vec<Release>,
        pub security: Vec<SecurityAdvisory>,
        pub failing: Vec<&'static str>,
        pub repository_calls: AtomicUsize,
    }

    fn failure(status: StatusCode, endpoint: &str) -> FetchError {
        FetchError::Status {
            status,
            endpoint: endpoint.to_string(),
            message: "fake failure".to_string(),
        }
    }

    impl FakeHost {
        fn serve<T: Clone>(&self, source: &'static str, data: &T) -> Result<T, FetchError> {
            if self.failing.contains(&source) {
                Err(failure(StatusCode::INTERNAL_SERVER_ERROR, source))
            } else {
                Ok(data.clone())
            }
        }
    }

    impl RepositorySource for FakeHost {
        async fn repository(&self, _owner: &str, _repo: &str) -> Result<Repository, FetchError> {
            self.repository_calls.fetch_add(1, Ordering::SeqCst);
            match (&self.repository, self.repository_status) {
                (Some(repo), None) => Ok(repo.clone()),
                (_, Some(status)) => Err(failure(status, "repository")),
                (None, None) => Err(failure(StatusCode::NOT_FOUND, "repository")),
            }
        }

        async fn contributors(&self, _: &str, _: &str) -> Result<Vec<Contributor>, FetchError> {
            self.serve("contributors", &self.contributors)
        }

        async fn contributor_stats(&self, _: &str, _: &str) -> Result<Vec<ContributorStats>, FetchError> {
            self.serve("contributor_stats", &self.stats)
        }

        async fn issues(&self, _: &str, _: &str) -> Result<Vec<Issue>, FetchError> {
            self.serve("issues", &self.issues)
        }

        async fn pull_requests(&self, _: &str, _: &str) -> Result<Vec<PullRequest>, FetchError> {
            self.serve("pull_requests", &self.pull_requests)
        }

        async fn releases(&self, _: &str, _: &str) -> Result<Vec<Release>, FetchError> {
            self.serve("releases", &self.releases)
        }

        async fn security_advisories(&self, _: &str, _: &str) -> Result<Vec<SecurityAdvisory>, FetchError> {
            self.serve("security", &self.security)
        }
    }

    #[derive(Default)]
    pub struct FakeRegistry {
        pub package: Option<PackageInfo>,
        pub fail: bool,
    }

    impl PackageSource for FakeRegistry {
        async fn package_info(&self, name: &str) -> Result<Option<PackageInfo>, FetchError> {
            if self.fail {
                Err(failure(StatusCode::BAD_GATEWAY, name))
            } else {
                Ok(self.package.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fakes::{FakeHost, FakeRegistry};
    use super::*;
    use crate::metrics::calculate_at;
    use crate::metrics::fixtures::{ago, item, now, repository};
    use crate::models::github::{Contributor, ContributorStats, ItemState, PullRequest};
    use crate::models::package::PackageInfo;
    use reqwest::StatusCode;

    fn orchestrator(host: FakeHost, registry: FakeRegistry) -> FetchOrchestrator<FakeHost, FakeRegistry> {
        FetchOrchestrator::new(Arc::new(host), Arc::new(registry))
    }

    #[tokio::test]
    async fn test_missing_repository_is_not_found() {
        let orchestrator = orchestrator(FakeHost::default(), FakeRegistry::default());
        let err = orchestrator.fetch("acme", "ghost").await.unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound { ref slug, .. } if slug == "acme/ghost"));
    }

    #[tokio::test]
    async fn test_forbidden_repository_is_access_denied() {
        let host = FakeHost {
            repository_status: Some(StatusCode::FORBIDDEN),
            ..Default::default()
        };
        let err = orchestrator(host, FakeRegistry::default())
            .fetch("acme", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::AccessDenied { .. }));
    }

    #[tokio::test]
    async fn test_failed_sources_degrade_to_defaults() {
        let host = FakeHost {
            repository: Some(repository()),
            releases: vec![],
            issues: vec![item(ItemState::Open, 1, 1)],
            failing: vec!["issues", "security"],
            ..Default::default()
        };
        let registry = FakeRegistry {
            package: Some(PackageInfo::default()),
            fail: true,
        };

        let bundle = orchestrator(host, registry).fetch("acme", "widget").await.unwrap();
        assert!(bundle.issues.is_empty());
        assert!(bundle.security.is_empty());
        assert_eq!(bundle.package_info, None);
        assert_eq!(
            bundle.degraded_sources,
            vec!["issues".to_string(), "security".to_string(), "package".to_string()]
        );
    }

    #[tokio::test]
    async fn test_pull_requests_are_dropped_from_issues() {
        let mut pr_shaped = item(ItemState::Closed, 2, 2);
        pr_shaped.pull_request = Some(serde_json::json!({ "url": "https://example.com" }));
        let host = FakeHost {
            repository: Some(repository()),
            issues: vec![item(ItemState::Open, 1, 1), pr_shaped],
            ..Default::default()
        };

        let bundle = orchestrator(host, FakeRegistry::default())
            .fetch("acme", "widget")
            .await
            .unwrap();
        assert_eq!(bundle.issues.len(), 1);
        assert!(bundle.degraded_sources.is_empty());
    }

    #[tokio::test]
    async fn test_pull_request_comments_survive_issue_filtering() {
        let mut pr_shaped = item(ItemState::Open, 1, 1);
        pr_shaped.comments = 40;
        pr_shaped.pull_request = Some(serde_json::json!({ "url": "https://example.com" }));
        let listed_pr: PullRequest = serde_json::from_value(serde_json::json!({
            "state": "open",
            "created_at": ago(1),
            "updated_at": ago(1),
        }))
        .unwrap();
        let host = FakeHost {
            repository: Some(repository()),
            issues: vec![pr_shaped],
            pull_requests: vec![listed_pr],
            ..Default::default()
        };

        let bundle = orchestrator(host, FakeRegistry::default())
            .fetch("acme", "widget")
            .await
            .unwrap();
        assert!(bundle.issues.is_empty());
        assert_eq!(bundle.pull_request_comments, 40);

        let result = calculate_at(&bundle, now()).unwrap();
        assert_eq!(result.community.metrics.total_comments, 40);
        assert_eq!(result.community.breakdown.engagement, 2);
    }

    #[tokio::test]
    async fn test_contributor_source_resolved_once() {
        let host = FakeHost {
            repository: Some(repository()),
            contributors: vec![Contributor::default()],
            stats: vec![ContributorStats::default()],
            ..Default::default()
        };
        let bundle = orchestrator(host, FakeRegistry::default())
            .fetch("acme", "widget")
            .await
            .unwrap();
        assert!(bundle.contributors.is_detailed());

        let host = FakeHost {
            repository: Some(repository()),
            contributors: vec![Contributor::default()],
            failing: vec!["contributor_stats"],
            ..Default::default()
        };
        let bundle = orchestrator(host, FakeRegistry::default())
            .fetch("acme", "widget")
            .await
            .unwrap();
        assert!(!bundle.contributors.is_detailed());
        assert_eq!(bundle.degraded_sources, vec!["contributor_stats".to_string()]);
    }
}
