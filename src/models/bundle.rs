use std::fmt::Display;

use log::warn;

use crate::models::github::{
    Contributor, ContributorStats, Issue, PullRequest, Release, Repository, SecurityAdvisory,
};
use crate::models::package::PackageInfo;

/// Where the community figures come from. Weekly stats are preferred; the
/// plain contributor list is used when GitHub has none (or is still
/// computing them).
#[derive(Debug, Clone, PartialEq)]
pub enum ContributorDataSource {
    Detailed(Vec<ContributorStats>),
    Basic(Vec<Contributor>),
}

impl ContributorDataSource {
    pub fn resolve(contributors: Vec<Contributor>, stats: Vec<ContributorStats>) -> Self {
        if stats.is_empty() {
            ContributorDataSource::Basic(contributors)
        } else {
            ContributorDataSource::Detailed(stats)
        }
    }

    pub fn is_detailed(&self) -> bool {
        matches!(self, ContributorDataSource::Detailed(_))
    }
}

impl Default for ContributorDataSource {
    fn default() -> Self {
        ContributorDataSource::Basic(Vec::new())
    }
}

/// Everything fetched for one repository, consumed once by the calculator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBundle {
    pub repository: Repository,
    pub contributors: ContributorDataSource,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
    pub releases: Vec<Release>,
    pub security: Vec<SecurityAdvisory>,
    pub package_info: Option<PackageInfo>,
    /// Comments on pull requests, as counted by the issues listing. The
    /// pulls listing carries no comment count.
    pub pull_request_comments: u64,
    /// Names of the sources that failed and were replaced by defaults.
    pub degraded_sources: Vec<String>,
}

impl RawBundle {
    pub fn new(repository: Repository) -> Self {
        RawBundle {
            repository,
            ..Default::default()
        }
    }
}

/// Settled outcome of a single upstream fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome<T> {
    Fetched(T),
    Degraded { source: &'static str, reason: String },
}

impl<T> SourceOutcome<T> {
    pub fn settle<E: Display>(source: &'static str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => SourceOutcome::Fetched(value),
            Err(e) => SourceOutcome::Degraded {
                source,
                reason: e.to_string(),
            },
        }
    }

    /// Unwraps fetched data, or records the failure in `degraded` and
    /// substitutes `T::default()`.
    pub fn or_default(self, degraded: &mut Vec<String>) -> T
    where
        T: Default,
    {
        match self {
            SourceOutcome::Fetched(value) => value,
            SourceOutcome::Degraded { source, reason } => {
                warn!("{} unavailable, using defaults: {}", source, reason);
                degraded.push(source.to_string());
                T::default()
            }
        }
    }
}
