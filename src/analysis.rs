use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::{MetricsCalculator, MetricsError};
use crate::models::github::Repository;
use crate::models::score::ScoredResult;
use crate::scraper::orchestrator::FetchOrchestrator;
use crate::scraper::{PackageSource, RepositorySource};
use crate::utils::cache::{ResponseCache, cache_key};
use crate::utils::clock::Clock;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("repository {slug} not found or not accessible ({reason})")]
    NotFound { slug: String, reason: String },
    #[error("access to repository {slug} denied: it is private or the token lacks permissions")]
    AccessDenied { slug: String },
    #[error("failed to score repository: {0}")]
    Metrics(#[from] MetricsError),
}

/// A scored repository, as cached and handed to the report layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub repository: Repository,
    pub metrics: ScoredResult,
    pub last_updated: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded_sources: Vec<String>,
}

pub struct Analyzer<R, P> {
    orchestrator: FetchOrchestrator<R, P>,
    calculator: MetricsCalculator,
    cache: ResponseCache<Arc<AnalysisReport>>,
    clock: Arc<dyn Clock>,
}

impl<R: RepositorySource, P: PackageSource> Analyzer<R, P> {
    pub fn new(
        orchestrator: FetchOrchestrator<R, P>,
        clock: Arc<dyn Clock>,
        cache_ttl: Duration,
    ) -> Self {
        Analyzer {
            orchestrator,
            calculator: MetricsCalculator::new(Arc::clone(&clock)),
            cache: ResponseCache::new(cache_ttl, Arc::clone(&clock)),
            clock,
        }
    }

    pub async fn analyze(&self, owner: &str, repo: &str) -> Result<Arc<AnalysisReport>, AnalysisError> {
        let key = cache_key(owner, repo);
        if let Some(cached) = self.cache.get(&key) {
            info!("serving cached result for {}", key);
            return Ok(cached);
        }

        info!("analyzing repository {}", key);
        let bundle = self.orchestrator.fetch(owner, repo).await?;
        let metrics = self.calculator.calculate(&bundle)?;

        let report = Arc::new(AnalysisReport {
            repository: bundle.repository,
            metrics,
            last_updated: self.clock.now(),
            degraded_sources: bundle.degraded_sources,
        });
        self.cache.insert(key, Arc::clone(&report));

        Ok(report)
    }
}
