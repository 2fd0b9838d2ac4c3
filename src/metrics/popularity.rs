use crate::metrics::{bounded_score, points};
use crate::models::github::Repository;
use crate::models::package::PackageInfo;
use crate::models::score::{PopularityBreakdown, PopularityMetrics, PopularityScore};

/// `min(count / per_step, 10) * weight`: ten steps at most, so the term
/// tops out at `10 * weight`.
fn stepped(count: u64, per_step: f64, weight: f64) -> f64 {
    (count as f64 / per_step).min(10.0) * weight
}

pub fn calculate(repo: &Repository, package_info: Option<&PackageInfo>) -> PopularityScore {
    let metrics = PopularityMetrics {
        stars: repo.stargazers_count,
        forks: repo.forks_count,
        watchers: repo.watchers_count,
        downloads: package_info.map_or(0, |p| p.downloads.total),
    };

    let stars = stepped(metrics.stars, 1000.0, 2.0);
    let forks = stepped(metrics.forks, 200.0, 1.5);
    let watchers = stepped(metrics.watchers, 100.0, 1.0);
    let downloads = stepped(metrics.downloads, 10_000.0, 1.5);

    PopularityScore {
        score: bounded_score(stars + forks + watchers + downloads),
        metrics,
        breakdown: PopularityBreakdown {
            stars: points(stars),
            forks: points(forks),
            watchers: points(watchers),
            downloads: points(downloads),
        },
    }
}
