use chrono::{DateTime, Duration, Months, Utc};

use crate::metrics::{bounded_score, points, ratio, round_hundredths};
use crate::models::bundle::ContributorDataSource;
use crate::models::github::{Issue, PullRequest, Repository};
use crate::models::score::{CommunityBreakdown, CommunityMetrics, CommunityScore};

const CORE_CONTRIBUTIONS: u64 = 10;
const FEATURE_BONUS: u32 = 5;

/// Contributor figures normalized from either data source.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ContributorCounts {
    pub total: usize,
    pub core: usize,
    pub external: usize,
    pub active: usize,
    pub commits: u64,
}

fn is_external(login: Option<&str>, owner: &str) -> bool {
    login.is_some_and(|l| !l.is_empty() && !l.eq_ignore_ascii_case(owner))
}

pub fn contributor_counts(
    source: &ContributorDataSource,
    owner: &str,
    now: DateTime<Utc>,
) -> ContributorCounts {
    match source {
        ContributorDataSource::Detailed(stats) => {
            let active_since = now
                .checked_sub_months(Months::new(6))
                .unwrap_or(now - Duration::days(183));

            let active = stats
                .iter()
                .filter(|s| {
                    s.weeks.iter().any(|week| {
                        DateTime::from_timestamp(week.w, 0)
                            .is_some_and(|start| start > active_since && week.has_activity())
                    })
                })
                .count();

            ContributorCounts {
                total: stats.len(),
                core: stats.iter().filter(|s| s.total >= CORE_CONTRIBUTIONS).count(),
                external: stats
                    .iter()
                    .filter(|s| is_external(s.author.as_ref().map(|a| a.login.as_str()), owner))
                    .count(),
                active,
                commits: stats.iter().map(|s| s.total).sum(),
            }
        }
        ContributorDataSource::Basic(contributors) => {
            let total = contributors.len();
            ContributorCounts {
                total,
                core: contributors
                    .iter()
                    .filter(|c| c.contributions >= CORE_CONTRIBUTIONS)
                    .count(),
                external: contributors
                    .iter()
                    .filter(|c| is_external(c.login.as_deref(), owner))
                    .count(),
                // No weekly data: assume three in ten are active.
                active: total * 3 / 10,
                commits: 0,
            }
        }
    }
}

pub fn calculate(
    repo: &Repository,
    source: &ContributorDataSource,
    issues: &[Issue],
    pull_requests: &[PullRequest],
    pull_request_comments: u64,
    now: DateTime<Utc>,
) -> CommunityScore {
    let counts = contributor_counts(source, &repo.owner.login, now);

    let issue_comments: u64 = issues.iter().map(|i| i.comments).sum();
    let pr_comments: u64 =
        pull_request_comments + pull_requests.iter().map(|pr| pr.comments).sum::<u64>();
    let total_comments = issue_comments + pr_comments;

    let contributor_diversity = if counts.total > 1 {
        ratio(counts.external, counts.total)
    } else {
        0.0
    };
    let activity_ratio = ratio(counts.active, counts.total);

    let contributors = (((counts.total + 1) as f64).log10() * 15.0).min(25.0);
    let core_contributors = (counts.core as f64 * 3.0).min(20.0);
    let diversity = contributor_diversity * 20.0;
    let activity = activity_ratio * 15.0;
    let engagement = (total_comments as f64 / 20.0).min(10.0);
    let features =
        u32::from(repo.has_wiki) * FEATURE_BONUS + u32::from(repo.has_discussions) * FEATURE_BONUS;

    let raw = contributors + core_contributors + diversity + activity + engagement
        + f64::from(features);

    let avg_comments_per_issue = if issues.is_empty() {
        0.0
    } else {
        round_hundredths(total_comments as f64 / issues.len() as f64)
    };

    CommunityScore {
        score: bounded_score(raw),
        metrics: CommunityMetrics {
            total_contributors: counts.total,
            core_contributors: counts.core,
            external_contributors: counts.external,
            active_contributors: counts.active,
            total_comments,
            total_commits: counts.commits,
            contributor_diversity: round_hundredths(contributor_diversity),
            activity_ratio: round_hundredths(activity_ratio),
            avg_comments_per_issue,
            has_wiki: repo.has_wiki,
            has_discussions: repo.has_discussions,
        },
        breakdown: CommunityBreakdown {
            contributors: points(contributors),
            core_contributors: points(core_contributors),
            diversity: points(diversity),
            activity: points(activity),
            engagement: points(engagement),
            features,
        },
    }
}
