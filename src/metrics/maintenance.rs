use chrono::{DateTime, Duration, Utc};

use crate::metrics::{MetricsError, bounded_score, parse_timestamp, points, ratio};
use crate::models::github::{Issue, ItemState, PullRequest};
use crate::models::score::{MaintenanceBreakdown, MaintenanceMetrics, MaintenanceScore};

const STALE_AFTER_DAYS: i64 = 30;
const BASELINE: f64 = 40.0;

#[derive(Debug, Default, PartialEq)]
struct StateCounts {
    open: usize,
    closed: usize,
    stale: usize,
}

fn count_states(
    field: &'static str,
    items: &[Issue],
    stale_before: DateTime<Utc>,
) -> Result<StateCounts, MetricsError> {
    let mut counts = StateCounts::default();
    for item in items {
        match item.state {
            ItemState::Closed => counts.closed += 1,
            ItemState::Open => {
                counts.open += 1;
                if parse_timestamp(field, &item.updated_at)? < stale_before {
                    counts.stale += 1;
                }
            }
        }
    }
    Ok(counts)
}

pub fn calculate(
    issues: &[Issue],
    pull_requests: &[PullRequest],
    now: DateTime<Utc>,
) -> Result<MaintenanceScore, MetricsError> {
    let stale_before = now - Duration::days(STALE_AFTER_DAYS);

    let issue_counts = count_states("issues.updated_at", issues, stale_before)?;
    let pr_counts = count_states("pull_requests.updated_at", pull_requests, stale_before)?;

    let issue_close_ratio = ratio(issue_counts.closed, issue_counts.closed + issue_counts.open);
    let pr_close_ratio = ratio(pr_counts.closed, pr_counts.closed + pr_counts.open);

    let issue_management = issue_close_ratio * 30.0;
    let pr_management = pr_close_ratio * 30.0;
    let stale_issue_penalty = (issue_counts.stale as f64 * 2.0).min(20.0);
    let stale_pr_penalty = (pr_counts.stale as f64 * 3.0).min(20.0);

    let raw =
        issue_management + pr_management - stale_issue_penalty - stale_pr_penalty + BASELINE;

    Ok(MaintenanceScore {
        score: bounded_score(raw),
        metrics: MaintenanceMetrics {
            open_issues: issue_counts.open,
            closed_issues: issue_counts.closed,
            open_prs: pr_counts.open,
            closed_prs: pr_counts.closed,
            stale_issues: issue_counts.stale,
            stale_prs: pr_counts.stale,
            issue_close_ratio,
            pr_close_ratio,
        },
        breakdown: MaintenanceBreakdown {
            issue_management: points(issue_management),
            pr_management: points(pr_management),
            stale_penalty: points(stale_issue_penalty + stale_pr_penalty),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{item, now};

    #[test]
    fn test_no_issues_or_prs_scores_baseline() {
        let result = calculate(&[], &[], now()).unwrap();
        assert_eq!(result.score, 40);
        assert_eq!(result.metrics.issue_close_ratio, 0.0);
        assert_eq!(result.metrics.pr_close_ratio, 0.0);
    }

    #[test]
    fn test_half_closed_issues_without_prs() {
        let issues: Vec<_> = (0..5)
            .map(|_| item(ItemState::Closed, 10, 5))
            .chain((0..5).map(|_| item(ItemState::Open, 10, 5)))
            .collect();

        let result = calculate(&issues, &[], now()).unwrap();
        assert_eq!(result.metrics.issue_close_ratio, 0.5);
        assert_eq!(result.metrics.pr_close_ratio, 0.0);
        assert_eq!(result.metrics.stale_issues, 0);
        assert_eq!(result.score, 55);
        assert_eq!(result.breakdown.issue_management, 15);
    }

    #[test]
    fn test_only_open_items_can_be_stale() {
        let issues = vec![
            item(ItemState::Open, 100, 31),
            item(ItemState::Open, 100, 29),
            item(ItemState::Closed, 100, 90),
        ];
        let prs = vec![item(ItemState::Open, 100, 60), item(ItemState::Closed, 100, 60)];

        let result = calculate(&issues, &prs, now()).unwrap();
        assert_eq!(result.metrics.stale_issues, 1);
        assert_eq!(result.metrics.stale_prs, 1);
        assert_eq!(result.breakdown.stale_penalty, 5);
        // 1/3 * 30 + 1/2 * 30 - 2 - 3 + 40
        assert_eq!(result.score, 60);
    }

    #[test]
    fn test_penalties_are_capped_and_score_floors_at_zero() {
        let stale: Vec<_> = (0..50).map(|_| item(ItemState::Open, 200, 200)).collect();

        let result = calculate(&stale, &stale, now()).unwrap();
        assert_eq!(result.breakdown.stale_penalty, 40);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_everything_closed_scores_full() {
        let closed: Vec<_> = (0..3).map(|_| item(ItemState::Closed, 5, 5)).collect();
        let result = calculate(&closed, &closed, now()).unwrap();
        assert_eq!(result.score, 100);
    }
}
