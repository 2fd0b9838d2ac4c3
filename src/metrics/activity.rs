use chrono::{DateTime, Duration, Utc};

use crate::metrics::{MetricsError, bounded_score, days_between, parse_timestamp, points};
use crate::models::github::{Issue, PullRequest, Release, Repository};
use crate::models::score::{ActivityBreakdown, ActivityMetrics, ActivityScore};

const RECENT_ITEM_DAYS: i64 = 30;
const RECENT_RELEASE_DAYS: i64 = 90;

fn created_after<'a, I>(
    field: &'static str,
    timestamps: I,
    cutoff: DateTime<Utc>,
) -> Result<usize, MetricsError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut count = 0;
    for raw in timestamps {
        if parse_timestamp(field, raw)? > cutoff {
            count += 1;
        }
    }
    Ok(count)
}

/// Upper bounds are inclusive: a push exactly 30 days ago still earns 20.
fn recency_points(days_since_last_push: i64) -> f64 {
    match days_since_last_push {
        ..=30 => 20.0,
        31..=90 => 10.0,
        91..=180 => 5.0,
        _ => 0.0,
    }
}

pub fn calculate(
    repo: &Repository,
    issues: &[Issue],
    pull_requests: &[PullRequest],
    releases: &[Release],
    now: DateTime<Utc>,
) -> Result<ActivityScore, MetricsError> {
    let pushed_at = repo
        .pushed_at
        .as_deref()
        .ok_or(MetricsError::MissingTimestamp { field: "pushed_at" })?;
    let last_push = parse_timestamp("pushed_at", pushed_at)?;

    let month_ago = now - Duration::days(RECENT_ITEM_DAYS);
    let quarter_ago = now - Duration::days(RECENT_RELEASE_DAYS);

    let recent_issues = created_after(
        "issues.created_at",
        issues.iter().map(|i| i.created_at.as_str()),
        month_ago,
    )?;
    let recent_prs = created_after(
        "pull_requests.created_at",
        pull_requests.iter().map(|pr| pr.created_at.as_str()),
        month_ago,
    )?;
    let recent_releases = created_after(
        "releases.created_at",
        releases.iter().map(|r| r.created_at.as_str()),
        quarter_ago,
    )?;
    let days_since_last_push = days_between(last_push, now);

    let issue_points = (recent_issues as f64 * 2.0).min(25.0);
    let pr_points = (recent_prs as f64 * 3.0).min(30.0);
    let release_points = (recent_releases as f64 * 10.0).min(25.0);
    let recency = recency_points(days_since_last_push);

    Ok(ActivityScore {
        score: bounded_score(issue_points + pr_points + release_points + recency),
        metrics: ActivityMetrics {
            recent_issues,
            recent_prs,
            recent_releases,
            days_since_last_push,
            last_push: pushed_at.to_string(),
        },
        breakdown: ActivityBreakdown {
            issues: points(issue_points),
            pull_requests: points(pr_points),
            releases: points(release_points),
            recency: points(recency),
        },
    })
}
