use chrono::{DateTime, Duration, Utc};

use crate::metrics::{MetricsError, bounded_score, parse_timestamp, points};
use crate::models::github::{Repository, SecurityAdvisory};
use crate::models::score::{SecurityBreakdown, SecurityMetrics, SecurityScore};

const BASELINE: f64 = 60.0;
const FEATURE_BONUS: u32 = 15;
const RESPONSIVENESS_BONUS: u32 = 10;
const RESPONSIVE_WINDOW_DAYS: i64 = 180;

/// Advisories published inside the responsiveness window. Unpublished
/// drafts never count.
fn recently_published(
    advisories: &[SecurityAdvisory],
    since: DateTime<Utc>,
) -> Result<usize, MetricsError> {
    let mut count = 0;
    for published in advisories.iter().filter_map(|a| a.published_at.as_deref()) {
        if parse_timestamp("security.published_at", published)? > since {
            count += 1;
        }
    }
    Ok(count)
}

pub fn calculate(
    repo: &Repository,
    advisories: &[SecurityAdvisory],
    now: DateTime<Utc>,
) -> Result<SecurityScore, MetricsError> {
    let has_security_policy = repo.has_secret_scanning();
    let has_dependabot = repo.has_dependabot();

    let security_features = u32::from(has_security_policy) * FEATURE_BONUS
        + u32::from(has_dependabot) * FEATURE_BONUS;
    let advisory_penalty = (advisories.len() as f64 * 5.0).min(30.0);

    let recent = recently_published(advisories, now - Duration::days(RESPONSIVE_WINDOW_DAYS))?;
    let responsiveness_bonus = if recent > 0 && !advisories.is_empty() {
        RESPONSIVENESS_BONUS
    } else {
        0
    };

    let raw = BASELINE + f64::from(security_features) - advisory_penalty
        + f64::from(responsiveness_bonus);

    Ok(SecurityScore {
        score: bounded_score(raw),
        metrics: SecurityMetrics {
            security_advisories: advisories.len(),
            has_security_policy,
            has_dependabot,
            vulnerability_alerts: 0,
        },
        breakdown: SecurityBreakdown {
            security_features,
            advisory_penalty: points(advisory_penalty),
            responsiveness_bonus,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::fixtures::{ago, now, repository};
    use crate::models::github::{FeatureStatus, SecurityAndAnalysis};

    fn with_features(secret_scanning: bool, dependabot: bool) -> Repository {
        let status = |on: bool| {
            Some(FeatureStatus {
                status: if on { "enabled" } else { "disabled" }.to_string(),
            })
        };
        Repository {
            security_and_analysis: Some(SecurityAndAnalysis {
                secret_scanning: status(secret_scanning),
                dependabot_security_updates: status(dependabot),
            }),
            ..repository()
        }
    }

    fn advisory(published_days_ago: Option<i64>) -> SecurityAdvisory {
        SecurityAdvisory {
            ghsa_id: Some("GHSA-xxxx-xxxx-xxxx".to_string()),
            published_at: published_days_ago.map(ago),
        }
    }

    #[test]
    fn test_bare_baseline() {
        let result = calculate(&repository(), &[], now()).unwrap();
        assert_eq!(result.score, 60);
        assert_eq!(result.breakdown.responsiveness_bonus, 0);
    }

    #[test]
    fn test_both_features_without_advisories() {
        let result = calculate(&with_features(true, true), &[], now()).unwrap();
        assert_eq!(result.score, 90);
        assert_eq!(result.breakdown.security_features, 30);
        assert!(result.metrics.has_security_policy);
        assert!(result.metrics.has_dependabot);
    }

    #[test]
    fn test_disabled_features_earn_nothing() {
        let result = calculate(&with_features(false, true), &[], now()).unwrap();
        assert_eq!(result.score, 75);
    }

    #[test]
    fn test_recent_advisory_earns_responsiveness_bonus() {
        let result = calculate(&repository(), &[advisory(Some(20))], now()).unwrap();
        assert_eq!(result.breakdown.advisory_penalty, 5);
        assert_eq!(result.breakdown.responsiveness_bonus, 10);
        assert_eq!(result.score, 65);
    }

    #[test]
    fn test_old_and_draft_advisories_only_penalize() {
        let advisories = vec![advisory(Some(181)), advisory(None)];
        let result = calculate(&repository(), &advisories, now()).unwrap();
        assert_eq!(result.metrics.security_advisories, 2);
        assert_eq!(result.breakdown.responsiveness_bonus, 0);
        assert_eq!(result.score, 50);
    }

    #[test]
    fn test_advisory_penalty_is_capped() {
        let advisories: Vec<_> = (0..20).map(|_| advisory(Some(400))).collect();
        let result = calculate(&repository(), &advisories, now()).unwrap();
        assert_eq!(result.breakdown.advisory_penalty, 30);
        assert_eq!(result.score, 30);
    }

    #[test]
    fn test_features_penalty_and_bonus_combine() {
        let result = calculate(&with_features(true, true), &[advisory(Some(1))], now()).unwrap();
        assert_eq!(result.score, 60 + 30 - 5 + 10);
    }
}
