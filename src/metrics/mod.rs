//! Health score calculation.
//!
//! Every function here is a pure transformation of a [`RawBundle`] plus a
//! fixed "now". Nothing performs I/O and nothing mutates its input.

mod activity;
mod community;
mod maintenance;
mod popularity;
mod security;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use thiserror::Error;

use crate::models::bundle::RawBundle;
use crate::models::score::ScoredResult;
use crate::utils::clock::Clock;

pub const POPULARITY_WEIGHT: f64 = 0.20;
pub const ACTIVITY_WEIGHT: f64 = 0.25;
pub const MAINTENANCE_WEIGHT: f64 = 0.25;
pub const SECURITY_WEIGHT: f64 = 0.15;
pub const COMMUNITY_WEIGHT: f64 = 0.15;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("missing timestamp `{field}`")]
    MissingTimestamp { field: &'static str },
    #[error("invalid timestamp `{field}`: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
}

pub struct MetricsCalculator {
    clock: Arc<dyn Clock>,
}

impl MetricsCalculator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        MetricsCalculator { clock }
    }

    pub fn calculate(&self, bundle: &RawBundle) -> Result<ScoredResult, MetricsError> {
        calculate_at(bundle, self.clock.now())
    }
}

pub fn calculate_at(bundle: &RawBundle, now: DateTime<Utc>) -> Result<ScoredResult, MetricsError> {
    let repo = &bundle.repository;

    let popularity = popularity::calculate(repo, bundle.package_info.as_ref());
    let activity = activity::calculate(
        repo,
        &bundle.issues,
        &bundle.pull_requests,
        &bundle.releases,
        now,
    )?;
    let maintenance = maintenance::calculate(&bundle.issues, &bundle.pull_requests, now)?;
    let security = security::calculate(repo, &bundle.security, now)?;
    let community = community::calculate(
        repo,
        &bundle.contributors,
        &bundle.issues,
        &bundle.pull_requests,
        bundle.pull_request_comments,
        now,
    );

    let overall = overall_score(
        popularity.score,
        activity.score,
        maintenance.score,
        security.score,
        community.score,
    );

    debug!(
        "scored {}: popularity={} activity={} maintenance={} security={} community={} overall={}",
        repo.full_name,
        popularity.score,
        activity.score,
        maintenance.score,
        security.score,
        community.score,
        overall
    );

    Ok(ScoredResult {
        popularity,
        activity,
        maintenance,
        security,
        community,
        overall,
    })
}

pub fn overall_score(
    popularity: u8,
    activity: u8,
    maintenance: u8,
    security: u8,
    community: u8,
) -> u8 {
    let weighted = f64::from(popularity) * POPULARITY_WEIGHT
        + f64::from(activity) * ACTIVITY_WEIGHT
        + f64::from(maintenance) * MAINTENANCE_WEIGHT
        + f64::from(security) * SECURITY_WEIGHT
        + f64::from(community) * COMMUNITY_WEIGHT;

    weighted.round() as u8
}

pub(crate) fn parse_timestamp(
    field: &'static str,
    value: &str,
) -> Result<DateTime<Utc>, MetricsError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| MetricsError::InvalidTimestamp {
            field,
            value: value.to_string(),
        })
}

/// Whole days elapsed between `earlier` and `now`, rounded towards
/// negative infinity.
pub(crate) fn days_between(earlier: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
    (now - earlier).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Clamps to [0, 100] and rounds half away from zero.
pub(crate) fn bounded_score(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0).round() as u8
}

pub(crate) fn points(raw: f64) -> u32 {
    raw.max(0.0).round() as u32
}

pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

pub(crate) fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::models::github::{Issue, ItemState, Repository, RepositoryOwner};

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    pub fn ago(days: i64) -> String {
        (now() - Duration::days(days)).to_rfc3339()
    }

    pub fn repository() -> Repository {
        Repository {
            name: "widget".to_string(),
            full_name: "acme/widget".to_string(),
            owner: RepositoryOwner {
                login: "acme".to_string(),
                html_url: None,
            },
            pushed_at: Some(ago(1)),
            ..Default::default()
        }
    }

    pub fn item(state: ItemState, created_days_ago: i64, updated_days_ago: i64) -> Issue {
        Issue {
            state,
            created_at: ago(created_days_ago),
            updated_at: ago(updated_days_ago),
            comments: 0,
            pull_request: None,
        }
    }
}
