use std::path::Path;

use eyre::{Result, WrapErr};
use log::info;
use rayon::prelude::*;
use serde_json::{Value, json};

use crate::analysis::AnalysisReport;

pub const GENERATED_BY: &str = "repo-health";

const CSV_HEADERS: [&str; 12] = [
    "Repository",
    "Overall Score",
    "Popularity",
    "Activity",
    "Maintenance",
    "Security",
    "Community",
    "Stars",
    "Forks",
    "Contributors",
    "Language",
    "License",
];

/// Flattened health report for a single repository.
pub fn json_report(report: &AnalysisReport) -> Value {
    let repo = &report.repository;
    let m = &report.metrics;

    json!({
        "repository": {
            "name": repo.full_name,
            "description": repo.description,
            "url": repo.html_url,
            "stars": repo.stargazers_count,
            "forks": repo.forks_count,
            "language": repo.language,
            "license": repo.license_name(),
            "created_at": repo.created_at,
            "updated_at": repo.updated_at,
        },
        "health_metrics": {
            "overall_score": m.overall,
            "popularity": {
                "score": m.popularity.score,
                "stars": m.popularity.metrics.stars,
                "forks": m.popularity.metrics.forks,
                "downloads": m.popularity.metrics.downloads,
            },
            "activity": {
                "score": m.activity.score,
                "recent_issues": m.activity.metrics.recent_issues,
                "recent_prs": m.activity.metrics.recent_prs,
                "recent_releases": m.activity.metrics.recent_releases,
                "days_since_last_push": m.activity.metrics.days_since_last_push,
            },
            "maintenance": {
                "score": m.maintenance.score,
                "open_issues": m.maintenance.metrics.open_issues,
                "issue_close_ratio": m.maintenance.metrics.issue_close_ratio,
                "stale_issues": m.maintenance.metrics.stale_issues,
            },
            "security": {
                "score": m.security.score,
                "has_security_policy": m.security.metrics.has_security_policy,
                "has_dependabot": m.security.metrics.has_dependabot,
                "security_advisories": m.security.metrics.security_advisories,
            },
            "community": {
                "score": m.community.score,
                "total_contributors": m.community.metrics.total_contributors,
                "external_contributors": m.community.metrics.external_contributors,
                "total_comments": m.community.metrics.total_comments,
            },
        },
        "analysis_date": report.last_updated.to_rfc3339(),
        "generated_by": GENERATED_BY,
    })
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn csv_row(report: &AnalysisReport) -> String {
    let repo = &report.repository;
    let m = &report.metrics;

    [
        repo.full_name.clone(),
        m.overall.to_string(),
        m.popularity.score.to_string(),
        m.activity.score.to_string(),
        m.maintenance.score.to_string(),
        m.security.score.to_string(),
        m.community.score.to_string(),
        repo.stargazers_count.to_string(),
        repo.forks_count.to_string(),
        m.community.metrics.total_contributors.to_string(),
        repo.language.clone().unwrap_or_else(|| "N/A".to_string()),
        repo.license_name().unwrap_or("N/A").to_string(),
    ]
    .iter()
    .map(|field| quote(field))
    .collect::<Vec<_>>()
    .join(",")
}

/// One quoted row per repository under a fixed header.
pub fn csv_report(reports: &[&AnalysisReport]) -> String {
    let header = CSV_HEADERS.map(quote).join(",");
    let rows: Vec<String> = reports.par_iter().map(|r| csv_row(r)).collect();

    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn write_json(path: &Path, reports: &[&AnalysisReport]) -> Result<()> {
    let body = match reports {
        [single] => json_report(single),
        many => Value::Array(many.iter().map(|r| json_report(r)).collect()),
    };
    tokio::fs::write(path, serde_json::to_string_pretty(&body)?)
        .await
        .wrap_err_with(|| format!("failed to write json report to {}", path.display()))?;
    info!("wrote json health report to {}", path.display());
    Ok(())
}

pub async fn write_csv(path: &Path, reports: &[&AnalysisReport]) -> Result<()> {
    tokio::fs::write(path, csv_report(reports))
        .await
        .wrap_err_with(|| format!("failed to write csv report to {}", path.display()))?;
    info!("wrote csv comparison to {}", path.display());
    Ok(())
}
