use crate::analysis::AnalysisReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insight {
    pub kind: InsightKind,
    pub category: &'static str,
    pub message: String,
}

impl Insight {
    fn new(kind: InsightKind, category: &'static str, message: impl Into<String>) -> Self {
        Insight {
            kind,
            category,
            message: message.into(),
        }
    }
}

pub fn insights(report: &AnalysisReport) -> Vec<Insight> {
    use InsightKind::*;

    let metrics = &report.metrics;
    let repo = &report.repository;
    let mut out = Vec::new();

    if metrics.popularity.score >= 80 {
        out.push(Insight::new(
            Success,
            "Popularity",
            "Excellent popularity with strong community adoption",
        ));
    } else if metrics.popularity.score < 40 {
        out.push(Insight::new(
            Warning,
            "Popularity",
            "Low popularity - consider improving documentation and outreach",
        ));
    }

    let days = metrics.activity.metrics.days_since_last_push;
    if days > 90 {
        out.push(Insight::new(
            Warning,
            "Activity",
            format!("No recent activity ({} days since last push)", days),
        ));
    } else if metrics.activity.score >= 70 {
        out.push(Insight::new(
            Success,
            "Activity",
            "Active development with regular updates",
        ));
    }

    let stale = metrics.maintenance.metrics.stale_issues;
    if stale > 20 {
        out.push(Insight::new(
            Warning,
            "Maintenance",
            format!("High number of stale issues ({}) - needs attention", stale),
        ));
    }
    if metrics.maintenance.metrics.issue_close_ratio < 0.5 {
        out.push(Insight::new(
            Info,
            "Maintenance",
            "Low issue close ratio - consider improving issue triage",
        ));
    }

    let security = &metrics.security.metrics;
    if security.has_security_policy && security.has_dependabot {
        out.push(Insight::new(
            Success,
            "Security",
            "Good security practices with secret scanning and automated updates",
        ));
    } else {
        out.push(Insight::new(
            Info,
            "Security",
            "Consider enabling secret scanning and Dependabot security updates",
        ));
    }

    let community = &metrics.community.metrics;
    if community.total_contributors == 1 {
        out.push(Insight::new(
            Warning,
            "Community",
            "Single contributor - project may be at risk if the maintainer becomes unavailable",
        ));
    } else if community.external_contributors > 10 {
        out.push(Insight::new(
            Success,
            "Community",
            "Strong external contributor base indicates a healthy community",
        ));
    }

    if repo.license.is_none() {
        out.push(Insight::new(
            Warning,
            "Legal",
            "No license specified - may limit adoption and contributions",
        ));
    }

    if !repo.has_wiki && repo.description.as_deref().is_none_or(str::is_empty) {
        out.push(Insight::new(
            Info,
            "Documentation",
            "Consider adding documentation and a project description",
        ));
    }

    out
}
