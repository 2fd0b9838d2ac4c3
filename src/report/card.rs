use colored::{ColoredString, Colorize};

use crate::analysis::AnalysisReport;
use crate::models::github::TrendingRepository;
use crate::models::score::ScoreLabel;
use crate::report::insights::{InsightKind, insights};

const BAR_WIDTH: usize = 20;

pub fn colorize_score(score: u8, text: &str) -> ColoredString {
    match ScoreLabel::of(score) {
        ScoreLabel::Excellent => text.green(),
        ScoreLabel::Good => text.blue(),
        ScoreLabel::Fair => text.yellow(),
        ScoreLabel::Poor => text.red(),
    }
}

fn bar(score: u8) -> String {
    let filled = usize::from(score.min(100)) * BAR_WIDTH / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// 1234 -> "1.2k", 2500000 -> "2.5M".
pub fn compact(n: u64) -> String {
    match n {
        0..1_000 => n.to_string(),
        1_000..1_000_000 => format!("{:.1}k", n as f64 / 1_000.0),
        _ => format!("{:.1}M", n as f64 / 1_000_000.0),
    }
}

/// Terminal rendering of one analyzed repository.
pub struct ScoreCardAssembler<'a> {
    report: &'a AnalysisReport,
}

impl<'a> ScoreCardAssembler<'a> {
    pub fn new(report: &'a AnalysisReport) -> Self {
        Self { report }
    }

    pub fn assemble(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header());
        out.push_str(&self.overall());
        out.push_str(&self.scores());
        out.push_str(&self.insights());
        out.push_str(&self.footer());
        out
    }

    fn header(&self) -> String {
        let repo = &self.report.repository;
        let mut header = format!("\n{}\n", repo.full_name.bold().cyan());

        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            header.push_str(&format!("{}\n", description.dimmed()));
        }

        header.push_str(&format!(
            "★ {}  ⑂ {}  {}  {}\n",
            compact(repo.stargazers_count),
            compact(repo.forks_count),
            repo.language.as_deref().unwrap_or("N/A"),
            repo.license_name().unwrap_or("no license"),
        ));

        header
    }

    fn overall(&self) -> String {
        let overall = self.report.metrics.overall;
        format!(
            "\n{} {} ({})\n\n",
            "Overall health:".bold(),
            colorize_score(overall, &overall.to_string()).bold(),
            colorize_score(overall, &ScoreLabel::of(overall).to_string()),
        )
    }

    fn scores(&self) -> String {
        let m = &self.report.metrics;
        let rows = [
            ("Popularity", m.popularity.score),
            ("Activity", m.activity.score),
            ("Maintenance", m.maintenance.score),
            ("Security", m.security.score),
            ("Community", m.community.score),
        ];

        let mut out = String::new();
        for (name, score) in rows {
            out.push_str(&format!(
                "  {:<12} {:>3}  {}  {}\n",
                name,
                score,
                colorize_score(score, &bar(score)),
                ScoreLabel::of(score),
            ));
        }

        out.push_str(&format!(
            "\n  {} recent issues, {} recent PRs, {} releases in 90 days, last push {} days ago\n",
            m.activity.metrics.recent_issues,
            m.activity.metrics.recent_prs,
            m.activity.metrics.recent_releases,
            m.activity.metrics.days_since_last_push,
        ));
        out.push_str(&format!(
            "  {} contributors ({} core, {} external), {} comments\n",
            m.community.metrics.total_contributors,
            m.community.metrics.core_contributors,
            m.community.metrics.external_contributors,
            m.community.metrics.total_comments,
        ));

        out
    }

    fn insights(&self) -> String {
        let insights = insights(self.report);
        if insights.is_empty() {
            return String::new();
        }

        let mut out = format!("\n{}\n", "Insights".bold());
        for insight in insights {
            let marker = match insight.kind {
                InsightKind::Success => "✓".green(),
                InsightKind::Warning => "!".yellow(),
                InsightKind::Info => "i".blue(),
            };
            out.push_str(&format!(
                "  {} {} {}\n",
                marker,
                format!("[{}]", insight.category).dimmed(),
                insight.message
            ));
        }
        out
    }

    fn footer(&self) -> String {
        if self.report.degraded_sources.is_empty() {
            return String::new();
        }
        format!(
            "\n{} {}\n",
            "partial data, unavailable:".yellow(),
            self.report.degraded_sources.join(", ")
        )
    }
}

pub fn trending_list(repos: &[TrendingRepository]) -> String {
    let mut out = format!("\n{}\n", "=== Most Starred Repositories ===".cyan().bold());
    for (rank, repo) in repos.iter().enumerate() {
        out.push_str(&format!(
            "{:>2}. {} {} {}\n",
            rank + 1,
            repo.full_name.bold(),
            format!("★ {}", compact(repo.stargazers_count)).yellow(),
            repo.language.as_deref().unwrap_or("").dimmed(),
        ));
        if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(&format!("    {}\n", description));
        }
    }
    out
}
