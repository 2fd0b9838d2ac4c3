use colored::Colorize;

use crate::analysis::AnalysisReport;
use crate::report::card::colorize_score;

const COLUMNS: [&str; 6] = ["Overall", "Popular", "Active", "Maint.", "Secure", "Commun."];

fn scores(report: &AnalysisReport) -> [u8; 6] {
    let m = &report.metrics;
    [
        m.overall,
        m.popularity.score,
        m.activity.score,
        m.maintenance.score,
        m.security.score,
        m.community.score,
    ]
}

/// Reports ordered by overall score, best first. Ties keep input order.
pub fn ranked<'a>(reports: &[&'a AnalysisReport]) -> Vec<&'a AnalysisReport> {
    let mut ranked = reports.to_vec();
    ranked.sort_by(|a, b| b.metrics.overall.cmp(&a.metrics.overall));
    ranked
}

/// Side-by-side table; the best value of each column is underlined.
pub fn comparison_table(reports: &[&AnalysisReport]) -> String {
    let ranked = ranked(reports);
    let name_width = ranked
        .iter()
        .map(|r| r.repository.full_name.len())
        .max()
        .unwrap_or(0)
        .max("Repository".len());

    let mut best = [0u8; 6];
    for report in &ranked {
        for (slot, score) in best.iter_mut().zip(scores(report)) {
            *slot = (*slot).max(score);
        }
    }

    let mut out = format!("\n{}\n", "=== Repository Comparison ===".cyan().bold());
    out.push_str(&format!("{:<width$}", "Repository", width = name_width));
    for column in COLUMNS {
        out.push_str(&format!(" {:>8}", column));
    }
    out.push('\n');

    for report in &ranked {
        out.push_str(&format!(
            "{:<width$}",
            report.repository.full_name,
            width = name_width
        ));
        for (score, top) in scores(report).into_iter().zip(best) {
            let cell = format!("{:>8}", score);
            let cell = colorize_score(score, &cell);
            out.push(' ');
            out.push_str(&if score == top && ranked.len() > 1 {
                cell.underline().to_string()
            } else {
                cell.to_string()
            });
        }
        out.push('\n');
    }

    if let Some(leader) = ranked.first().filter(|_| ranked.len() > 1) {
        out.push_str(&format!(
            "\n{} {} ({})\n",
            "Healthiest:".bold(),
            leader.repository.full_name.green(),
            leader.metrics.overall
        ));
    }

    out
}
