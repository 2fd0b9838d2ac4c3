use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "repo-health")]
#[command(about = "Score the health of open-source repositories using GitHub and package registry data", long_about = None)]
pub struct Args {
    /// Repositories to analyze, as `owner/repo` or a GitHub URL
    #[arg(value_name = "REPO")]
    pub repos: Vec<String>,

    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
    pub config: PathBuf,

    /// Write a JSON health report for each analyzed repository into this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write a CSV comparison of all analyzed repositories into this file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// List the most starred repositories, optionally for one language
    #[arg(short, long, value_name = "LANG", num_args = 0..=1, default_missing_value = "")]
    pub trending: Option<String>,

    /// Keep prompting for repositories to analyze
    #[arg(short, long)]
    pub interactive: bool,

    /// Evaluate freshness windows as of this RFC 3339 instant instead of now
    #[arg(long, value_name = "TIMESTAMP")]
    pub as_of: Option<DateTime<Utc>>,

    /// Sets the logger's verbosity level
    #[arg(short, long, value_name = "VERBOSITY", default_value_t = LevelFilter::Info)]
    pub verbosity: LevelFilter,
}

impl Args {
    /// `Some(None)` for all languages, `Some(Some(lang))` for one.
    pub fn trending_language(&self) -> Option<Option<&str>> {
        self.trending
            .as_deref()
            .map(|lang| Some(lang.trim()).filter(|l| !l.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_repositories_and_exports() {
        let args = Args::parse_from([
            "repo-health",
            "rust-lang/rust",
            "https://github.com/tokio-rs/tokio",
            "--csv",
            "out.csv",
        ]);
        assert_eq!(args.repos.len(), 2);
        assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(args.json, None);
        assert_eq!(args.trending_language(), None);
    }

    #[test]
    fn test_trending_with_and_without_language() {
        let args = Args::parse_from(["repo-health", "--trending"]);
        assert_eq!(args.trending_language(), Some(None));

        let args = Args::parse_from(["repo-health", "--trending", "rust"]);
        assert_eq!(args.trending_language(), Some(Some("rust")));
    }

    #[test]
    fn test_as_of_parses_rfc3339() {
        let args = Args::parse_from(["repo-health", "acme/widget", "--as-of", "2024-06-01T12:00:00Z"]);
        assert_eq!(
            args.as_of.map(|t| t.to_rfc3339()),
            Some("2024-06-01T12:00:00+00:00".to_string())
        );
    }
}
