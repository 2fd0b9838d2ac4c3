use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use eyre::{Report, eyre};
use regex::Regex;

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com[/:]([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+?)(?:\.git)?/?(?:[#?/].*)?$")
        .expect("static regex")
});

static SLUG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$").expect("static regex")
});

/// An `owner/repo` pair parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepoRef {
    type Err = Report;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let captures = SLUG
            .captures(input)
            .or_else(|| GITHUB_URL.captures(input))
            .ok_or_else(|| {
                eyre!(
                    "invalid repository '{}': expected owner/repo or a github.com URL",
                    input
                )
            })?;

        Ok(RepoRef {
            owner: captures[1].to_string(),
            repo: captures[2].to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
