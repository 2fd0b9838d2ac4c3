use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoryOwner {
    pub login: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RepositoryLicense {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FeatureStatus {
    pub status: String,
}

impl FeatureStatus {
    pub fn is_enabled(&self) -> bool {
        self.status == "enabled"
    }
}

/// Only visible to tokens with admin rights on the repository.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct SecurityAndAnalysis {
    #[serde(default)]
    pub secret_scanning: Option<FeatureStatus>,
    #[serde(default)]
    pub dependabot_security_updates: Option<FeatureStatus>,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub owner: RepositoryOwner,
    pub html_url: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub pushed_at: Option<String>,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub forks_count: u64,
    pub open_issues_count: u64,
    pub language: Option<String>,
    pub has_wiki: bool,
    pub has_discussions: bool,
    pub archived: bool,
    pub license: Option<RepositoryLicense>,
    pub topics: Vec<String>,
    pub security_and_analysis: Option<SecurityAndAnalysis>,
}

impl Repository {
    pub fn has_secret_scanning(&self) -> bool {
        self.security_and_analysis
            .as_ref()
            .and_then(|s| s.secret_scanning.as_ref())
            .is_some_and(FeatureStatus::is_enabled)
    }

    pub fn has_dependabot(&self) -> bool {
        self.security_and_analysis
            .as_ref()
            .and_then(|s| s.dependabot_security_updates.as_ref())
            .is_some_and(FeatureStatus::is_enabled)
    }

    pub fn license_name(&self) -> Option<&str> {
        self.license.as_ref().map(|l| l.name.as_str())
    }
}

/// Entry of `/contributors?anon=true`. Anonymous entries carry no login.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct Contributor {
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub contributions: u64,
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct StatsAuthor {
    pub login: String,
}

/// One week of `/stats/contributors` data: `w` is a unix timestamp in
/// seconds, `a`/`d`/`c` are additions, deletions and commits.
#[derive(Debug, Default, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct WeeklyActivity {
    pub w: i64,
    #[serde(default)]
    pub a: u64,
    #[serde(default)]
    pub d: u64,
    #[serde(default)]
    pub c: u64,
}

impl WeeklyActivity {
    pub fn has_activity(&self) -> bool {
        self.c > 0 || self.a > 0 || self.d > 0
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ContributorStats {
    #[serde(default)]
    pub author: Option<StatsAuthor>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub weeks: Vec<WeeklyActivity>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    Open,
    Closed,
}

/// Shared shape of issues and pull requests. The issues endpoint also
/// returns pull requests, tagged by the presence of `pull_request`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Issue {
    pub state: ItemState,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub comments: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<serde_json::Value>,
}

impl Issue {
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

pub type PullRequest = Issue;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Release {
    pub created_at: String,
    #[serde(default)]
    pub tag_name: Option<String>,
}

/// Drafts have no `published_at`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SecurityAdvisory {
    #[serde(default)]
    pub ghsa_id: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TrendingRepository {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse<T> {
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_deserializes_security_flags() {
        let json = r#"{
            "name": "widget",
            "full_name": "acme/widget",
            "owner": { "login": "acme" },
            "html_url": "https://github.com/acme/widget",
            "pushed_at": "2024-01-15T10:30:00Z",
            "stargazers_count": 1200,
            "has_wiki": true,
            "security_and_analysis": {
                "secret_scanning": { "status": "enabled" },
                "dependabot_security_updates": { "status": "disabled" }
            }
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.owner.login, "acme");
        assert_eq!(repo.stargazers_count, 1200);
        assert!(repo.has_wiki);
        assert!(!repo.has_discussions);
        assert!(repo.has_secret_scanning());
        assert!(!repo.has_dependabot());
    }

    #[test]
    fn test_security_flags_default_to_disabled() {
        let repo = Repository::default();
        assert!(!repo.has_secret_scanning());
        assert!(!repo.has_dependabot());
    }

    #[test]
    fn test_issue_detects_pull_request_shape() {
        let json = r#"[
            { "state": "open", "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z", "comments": 3 },
            { "state": "closed", "created_at": "2024-01-01T00:00:00Z", "updated_at": "2024-01-02T00:00:00Z",
              "pull_request": { "url": "https://api.github.com/repos/acme/widget/pulls/2" } }
        ]"#;

        let issues: Vec<Issue> = serde_json::from_str(json).unwrap();
        assert!(!issues[0].is_pull_request());
        assert!(issues[1].is_pull_request());
        assert_eq!(issues[0].state, ItemState::Open);
        assert_eq!(issues[1].comments, 0);
    }

    #[test]
    fn test_anonymous_contributor_has_no_login() {
        let json = r#"{ "type": "Anonymous", "name": "someone", "contributions": 4 }"#;
        let contributor: Contributor = serde_json::from_str(json).unwrap();
        assert_eq!(contributor.login, None);
        assert_eq!(contributor.contributions, 4);
    }
}
