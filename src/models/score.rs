use serde::{Deserialize, Serialize};

/// A sub-score with the raw figures it was computed from and the points
/// each factor contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubScore<M, B> {
    pub score: u8,
    pub metrics: M,
    pub breakdown: B,
}

pub type PopularityScore = SubScore<PopularityMetrics, PopularityBreakdown>;
pub type ActivityScore = SubScore<ActivityMetrics, ActivityBreakdown>;
pub type MaintenanceScore = SubScore<MaintenanceMetrics, MaintenanceBreakdown>;
pub type SecurityScore = SubScore<SecurityMetrics, SecurityBreakdown>;
pub type CommunityScore = SubScore<CommunityMetrics, CommunityBreakdown>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub popularity: PopularityScore,
    pub activity: ActivityScore,
    pub maintenance: MaintenanceScore,
    pub security: SecurityScore,
    pub community: CommunityScore,
    pub overall: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopularityMetrics {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub downloads: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopularityBreakdown {
    pub stars: u32,
    pub forks: u32,
    pub watchers: u32,
    pub downloads: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetrics {
    pub recent_issues: usize,
    #[serde(rename = "recentPRs")]
    pub recent_prs: usize,
    pub recent_releases: usize,
    pub days_since_last_push: i64,
    pub last_push: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBreakdown {
    pub issues: u32,
    pub pull_requests: u32,
    pub releases: u32,
    pub recency: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceMetrics {
    pub open_issues: usize,
    pub closed_issues: usize,
    #[serde(rename = "openPRs")]
    pub open_prs: usize,
    #[serde(rename = "closedPRs")]
    pub closed_prs: usize,
    pub stale_issues: usize,
    #[serde(rename = "stalePRs")]
    pub stale_prs: usize,
    pub issue_close_ratio: f64,
    pub pr_close_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceBreakdown {
    pub issue_management: u32,
    pub pr_management: u32,
    pub stale_penalty: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityMetrics {
    pub security_advisories: usize,
    pub has_security_policy: bool,
    pub has_dependabot: bool,
    /// Requires permissions a read token never has; always zero.
    pub vulnerability_alerts: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityBreakdown {
    pub security_features: u32,
    pub advisory_penalty: u32,
    pub responsiveness_bonus: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityMetrics {
    pub total_contributors: usize,
    pub core_contributors: usize,
    pub external_contributors: usize,
    pub active_contributors: usize,
    pub total_comments: u64,
    pub total_commits: u64,
    pub contributor_diversity: f64,
    pub activity_ratio: f64,
    pub avg_comments_per_issue: f64,
    pub has_wiki: bool,
    pub has_discussions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityBreakdown {
    pub contributors: u32,
    pub core_contributors: u32,
    pub diversity: u32,
    pub activity: u32,
    pub engagement: u32,
    pub features: u32,
}

/// Qualitative band used by score cards and the overall status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLabel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreLabel {
    pub fn of(score: u8) -> Self {
        match score {
            80.. => ScoreLabel::Excellent,
            60..=79 => ScoreLabel::Good,
            40..=59 => ScoreLabel::Fair,
            _ => ScoreLabel::Poor,
        }
    }
}

impl std::fmt::Display for ScoreLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ScoreLabel::Excellent => "Excellent",
            ScoreLabel::Good => "Good",
            ScoreLabel::Fair => "Fair",
            ScoreLabel::Poor => "Poor",
        };
        f.write_str(label)
    }
}
