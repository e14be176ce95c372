use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::tiers::ContributorMetric;

pub mod analyzer;
pub mod links;
pub mod stats;

pub use analyzer::GitAnalyzer;
pub use links::RepositoryLinker;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub author: String,
    pub author_email: String,
    pub authored_date: DateTime<Utc>,
    pub files_changed: Vec<String>,
    pub insertions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorStats {
    pub name: String,
    pub email: String,
    pub commits: usize,
    pub files_touched: HashSet<String>,
    pub first_commit: DateTime<Utc>,
    pub last_commit: DateTime<Utc>,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl ContributorMetric for AuthorStats {
    fn commits(&self) -> f64 {
        self.commits as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryStats {
    pub path: String,
    pub total_commits: usize,
    pub skipped_commits: usize,
    pub total_authors: usize,
    pub first_commit: Option<DateTime<Utc>>,
    pub last_commit: Option<DateTime<Utc>>,
    pub branches: Vec<String>,
    pub author_stats: HashMap<String, AuthorStats>,
    pub remote_url: Option<String>,
    pub repository_type: RepositoryType,
}

impl RepositoryStats {
    pub fn empty(path: &Path) -> Self {
        Self {
            path: path.display().to_string(),
            total_commits: 0,
            skipped_commits: 0,
            total_authors: 0,
            first_commit: None,
            last_commit: None,
            branches: Vec::new(),
            author_stats: HashMap::new(),
            remote_url: None,
            repository_type: RepositoryType::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RepositoryType {
    GitHub,
    GitLab,
    Bitbucket,
    Other,
    Local,
}
