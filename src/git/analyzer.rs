use super::*;
use crate::config::{AnalysisConfig, AuthorIdentity};
use anyhow::{Context, Result};
use chrono::TimeZone;
use git2::{BranchType, Commit, ErrorCode, Mailmap, Repository, Sort};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct GitAnalyzer {
    repo: Repository,
    path: PathBuf,
}

const MAX_COMMITS_FOR_FULL_ANALYSIS: usize = 200_000;
const BATCH_SIZE: usize = 200;

impl GitAnalyzer {
    pub fn new(path: &Path) -> Result<Self> {
        let repo = Repository::open(path).with_context(|| {
            format!(
                "Failed to open repository at {}\n Is it really a git repo?",
                path.display()
            )
        })?;

        info!("Opened Git repository at {}", path.display());

        Ok(Self {
            repo,
            path: path.to_path_buf(),
        })
    }

    pub async fn analyze(&self, options: &AnalysisConfig) -> Result<RepositoryStats> {
        let filter = AuthorFilter::new(&options.exclude_authors)?;
        let mut stats = RepositoryStats::empty(&self.path);

        self.analyze_branches(&mut stats)?;
        self.analyze_commits(&mut stats, options, &filter).await?;
        stats.total_authors = stats.author_stats.len();
        stats.remote_url = self.detect_remote_url();
        stats.repository_type = self.detect_repository_type(&stats.remote_url);

        info!(
            "Analysis complete: {} commits by {} authors ({} skipped)",
            stats.total_commits, stats.total_authors, stats.skipped_commits
        );

        Ok(stats)
    }

    fn analyze_branches(&self, stats: &mut RepositoryStats) -> Result<()> {
        let branches = self.repo.branches(Some(BranchType::Local))?;

        for branch in branches {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                stats.branches.push(name.to_string());
            }
        }

        debug!("Found {} branches", stats.branches.len());
        Ok(())
    }

    async fn analyze_commits(
        &self,
        stats: &mut RepositoryStats,
        options: &AnalysisConfig,
        filter: &AuthorFilter,
    ) -> Result<()> {
        let mut revwalk = self.repo.revwalk()?;

        match self.repo.head() {
            Ok(head) => {
                if let Some(target) = head.target() {
                    revwalk.push(target)?;
                    info!(
                        "Analyzing commits from current branch: {}",
                        head.shorthand().unwrap_or("HEAD")
                    );
                }
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                warn!("Repository has no commits yet");
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to resolve HEAD"),
        }

        revwalk.set_sorting(Sort::TIME)?;

        let mut commit_oids = Vec::new();
        for oid in revwalk {
            commit_oids.push(oid?);
        }

        let limit = options
            .max_commits
            .unwrap_or(MAX_COMMITS_FOR_FULL_ANALYSIS)
            .min(MAX_COMMITS_FOR_FULL_ANALYSIS);
        if commit_oids.len() > limit {
            info!(
                "Found {} commits, only the {} most recent are counted",
                commit_oids.len(),
                limit
            );
            commit_oids.truncate(limit);
        } else {
            info!("Found {} commits to analyze", commit_oids.len());
        }

        let mailmap = if options.use_mailmap {
            match self.repo.mailmap() {
                Ok(mailmap) => Some(mailmap),
                Err(e) => {
                    debug!("No usable mailmap: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let since = options
            .since
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|midnight| Utc.from_utc_datetime(&midnight));

        let pb = ProgressBar::new(commit_oids.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} commits ({eta})",
            )?
            .progress_chars("#>-"),
        );

        for batch in commit_oids.chunks(BATCH_SIZE) {
            for &oid in batch {
                pb.inc(1);

                let commit = self.repo.find_commit(oid)?;
                if !options.include_merge_commits && commit.parent_count() > 1 {
                    stats.skipped_commits += 1;
                    continue;
                }

                let Some(commit_info) = self.read_commit(&commit, mailmap.as_ref(), since, filter)?
                else {
                    stats.skipped_commits += 1;
                    continue;
                };

                if stats
                    .first_commit
                    .map_or(true, |first| commit_info.authored_date < first)
                {
                    stats.first_commit = Some(commit_info.authored_date);
                }
                if stats
                    .last_commit
                    .map_or(true, |last| commit_info.authored_date > last)
                {
                    stats.last_commit = Some(commit_info.authored_date);
                }

                self.update_author_stats(stats, &commit_info, options.identity);
                stats.total_commits += 1;
            }

            // git2 is not Send, so the walk stays on this task; yield between batches.
            tokio::task::yield_now().await;
        }

        pb.finish_with_message("Commit analysis complete");

        Ok(())
    }

    /// Returns `None` for commits that fall outside the date window, carry an
    /// unrepresentable author time, or belong to an excluded author.
    fn read_commit(
        &self,
        commit: &Commit<'_>,
        mailmap: Option<&Mailmap>,
        since: Option<DateTime<Utc>>,
        filter: &AuthorFilter,
    ) -> Result<Option<CommitInfo>> {
        let author = match mailmap {
            Some(mailmap) => commit.author_with_mailmap(mailmap)?,
            None => commit.author().to_owned(),
        };

        let Some(authored_date) = authored_at(author.when().seconds()) else {
            debug!(
                "Skipping commit {} with out-of-range author time {}",
                commit.id(),
                author.when().seconds()
            );
            return Ok(None);
        };
        if since.is_some_and(|since| authored_date < since) {
            return Ok(None);
        }

        let name = String::from_utf8_lossy(author.name_bytes()).to_string();
        let email = String::from_utf8_lossy(author.email_bytes()).to_string();
        if filter.is_excluded(&name, &email) {
            debug!("Skipping commit {} by excluded author {}", commit.id(), name);
            return Ok(None);
        }

        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };
        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
            .with_context(|| format!("Failed to diff commit {}", commit.id()))?;
        let diff_stats = diff.stats()?;

        let files_changed = diff
            .deltas()
            .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
            .map(|path| path.to_string_lossy().into_owned())
            .collect();

        Ok(Some(CommitInfo {
            author: name,
            author_email: email,
            authored_date,
            files_changed,
            insertions: diff_stats.insertions(),
            deletions: diff_stats.deletions(),
        }))
    }

    fn update_author_stats(
        &self,
        stats: &mut RepositoryStats,
        commit: &CommitInfo,
        identity: AuthorIdentity,
    ) {
        let author_key = author_key(&commit.author, &commit.author_email, identity);

        let author_stats = stats.author_stats.entry(author_key).or_insert(AuthorStats {
            name: commit.author.clone(),
            email: commit.author_email.clone(),
            commits: 0,
            files_touched: HashSet::new(),
            first_commit: commit.authored_date,
            last_commit: commit.authored_date,
            lines_added: 0,
            lines_removed: 0,
        });

        author_stats.commits += 1;
        author_stats.lines_added += commit.insertions;
        author_stats.lines_removed += commit.deletions;

        if commit.authored_date < author_stats.first_commit {
            author_stats.first_commit = commit.authored_date;
        }
        if commit.authored_date > author_stats.last_commit {
            author_stats.last_commit = commit.authored_date;
        }

        for file in &commit.files_changed {
            author_stats.files_touched.insert(file.clone());
        }
    }

    fn detect_remote_url(&self) -> Option<String> {
        if let Ok(remote) = self.repo.find_remote("origin") {
            if let Some(url) = remote.url() {
                return Some(url.to_string());
            }
        }

        if let Ok(remotes) = self.repo.remotes() {
            for remote_name in remotes.iter().flatten() {
                if let Ok(remote) = self.repo.find_remote(remote_name) {
                    if let Some(url) = remote.url() {
                        return Some(url.to_string());
                    }
                }
            }
        }

        None
    }

    fn detect_repository_type(&self, remote_url: &Option<String>) -> RepositoryType {
        if let Some(url) = remote_url {
            let url_lower = url.to_lowercase();
            if url_lower.contains("gitlab") {
                RepositoryType::GitLab
            } else if url_lower.contains("github") {
                RepositoryType::GitHub
            } else if url_lower.contains("bitbucket") {
                RepositoryType::Bitbucket
            } else {
                RepositoryType::Other
            }
        } else {
            RepositoryType::Local
        }
    }
}

/// `None` when git's timestamp lies outside what chrono can represent.
fn authored_at(seconds: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(seconds, 0).single()
}

fn author_key(name: &str, email: &str, identity: AuthorIdentity) -> String {
    match identity {
        AuthorIdentity::Email if !email.trim().is_empty() => email.trim().to_lowercase(),
        AuthorIdentity::Email => name.trim().to_lowercase(),
        AuthorIdentity::NameEmail => format!("{}:{}", name, email),
    }
}

struct AuthorFilter {
    patterns: Vec<Regex>,
}

impl AuthorFilter {
    fn new(patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).with_context(|| format!("Invalid author exclusion pattern '{}'", p))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    fn is_excluded(&self, name: &str, email: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let who = format!("{} <{}>", name, email);
        self.patterns.iter().any(|re| re.is_match(&who))
    }
}
