use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod html;
pub mod reporter;
pub mod text;

pub use reporter::Reporter;

use crate::git::{AuthorStats, RepositoryLinker, RepositoryStats};
use crate::input::ContributorRecord;
use crate::tiers::{ContributorMetric, Tier, TierAssignment, TierDistribution, TIER_THRESHOLDS};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "html" => OutputFormat::Html,
            _ => OutputFormat::Text,
        }
    }
}

pub fn add_file_extension(path: &str, format: &OutputFormat) -> String {
    let extension = match format {
        OutputFormat::Html => ".html",
        OutputFormat::Json => ".json",
        OutputFormat::Text => ".txt",
    };

    if path.ends_with(extension) {
        path.to_string()
    } else {
        format!("{}{}", path, extension)
    }
}

pub trait OutputGenerator {
    fn generate(&mut self, leaderboard: &Leaderboard) -> Result<String>;
}

/// A ranked record that can be shown on a leaderboard.
pub trait LeaderboardSubject: ContributorMetric {
    fn display_name(&self) -> &str;
    fn email(&self) -> Option<&str>;

    /// Change volume behind the commits, when the source knows it.
    fn activity(&self) -> Option<Activity> {
        None
    }
}

impl<T: LeaderboardSubject + ?Sized> LeaderboardSubject for &T {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    fn email(&self) -> Option<&str> {
        (**self).email()
    }

    fn activity(&self) -> Option<Activity> {
        (**self).activity()
    }
}

impl LeaderboardSubject for AuthorStats {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn email(&self) -> Option<&str> {
        Some(self.email.as_str()).filter(|e| !e.is_empty())
    }

    fn activity(&self) -> Option<Activity> {
        Some(Activity {
            lines_added: self.lines_added,
            lines_removed: self.lines_removed,
            files_touched: self.files_touched.len(),
            active_since: self.first_commit.date_naive(),
            last_active: self.last_commit.date_naive(),
        })
    }
}

impl LeaderboardSubject for ContributorRecord {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardRow {
    pub position: usize,
    pub name: String,
    pub email: Option<String>,
    pub commits: f64,
    pub percentile: f64,
    pub tier: Tier,
    pub profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub files_touched: usize,
    pub active_since: NaiveDate,
    pub last_active: NaiveDate,
}

/// What was walked to produce a git-sourced leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub hosting: String,
    pub url: Option<String>,
    pub commits_counted: usize,
    pub commits_skipped: usize,
    pub branches: Vec<String>,
    pub first_commit: Option<NaiveDate>,
    pub last_commit: Option<NaiveDate>,
}

impl RepositorySummary {
    pub fn from_stats(stats: &RepositoryStats) -> Self {
        let linker = RepositoryLinker::new(stats);
        Self {
            hosting: linker.get_repository_name(),
            url: linker.get_base_url(),
            commits_counted: stats.total_commits,
            commits_skipped: stats.skipped_commits,
            branches: stats.branches.clone(),
            first_commit: stats.first_commit.map(|t| t.date_naive()),
            last_commit: stats.last_commit.map(|t| t.date_naive()),
        }
    }
}

/// Percentile band of a tier and how many contributors fell into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierBand {
    pub tier: Tier,
    pub from: f64,
    pub to: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Leaderboard {
    pub source: String,
    pub generated_at: DateTime<Utc>,
    pub total_contributors: usize,
    pub distribution: TierDistribution,
    pub bands: Vec<TierBand>,
    pub rows: Vec<LeaderboardRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositorySummary>,
}

impl Leaderboard {
    /// Rows come out in rank order. `records` must be the slice that produced
    /// `assignment`.
    pub fn build<R: LeaderboardSubject>(
        source: &str,
        records: &[R],
        assignment: &TierAssignment,
        linker: Option<&RepositoryLinker<'_>>,
    ) -> Self {
        let rows: Vec<LeaderboardRow> = assignment
            .ranked()
            .into_iter()
            .filter_map(|placement| {
                let record = records.get(placement.index)?;
                let email = record.email().map(str::to_string);
                let profile_url = linker.and_then(|linker| {
                    linker.get_author_commits_url(
                        record.display_name(),
                        email.as_deref().unwrap_or(""),
                    )
                });
                Some(LeaderboardRow {
                    position: placement.position,
                    name: record.display_name().to_string(),
                    email,
                    commits: record.commits(),
                    percentile: placement.percentile,
                    tier: placement.tier,
                    profile_url,
                    activity: record.activity(),
                })
            })
            .collect();

        let distribution = assignment.distribution();

        Self {
            source: source.to_string(),
            generated_at: Utc::now(),
            total_contributors: rows.len(),
            distribution,
            bands: tier_bands(&distribution),
            rows,
            repository: None,
        }
    }

    pub fn with_repository(mut self, stats: &RepositoryStats) -> Self {
        self.repository = Some(RepositorySummary::from_stats(stats));
        self
    }

    /// Drops the rows of every other tier. Totals and bands still describe
    /// the whole ranked population.
    pub fn retain_tier(&mut self, tier: Tier) {
        self.rows.retain(|row| row.tier == tier);
    }

    pub fn has_activity(&self) -> bool {
        self.rows.iter().any(|row| row.activity.is_some())
    }
}

pub fn tier_bands(distribution: &TierDistribution) -> Vec<TierBand> {
    let mut from = 0.0;
    TIER_THRESHOLDS
        .bands()
        .iter()
        .map(|&(to, tier)| {
            let band = TierBand {
                tier,
                from,
                to,
                count: distribution.count(tier),
                percentage: distribution.percentage(tier),
            };
            from = to;
            band
        })
        .collect()
}

/// Whole counts print without a fractional part.
pub fn format_commits(commits: f64) -> String {
    if commits.fract() == 0.0 && commits.abs() < 1e15 {
        format!("{:.0}", commits)
    } else {
        format!("{:.2}", commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::assign_tiers;

    fn record(name: &str, commits: f64) -> ContributorRecord {
        ContributorRecord {
            name: name.to_string(),
            email: None,
            commits,
        }
    }

    #[test]
    fn format_parsing_falls_back_to_text() {
        assert_eq!(OutputFormat::from("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from("html"), OutputFormat::Html);
        assert_eq!(OutputFormat::from("csv"), OutputFormat::Text);
    }

    #[test]
    fn extension_added_once() {
        assert_eq!(add_file_extension("report", &OutputFormat::Json), "report.json");
        assert_eq!(add_file_extension("report.html", &OutputFormat::Html), "report.html");
    }

    #[test]
    fn leaderboard_rows_follow_rank() {
        let records = vec![record("low", 1.0), record("high", 1000.0)];
        let assignment = assign_tiers(&records);
        let board = Leaderboard::build("metrics.json", &records, &assignment, None);

        assert_eq!(board.total_contributors, 2);
        assert_eq!(board.rows[0].name, "high");
        assert_eq!(board.rows[0].tier, Tier::B);
        assert_eq!(board.rows[0].position, 1);
        assert_eq!(board.rows[1].name, "low");
        assert_eq!(board.rows[1].tier, Tier::C);
        assert_eq!(board.distribution.c, 1);
        assert_eq!(board.distribution.s, 0);
    }

    #[test]
    fn bands_cover_unit_interval() {
        let records: Vec<ContributorRecord> =
            (0..10).map(|i| record(&format!("dev{}", i), i as f64)).collect();
        let board = Leaderboard::build("x", &records, &assign_tiers(&records), None);

        let bands = &board.bands;
        assert_eq!(bands.len(), 4);
        assert_eq!(bands[0].from, 0.0);
        assert_eq!(bands[3].to, 1.0);
        assert!(bands.windows(2).all(|w| w[0].to == w[1].from));
        let counts: Vec<usize> = bands.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 2, 3, 4]);
        assert_eq!(bands[3].percentage, 40.0);
    }

    #[test]
    fn tier_filter_keeps_population_totals() {
        let records: Vec<ContributorRecord> =
            (0..10).map(|i| record(&format!("dev{}", i), i as f64)).collect();
        let mut board = Leaderboard::build("x", &records, &assign_tiers(&records), None);

        board.retain_tier(Tier::A);
        let names: Vec<&str> = board.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["dev8", "dev7"]);
        assert_eq!(board.total_contributors, 10);
        assert_eq!(board.distribution.c, 4);

        board.retain_tier(Tier::S);
        assert!(board.rows.is_empty());
    }

    #[test]
    fn metrics_records_carry_no_activity() -> Result<()> {
        let records = vec![record("solo", 4.0)];
        let board = Leaderboard::build("m", &records, &assign_tiers(&records), None);
        assert!(!board.has_activity());
        assert!(board.repository.is_none());

        let value = serde_json::to_value(&board)?;
        assert!(value.get("repository").is_none());
        assert!(value["rows"][0].get("activity").is_none());
        Ok(())
    }

    #[test]
    fn git_authors_carry_activity_and_repository() -> Result<()> {
        let day = |d: u32| -> Result<DateTime<Utc>> {
            NaiveDate::from_ymd_opt(2024, 3, d)
                .and_then(|date| date.and_hms_opt(12, 0, 0))
                .map(|t| t.and_utc())
                .ok_or_else(|| anyhow::anyhow!("bad date"))
        };
        let mut stats = RepositoryStats::empty(std::path::Path::new("widgets"));
        stats.remote_url = Some("git@github.com:acme/widgets.git".to_string());
        stats.repository_type = crate::git::RepositoryType::GitHub;
        stats.total_commits = 7;
        stats.skipped_commits = 2;
        stats.branches = vec!["main".to_string()];
        stats.first_commit = Some(day(1)?);
        stats.last_commit = Some(day(9)?);
        stats.author_stats.insert(
            "ada@example.com".to_string(),
            AuthorStats {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                commits: 7,
                files_touched: ["a.rs", "b.rs"].iter().map(|f| f.to_string()).collect(),
                first_commit: day(1)?,
                last_commit: day(9)?,
                lines_added: 120,
                lines_removed: 30,
            },
        );

        let contributors = stats.contributors();
        let board = Leaderboard::build("widgets", &contributors, &assign_tiers(&contributors), None)
            .with_repository(&stats);

        let activity = board.rows[0].activity.ok_or_else(|| anyhow::anyhow!("no activity"))?;
        assert_eq!((activity.lines_added, activity.lines_removed), (120, 30));
        assert_eq!(activity.files_touched, 2);
        assert_eq!(activity.active_since, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(board.has_activity());

        let repo = board.repository.as_ref().unwrap();
        assert_eq!(repo.hosting, "GitHub");
        assert_eq!(repo.url.as_deref(), Some("https://github.com/acme/widgets"));
        assert_eq!((repo.commits_counted, repo.commits_skipped), (7, 2));
        assert_eq!(repo.last_commit, NaiveDate::from_ymd_opt(2024, 3, 9));

        let value = serde_json::to_value(&board)?;
        assert_eq!(value["rows"][0]["activity"]["lines_added"], 120);
        assert_eq!(value["rows"][0]["activity"]["active_since"], "2024-03-01");
        assert_eq!(value["repository"]["hosting"], "GitHub");
        Ok(())
    }

    #[test]
    fn commit_counts_print_compactly() {
        assert_eq!(format_commits(12.0), "12");
        assert_eq!(format_commits(3.5), "3.50");
        assert_eq!(format_commits(0.0), "0");
    }
}
