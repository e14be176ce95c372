use super::*;
use colored::*;
use std::fmt::Write as _;

const NAME_WIDTH: usize = 32;

pub struct TextGenerator {
    color: bool,
    max_rows: usize,
}

impl TextGenerator {
    pub fn new(color: bool, max_rows: usize) -> Self {
        Self { color, max_rows }
    }

    fn paint_tier(&self, tier: Tier) -> String {
        let label = format!("{:<4}", tier);
        if !self.color {
            return label;
        }
        match tier {
            Tier::S => label.bright_magenta().bold().to_string(),
            Tier::A => label.bright_green().bold().to_string(),
            Tier::B => label.bright_yellow().to_string(),
            Tier::C => label.white().to_string(),
        }
    }

    fn paint_heading(&self, text: &str) -> String {
        if self.color {
            text.bright_cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() <= width {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(width.saturating_sub(1)).collect();
        short.push('~');
        short
    }
}

fn write_repository(out: &mut String, repo: &RepositorySummary) -> Result<()> {
    match &repo.url {
        Some(url) => writeln!(out, "{}: {}", repo.hosting, url)?,
        None => writeln!(out, "{}", repo.hosting)?,
    }
    write!(
        out,
        "{} commits counted, {} skipped, {} branches",
        repo.commits_counted,
        repo.commits_skipped,
        repo.branches.len()
    )?;
    if let (Some(first), Some(last)) = (repo.first_commit, repo.last_commit) {
        write!(out, ", {} to {}", first, last)?;
    }
    writeln!(out)?;
    writeln!(out)?;
    Ok(())
}

impl OutputGenerator for TextGenerator {
    fn generate(&mut self, leaderboard: &Leaderboard) -> Result<String> {
        let mut out = String::new();

        writeln!(
            out,
            "{}",
            self.paint_heading(&format!("Contributor tiers for {}", leaderboard.source))
        )?;

        if let Some(repo) = &leaderboard.repository {
            write_repository(&mut out, repo)?;
        }

        if leaderboard.rows.is_empty() {
            writeln!(out, "No contributors to rank.")?;
            return Ok(out);
        }

        let with_activity = leaderboard.has_activity();

        write!(
            out,
            "{:>5}  {:<4}  {:<width$}  {:>10}  {:>10}",
            "#",
            "TIER",
            "CONTRIBUTOR",
            "COMMITS",
            "PERCENTILE",
            width = NAME_WIDTH
        )?;
        if with_activity {
            write!(
                out,
                "  {:>9}  {:>9}  {:>6}  {:<10}",
                "ADDED",
                "REMOVED",
                "FILES",
                "SINCE"
            )?;
        }
        writeln!(out)?;

        for row in leaderboard.rows.iter().take(self.max_rows) {
            write!(
                out,
                "{:>5}  {}  {:<width$}  {:>10}  {:>9.1}%",
                row.position,
                self.paint_tier(row.tier),
                truncate(&row.name, NAME_WIDTH),
                format_commits(row.commits),
                row.percentile * 100.0,
                width = NAME_WIDTH
            )?;
            if let Some(activity) = &row.activity {
                write!(
                    out,
                    "  {:>9}  {:>9}  {:>6}  {}",
                    format!("+{}", activity.lines_added),
                    format!("-{}", activity.lines_removed),
                    activity.files_touched,
                    activity.active_since
                )?;
            }
            writeln!(out)?;
        }

        let hidden = leaderboard.rows.len().saturating_sub(self.max_rows);
        if hidden > 0 {
            writeln!(out, "  ... {} more", hidden)?;
        }

        writeln!(out)?;
        for band in &leaderboard.bands {
            let range = format!("{:.0}-{:.0}%", band.from * 100.0, band.to * 100.0);
            writeln!(
                out,
                "{} {:<8} {:>5} contributors ({:.1}%)",
                self.paint_tier(band.tier),
                range,
                band.count,
                band.percentage
            )?;
        }

        Ok(out)
    }
}
