use anyhow::Result;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser};
use colored::*;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use commitrank::config::{CliOverrides, Config};
use commitrank::git::{GitAnalyzer, RepositoryLinker};
use commitrank::input;
use commitrank::output::{Leaderboard, Reporter};
use commitrank::tiers::{assign_tiers, Tier};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["repo", "metrics"])))]
struct Cli {
    /// Repository whose authors are ranked
    #[arg(short, long)]
    repo: Option<PathBuf>,

    /// JSON file of contributor records to rank instead of a repository
    #[arg(short, long)]
    metrics: Option<PathBuf>,

    /// Output format (text, json, html)
    #[arg(short, long)]
    output: Option<String>,

    /// Output file for json/html (extension added when missing)
    #[arg(long, default_value = "commitrank_report")]
    output_file: String,

    /// Only count commits authored on or after this date (YYYY-MM-DD)
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Maximum number of commits to walk, most recent first
    #[arg(long)]
    max_commits: Option<usize>,

    /// Count merge commits too
    #[arg(long)]
    include_merges: bool,

    /// Ignore .mailmap when resolving author identities
    #[arg(long)]
    no_mailmap: bool,

    /// Regex on "Name <email>" of authors to leave out (repeatable)
    #[arg(long = "exclude-author")]
    exclude_authors: Vec<String>,

    /// Only show contributors of this tier (S, A, B, C)
    #[arg(long)]
    tier: Option<String>,

    /// Configuration file
    #[arg(short, long, env = "COMMITRANK_CONFIG")]
    config: Option<PathBuf>,

    /// Disable coloured terminal output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&CliOverrides {
        since: cli.since,
        max_commits: cli.max_commits,
        include_merges: cli.include_merges,
        no_mailmap: cli.no_mailmap,
        exclude_authors: cli.exclude_authors.clone(),
        output_format: cli.output.clone(),
        no_color: cli.no_color,
    });
    if !config.output.color_output {
        colored::control::set_override(false);
    }

    let only_tier = cli.tier.as_deref().map(str::parse::<Tier>).transpose()?;
    let mut reporter = Reporter::new(
        &config.output.default_format,
        &cli.output_file,
        &config.output,
    )?;

    eprintln!("{}", "CommitRank - Contributor Tier Ranking".bright_cyan().bold());

    let mut leaderboard = if let Some(repo) = &cli.repo {
        eprintln!("Repository: {}", repo.display().to_string().bright_white());

        let git_analyzer = GitAnalyzer::new(repo)?;
        info!("Starting repository analysis...");
        let stats = git_analyzer.analyze(&config.analysis).await?;

        let contributors = stats.contributors();
        let assignment = assign_tiers(&contributors);
        let linker = RepositoryLinker::new(&stats);
        Leaderboard::build(
            &repo.display().to_string(),
            &contributors,
            &assignment,
            Some(&linker),
        )
        .with_repository(&stats)
    } else if let Some(path) = &cli.metrics {
        let records = input::load_metrics(path)?;
        let assignment = assign_tiers(&records);
        Leaderboard::build(&path.display().to_string(), &records, &assignment, None)
    } else {
        anyhow::bail!("Either --repo or --metrics is required");
    };

    info!(
        "Ranked {} contributors ({})",
        leaderboard.total_contributors, leaderboard.distribution
    );

    if let Some(tier) = only_tier {
        leaderboard.retain_tier(tier);
    }

    reporter.generate_report(&leaderboard).await?;

    eprintln!("\n{}", "Ranking complete!".bright_green().bold());

    Ok(())
}
