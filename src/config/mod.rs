use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const DEFAULT_CONFIG_FILE: &str = "commitrank.toml";
const ENV_PREFIX: &str = "COMMITRANK";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub max_commits: Option<usize>,
    /// Only commits authored on or after this day are counted.
    pub since: Option<NaiveDate>,
    pub include_merge_commits: bool,
    pub use_mailmap: bool,
    pub identity: AuthorIdentity,
    /// Regexes matched against `Name <email>`.
    pub exclude_authors: Vec<String>,
}

/// How commits are grouped into one contributor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthorIdentity {
    /// Case-folded email address.
    Email,
    /// Name and email together, as git records them.
    NameEmail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub default_format: String,
    pub color_output: bool,
    pub max_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            output: OutputConfig {
                default_format: "text".to_string(),
                color_output: true,
                max_rows: 100,
            },
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_commits: None,
            since: None,
            include_merge_commits: false,
            use_mailmap: true,
            identity: AuthorIdentity::Email,
            exclude_authors: vec![r"\[bot\]".to_string()],
        }
    }
}

/// Command line values that win over every configuration layer.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub since: Option<NaiveDate>,
    pub max_commits: Option<usize>,
    pub include_merges: bool,
    pub no_mailmap: bool,
    pub exclude_authors: Vec<String>,
    pub output_format: Option<String>,
    pub no_color: bool,
}

impl Config {
    /// Defaults, then `path` (or `commitrank.toml` when present), then
    /// `COMMITRANK_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`Config::load`], reading the environment layer from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self> {
        let defaults = ::config::Config::try_from(&Config::default())
            .context("Failed to seed configuration defaults")?;

        let mut builder = ::config::Config::builder().add_source(defaults);

        match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                builder = builder.add_source(::config::File::from(path).required(true));
            }
            None => {
                builder = builder
                    .add_source(::config::File::with_name(DEFAULT_CONFIG_FILE).required(false));
            }
        }

        let settings = builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(env),
            )
            .build()
            .context("Failed to read configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Set flags replace loaded values; excluded authors are added to the
    /// configured patterns.
    pub fn apply_cli(&mut self, cli: &CliOverrides) {
        if cli.since.is_some() {
            self.analysis.since = cli.since;
        }
        if cli.max_commits.is_some() {
            self.analysis.max_commits = cli.max_commits;
        }
        if cli.include_merges {
            self.analysis.include_merge_commits = true;
        }
        if cli.no_mailmap {
            self.analysis.use_mailmap = false;
        }
        self.analysis
            .exclude_authors
            .extend(cli.exclude_authors.iter().cloned());
        if let Some(format) = &cli.output_format {
            self.output.default_format = format.clone();
        }
        if cli.no_color {
            self.output.color_output = false;
        }
    }
}
