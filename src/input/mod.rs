use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::tiers::ContributorMetric;

/// One contributor as exported by an external sync job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContributorRecord {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub commits: f64,
}

impl ContributorMetric for ContributorRecord {
    fn commits(&self) -> f64 {
        self.commits
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MetricsDocument {
    List(Vec<ContributorRecord>),
    Wrapped { contributors: Vec<ContributorRecord> },
}

/// Parses either a bare array of records or `{ "contributors": [...] }`.
pub fn parse_metrics(content: &str) -> Result<Vec<ContributorRecord>> {
    let document: MetricsDocument =
        serde_json::from_str(content).context("Metrics file is not a contributor list")?;

    Ok(match document {
        MetricsDocument::List(records) => records,
        MetricsDocument::Wrapped { contributors } => contributors,
    })
}

pub fn load_metrics(path: &Path) -> Result<Vec<ContributorRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read metrics file {}", path.display()))?;
    let records = parse_metrics(&content)
        .with_context(|| format!("Failed to parse metrics file {}", path.display()))?;

    info!("Loaded {} contributors from {}", records.len(), path.display());
    Ok(records)
}
