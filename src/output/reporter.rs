use super::*;
use crate::config::OutputConfig;
use anyhow::Context as _;
use tracing::info;

use super::html::HtmlGenerator;
use super::text::TextGenerator;

pub struct Reporter {
    format: OutputFormat,
    output_path: String,
    color: bool,
    max_rows: usize,
}

impl Reporter {
    pub fn new(format: &str, output_path: &str, output: &OutputConfig) -> Result<Self> {
        let format = OutputFormat::from(format);
        let output_path = super::add_file_extension(output_path, &format);

        Ok(Self {
            format,
            output_path,
            color: output.color_output,
            max_rows: output.max_rows,
        })
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn render(&self, leaderboard: &Leaderboard) -> Result<String> {
        match self.format {
            OutputFormat::Text => {
                TextGenerator::new(self.color, self.max_rows).generate(leaderboard)
            }
            OutputFormat::Html => HtmlGenerator::new()?.generate(leaderboard),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(leaderboard)?),
        }
    }

    /// Text goes to stdout, the other formats to the output file.
    pub async fn generate_report(&mut self, leaderboard: &Leaderboard) -> Result<()> {
        let content = self.render(leaderboard)?;

        if self.format == OutputFormat::Text {
            print!("{}", content);
            return Ok(());
        }

        tokio::fs::write(&self.output_path, content)
            .await
            .with_context(|| format!("Failed to write report to {}", self.output_path))?;
        info!("Report saved to {}", self.output_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tiers::assign_tiers;

    fn sample_board() -> Leaderboard {
        let records: Vec<ContributorRecord> = [("ada", 30.0), ("bob", 10.0), ("cy", 20.0)]
            .iter()
            .map(|(name, commits)| ContributorRecord {
                name: name.to_string(),
                email: None,
                commits: *commits,
            })
            .collect();
        Leaderboard::build("sample", &records, &assign_tiers(&records), None)
    }

    #[tokio::test]
    async fn json_report_is_written_with_extension() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let base = dir.path().join("tiers");
        let config = Config::default();
        let mut reporter = Reporter::new("json", &base.to_string_lossy(), &config.output)?;

        reporter.generate_report(&sample_board()).await?;

        let written = std::fs::read_to_string(dir.path().join("tiers.json"))?;
        let value: serde_json::Value = serde_json::from_str(&written)?;
        assert_eq!(value["total_contributors"], 3);
        assert_eq!(value["rows"][0]["name"], "ada");
        assert_eq!(value["rows"][0]["tier"], "B");
        assert_eq!(value["distribution"]["c"], 2);
        Ok(())
    }

    #[test]
    fn unknown_format_renders_text() -> Result<()> {
        let config = Config::default();
        let reporter = Reporter::new("yaml", "out", &config.output)?;
        assert_eq!(reporter.format(), OutputFormat::Text);
        assert!(reporter.render(&sample_board())?.contains("ada"));
        Ok(())
    }
}
