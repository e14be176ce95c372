use super::*;
use rust_embed::RustEmbed;
use serde_json::Value;
use std::collections::HashMap;
use tera::{Context, Tera};

#[derive(RustEmbed)]
#[folder = "src/output/templates/"]
#[include = "*.html"]
struct Templates;

#[derive(RustEmbed)]
#[folder = "src/output/assets/"]
#[include = "*.css"]
struct Assets;

pub struct HtmlGenerator {
    tera: Tera,
}

impl HtmlGenerator {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Load templates from embedded resources
        for file in Templates::iter() {
            let template_name = file.as_ref();
            let template_content = Templates::get(template_name)
                .ok_or_else(|| anyhow::anyhow!("Template {} not found", template_name))?;
            let template_str = std::str::from_utf8(&template_content.data).map_err(|e| {
                anyhow::anyhow!("Invalid UTF-8 in template {}: {}", template_name, e)
            })?;

            tera.add_raw_template(template_name, template_str)
                .map_err(|e| anyhow::anyhow!("Failed to add template {}: {}", template_name, e))?;
        }

        tera.register_filter("tier_class", Self::tier_class_filter);
        tera.register_filter("percent", Self::percent_filter);
        tera.register_filter("commits", Self::commits_filter);

        Ok(Self { tera })
    }

    fn load_asset(&self, filename: &str) -> Result<String> {
        let asset = Assets::get(filename)
            .ok_or_else(|| anyhow::anyhow!("Asset {} not found", filename))?;
        let content = std::str::from_utf8(&asset.data)
            .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in asset {}: {}", filename, e))?;
        Ok(content.to_string())
    }

    fn tier_class_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let class = match value.as_str().unwrap_or("") {
            "S" => "tier-s",
            "A" => "tier-a",
            "B" => "tier-b",
            _ => "tier-c",
        };
        Ok(Value::String(class.to_string()))
    }

    /// Fraction in [0, 1] to a one-decimal percentage.
    fn percent_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        let fraction = value.as_f64().unwrap_or(0.0);
        Ok(Value::String(format!("{:.1}%", fraction * 100.0)))
    }

    fn commits_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
        Ok(Value::String(format_commits(value.as_f64().unwrap_or(0.0))))
    }

    fn prepare_template_context(&self, leaderboard: &Leaderboard) -> Result<Context> {
        let mut context = Context::new();

        context.insert("css_content", &self.load_asset("styles.css")?);
        context.insert("source", &leaderboard.source);
        context.insert(
            "generated_date",
            &leaderboard
                .generated_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
        );
        context.insert("total_contributors", &leaderboard.total_contributors);
        context.insert("bands", &leaderboard.bands);
        context.insert("rows", &leaderboard.rows);
        context.insert("with_activity", &leaderboard.has_activity());
        context.insert("repository", &leaderboard.repository);

        Ok(context)
    }
}

impl OutputGenerator for HtmlGenerator {
    fn generate(&mut self, leaderboard: &Leaderboard) -> Result<String> {
        let context = self.prepare_template_context(leaderboard)?;
        let html = self.tera.render("leaderboard.html", &context)?;
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiers::assign_tiers;

    #[test]
    fn renders_rows_and_bands() -> Result<()> {
        let records = vec![
            ContributorRecord {
                name: "Ada <script>".to_string(),
                email: Some("ada@example.com".to_string()),
                commits: 120.0,
            },
            ContributorRecord {
                name: "Grace".to_string(),
                email: None,
                commits: 3.0,
            },
        ];
        let board = Leaderboard::build("demo", &records, &assign_tiers(&records), None);

        let html = HtmlGenerator::new()?.generate(&board)?;
        assert!(html.contains("<title>Contributor tiers: demo</title>"));
        assert!(html.contains("Ada &lt;script&gt;"));
        assert!(html.contains("tier-b"));
        assert!(html.contains("tier-c"));
        assert!(html.contains("50.0%"));
        assert!(html.contains(">120<"));
        assert!(!html.contains("Lines added"));
        Ok(())
    }

    #[test]
    fn git_board_shows_repository_and_activity() -> Result<()> {
        let records = vec![ContributorRecord {
            name: "Ada".to_string(),
            email: None,
            commits: 4.0,
        }];
        let mut board = Leaderboard::build("widgets", &records, &assign_tiers(&records), None);
        board.rows[0].activity = Some(Activity {
            lines_added: 77,
            lines_removed: 5,
            files_touched: 3,
            active_since: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
            last_active: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        });
        board.repository = Some(RepositorySummary {
            hosting: "GitLab".to_string(),
            url: Some("https://gitlab.com/acme/widgets".to_string()),
            commits_counted: 4,
            commits_skipped: 1,
            branches: vec!["main".to_string()],
            first_commit: NaiveDate::from_ymd_opt(2024, 2, 29),
            last_commit: NaiveDate::from_ymd_opt(2024, 3, 4),
        });

        let html = HtmlGenerator::new()?.generate(&board)?;
        assert!(html.contains(">GitLab</a>"));
        assert!(html.contains("4 commits counted, 1 skipped"));
        assert!(html.contains("Lines added"));
        assert!(html.contains("+77"));
        assert!(html.contains("2024-02-29"));
        Ok(())
    }

    #[test]
    fn filters_map_values() -> tera::Result<()> {
        let args = HashMap::new();
        assert_eq!(
            HtmlGenerator::tier_class_filter(&Value::from("S"), &args)?,
            Value::from("tier-s")
        );
        assert_eq!(
            HtmlGenerator::percent_filter(&Value::from(0.15), &args)?,
            Value::from("15.0%")
        );
        assert_eq!(
            HtmlGenerator::commits_filter(&Value::from(7.0), &args)?,
            Value::from("7")
        );
        Ok(())
    }
}
