use super::{RepositoryStats, RepositoryType};
use regex::Regex;

pub struct RepositoryLinker<'a> {
    stats: &'a RepositoryStats,
}

impl<'a> RepositoryLinker<'a> {
    pub fn new(stats: &'a RepositoryStats) -> Self {
        Self { stats }
    }

    /// Commit list of one author on the hosting site.
    pub fn get_author_commits_url(&self, name: &str, email: &str) -> Option<String> {
        let base_url = self.get_base_url()?;

        match self.stats.repository_type {
            RepositoryType::GitHub if !email.is_empty() => {
                Some(format!("{}/commits?author={}", base_url, query_escape(email)))
            }
            RepositoryType::GitLab if !name.is_empty() => Some(format!(
                "{}/-/commits/HEAD?author={}",
                base_url,
                query_escape(name)
            )),
            _ => None,
        }
    }

    pub fn get_repository_name(&self) -> String {
        match self.stats.repository_type {
            RepositoryType::GitHub => "GitHub",
            RepositoryType::GitLab => "GitLab",
            RepositoryType::Bitbucket => "Bitbucket",
            RepositoryType::Other => "Git Repository",
            RepositoryType::Local => "Local Repository",
        }
        .to_string()
    }

    pub fn get_base_url(&self) -> Option<String> {
        let remote_url = self.stats.remote_url.as_ref()?;

        // Convert SSH URLs to HTTPS URLs
        let url = if remote_url.starts_with("git@") {
            self.convert_ssh_to_https(remote_url)?
        } else {
            remote_url.clone()
        };

        Some(url.strip_suffix(".git").unwrap_or(&url).to_string())
    }

    fn convert_ssh_to_https(&self, ssh_url: &str) -> Option<String> {
        // git@hostname:owner/repo.git -> https://hostname/owner/repo
        let re = Regex::new(r"git@([^:]+):(.+)").ok()?;

        let captures = re.captures(ssh_url)?;
        let hostname = captures.get(1)?.as_str();
        let path = captures.get(2)?.as_str();
        let path = path.strip_suffix(".git").unwrap_or(path);

        Some(format!("https://{}/{}", hostname, path))
    }
}

fn query_escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn stats(remote: Option<&str>, repository_type: RepositoryType) -> RepositoryStats {
        let mut stats = RepositoryStats::empty(Path::new("."));
        stats.remote_url = remote.map(str::to_string);
        stats.repository_type = repository_type;
        stats
    }

    #[test]
    fn ssh_remote_becomes_https() {
        let stats = stats(Some("git@github.com:acme/widgets.git"), RepositoryType::GitHub);
        let linker = RepositoryLinker::new(&stats);
        assert_eq!(
            linker.get_base_url().as_deref(),
            Some("https://github.com/acme/widgets")
        );
    }

    #[test]
    fn github_author_link_uses_email() {
        let stats = stats(Some("https://github.com/acme/widgets.git"), RepositoryType::GitHub);
        let linker = RepositoryLinker::new(&stats);
        assert_eq!(
            linker
                .get_author_commits_url("Ada Lovelace", "ada+git@example.com")
                .as_deref(),
            Some("https://github.com/acme/widgets/commits?author=ada%2Bgit%40example.com")
        );
    }

    #[test]
    fn gitlab_author_link_uses_name() {
        let stats = stats(Some("https://gitlab.com/acme/widgets"), RepositoryType::GitLab);
        let linker = RepositoryLinker::new(&stats);
        assert_eq!(
            linker
                .get_author_commits_url("Ada Lovelace", "ada@example.com")
                .as_deref(),
            Some("https://gitlab.com/acme/widgets/-/commits/HEAD?author=Ada+Lovelace")
        );
        assert_eq!(linker.get_repository_name(), "GitLab");
    }

    #[test]
    fn local_repository_has_no_links() {
        let stats = stats(None, RepositoryType::Local);
        let linker = RepositoryLinker::new(&stats);
        assert_eq!(linker.get_base_url(), None);
        assert_eq!(linker.get_author_commits_url("Ada", "ada@example.com"), None);
    }
}
