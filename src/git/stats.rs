use super::*;

impl RepositoryStats {
    /// Authors in identity-key order. The order is stable across runs, which
    /// keeps tie resolution in the classifier reproducible.
    pub fn contributors(&self) -> Vec<&AuthorStats> {
        let mut keys: Vec<&String> = self.author_stats.keys().collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|key| self.author_stats.get(key))
            .collect()
    }
}
