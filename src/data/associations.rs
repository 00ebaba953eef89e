// ============================================================
// Layer 4 - Association Index
// ============================================================
// query_id → set of matching model ids, built once from the
// ground-truth rows and read-only afterwards. The negative
// sampler rejects any model found in a query's set.

use std::collections::{HashMap, HashSet};

use crate::domain::query::Association;

#[derive(Debug, Clone, Default)]
pub struct AssociationIndex {
    positives: HashMap<String, HashSet<String>>,
}

impl AssociationIndex {
    /// Build from any number of ground-truth tables.
    /// Rows from every table land in the same sets.
    pub fn build<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a [Association]>,
    {
        let mut positives: HashMap<String, HashSet<String>> = HashMap::new();
        for table in tables {
            for row in table {
                positives
                    .entry(row.query_id.clone())
                    .or_default()
                    .insert(row.model_id.clone());
            }
        }
        Self { positives }
    }

    pub fn positives(&self, query_id: &str) -> Option<&HashSet<String>> {
        self.positives.get(query_id)
    }

    pub fn contains(&self, query_id: &str, model_id: &str) -> bool {
        self.positives
            .get(query_id)
            .is_some_and(|set| set.contains(model_id))
    }

    pub fn query_count(&self) -> usize {
        self.positives.len()
    }

    pub fn max_positives(&self) -> usize {
        self.positives.values().map(HashSet::len).max().unwrap_or(0)
    }

    /// Queries whose positives cover every model in `catalog`.
    /// No negative exists for these.
    pub fn saturated_queries(&self, catalog: &[String]) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .positives
            .iter()
            .filter(|(_, set)| catalog.iter().all(|m| set.contains(m)))
            .map(|(q, _)| q.as_str())
            .collect();
        out.sort_unstable();
        out
    }
}
