// ============================================================
// Layer 2 - StatsUseCase
// ============================================================
// Loads the tables and reports what the sampler will face:
// how many rows each split has, how large the positive sets
// get, and which queries cannot be given a negative at all.

use anyhow::Result;
use serde::Serialize;

use crate::data::{dataset::DatasetTables, point_cloud::ObjPointCloudLoader};
use crate::domain::query::Split;
use crate::infra::config::DatasetConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetStats {
    pub split:             Split,
    pub split_rows:        usize,
    pub train_rows:        usize,
    pub validation_rows:   usize,
    pub query_texts:       usize,
    pub distinct_queries:  usize,
    pub catalog_size:      usize,
    pub max_positives:     usize,
    /// Queries whose positives cover the whole catalog
    pub saturated_queries: Vec<String>,
    /// Queries in the active split with no text
    pub missing_texts:     Vec<String>,
    /// Catalog models with no `.obj` file
    pub missing_clouds:    usize,
}

pub struct StatsUseCase {
    config: DatasetConfig,
}

impl StatsUseCase {
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<DatasetStats> {
        let cfg    = &self.config;
        let tables = DatasetTables::load(cfg)?;
        let index  = tables.index();
        let rows   = tables.rows(cfg.split);

        let mut missing_texts: Vec<String> = rows
            .iter()
            .filter(|r| !tables.texts().contains_key(&r.query_id))
            .map(|r| r.query_id.clone())
            .collect();
        missing_texts.sort_unstable();
        missing_texts.dedup();

        let loader = ObjPointCloudLoader::new(cfg.point_cloud_dir());
        let missing_clouds = tables
            .catalog()
            .iter()
            .filter(|id| !loader.path_for(id).exists())
            .count();
        if missing_clouds > 0 {
            tracing::warn!(
                "{} of {} catalog models have no file in '{}'",
                missing_clouds,
                tables.catalog().len(),
                cfg.point_cloud_dir().display()
            );
        }

        Ok(DatasetStats {
            split:             cfg.split,
            split_rows:        rows.len(),
            train_rows:        tables.rows(Split::Train).len(),
            validation_rows:   tables.rows(Split::Validation).len(),
            query_texts:       tables.texts().len(),
            distinct_queries:  index.query_count(),
            catalog_size:      tables.catalog().len(),
            max_positives:     index.max_positives(),
            saturated_queries: index
                .saturated_queries(tables.catalog())
                .into_iter()
                .map(str::to_string)
                .collect(),
            missing_texts,
            missing_clouds,
        })
    }
}
