// ============================================================
// Layer 4 - Text / Point Cloud Triplet Dataset
// ============================================================
// Implements Burn's Dataset trait. Item `i` of the active split:
//
//   1. (query, true model) = row i of the split's ground truth
//   2. false model         = negative sample for the query
//   3. query text          → fixed-length ids + attention mask
//   4. both point clouds   → loaded, then transformed separately
//
// All lookup tables are built once and shared read-only behind
// an Arc. The only mutable state is the RNG; each item takes a
// child RNG seeded from it, so the lock is held for one draw.

use anyhow::{Context, Result};
use burn::data::dataset::Dataset;
use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use thiserror::Error;

use crate::data::{
    associations::AssociationIndex,
    negative::NegativeSampler,
    point_cloud::ObjPointCloudLoader,
    tables,
    text::TextEncoder,
    transform::{Compose, Normalize, SamplePoints},
};
use crate::domain::{
    point_cloud::PointCloud,
    query::{Association, Split},
    traits::{PointCloudSource, PointCloudTransform},
    triplet::Triplet,
};
use crate::infra::config::DatasetConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("index {index} is out of range for the {split} split ({len} examples)")]
    IndexOutOfRange { index: usize, len: usize, split: Split },

    #[error("query '{query_id}' has no text in the query table")]
    MissingText { query_id: String },
}

/// One assembled example, ready for the batcher.
#[derive(Debug, Clone)]
pub struct TripletItem {
    pub triplet:        Triplet,
    pub true_cloud:     PointCloud,
    pub false_cloud:    PointCloud,
    pub input_ids:      Vec<u32>,
    pub attention_mask: Vec<u32>,
    /// Catalog draws the negative sampler needed
    pub negative_draws: usize,
}

// ─── DatasetTables ────────────────────────────────────────────────────────────
/// Everything read from the tabular inputs.
#[derive(Debug, Clone)]
pub struct DatasetTables {
    train:      Vec<Association>,
    validation: Vec<Association>,
    texts:      HashMap<String, String>,
    catalog:    Vec<String>,
    index:      AssociationIndex,
}

impl DatasetTables {
    /// The association index covers both splits, so a validation
    /// positive is never drawn as a negative for the same query.
    pub fn new(
        train:      Vec<Association>,
        validation: Vec<Association>,
        texts:      HashMap<String, String>,
        catalog:    Vec<String>,
    ) -> Self {
        let index = AssociationIndex::build([train.as_slice(), validation.as_slice()]);
        Self { train, validation, texts, catalog, index }
    }

    pub fn load(config: &DatasetConfig) -> Result<Self> {
        let query_delim   = config.query_delimiter_byte()?;
        let catalog_delim = config.catalog_delimiter_byte()?;

        let train      = tables::load_ground_truth(&config.train_gt_path(), query_delim)?;
        let validation = tables::load_ground_truth(&config.validation_gt_path(), query_delim)?;
        let texts      = tables::load_query_texts(&config.query_text_path(), query_delim)?;
        let catalog    = tables::load_model_catalog(&config.model_id_path(), catalog_delim)?;

        tracing::info!(
            "Loaded tables from '{}': {} train rows, {} validation rows, {} query texts, {} models",
            config.queries_dir().display(),
            train.len(),
            validation.len(),
            texts.len(),
            catalog.len(),
        );

        Ok(Self::new(train, validation, texts, catalog))
    }

    pub fn rows(&self, split: Split) -> &[Association] {
        match split {
            Split::Train      => &self.train,
            Split::Validation => &self.validation,
        }
    }

    pub fn texts(&self) -> &HashMap<String, String> {
        &self.texts
    }

    pub fn catalog(&self) -> &[String] {
        &self.catalog
    }

    pub fn index(&self) -> &AssociationIndex {
        &self.index
    }
}

// ─── TextPointCloudDataset ────────────────────────────────────────────────────
#[derive(Clone)]
pub struct TextPointCloudDataset {
    tables:    Arc<DatasetTables>,
    split:     Split,
    encoder:   Arc<TextEncoder>,
    source:    Arc<dyn PointCloudSource>,
    transform: Option<Arc<dyn PointCloudTransform>>,
    sampler:   NegativeSampler,
    rng:       Arc<Mutex<StdRng>>,
}

impl TextPointCloudDataset {
    /// Unseeded, untransformed dataset over `split`.
    pub fn new(
        tables:  DatasetTables,
        encoder: TextEncoder,
        source:  Arc<dyn PointCloudSource>,
        split:   Split,
    ) -> Self {
        Self {
            tables:    Arc::new(tables),
            split,
            encoder:   Arc::new(encoder),
            source,
            transform: None,
            sampler:   NegativeSampler::default(),
            rng:       Arc::new(Mutex::new(StdRng::from_entropy())),
        }
    }

    /// Build the dataset described by `config`: tables from disk,
    /// clouds from `<root>/<pc_subdir>`, and the configured
    /// normalisation / resampling.
    pub fn open(config: &DatasetConfig, encoder: TextEncoder) -> Result<Self> {
        let tables = DatasetTables::load(config)?;
        let source = Arc::new(ObjPointCloudLoader::new(config.point_cloud_dir()));

        let mut dataset = Self::new(tables, encoder, source, config.split)
            .with_max_negative_draws(config.max_negative_draws);

        if let Some(seed) = config.seed {
            dataset = dataset.with_seed(seed);
        }

        let mut pipeline = Compose::new();
        if config.normalize {
            pipeline = pipeline.then(Normalize);
        }
        if let Some(n) = config.num_points {
            pipeline = pipeline.then(SamplePoints(n));
        }
        if !pipeline.is_empty() {
            dataset = dataset.with_transform(Arc::new(pipeline));
        }

        tracing::info!("Dataset ready: {} split, {} examples", dataset.split, dataset.len());
        Ok(dataset)
    }

    pub fn with_transform(mut self, transform: Arc<dyn PointCloudTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Replaces the RNG. Views made with `with_split` afterwards share it.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Arc::new(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn with_max_negative_draws(mut self, max_draws: usize) -> Self {
        self.sampler = NegativeSampler::new(max_draws);
        self
    }

    /// Same tables, encoder and RNG over another split.
    pub fn with_split(&self, split: Split) -> Self {
        Self { split, ..self.clone() }
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn tables(&self) -> &DatasetTables {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.rows(self.split).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Assemble example `index`, reporting why it could not be built.
    pub fn try_get(&self, index: usize) -> Result<TripletItem> {
        let rows = self.tables.rows(self.split);
        let row  = rows.get(index).ok_or(DatasetError::IndexOutOfRange {
            index,
            len: rows.len(),
            split: self.split,
        })?;

        // The index is built from every ground-truth row, so the
        // row's own query is always present
        let no_positives = HashSet::new();
        let positives    = self.tables.index.positives(&row.query_id).unwrap_or(&no_positives);

        let mut rng  = self.item_rng();
        let negative = self
            .sampler
            .sample(&mut rng, &row.query_id, &self.tables.catalog, positives)?;

        let query_text = self
            .tables
            .texts
            .get(&row.query_id)
            .ok_or_else(|| DatasetError::MissingText { query_id: row.query_id.clone() })?;
        let text = self.encoder.encode(query_text)?;

        let true_cloud  = self.load_cloud(&row.model_id, &mut rng)?;
        let false_cloud = self.load_cloud(&negative.model_id, &mut rng)?;

        tracing::debug!(
            "Example {}: query={} true={} false={} ({} draws)",
            index,
            row.query_id,
            row.model_id,
            negative.model_id,
            negative.draws,
        );

        Ok(TripletItem {
            triplet: Triplet {
                query_id:       row.query_id.clone(),
                query_text:     query_text.clone(),
                true_model_id:  row.model_id.clone(),
                false_model_id: negative.model_id,
            },
            true_cloud,
            false_cloud,
            input_ids:      text.input_ids,
            attention_mask: text.attention_mask,
            negative_draws: negative.draws,
        })
    }

    fn item_rng(&self) -> StdRng {
        let seed: u64 = self.rng.lock().gen();
        StdRng::seed_from_u64(seed)
    }

    fn load_cloud(&self, model_id: &str, rng: &mut StdRng) -> Result<PointCloud> {
        let cloud = self
            .source
            .load(model_id)
            .with_context(|| format!("Cannot load point cloud for model '{model_id}'"))?;

        Ok(match &self.transform {
            Some(transform) => transform.apply(cloud, rng),
            None            => cloud,
        })
    }
}

// ─── Burn Dataset Trait Implementation ────────────────────────────────────────
// Out-of-range indices return None. Any other failure means the
// input data is malformed, which is fatal for the training run.
impl Dataset<TripletItem> for TextPointCloudDataset {
    fn get(&self, index: usize) -> Option<TripletItem> {
        if index >= TextPointCloudDataset::len(self) {
            return None;
        }
        match self.try_get(index) {
            Ok(item) => Some(item),
            Err(err) => panic!("Cannot assemble example {index} of the {} split: {err:#}", self.split),
        }
    }

    fn len(&self) -> usize {
        TextPointCloudDataset::len(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::negative::SamplingError;
    use crate::test_utils::{fixture_encoder, write_fixture, MemorySource};
    use tempfile::TempDir;

    fn rows(pairs: &[(&str, &str)]) -> Vec<Association> {
        pairs.iter().map(|(q, m)| Association::new(*q, *m)).collect()
    }

    fn texts(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(q, t)| (q.to_string(), t.to_string())).collect()
    }

    fn catalog(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    /// catalog = [A, B, C], Q1 matches only A
    fn abc_dataset(dir: &TempDir) -> TextPointCloudDataset {
        let tables = DatasetTables::new(
            rows(&[("Q1", "A")]),
            rows(&[("Q1", "A")]),
            texts(&[("Q1", "a red chair")]),
            catalog(&["A", "B", "C"]),
        );
        let source = MemorySource::with_models(&["A", "B", "C"], 5);
        TextPointCloudDataset::new(tables, fixture_encoder(dir.path(), 64), Arc::new(source), Split::Train)
            .with_seed(17)
    }

    #[test]
    fn test_negative_is_never_a_positive() {
        let dir     = TempDir::new().unwrap();
        let dataset = abc_dataset(&dir);

        let mut negatives = HashSet::new();
        for _ in 0..100 {
            let item = dataset.try_get(0).unwrap();
            assert_eq!(item.triplet.true_model_id, "A");
            assert_ne!(item.triplet.false_model_id, "A");
            negatives.insert(item.triplet.false_model_id);
        }
        assert!(negatives.iter().all(|m| m == "B" || m == "C"));
    }

    #[test]
    fn test_out_of_range_fails_instead_of_wrapping() {
        let dir     = TempDir::new().unwrap();
        let dataset = abc_dataset(&dir);

        let err = dataset.try_get(1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DatasetError>(),
            Some(&DatasetError::IndexOutOfRange { index: 1, len: 1, split: Split::Train })
        );
        assert!(dataset.get(1).is_none());
    }

    #[test]
    fn test_item_text_is_fixed_length() {
        let dir  = TempDir::new().unwrap();
        let item = abc_dataset(&dir).try_get(0).unwrap();

        assert_eq!(item.input_ids.len(), 64);
        assert_eq!(item.attention_mask.len(), 64);
        assert_eq!(item.triplet.query_text, "a red chair");
        assert_eq!(item.true_cloud.len(), 5);
    }

    #[test]
    fn test_saturated_query_reports_error() {
        let dir    = TempDir::new().unwrap();
        let tables = DatasetTables::new(
            rows(&[("Q1", "A"), ("Q1", "B")]),
            Vec::new(),
            texts(&[("Q1", "anything")]),
            catalog(&["A", "B"]),
        );
        let source  = MemorySource::with_models(&["A", "B"], 3);
        let dataset = TextPointCloudDataset::new(
            tables,
            fixture_encoder(dir.path(), 16),
            Arc::new(source),
            Split::Train,
        )
        .with_max_negative_draws(10);

        let err = dataset.try_get(0).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SamplingError>(),
            Some(SamplingError::NoNegativeCandidate { .. })
        ));
    }

    #[test]
    fn test_missing_text_is_reported() {
        let dir    = TempDir::new().unwrap();
        let tables = DatasetTables::new(
            rows(&[("Q1", "A")]),
            Vec::new(),
            HashMap::new(),
            catalog(&["A", "B"]),
        );
        let source  = MemorySource::with_models(&["A", "B"], 3);
        let dataset = TextPointCloudDataset::new(
            tables,
            fixture_encoder(dir.path(), 16),
            Arc::new(source),
            Split::Train,
        );

        let err = dataset.try_get(0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DatasetError>(),
            Some(&DatasetError::MissingText { query_id: "Q1".into() })
        );
    }

    #[test]
    #[should_panic(expected = "Cannot assemble example 0")]
    fn test_get_panics_on_malformed_data() {
        let dir    = TempDir::new().unwrap();
        let tables = DatasetTables::new(
            rows(&[("Q1", "A")]),
            Vec::new(),
            texts(&[("Q1", "a chair")]),
            catalog(&["A", "B"]),
        );
        // No clouds available at all
        let source  = MemorySource::with_models(&[], 3);
        let dataset = TextPointCloudDataset::new(
            tables,
            fixture_encoder(dir.path(), 16),
            Arc::new(source),
            Split::Train,
        );
        let _ = dataset.get(0);
    }

    #[test]
    fn test_open_from_files_train_and_validation() {
        let dir = TempDir::new().unwrap();
        let cfg = write_fixture(dir.path());

        let train = TextPointCloudDataset::open(&cfg, fixture_encoder(dir.path(), 64)).unwrap();
        assert_eq!(train.split(), Split::Train);
        assert_eq!(train.len(), 3);

        let val = train.with_split(Split::Validation);
        assert_eq!(val.len(), 1);

        for dataset in [&train, &val] {
            for i in 0..dataset.len() {
                let item = dataset.try_get(i).unwrap();
                let t    = &item.triplet;
                assert!(dataset.tables().index().contains(&t.query_id, &t.true_model_id));
                assert!(!dataset.tables().index().contains(&t.query_id, &t.false_model_id));
            }
        }
    }

    #[test]
    fn test_validation_rows_see_positives_from_both_splits() {
        let dir    = TempDir::new().unwrap();
        let tables = DatasetTables::new(
            rows(&[("Q1", "A")]),
            rows(&[("Q1", "B"), ("Q2", "C")]),
            texts(&[("Q1", "a red chair"), ("Q2", "a table")]),
            catalog(&["A", "B", "C"]),
        );
        let source  = MemorySource::with_models(&["A", "B", "C"], 3);
        let dataset = TextPointCloudDataset::new(
            tables,
            fixture_encoder(dir.path(), 16),
            Arc::new(source),
            Split::Validation,
        )
        .with_seed(3);

        for _ in 0..50 {
            let item = dataset.try_get(0).unwrap();
            assert_eq!(item.triplet.true_model_id, "B");
            assert_eq!(item.triplet.false_model_id, "C");
        }
    }

    #[test]
    fn test_configured_transform_fixes_point_count() {
        let dir     = TempDir::new().unwrap();
        let mut cfg = write_fixture(dir.path());
        cfg.num_points = Some(8);
        cfg.normalize  = true;

        let dataset = TextPointCloudDataset::open(&cfg, fixture_encoder(dir.path(), 64)).unwrap();
        for i in 0..dataset.len() {
            let item = dataset.try_get(i).unwrap();
            assert_eq!(item.true_cloud.len(), 8);
            assert_eq!(item.false_cloud.len(), 8);
        }
    }

    #[test]
    fn test_same_seed_same_negatives() {
        let dir = TempDir::new().unwrap();
        let cfg = write_fixture(dir.path());

        let run = |seed| {
            let dataset = TextPointCloudDataset::open(&cfg, fixture_encoder(dir.path(), 64))
                .unwrap()
                .with_seed(seed);
            (0..dataset.len())
                .map(|i| dataset.try_get(i).unwrap().triplet.false_model_id)
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }
}
