//! Shared fixtures for unit tests: a small dataset directory on
//! disk, a tokenizer built from its queries, and an in-memory
//! point cloud source.

use anyhow::{anyhow, Result};
use std::{collections::HashMap, fs, path::Path};

use crate::data::text::TextEncoder;
use crate::domain::{point_cloud::PointCloud, traits::PointCloudSource};
use crate::infra::{config::DatasetConfig, tokenizer_store::TokenizerStore};

pub const FIXTURE_TEXTS: [&str; 3] = ["a red chair", "a round table", "a tall lamp"];

/// Lays out a dataset under `root`:
///   train:      q1→{m1, m2}, q2→{m3}
///   validation: q3→{m4}
///   catalog:    m1..m5
/// Model `mN` has N + 2 points.
pub fn write_fixture(root: &Path) -> DatasetConfig {
    let cfg = DatasetConfig::new(root);
    fs::create_dir_all(cfg.queries_dir()).unwrap();
    fs::create_dir_all(cfg.point_cloud_dir()).unwrap();

    fs::write(
        cfg.train_gt_path(),
        "Text Query ID;Model ID\nq1;m1\nq1;m2\nq2;m3\n",
    )
    .unwrap();
    fs::write(cfg.validation_gt_path(), "Text Query ID;Model ID\nq3;m4\n").unwrap();
    fs::write(
        cfg.query_text_path(),
        format!(
            "ID;Text\nq1;{}\nq2;{}\nq3;{}\n",
            FIXTURE_TEXTS[0], FIXTURE_TEXTS[1], FIXTURE_TEXTS[2]
        ),
    )
    .unwrap();
    fs::write(cfg.model_id_path(), "ID\nm1\nm2\nm3\nm4\nm5\n").unwrap();

    for n in 1..=5 {
        let obj: String = (0..n + 2)
            .map(|i| format!("v {} {} {}\n", i, n, -(i as i32)))
            .collect();
        fs::write(cfg.point_cloud_dir().join(format!("m{n}.obj")), obj).unwrap();
    }

    cfg
}

/// Word-level tokenizer over the fixture texts, stored under `root/tokenizer`.
pub fn fixture_encoder(root: &Path, max_len: usize) -> TextEncoder {
    let texts: Vec<String> = FIXTURE_TEXTS.iter().map(|s| s.to_string()).collect();
    let tok = TokenizerStore::new(root.join("tokenizer"))
        .load_or_build(&texts, 100)
        .unwrap();
    TextEncoder::new(tok, max_len).unwrap()
}

/// Point clouds held in memory, keyed by model id.
pub struct MemorySource {
    clouds: HashMap<String, PointCloud>,
}

impl MemorySource {
    /// Every model gets `points` points whose x coordinate encodes
    /// the model's position in `ids`.
    pub fn with_models(ids: &[&str], points: usize) -> Self {
        let clouds = ids
            .iter()
            .enumerate()
            .map(|(k, id)| {
                let pts = (0..points).map(|i| [k as f32, i as f32, 0.0]).collect();
                (id.to_string(), PointCloud::new(pts))
            })
            .collect();
        Self { clouds }
    }
}

impl PointCloudSource for MemorySource {
    fn load(&self, model_id: &str) -> Result<PointCloud> {
        self.clouds
            .get(model_id)
            .cloned()
            .ok_or_else(|| anyhow!("no cloud for model '{model_id}'"))
    }
}
