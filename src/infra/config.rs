// ============================================================
// Layer 6 - Dataset Configuration
// ============================================================
// Where the dataset lives and how examples are assembled.
// Serialisable so a run can be described by one JSON file:
//
//   {
//     "root_dir": "data/shrec",
//     "max_text_len": 64,
//     "num_points": 2048,
//     "seed": 42,
//     ...
//   }
//
// Missing fields fall back to the defaults below, which match
// the layout of the text-to-shape challenge data:
//
//   <root>/text_queries/TextQuery_GT_Train.csv
//   <root>/text_queries/TextQuery_GT_Validation.csv
//   <root>/text_queries/TextQuery_Train.csv
//   <root>/text_queries/ModelID.csv
//   <root>/PC_OBJ/<model_id>.obj

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::{negative::DEFAULT_MAX_DRAWS, point_cloud::DEFAULT_PC_SUBDIR, text::DEFAULT_MAX_TEXT_LEN};
use crate::domain::query::Split;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub root_dir: PathBuf,
    pub split:    Split,

    pub queries_subdir:       String,
    pub pc_subdir:            String,
    pub train_gt_file:        String,
    pub validation_gt_file:   String,
    pub query_text_file:      String,
    pub model_id_file:        String,

    /// Delimiter of the ground-truth and query text tables
    pub query_delimiter:   char,
    /// Delimiter of the model catalog table
    pub catalog_delimiter: char,

    pub max_text_len:       usize,
    pub max_negative_draws: usize,

    /// Resample every cloud to this many points
    pub num_points: Option<usize>,
    /// Centre and scale every cloud to the unit sphere
    pub normalize:  bool,
    /// Seed for negative sampling and random transforms
    pub seed:       Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root_dir:           PathBuf::from("data"),
            split:              Split::Train,
            queries_subdir:     "text_queries".to_string(),
            pc_subdir:          DEFAULT_PC_SUBDIR.to_string(),
            train_gt_file:      "TextQuery_GT_Train.csv".to_string(),
            validation_gt_file: "TextQuery_GT_Validation.csv".to_string(),
            query_text_file:    "TextQuery_Train.csv".to_string(),
            model_id_file:      "ModelID.csv".to_string(),
            query_delimiter:    ';',
            catalog_delimiter:  ',',
            max_text_len:       DEFAULT_MAX_TEXT_LEN,
            max_negative_draws: DEFAULT_MAX_DRAWS,
            num_points:         None,
            normalize:          false,
            seed:               None,
        }
    }
}

impl DatasetConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self { root_dir: root_dir.into(), ..Self::default() }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Invalid config in '{}'", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved dataset config to '{}'", path.display());
        Ok(())
    }

    pub fn queries_dir(&self) -> PathBuf {
        self.root_dir.join(&self.queries_subdir)
    }

    pub fn train_gt_path(&self) -> PathBuf {
        self.queries_dir().join(&self.train_gt_file)
    }

    pub fn validation_gt_path(&self) -> PathBuf {
        self.queries_dir().join(&self.validation_gt_file)
    }

    pub fn query_text_path(&self) -> PathBuf {
        self.queries_dir().join(&self.query_text_file)
    }

    pub fn model_id_path(&self) -> PathBuf {
        self.queries_dir().join(&self.model_id_file)
    }

    pub fn point_cloud_dir(&self) -> PathBuf {
        self.root_dir.join(&self.pc_subdir)
    }

    /// Delimiters as the single bytes the CSV reader expects.
    pub fn query_delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(self.query_delimiter)
    }

    pub fn catalog_delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(self.catalog_delimiter)
    }
}

fn delimiter_byte(c: char) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| anyhow::anyhow!("Delimiter '{c}' must be a single ASCII character"))
}
