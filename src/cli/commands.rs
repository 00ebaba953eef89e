// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Three subcommands: `stats`, `sample` and `tokenizer`.
// Dataset location comes from --root-dir and/or a JSON config
// file; flags given on the command line win over the file.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    sample_use_case::SampleConfig,
    tokenizer_use_case::TokenizerConfig,
};
use crate::domain::query::Split;
use crate::infra::config::DatasetConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report table sizes, positive-set sizes and data gaps
    Stats(StatsArgs),

    /// Assemble triplets the way the training DataLoader would
    Sample(SampleArgs),

    /// Build (or reuse) a tokenizer from the query texts
    Tokenizer(TokenizerArgs),
}

/// Options shared by every command
#[derive(Args, Debug)]
pub struct DataArgs {
    /// Dataset root containing text_queries/ and PC_OBJ/
    #[arg(long)]
    pub root_dir: Option<PathBuf>,

    /// JSON dataset config; other flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ground-truth table to iterate: train or validation
    #[arg(long)]
    pub split: Option<Split>,
}

impl DataArgs {
    pub fn resolve(&self) -> Result<DatasetConfig> {
        let mut cfg = match &self.config {
            Some(path) => DatasetConfig::load(path)?,
            None       => DatasetConfig::default(),
        };
        if let Some(root) = &self.root_dir {
            cfg.root_dir = root.clone();
        }
        if let Some(split) = self.split {
            cfg.split = split;
        }
        Ok(cfg)
    }
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Args, Debug)]
pub struct SampleArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// tokenizer.json used to encode the queries
    #[arg(long, default_value = "tokenizer/tokenizer.json")]
    pub tokenizer: PathBuf,

    /// First example index
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Number of examples to assemble
    #[arg(long, default_value_t = 4)]
    pub count: usize,

    /// Resample every point cloud to this many points
    #[arg(long)]
    pub num_points: Option<usize>,

    /// Centre and scale clouds to the unit sphere
    #[arg(long)]
    pub normalize: bool,

    /// Seed for negative sampling and transforms
    #[arg(long)]
    pub seed: Option<u64>,

    /// Token positions per query, including [CLS] and [SEP]
    #[arg(long)]
    pub max_text_len: Option<usize>,

    /// Stack the examples into one batch and print tensor shapes
    #[arg(long)]
    pub batch: bool,

    /// Write the sampled triplets to this CSV file
    #[arg(long)]
    pub log_csv: Option<PathBuf>,
}

impl SampleArgs {
    pub fn into_config(self) -> Result<SampleConfig> {
        let mut dataset = self.data.resolve()?;
        if self.num_points.is_some() {
            dataset.num_points = self.num_points;
        }
        if self.seed.is_some() {
            dataset.seed = self.seed;
        }
        if let Some(len) = self.max_text_len {
            dataset.max_text_len = len;
        }
        dataset.normalize |= self.normalize;

        Ok(SampleConfig {
            dataset,
            tokenizer: self.tokenizer,
            start:     self.start,
            count:     self.count,
            batch:     self.batch,
            log_csv:   self.log_csv,
        })
    }
}

#[derive(Args, Debug)]
pub struct TokenizerArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Directory holding tokenizer.json
    #[arg(long, default_value = "tokenizer")]
    pub out: PathBuf,

    /// Maximum vocabulary size when building, special tokens included
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,
}

impl TokenizerArgs {
    pub fn into_config(self) -> Result<TokenizerConfig> {
        Ok(TokenizerConfig {
            dataset:    self.data.resolve()?,
            out_dir:    self.out,
            vocab_size: self.vocab_size,
        })
    }
}
