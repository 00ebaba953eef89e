// ============================================================
// Layer 2 - TokenizerUseCase
// ============================================================
// Prepares the tokenizer the dataset encodes queries with, built
// from the query text table when none is stored yet.

use anyhow::Result;
use std::path::PathBuf;

use crate::data::tables;
use crate::infra::{config::DatasetConfig, tokenizer_store::TokenizerStore};

#[derive(Debug, Clone)]
pub struct TokenizerConfig {
    pub dataset:    DatasetConfig,
    pub out_dir:    PathBuf,
    pub vocab_size: usize,
}

/// Loads `<out_dir>/tokenizer.json` if present, otherwise builds a
/// word-level tokenizer from the query text table.
pub struct TokenizerUseCase {
    config: TokenizerConfig,
}

impl TokenizerUseCase {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// Returns the tokenizer path and its vocabulary size.
    pub fn execute(&self) -> Result<(PathBuf, usize)> {
        let cfg   = &self.config;
        let store = TokenizerStore::new(&cfg.out_dir);

        let texts: Vec<String> = if store.exists() {
            Vec::new()
        } else {
            tables::load_query_records(
                &cfg.dataset.query_text_path(),
                cfg.dataset.query_delimiter_byte()?,
            )?
            .into_iter()
            .map(|r| r.query_text)
            .collect()
        };

        let tokenizer = store.load_or_build(&texts, cfg.vocab_size)?;
        Ok((store.path(), tokenizer.get_vocab_size(false)))
    }
}
