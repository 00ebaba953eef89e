// ============================================================
// Layer 2 - SampleUseCase
// ============================================================
// Assembles a contiguous range of examples exactly as a training
// DataLoader would, optionally stacks them into a batch on the
// NdArray backend, and optionally logs the triplets to CSV.
//
//   Step 1: Load tokenizer            (Layer 6 - infra)
//   Step 2: Open dataset              (Layer 4 - data)
//   Step 3: Assemble items            (Layer 4 - data)
//   Step 4: Log triplets              (Layer 6 - infra)
//   Step 5: Batch                     (Layer 4 - data)

use anyhow::{ensure, Result};
use burn::data::dataloader::batcher::Batcher;
use std::path::PathBuf;

use crate::data::{
    batcher::TripletBatcher,
    dataset::{DatasetError, TextPointCloudDataset, TripletItem},
    text::TextEncoder,
};
use crate::infra::{
    config::DatasetConfig,
    tokenizer_store::load_tokenizer,
    triplet_log::{TripletLog, TripletRecord},
};

type InspectBackend = burn::backend::NdArray;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub dataset:   DatasetConfig,
    pub tokenizer: PathBuf,
    pub start:     usize,
    pub count:     usize,
    pub batch:     bool,
    pub log_csv:   Option<PathBuf>,
}

/// Tensor dims of one assembled batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchShapes {
    pub true_point_clouds:  [usize; 3],
    pub false_point_clouds: [usize; 3],
    pub input_ids:          [usize; 2],
    pub attention_mask:     [usize; 2],
}

#[derive(Debug, Clone)]
pub struct SampleReport {
    pub dataset_len: usize,
    pub items:       Vec<TripletItem>,
    pub batch:       Option<BatchShapes>,
}

pub struct SampleUseCase {
    config: SampleConfig,
}

impl SampleUseCase {
    pub fn new(config: SampleConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<SampleReport> {
        let cfg = &self.config;

        let tokenizer = load_tokenizer(&cfg.tokenizer)?;
        let encoder   = TextEncoder::new(tokenizer, cfg.dataset.max_text_len)?;
        let dataset   = TextPointCloudDataset::open(&cfg.dataset, encoder)?;

        // A start past the end is an error, not an empty sample
        if cfg.count > 0 && cfg.start >= dataset.len() {
            return Err(DatasetError::IndexOutOfRange {
                index: cfg.start,
                len:   dataset.len(),
                split: dataset.split(),
            }
            .into());
        }

        let end   = cfg.start.saturating_add(cfg.count).min(dataset.len());
        let items = (cfg.start..end)
            .map(|i| dataset.try_get(i))
            .collect::<Result<Vec<_>>>()?;

        if let Some(path) = &cfg.log_csv {
            let mut log = TripletLog::create(path)?;
            for (offset, item) in items.iter().enumerate() {
                log.log(&TripletRecord::from_item(cfg.start + offset, dataset.split(), item))?;
            }
            let rows = log.finish()?;
            tracing::info!("Logged {} triplets to '{}'", rows, path.display());
        }

        let batch = if cfg.batch {
            ensure!(!items.is_empty(), "Nothing to batch: no examples were assembled");
            let batcher = TripletBatcher::<InspectBackend>::new(Default::default());
            let batch   = batcher.batch(items.clone());
            Some(BatchShapes {
                true_point_clouds:  batch.true_point_clouds.dims(),
                false_point_clouds: batch.false_point_clouds.dims(),
                input_ids:          batch.input_ids.dims(),
                attention_mask:     batch.attention_mask.dims(),
            })
        } else {
            None
        };

        Ok(SampleReport { dataset_len: dataset.len(), items, batch })
    }
}
