// ============================================================
// Layer 4 - Triplet Batcher
// ============================================================
// Implements Burn's Batcher trait: stacks N TripletItems into
// one TripletBatch, keeping item order.
//
//   point clouds:  N × [P, 3]  → [N, P, 3] → swap → [N, 3, P]
//   text fields:   N × [L]     → [N, L]
//
// Clouds end up channel-first (xyz as the channel axis), which
// is what point-cloud encoders expect. Every item must have the
// same P and L; SamplePoints and TextEncoder guarantee that.

use burn::{
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    prelude::*,
    tensor::TensorData,
};
use std::sync::Arc;

use crate::data::dataset::{TextPointCloudDataset, TripletItem};
use crate::domain::point_cloud::PointCloud;

// ─── TripletBatch ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TripletBatch<B: Backend> {
    /// Matching models, shape: [batch_size, 3, num_points]
    pub true_point_clouds: Tensor<B, 3>,

    /// Negative models, shape: [batch_size, 3, num_points]
    pub false_point_clouds: Tensor<B, 3>,

    /// Query token ids, shape: [batch_size, seq_len]
    pub input_ids: Tensor<B, 2, Int>,

    /// 1 = real token, 0 = padding, shape: [batch_size, seq_len]
    pub attention_mask: Tensor<B, 2, Int>,
}

// ─── TripletBatcher ───────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct TripletBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TripletBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn stack_clouds<'a>(
        &self,
        clouds:     impl Iterator<Item = &'a PointCloud>,
        batch_size: usize,
        num_points: usize,
    ) -> Tensor<B, 3> {
        let flat: Vec<f32> = clouds
            .flat_map(|pc| pc.points().iter().flatten().copied())
            .collect();

        Tensor::<B, 3>::from_data(
            TensorData::new(flat, [batch_size, num_points, 3]),
            &self.device,
        )
        .swap_dims(1, 2)
    }

    fn stack_ids<'a>(
        &self,
        rows:       impl Iterator<Item = &'a Vec<u32>>,
        batch_size: usize,
        seq_len:    usize,
    ) -> Tensor<B, 2, Int> {
        let flat: Vec<i32> = rows
            .flat_map(|row| row.iter().map(|&x| x as i32))
            .collect();

        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device)
            .reshape([batch_size, seq_len])
    }
}

impl<B: Backend> Batcher<TripletItem, TripletBatch<B>> for TripletBatcher<B> {
    /// # Panics
    /// On an empty batch, or when items disagree on point count or
    /// sequence length.
    fn batch(&self, items: Vec<TripletItem>) -> TripletBatch<B> {
        assert!(!items.is_empty(), "cannot batch zero triplets");

        let batch_size = items.len();
        let num_points = items[0].true_cloud.len();
        let seq_len    = items[0].input_ids.len();

        for item in &items {
            let t = &item.triplet;
            assert!(
                item.true_cloud.len() == num_points && item.false_cloud.len() == num_points,
                "point count mismatch in batch: expected {num_points}, got {} ({}) / {} ({}); \
                 resample clouds to a fixed size",
                item.true_cloud.len(),
                t.true_model_id,
                item.false_cloud.len(),
                t.false_model_id,
            );
            assert!(
                item.input_ids.len() == seq_len && item.attention_mask.len() == seq_len,
                "sequence length mismatch in batch for query '{}'",
                t.query_id,
            );
        }

        TripletBatch {
            true_point_clouds: self.stack_clouds(
                items.iter().map(|i| &i.true_cloud),
                batch_size,
                num_points,
            ),
            false_point_clouds: self.stack_clouds(
                items.iter().map(|i| &i.false_cloud),
                batch_size,
                num_points,
            ),
            input_ids: self.stack_ids(items.iter().map(|i| &i.input_ids), batch_size, seq_len),
            attention_mask: self.stack_ids(
                items.iter().map(|i| &i.attention_mask),
                batch_size,
                seq_len,
            ),
        }
    }
}

/// Wrap a dataset in Burn's DataLoader.
/// `shuffle` is the shuffle seed; `None` keeps dataset order.
/// `num_workers == 0` assembles batches on the calling thread.
pub fn build_loader<B: Backend>(
    dataset:     TextPointCloudDataset,
    device:      B::Device,
    batch_size:  usize,
    shuffle:     Option<u64>,
    num_workers: usize,
) -> Arc<dyn DataLoader<TripletBatch<B>>> {
    let mut builder = DataLoaderBuilder::new(TripletBatcher::<B>::new(device))
        .batch_size(batch_size);

    if num_workers > 0 {
        builder = builder.num_workers(num_workers);
    }
    if let Some(seed) = shuffle {
        builder = builder.shuffle(seed);
    }

    builder.build(dataset)
}
