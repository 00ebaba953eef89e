//! Text-query / point-cloud triplet dataset for text-to-shape
//! retrieval training.
//!
//! [`data::dataset::TextPointCloudDataset`] implements Burn's `Dataset`
//! and [`data::batcher::TripletBatcher`] its `Batcher`, so a training
//! loop only needs [`data::batcher::build_loader`].

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;

#[cfg(test)]
pub(crate) mod test_utils;
