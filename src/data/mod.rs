// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// From files on disk to tensor batches:
//
//   CSV tables            → tables          (ground truth, texts, catalog)
//       │
//       ▼
//   AssociationIndex      → associations    (query → matching models)
//       │
//       ▼
//   NegativeSampler       → negative        (non-matching model per access)
//       │
//       ▼
//   TextEncoder           → text            (64 ids + attention mask)
//   ObjPointCloudLoader   → point_cloud     (<model_id>.obj vertices)
//   transforms            → transform       (normalise / resample / jitter)
//       │
//       ▼
//   TextPointCloudDataset → dataset         (Burn Dataset)
//       │
//       ▼
//   TripletBatcher        → batcher         (Burn Batcher, channel-first clouds)

/// Delimited ground-truth, query text and catalog tables
pub mod tables;

/// Query → set of matching models
pub mod associations;

/// Rejection sampling of non-matching models
pub mod negative;

/// Fixed-length query tokenisation
pub mod text;

/// OBJ vertex loading
pub mod point_cloud;

/// Point cloud preprocessing and augmentation stages
pub mod transform;

/// Implements Burn's Dataset trait for text / point cloud triplets
pub mod dataset;

/// Implements Burn's Batcher trait and builds DataLoaders
pub mod batcher;
