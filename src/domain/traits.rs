// ============================================================
// Layer 3 - Core Traits
// ============================================================
// The dataset only sees these abstractions, so point clouds can
// come from OBJ files on disk or from memory in tests, and any
// augmentation pipeline can be plugged in.

use anyhow::Result;
use rand::RngCore;

use crate::domain::point_cloud::PointCloud;

// ─── PointCloudSource ─────────────────────────────────────────────────────────
/// Anything that can produce the point cloud for a model id.
///
/// Implementations:
///   - ObjPointCloudLoader → reads `<dir>/<model_id>.obj`
pub trait PointCloudSource: Send + Sync {
    fn load(&self, model_id: &str) -> Result<PointCloud>;
}

// ─── PointCloudTransform ──────────────────────────────────────────────────────
/// A per-sample preprocessing or augmentation stage.
///
/// The dataset hands over its own RNG so seeded runs stay
/// reproducible even for random augmentations.
pub trait PointCloudTransform: Send + Sync {
    fn apply(&self, cloud: PointCloud, rng: &mut dyn RngCore) -> PointCloud;
}

/// Plain closures work as transforms.
impl<F> PointCloudTransform for F
where
    F: Fn(PointCloud, &mut dyn RngCore) -> PointCloud + Send + Sync,
{
    fn apply(&self, cloud: PointCloud, rng: &mut dyn RngCore) -> PointCloud {
        self(cloud, rng)
    }
}
