// ============================================================
// Layer 4 - Point Cloud Transforms
// ============================================================
// Built-in preprocessing / augmentation stages:
//
//   Normalize     centroid → origin, farthest point → radius 1
//   SamplePoints  fixed point count (needed for batching)
//   Jitter        clipped gaussian noise per coordinate
//   Compose       runs stages in order
//
// Any closure `Fn(PointCloud, &mut dyn RngCore) -> PointCloud`
// can be used alongside these.

use anyhow::{anyhow, ensure, Result};
use rand::{seq::index, Rng, RngCore};
use rand_distr::{Distribution, Normal};
use std::sync::Arc;

use crate::domain::point_cloud::PointCloud;
use crate::domain::traits::PointCloudTransform;

#[derive(Debug, Clone, Copy, Default)]
pub struct Normalize;

impl PointCloudTransform for Normalize {
    fn apply(&self, cloud: PointCloud, _rng: &mut dyn RngCore) -> PointCloud {
        let [cx, cy, cz] = cloud.centroid();
        let mut points: Vec<[f32; 3]> = cloud
            .into_points()
            .into_iter()
            .map(|[x, y, z]| [x - cx, y - cy, z - cz])
            .collect();

        let radius = points
            .iter()
            .map(|[x, y, z]| (x * x + y * y + z * z).sqrt())
            .fold(0.0f32, f32::max);

        // A single point (or all identical points) stays at the origin
        if radius > 0.0 {
            for p in points.iter_mut() {
                for v in p.iter_mut() {
                    *v /= radius;
                }
            }
        }
        PointCloud::new(points)
    }
}

/// Resample to exactly `n` points: without replacement when the
/// cloud is large enough, with replacement otherwise.
#[derive(Debug, Clone, Copy)]
pub struct SamplePoints(pub usize);

impl PointCloudTransform for SamplePoints {
    fn apply(&self, cloud: PointCloud, rng: &mut dyn RngCore) -> PointCloud {
        let n   = self.0;
        let len = cloud.len();
        if len == n || len == 0 {
            return cloud;
        }

        let src = cloud.points();
        let points = if len > n {
            index::sample(rng, len, n).into_iter().map(|i| src[i]).collect()
        } else {
            // Keep every original point, then top up with random repeats
            let mut out = src.to_vec();
            out.extend((len..n).map(|_| src[rng.gen_range(0..len)]));
            out
        };
        PointCloud::new(points)
    }
}

/// Adds N(0, sigma) noise to every coordinate, clipped to [-clip, clip].
#[derive(Debug, Clone, Copy)]
pub struct Jitter {
    noise: Normal<f32>,
    clip:  f32,
}

impl Jitter {
    pub fn new(sigma: f32, clip: f32) -> Result<Self> {
        ensure!(
            clip.is_finite() && clip >= 0.0,
            "jitter clip must be finite and non-negative (got {clip})"
        );
        let noise = Normal::new(0.0, sigma)
            .map_err(|e| anyhow!("invalid jitter sigma {sigma}: {e}"))?;
        Ok(Self { noise, clip })
    }
}

impl PointCloudTransform for Jitter {
    fn apply(&self, cloud: PointCloud, rng: &mut dyn RngCore) -> PointCloud {
        let points = cloud
            .into_points()
            .into_iter()
            .map(|p| p.map(|v| v + self.noise.sample(rng).clamp(-self.clip, self.clip)))
            .collect();
        PointCloud::new(points)
    }
}

#[derive(Clone, Default)]
pub struct Compose {
    stages: Vec<Arc<dyn PointCloudTransform>>,
}

impl Compose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, stage: impl PointCloudTransform + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl PointCloudTransform for Compose {
    fn apply(&self, cloud: PointCloud, rng: &mut dyn RngCore) -> PointCloud {
        self.stages.iter().fold(cloud, |pc, stage| stage.apply(pc, rng))
    }
}
