use serde::{Deserialize, Serialize};

/// An unordered set of xyz points loaded from one model file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    points: Vec<[f32; 3]>,
}

impl PointCloud {
    pub fn new(points: Vec<[f32; 3]>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[[f32; 3]] {
        &self.points
    }

    pub fn into_points(self) -> Vec<[f32; 3]> {
        self.points
    }

    /// Mean of all points, or the origin for an empty cloud.
    pub fn centroid(&self) -> [f32; 3] {
        if self.points.is_empty() {
            return [0.0; 3];
        }
        let n = self.points.len() as f32;
        let mut sum = [0.0f32; 3];
        for p in &self.points {
            for axis in 0..3 {
                sum[axis] += p[axis];
            }
        }
        [sum[0] / n, sum[1] / n, sum[2] / n]
    }
}
