// ============================================================
// Layer 4 - OBJ Point Cloud Loader
// ============================================================
// Each model is stored as `<dir>/<model_id>.obj`. Point clouds
// are plain vertex lists, so only `v x y z` records are read;
// normals, texture coordinates, faces and comments are skipped.
// Extra values after z (per-vertex colour) are ignored.

use anyhow::{anyhow, bail, Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::domain::point_cloud::PointCloud;
use crate::domain::traits::PointCloudSource;

pub const DEFAULT_PC_SUBDIR: &str = "PC_OBJ";

/// Reads point clouds from a directory of `.obj` files.
#[derive(Debug, Clone)]
pub struct ObjPointCloudLoader {
    dir: PathBuf,
}

impl ObjPointCloudLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, model_id: &str) -> PathBuf {
        self.dir.join(format!("{model_id}.obj"))
    }
}

impl PointCloudSource for ObjPointCloudLoader {
    fn load(&self, model_id: &str) -> Result<PointCloud> {
        let path = self.path_for(model_id);
        let cloud = read_obj_vertices(&path)?;
        tracing::trace!("Loaded {} points from '{}'", cloud.len(), path.display());
        Ok(cloud)
    }
}

/// Read every vertex of an OBJ file. A file without vertices is an error.
pub fn read_obj_vertices(path: &Path) -> Result<PointCloud> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open point cloud '{}'", path.display()))?;
    let cloud = parse_obj_vertices(BufReader::new(file))
        .with_context(|| format!("Cannot parse point cloud '{}'", path.display()))?;

    if cloud.is_empty() {
        bail!("Point cloud '{}' has no vertices", path.display());
    }
    Ok(cloud)
}

pub fn parse_obj_vertices<R: BufRead>(reader: R) -> Result<PointCloud> {
    let mut points = Vec::new();

    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if parts.next() != Some("v") {
            continue;
        }

        let mut xyz = [0.0f32; 3];
        for value in xyz.iter_mut() {
            let raw = parts
                .next()
                .ok_or_else(|| anyhow!("line {}: vertex has fewer than 3 coordinates", n + 1))?;
            *value = raw
                .parse()
                .with_context(|| format!("line {}: bad coordinate '{}'", n + 1, raw))?;
        }
        points.push(xyz);
    }

    Ok(PointCloud::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Cursor};
    use tempfile::TempDir;

    #[test]
    fn test_reads_only_vertex_records() {
        let obj = "# comment\nv 1 2 3\nvn 0 0 1\nvt 0.5 0.5\nv -1.5 0 2e-1 0.2 0.3 0.4\nf 1 2 3\n";
        let pc  = parse_obj_vertices(Cursor::new(obj)).unwrap();
        assert_eq!(pc.points(), &[[1.0, 2.0, 3.0], [-1.5, 0.0, 0.2]]);
    }

    #[test]
    fn test_short_vertex_is_an_error() {
        let err = parse_obj_vertices(Cursor::new("v 1 2\n")).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_bad_number_is_an_error() {
        assert!(parse_obj_vertices(Cursor::new("v 1 x 3\n")).is_err());
    }

    #[test]
    fn test_loader_resolves_model_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("f770b7a17bed6938.obj"), "v 0 0 0\nv 1 1 1\n").unwrap();

        let loader = ObjPointCloudLoader::new(dir.path());
        assert_eq!(loader.load("f770b7a17bed6938").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_or_empty_file_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.obj"), "# nothing\n").unwrap();

        let loader = ObjPointCloudLoader::new(dir.path());
        assert!(loader.load("missing").is_err());
        assert!(loader.load("empty").is_err());
    }
}
