//! Tunables for the processing steps

use glam::Mat4;
use mosaic_core::MAX_FACE_INDICES;
use serde::{Deserialize, Serialize};

/// Configuration shared by every step of a pipeline run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub triangulate: TriangulateConfig,
    pub join_vertices: JoinVerticesConfig,
    pub pretransform: PretransformConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangulateConfig {
    /// Largest face accepted; bigger faces are reported as a resource limit
    pub max_polygon_indices: usize,
}

impl Default for TriangulateConfig {
    fn default() -> Self {
        Self {
            max_polygon_indices: MAX_FACE_INDICES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinVerticesConfig {
    /// Absolute distance under which two channel values count as equal
    pub epsilon: f32,
    /// Most entries a single spatial query may scan
    pub max_candidates: usize,
}

impl Default for JoinVerticesConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-5,
            max_candidates: 65_536,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PretransformConfig {
    /// Keep the node tree (with identity transforms) instead of flattening it
    pub keep_hierarchy: bool,
    /// Rescale all geometry into the [-1, 1] cube afterwards
    pub normalize: bool,
    /// Extra transform applied on top of the root node
    pub root_transformation: Option<Mat4>,
}
