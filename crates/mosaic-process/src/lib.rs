//! Mosaic Process - Post-processing steps for imported scenes
//!
//! Steps implement [`ProcessStep`] and are run in a fixed order by a
//! [`Pipeline`], filtered by [`PostProcessSteps`] flags. Each step either
//! fully establishes its postcondition or fails without modifying the scene.

mod config;
mod error;
mod join_vertices;
mod parallel;
mod pipeline;
pub mod poly;
mod preprocess;
mod pretransform;
mod spatial_sort;
mod step;
mod triangulate;
mod validate;

pub use config::{JoinVerticesConfig, PretransformConfig, ProcessConfig, TriangulateConfig};
pub use error::{ProcessError, ProcessTarget, Violation};
pub use join_vertices::JoinVerticesProcess;
pub use pipeline::{process_scene, Pipeline};
pub use preprocess::ScenePreprocessor;
pub use pretransform::PretransformVertices;
pub use spatial_sort::SpatialSort;
pub use step::{PostProcessSteps, ProcessStep};
pub use triangulate::TriangulateProcess;
pub use validate::ValidateDataStructure;
