//! Mosaic - Scene model and post-processing shared by 3D asset importers
//!
//! Format importers produce a [`Scene`]; the [`Pipeline`] then rewrites it in
//! place: polygons are triangulated, duplicated vertices joined and node
//! transforms baked into the geometry.
//!
//! ```ignore
//! let settings = mosaic::ImportSettings::load();
//! let mut server = mosaic::AssetServer::new("assets");
//! server.register_importer(MyImporter);
//! server.set_process_config(&settings.process);
//! let handle = server.load_scene(Path::new("ship.obj"), settings.steps.flags())?;
//! ```

mod logging;
mod settings;

pub use logging::{init_logging, init_logging_from_env};
pub use settings::{ImportSettings, StepSettings};

pub use mosaic_assets::{
    AssetError, AssetHandle, AssetId, AssetServer, Importer, ImporterRegistry, ParseError,
};
pub use mosaic_core::{Color, Mat3, Mat4, Quat, Transform, Vec2, Vec3, Vec4};
pub use mosaic_process::{
    process_scene, JoinVerticesProcess, Pipeline, PostProcessSteps, PretransformVertices,
    ProcessConfig, ProcessError, ProcessStep, ProcessTarget, ScenePreprocessor, TriangulateProcess,
    ValidateDataStructure,
};
pub use mosaic_scene::{
    Bone, Camera, Face, Light, LightKind, Material, Mesh, Node, NodeId, NodeTree, PrimitiveTypes,
    Scene, SceneError, SceneFlags, VertexChannel, VertexFormat, VertexWeight,
};
