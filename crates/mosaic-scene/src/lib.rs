//! Mosaic Scene - Canonical scene representation
//!
//! Every importer produces a [`Scene`] and every processing step mutates one in
//! place. Nodes live in a single arena ([`NodeTree`]) and refer to meshes by
//! index into the scene's mesh list, so a mesh can be instanced by several
//! nodes without shared ownership.

mod camera;
mod channel;
mod error;
mod material;
mod mesh;
mod node;
mod scene;
pub mod validate;

pub use camera::{Camera, Light, LightKind};
pub use channel::{ChannelKind, VertexChannel};
pub use error::SceneError;
pub use material::{keys, Material, DEFAULT_MATERIAL_NAME, MaterialProperty, PropertyValue, TextureKind, TextureRef};
pub use mesh::{Bone, Face, Mesh, PrimitiveTypes, VertexFormat, VertexWeight};
pub use node::{Node, NodeId, NodeTree};
pub use scene::{Scene, SceneFlags};
