use crate::camera::{Camera, Light};
use crate::error::SceneError;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::node::NodeTree;
use crate::validate;

bitflags::bitflags! {
    /// Capability and state flags of a scene.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SceneFlags: u32 {
        /// The importer could not deliver complete data; meshes may be missing.
        const INCOMPLETE = 0x1;
        /// The scene passed validation.
        const VALIDATED = 0x2;
        /// Validation found suspicious but tolerated data.
        const VALIDATION_WARNING = 0x4;
        /// Vertices are shared between faces (indexed, not verbose).
        const NON_VERBOSE_FORMAT = 0x8;
        /// The scene describes terrain; consumers may treat it as a height field.
        const TERRAIN = 0x10;
        /// Meshes may be referenced by more than one node.
        const ALLOW_SHARED = 0x20;
    }
}

/// Root container for one imported asset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub flags: SceneFlags,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub nodes: NodeTree,
    pub cameras: Vec<Camera>,
    pub lights: Vec<Light>,
}

impl Scene {
    /// Create an empty scene whose root node is called `root_name`.
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: NodeTree::new(root_name),
            ..Default::default()
        }
    }

    /// Append a mesh and return its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Append a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(|m| m.faces.len()).sum()
    }

    /// Check every structural invariant of the scene.
    pub fn validate(&self) -> Result<(), SceneError> {
        validate::validate_scene(self)
    }
}
