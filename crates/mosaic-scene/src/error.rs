use crate::channel::ChannelKind;
use crate::node::NodeId;

/// A violated scene invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("mesh {mesh}: {channel} has {actual} elements, expected {expected}")]
    ChannelLength {
        mesh: usize,
        channel: ChannelKind,
        expected: usize,
        actual: usize,
    },

    #[error("mesh {mesh}: face {face} is empty")]
    EmptyFace { mesh: usize, face: usize },

    #[error("mesh {mesh}: face {face} references vertex {index}, mesh has {vertex_count} vertices")]
    FaceIndexOutOfRange {
        mesh: usize,
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("mesh {mesh}: material index {material} out of range ({material_count} materials)")]
    MaterialIndexOutOfRange {
        mesh: usize,
        material: usize,
        material_count: usize,
    },

    #[error("mesh {mesh}: bone '{bone}' weights vertex {vertex}, mesh has {vertex_count} vertices")]
    BoneWeightOutOfRange {
        mesh: usize,
        bone: String,
        vertex: u32,
        vertex_count: usize,
    },

    #[error("bone '{name}' matches {count} nodes, bone nodes must be unique")]
    AmbiguousBoneNode { name: String, count: usize },

    #[error("node {node} references mesh {mesh}, scene has {mesh_count} meshes")]
    MeshReferenceOutOfRange {
        node: NodeId,
        mesh: usize,
        mesh_count: usize,
    },

    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("node {node} records parent {recorded:?}, reached through {actual:?}")]
    ParentMismatch {
        node: NodeId,
        recorded: Option<NodeId>,
        actual: Option<NodeId>,
    },

    #[error("node {0} is reachable more than once, hierarchy is cyclic")]
    HierarchyCycle(NodeId),

    #[error("node {0} is not reachable from the root")]
    DetachedNode(NodeId),
}
