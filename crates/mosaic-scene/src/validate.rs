//! Structural invariant checks.
//!
//! These cover what every processing step relies on: buffer lengths, index
//! ranges and the shape of the hierarchy. They do not judge whether the data
//! makes sense (degenerate faces, odd normals and such pass).

use std::collections::HashSet;

use crate::channel::ChannelKind;
use crate::error::SceneError;
use crate::mesh::Mesh;
use crate::node::{NodeId, NodeTree};
use crate::scene::Scene;

/// Every present channel must hold exactly one element per vertex.
pub fn validate_channels(index: usize, mesh: &Mesh) -> Result<(), SceneError> {
    let expected = mesh.vertex_count();
    let check = |channel: ChannelKind, actual: usize, present: bool| {
        if present && actual != expected {
            Err(SceneError::ChannelLength {
                mesh: index,
                channel,
                expected,
                actual,
            })
        } else {
            Ok(())
        }
    };

    check(ChannelKind::Normals, mesh.normals.len(), mesh.normals.is_present())?;
    check(ChannelKind::Tangents, mesh.tangents.len(), mesh.tangents.is_present())?;
    check(ChannelKind::Bitangents, mesh.bitangents.len(), mesh.bitangents.is_present())?;
    for (n, channel) in mesh.tex_coords.iter().enumerate() {
        check(ChannelKind::TexCoords(n), channel.len(), channel.is_present())?;
    }
    for (n, channel) in mesh.colors.iter().enumerate() {
        check(ChannelKind::Colors(n), channel.len(), channel.is_present())?;
    }
    Ok(())
}

/// Every face must be non-empty and reference existing vertices.
pub fn validate_faces(index: usize, mesh: &Mesh) -> Result<(), SceneError> {
    let vertex_count = mesh.vertex_count();
    for (f, face) in mesh.faces.iter().enumerate() {
        if face.is_empty() {
            return Err(SceneError::EmptyFace { mesh: index, face: f });
        }
        if let Some(&bad) = face.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(SceneError::FaceIndexOutOfRange {
                mesh: index,
                face: f,
                index: bad,
                vertex_count,
            });
        }
    }
    Ok(())
}

pub fn validate_bones(index: usize, mesh: &Mesh) -> Result<(), SceneError> {
    let vertex_count = mesh.vertex_count();
    for bone in &mesh.bones {
        if let Some(w) = bone
            .weights
            .iter()
            .find(|w| w.vertex_id as usize >= vertex_count)
        {
            return Err(SceneError::BoneWeightOutOfRange {
                mesh: index,
                bone: bone.name.clone(),
                vertex: w.vertex_id,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// All per-mesh checks, including the material reference.
pub fn validate_mesh(index: usize, mesh: &Mesh, material_count: usize) -> Result<(), SceneError> {
    validate_channels(index, mesh)?;
    validate_faces(index, mesh)?;
    validate_bones(index, mesh)?;
    if let Some(material) = mesh.material_index {
        if material >= material_count {
            return Err(SceneError::MaterialIndexOutOfRange {
                mesh: index,
                material,
                material_count,
            });
        }
    }
    Ok(())
}

/// The arena must form one tree rooted at index 0 with consistent parent links.
pub fn validate_hierarchy(tree: &NodeTree) -> Result<(), SceneError> {
    let mut visited = vec![false; tree.nodes.len()];
    let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(tree.root(), None)];

    while let Some((id, reached_from)) = stack.pop() {
        let node = tree.get(id).ok_or(SceneError::UnknownNode(id))?;
        if visited[id.index()] {
            return Err(SceneError::HierarchyCycle(id));
        }
        visited[id.index()] = true;

        if node.parent != reached_from {
            return Err(SceneError::ParentMismatch {
                node: id,
                recorded: node.parent,
                actual: reached_from,
            });
        }
        stack.extend(node.children.iter().map(|&child| (child, Some(id))));
    }

    match visited.iter().position(|v| !v) {
        Some(detached) => Err(SceneError::DetachedNode(NodeId(detached as u32))),
        None => Ok(()),
    }
}

/// Every node mesh reference must point into the scene mesh list.
pub fn validate_mesh_references(tree: &NodeTree, mesh_count: usize) -> Result<(), SceneError> {
    for (id, node) in tree.iter() {
        if let Some(&mesh) = node.meshes.iter().find(|&&m| m >= mesh_count) {
            return Err(SceneError::MeshReferenceOutOfRange {
                node: id,
                mesh,
                mesh_count,
            });
        }
    }
    Ok(())
}

/// Nodes that bones bind to must be unambiguous.
pub fn validate_bone_nodes(scene: &Scene) -> Result<(), SceneError> {
    let names: HashSet<&str> = scene
        .meshes
        .iter()
        .flat_map(|m| m.bones.iter().map(|b| b.name.as_str()))
        .collect();
    for name in names {
        let count = scene.nodes.count_by_name(name);
        if count > 1 {
            return Err(SceneError::AmbiguousBoneNode {
                name: name.to_string(),
                count,
            });
        }
    }
    Ok(())
}

pub fn validate_scene(scene: &Scene) -> Result<(), SceneError> {
    for (index, mesh) in scene.meshes.iter().enumerate() {
        validate_mesh(index, mesh, scene.materials.len())?;
    }
    validate_hierarchy(&scene.nodes)?;
    validate_mesh_references(&scene.nodes, scene.meshes.len())?;
    validate_bone_nodes(scene)
}
