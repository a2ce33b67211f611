//! Baking node transforms into vertex data
//!
//! Every node's root-to-node transform is applied to the geometry it
//! references. Afterwards either the hierarchy is kept with identity
//! transforms (meshes shared under different transforms are duplicated), or
//! the scene is flattened: all instances with the same material and vertex
//! format are merged into one mesh hanging off a bare root node.

use std::collections::{BTreeSet, HashMap};

use glam::{Mat4, Vec3};
use mosaic_core::{is_identity, normal_matrix};
use mosaic_scene::{validate, Face, Mesh, Node, NodeTree, Scene, VertexChannel};
use tracing::{debug, info};

use crate::config::{PretransformConfig, ProcessConfig};
use crate::error::{ProcessError, ProcessTarget};
use crate::step::{PostProcessSteps, ProcessStep};

const STEP: &str = "PretransformVertices";

pub struct PretransformVertices {
    config: PretransformConfig,
}

impl PretransformVertices {
    pub fn new() -> Self {
        Self {
            config: PretransformConfig::default(),
        }
    }

    pub fn with_config(config: PretransformConfig) -> Self {
        Self { config }
    }

    fn check(&self, scene: &Scene) -> Result<(), ProcessError> {
        let invalid = |e| ProcessError::invalid_scene(STEP, e);
        validate::validate_hierarchy(&scene.nodes).map_err(invalid)?;
        validate::validate_mesh_references(&scene.nodes, scene.meshes.len()).map_err(invalid)?;
        for (index, mesh) in scene.meshes.iter().enumerate() {
            validate::validate_mesh(index, mesh, scene.materials.len()).map_err(invalid)?;
        }
        Ok(())
    }

    fn world_transforms(&self, tree: &NodeTree) -> Vec<Mat4> {
        let world = tree.world_transforms();
        match self.config.root_transformation {
            Some(root) => world.into_iter().map(|m| root * m).collect(),
            None => world,
        }
    }
}

impl Default for PretransformVertices {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessStep for PretransformVertices {
    fn name(&self) -> &'static str {
        STEP
    }

    fn is_active(&self, steps: PostProcessSteps) -> bool {
        steps.contains(PostProcessSteps::PRE_TRANSFORM_VERTICES)
    }

    fn setup(&mut self, config: &ProcessConfig) {
        self.config = config.pretransform.clone();
    }

    fn execute(&self, scene: &mut Scene) -> Result<(), ProcessError> {
        debug!("PretransformVertices begin");
        self.check(scene)?;
        if scene.meshes.is_empty() {
            debug!("PretransformVertices finished. Scene has no meshes.");
            return Ok(());
        }

        let world = self.world_transforms(&scene.nodes);
        let meshes_in = scene.meshes.len();
        let nodes_in = scene.nodes.len();

        let (mut meshes, nodes) = if self.config.keep_hierarchy {
            keep_hierarchy(scene, &world)
        } else {
            flatten(scene, &world)?
        };

        let mut cameras = scene.cameras.clone();
        for camera in &mut cameras {
            if let Some(id) = scene.nodes.find_by_name(&camera.name) {
                camera.transform(&world[id.index()]);
            }
        }
        let mut lights = scene.lights.clone();
        for light in &mut lights {
            if let Some(id) = scene.nodes.find_by_name(&light.name) {
                light.transform(&world[id.index()]);
            }
        }

        if self.config.normalize {
            normalize(&mut meshes);
        }

        scene.meshes = meshes;
        scene.nodes = nodes;
        scene.cameras = cameras;
        scene.lights = lights;

        info!(
            "PretransformVertices finished | Meshes in: {} out: {} | Nodes in: {} out: {}",
            meshes_in,
            scene.meshes.len(),
            nodes_in,
            scene.nodes.len()
        );
        Ok(())
    }
}

/// Copy of `mesh` with `matrix` applied. Bones are dropped since their offset
/// matrices refer to the untransformed mesh.
fn bake(mesh: &Mesh, matrix: &Mat4) -> Mesh {
    let mut out = mesh.clone();
    out.bones.clear();
    if is_identity(matrix) {
        return out;
    }

    for p in &mut out.positions {
        *p = matrix.transform_point3(*p);
    }
    let normal = normal_matrix(matrix);
    for channel in [&mut out.normals, &mut out.tangents, &mut out.bitangents] {
        if let Some(data) = channel.as_mut_slice() {
            for v in data {
                *v = (normal * *v).normalize_or_zero();
            }
        }
    }
    out
}

/// Hashable identity of a matrix; `-0.0` and `0.0` compare equal.
fn matrix_key(matrix: &Mat4) -> [u32; 16] {
    matrix
        .to_cols_array()
        .map(|v| if v == 0.0 { 0 } else { v.to_bits() })
}

/// Bake in place, keeping the tree. The first reference of a mesh claims the
/// original slot; references under a different transform get their own copy,
/// shared by all references with that same transform. Meshes no node
/// references are dropped.
fn keep_hierarchy(scene: &Scene, world: &[Mat4]) -> (Vec<Mesh>, NodeTree) {
    let mut meshes = scene.meshes.clone();
    let mut claimed = vec![false; meshes.len()];
    let mut instances: HashMap<(usize, [u32; 16]), usize> = HashMap::new();
    let mut nodes = scene.nodes.clone();

    for id in scene.nodes.depth_first() {
        let matrix = world[id.index()];
        let Some(node) = nodes.get_mut(id) else { continue };

        for slot in &mut node.meshes {
            let source = *slot;
            let key = (source, matrix_key(&matrix));
            *slot = match instances.get(&key) {
                Some(&existing) => existing,
                None => {
                    let baked = bake(&scene.meshes[source], &matrix);
                    let target = if claimed[source] {
                        meshes.push(baked);
                        meshes.len() - 1
                    } else {
                        claimed[source] = true;
                        meshes[source] = baked;
                        source
                    };
                    instances.insert(key, target);
                    target
                }
            };
        }
        node.transform = Mat4::IDENTITY;
    }

    let duplicated = meshes.len() - scene.meshes.len();
    let orphaned = claimed.iter().filter(|c| !**c).count();
    if orphaned > 0 {
        // Copies are always referenced; only unclaimed originals go.
        let keep: Vec<bool> = (0..meshes.len())
            .map(|i| claimed.get(i).copied().unwrap_or(true))
            .collect();
        let mut remap = vec![0usize; meshes.len()];
        let mut next = 0;
        for (i, &kept) in keep.iter().enumerate() {
            remap[i] = next;
            next += usize::from(kept);
        }
        meshes = meshes
            .into_iter()
            .zip(&keep)
            .filter_map(|(mesh, &kept)| kept.then_some(mesh))
            .collect();
        for (_, node) in nodes.iter_mut() {
            for slot in &mut node.meshes {
                *slot = remap[*slot];
            }
        }
    }

    debug!(
        "Kept hierarchy, {} meshes duplicated for differing transforms, {} unreferenced dropped",
        duplicated, orphaned
    );
    (meshes, nodes)
}

/// Merge baked instances per (material, vertex format) under a single root.
fn flatten(scene: &Scene, world: &[Mat4]) -> Result<(Vec<Mesh>, NodeTree), ProcessError> {
    // (mesh index, world transform) for every node reference, depth-first.
    let instances: Vec<(usize, Mat4)> = scene
        .nodes
        .depth_first()
        .into_iter()
        .filter_map(|id| scene.nodes.get(id).map(|node| (id, node)))
        .flat_map(|(id, node)| node.meshes.iter().map(move |&m| (m, world[id.index()])))
        .collect();

    if instances.is_empty() {
        return Err(ProcessError::precondition(
            STEP,
            ProcessTarget::Scene,
            "all meshes orphaned, no node references any mesh",
        ));
    }

    let materials = (0..scene.materials.len()).map(Some).chain(std::iter::once(None));
    let mut meshes = Vec::new();
    for material in materials {
        let in_material: Vec<&(usize, Mat4)> = instances
            .iter()
            .filter(|(m, _)| scene.meshes[*m].material_index == material)
            .collect();
        let formats: BTreeSet<u32> = in_material
            .iter()
            .map(|(m, _)| scene.meshes[*m].vertex_format().bits())
            .collect();

        for format in formats {
            let group: Vec<Mesh> = in_material
                .iter()
                .filter(|(m, _)| scene.meshes[*m].vertex_format().bits() == format)
                .map(|(m, matrix)| bake(&scene.meshes[*m], matrix))
                .collect();
            meshes.push(merge(group));
        }
    }

    let mut nodes = NodeTree::new(scene.nodes.root_node().name.clone());
    nodes.root_node_mut().meshes = (0..meshes.len()).collect();
    let root = nodes.root();
    let names = scene
        .cameras
        .iter()
        .map(|c| c.name.as_str())
        .chain(scene.lights.iter().map(|l| l.name.as_str()));
    for name in names {
        nodes
            .add_child(root, Node::new(name))
            .map_err(|e| ProcessError::invalid_scene(STEP, e))?;
    }

    Ok((meshes, nodes))
}

/// Concatenate meshes sharing one vertex format into a single mesh.
fn merge(group: Vec<Mesh>) -> Mesh {
    let mut parts = group.into_iter();
    let Some(mut out) = parts.next() else {
        return Mesh::default();
    };

    for part in parts {
        let offset = out.positions.len() as u32;
        out.primitive_types |= part.primitive_types;
        out.faces.extend(
            part.faces
                .into_iter()
                .map(|f| Face::new(f.indices.into_iter().map(|i| i + offset).collect())),
        );
        out.positions.extend(part.positions);
        append(&mut out.normals, part.normals);
        append(&mut out.tangents, part.tangents);
        append(&mut out.bitangents, part.bitangents);
        for (dst, src) in out.tex_coords.iter_mut().zip(part.tex_coords) {
            append(dst, src);
        }
        for (dst, src) in out.colors.iter_mut().zip(part.colors) {
            append(dst, src);
        }
    }
    if out.primitive_types.is_empty() {
        out.primitive_types = out.compute_primitive_types();
    }
    out
}

fn append<T>(dst: &mut VertexChannel<T>, src: VertexChannel<T>) {
    if let (VertexChannel::Present(dst), VertexChannel::Present(src)) = (dst, src) {
        dst.extend(src);
    }
}

/// Rescale every position into the [-1, 1] cube around the scene center.
fn normalize(meshes: &mut [Mesh]) {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for p in meshes.iter().flat_map(|m| m.positions.iter()) {
        min = min.min(*p);
        max = max.max(*p);
    }
    if min.cmpgt(max).any() {
        return;
    }

    let center = (min + max) * 0.5;
    let half = (max - min).max_element() * 0.5;
    let scale = if half > 0.0 { 1.0 / half } else { 1.0 };
    for p in meshes.iter_mut().flat_map(|m| m.positions.iter_mut()) {
        *p = (*p - center) * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_scene::{Camera, Light, LightKind, Material, PrimitiveTypes};

    fn node(num: usize, i: usize) -> Node {
        let index = num * 5 + i;
        Node::new(format!("node{index}"))
            .with_meshes(vec![index, 24 - index])
            .with_transform(Mat4::from_scale(Vec3::new((index + 1) as f32, 1.0, 1.0)))
    }

    /// 5 materials, 25 point meshes; mesh `i` uses material `i % 5` and has
    /// normals when `i` is odd. Root has 5 children with 5 children each.
    fn layered_scene() -> Scene {
        let mut scene = Scene::new("root");
        for i in 0..5 {
            scene.add_material(Material::new(format!("material{i}")));
        }
        for i in 0..25 {
            let count = 10 + i;
            let positions = (0..count).map(|j| Vec3::new(i as f32, j as f32, 0.0)).collect();
            let faces = (0..count as u32).map(|j| Face::new(vec![j])).collect();
            let mut mesh = Mesh::new(format!("mesh{i}"), positions)
                .with_faces(faces)
                .with_material(i % 5);
            if i % 2 == 1 {
                mesh.normals = VertexChannel::Present(vec![Vec3::Y; count]);
            }
            scene.add_mesh(mesh);
        }

        let root = scene.nodes.root();
        for i in 0..5 {
            let child = scene.nodes.add_child(root, node(0, i)).unwrap();
            for k in 0..5 {
                scene.nodes.add_child(child, node(i, k)).unwrap();
            }
        }
        scene
    }

    fn referenced_vertex_count(scene: &Scene) -> usize {
        scene
            .nodes
            .iter()
            .flat_map(|(_, n)| n.meshes.iter())
            .map(|&m| scene.meshes[m].vertex_count())
            .sum()
    }

    #[test]
    fn flattening_groups_by_material_and_format() {
        let mut scene = layered_scene();
        let expected_vertices = referenced_vertex_count(&scene);
        PretransformVertices::new().execute(&mut scene).unwrap();

        assert_eq!(scene.meshes.len(), 10);
        assert_eq!(scene.materials.len(), 5);
        assert_eq!(scene.nodes.len(), 1);
        assert!(scene.nodes.root_node().children().is_empty());
        assert_eq!(scene.nodes.root_node().name, "root");
        assert_eq!(scene.nodes.root_node().meshes, (0..10).collect::<Vec<_>>());
        assert_eq!(scene.vertex_count(), expected_vertices);

        // Materials in order, and within one material the format without normals first.
        for (i, mesh) in scene.meshes.iter().enumerate() {
            assert_eq!(mesh.material_index, Some(i / 2));
            assert_eq!(mesh.has_normals(), i % 2 == 1);
            assert_eq!(mesh.primitive_types, PrimitiveTypes::POINT);
        }
        assert_eq!(scene.validate(), Ok(()));
    }

    #[test]
    fn keeping_hierarchy_duplicates_differently_transformed_meshes() {
        let mut scene = layered_scene();
        let node_count = scene.nodes.len();
        PretransformVertices::with_config(PretransformConfig {
            keep_hierarchy: true,
            ..Default::default()
        })
        .execute(&mut scene)
        .unwrap();

        assert_eq!(scene.meshes.len(), 49);
        assert_eq!(scene.materials.len(), 5);
        assert_eq!(scene.nodes.len(), node_count);
        assert!(scene.nodes.iter().all(|(_, n)| n.transform == Mat4::IDENTITY));
        assert_eq!(scene.validate(), Ok(()));

        // node0 scales x by 1 and references meshes 0 and 24.
        let first = scene.nodes.find_by_name("node0").unwrap();
        let refs = &scene.nodes.get(first).unwrap().meshes;
        assert_eq!(refs[0], 0);
        assert_eq!(scene.meshes[0].positions[3], Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn baked_positions_and_normals_follow_world_transform() {
        let mut scene = Scene::new("root");
        let mesh = Mesh::new("tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y])
            .with_normals(vec![Vec3::new(1.0, 1.0, 0.0).normalize(); 3])
            .with_faces(vec![Face::triangle(0, 1, 2)]);
        scene.add_mesh(mesh);
        let root = scene.nodes.root();
        let parent = scene
            .nodes
            .add_child(root, Node::new("move").with_transform(Mat4::from_translation(Vec3::Z)))
            .unwrap();
        scene
            .nodes
            .add_child(
                parent,
                Node::new("stretch")
                    .with_transform(Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0)))
                    .with_meshes(vec![0]),
            )
            .unwrap();

        PretransformVertices::new().execute(&mut scene).unwrap();
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.positions, vec![Vec3::Z, Vec3::new(2.0, 0.0, 1.0), Vec3::new(0.0, 1.0, 1.0)]);
        let n = mesh.normals.as_slice().unwrap()[0];
        assert!(n.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0).normalize(), 1e-5));
    }

    #[test]
    fn root_transformation_and_normalize() {
        let mut scene = Scene::new("root");
        scene.add_mesh(
            Mesh::new("segment", vec![Vec3::ZERO, Vec3::new(4.0, 2.0, 0.0)])
                .with_faces(vec![Face::new(vec![0, 1])]),
        );
        scene.nodes.root_node_mut().meshes.push(0);

        let mut step = PretransformVertices::new();
        let mut config = ProcessConfig::default();
        config.pretransform.root_transformation = Some(Mat4::from_translation(Vec3::splat(10.0)));
        step.setup(&config);
        step.execute(&mut scene).unwrap();
        assert_eq!(scene.meshes[0].positions[0], Vec3::splat(10.0));

        config.pretransform.root_transformation = None;
        config.pretransform.normalize = true;
        step.setup(&config);
        step.execute(&mut scene).unwrap();
        assert_eq!(
            scene.meshes[0].positions,
            vec![Vec3::new(-1.0, -0.5, 0.0), Vec3::new(1.0, 0.5, 0.0)]
        );
    }

    #[test]
    fn cameras_and_lights_move_to_world_space_and_stay_bound() {
        let mut scene = Scene::new("root");
        scene.add_mesh(Mesh::new("p", vec![Vec3::ZERO]).with_faces(vec![Face::new(vec![0])]));
        scene.nodes.root_node_mut().meshes.push(0);
        let root = scene.nodes.root();
        scene
            .nodes
            .add_child(root, Node::new("eye").with_transform(Mat4::from_translation(Vec3::Y * 3.0)))
            .unwrap();
        scene.cameras.push(Camera::new("eye"));
        scene.lights.push(Light::new("lamp", LightKind::Point));

        PretransformVertices::new().execute(&mut scene).unwrap();
        assert_eq!(scene.cameras[0].position, Vec3::Y * 3.0);
        assert_eq!(scene.lights[0].position, Vec3::ZERO);
        let names: Vec<&str> = scene
            .nodes
            .root_node()
            .children()
            .iter()
            .filter_map(|&id| scene.nodes.get(id))
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["eye", "lamp"]);
    }

    #[test]
    fn bones_are_dropped() {
        let mut scene = Scene::new("root");
        let mut mesh = Mesh::new("skinned", vec![Vec3::ZERO]).with_faces(vec![Face::new(vec![0])]);
        mesh.bones.push(mosaic_scene::Bone {
            name: "hip".into(),
            offset_matrix: Mat4::IDENTITY,
            weights: vec![mosaic_scene::VertexWeight { vertex_id: 0, weight: 1.0 }],
        });
        scene.add_mesh(mesh);
        scene.nodes.root_node_mut().meshes.push(0);

        PretransformVertices::new().execute(&mut scene).unwrap();
        assert!(!scene.meshes[0].has_bones());
    }

    #[test]
    fn invalid_mesh_reference_is_rejected() {
        let mut scene = layered_scene();
        let root = scene.nodes.root();
        scene.nodes.add_child(root, Node::new("bad").with_meshes(vec![99])).unwrap();
        let before = scene.clone();

        let err = PretransformVertices::new().execute(&mut scene).unwrap_err();
        assert!(matches!(err, ProcessError::PreconditionViolation { .. }));
        assert!(matches!(err.target(), ProcessTarget::Node(_)));
        assert_eq!(scene, before);
    }

    #[test]
    fn orphaned_meshes_fail_flattening() {
        let mut scene = Scene::new("root");
        scene.add_mesh(Mesh::new("lost", vec![Vec3::ZERO]).with_faces(vec![Face::new(vec![0])]));
        let err = PretransformVertices::new().execute(&mut scene).unwrap_err();
        assert_eq!(err.target(), ProcessTarget::Scene);
    }

    #[test]
    fn keeping_hierarchy_drops_unreferenced_meshes() {
        let mut scene = Scene::new("root");
        for name in ["unused", "used"] {
            scene.add_mesh(Mesh::new(name, vec![Vec3::ZERO]).with_faces(vec![Face::new(vec![0])]));
        }
        let root = scene.nodes.root();
        scene
            .nodes
            .add_child(
                root,
                Node::new("holder")
                    .with_transform(Mat4::from_translation(Vec3::X))
                    .with_meshes(vec![1]),
            )
            .unwrap();

        PretransformVertices::with_config(PretransformConfig {
            keep_hierarchy: true,
            ..Default::default()
        })
        .execute(&mut scene)
        .unwrap();

        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.meshes[0].name, "used");
        assert_eq!(scene.meshes[0].positions[0], Vec3::X);
        let holder = scene.nodes.find_by_name("holder").unwrap();
        assert_eq!(scene.nodes.get(holder).unwrap().meshes, vec![0]);
        assert_eq!(scene.validate(), Ok(()));
    }

    #[test]
    fn flattening_separates_every_channel_difference() {
        let point = || Mesh::new("p", vec![Vec3::ZERO]).with_faces(vec![Face::new(vec![0])]);
        let plain = point();
        let mut tangents = point();
        tangents.tangents = VertexChannel::Present(vec![Vec3::X]);
        let mut uvs = point();
        uvs.tex_coords[0] = VertexChannel::Present(vec![Vec3::ZERO]);
        uvs.uv_components[0] = 2;
        let mut colors = point();
        colors.colors[1] = VertexChannel::Present(vec![mosaic_core::Color::WHITE]);

        let mut scene = Scene::new("root");
        scene.add_material(Material::new("shared"));
        for mesh in [plain, tangents, uvs, colors] {
            let index = scene.add_mesh(mesh.with_material(0));
            scene.nodes.root_node_mut().meshes.push(index);
        }

        PretransformVertices::new().execute(&mut scene).unwrap();
        assert_eq!(scene.meshes.len(), 4);
        assert_eq!(scene.validate(), Ok(()));
        assert_eq!(scene.meshes.iter().filter(|m| m.tangents.is_present()).count(), 1);
        assert_eq!(scene.meshes.iter().filter(|m| m.tex_coords[0].is_present()).count(), 1);
        assert_eq!(scene.meshes.iter().filter(|m| m.colors[1].is_present()).count(), 1);
    }

    #[test]
    fn mesh_reference_without_meshes_is_rejected() {
        let mut scene = Scene::new("root");
        scene.nodes.root_node_mut().meshes.push(0);
        let err = PretransformVertices::new().execute(&mut scene).unwrap_err();
        assert!(matches!(err, ProcessError::PreconditionViolation { .. }));
    }

    #[test]
    fn empty_scene_is_left_alone() {
        let mut scene = Scene::new("root");
        let root = scene.nodes.root();
        scene.nodes.add_child(root, Node::new("empty")).unwrap();
        let before = scene.clone();
        PretransformVertices::new().execute(&mut scene).unwrap();
        assert_eq!(scene, before);
    }
}
