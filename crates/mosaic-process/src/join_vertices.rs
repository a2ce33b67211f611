//! Duplicate vertex collapsing
//!
//! Importers usually emit one vertex per face corner. This step merges
//! vertices that agree on every present channel into the first occurrence and
//! rewrites face indices, turning the mesh into shared (non-verbose) indexing.

use glam::Vec3;
use mosaic_core::Color;
use mosaic_scene::{validate, Bone, Face, Mesh, Scene, SceneFlags, VertexChannel, VertexWeight};
use tracing::{debug, info, warn};

use crate::config::{JoinVerticesConfig, ProcessConfig};
use crate::error::{ProcessError, ProcessTarget};
use crate::parallel::map_meshes;
use crate::spatial_sort::SpatialSort;
use crate::step::{PostProcessSteps, ProcessStep};

const STEP: &str = "JoinVertices";

pub struct JoinVerticesProcess {
    config: JoinVerticesConfig,
}

/// Bone influences on one vertex, as (bone index, weight bits), sorted.
type WeightSet = Vec<(usize, u32)>;

impl JoinVerticesProcess {
    pub fn new() -> Self {
        Self {
            config: JoinVerticesConfig::default(),
        }
    }

    /// Joined copy of `mesh`, or `None` when every vertex is already unique.
    fn join_mesh(&self, index: usize, mesh: &Mesh) -> Result<Option<Mesh>, ProcessError> {
        let invalid = |e| ProcessError::invalid_scene(STEP, e);
        validate::validate_channels(index, mesh).map_err(invalid)?;
        validate::validate_faces(index, mesh).map_err(invalid)?;
        validate::validate_bones(index, mesh).map_err(invalid)?;

        let vertex_count = mesh.vertex_count();
        if vertex_count == 0 {
            return Ok(None);
        }

        let weights = weight_sets(mesh);
        let sort = SpatialSort::new(&mesh.positions);
        let epsilon = self.config.epsilon;

        // Old vertex index -> new vertex index.
        let mut remap = vec![0u32; vertex_count];
        let mut is_survivor = vec![false; vertex_count];
        let mut survivors: Vec<usize> = Vec::with_capacity(vertex_count);
        let mut candidates = Vec::new();

        for v in 0..vertex_count {
            let limit = self.config.max_candidates;
            let scanned = sort.find_positions(mesh.positions[v], epsilon, limit, &mut candidates);
            if scanned > limit {
                return Err(ProcessError::resource_limit(
                    STEP,
                    ProcessTarget::Mesh(index),
                    format!("more than {} vertices in the sort key range of vertex {}", limit, v),
                ));
            }

            let survivor = candidates
                .iter()
                .map(|&c| c as usize)
                .filter(|&c| c < v && is_survivor[c])
                .filter(|&c| vertices_equal(mesh, &weights, c, v, epsilon))
                .min();

            match survivor {
                Some(c) => remap[v] = remap[c],
                None => {
                    remap[v] = survivors.len() as u32;
                    is_survivor[v] = true;
                    survivors.push(v);
                }
            }
        }

        if survivors.len() == vertex_count {
            return Ok(None);
        }

        let faces = mesh
            .faces
            .iter()
            .map(|face| Face::new(face.indices.iter().map(|&i| remap[i as usize]).collect()))
            .collect();

        let bones = remap_bones(&mesh.bones, &remap, &is_survivor, &mesh.name);

        Ok(Some(Mesh {
            name: mesh.name.clone(),
            primitive_types: mesh.primitive_types,
            positions: survivors.iter().map(|&v| mesh.positions[v]).collect(),
            normals: mesh.normals.gather(&survivors),
            tangents: mesh.tangents.gather(&survivors),
            bitangents: mesh.bitangents.gather(&survivors),
            tex_coords: std::array::from_fn(|n| mesh.tex_coords[n].gather(&survivors)),
            uv_components: mesh.uv_components,
            colors: std::array::from_fn(|n| mesh.colors[n].gather(&survivors)),
            faces,
            bones,
            material_index: mesh.material_index,
        }))
    }
}

impl Default for JoinVerticesProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessStep for JoinVerticesProcess {
    fn name(&self) -> &'static str {
        STEP
    }

    fn is_active(&self, steps: PostProcessSteps) -> bool {
        steps.contains(PostProcessSteps::JOIN_IDENTICAL_VERTICES)
    }

    fn setup(&mut self, config: &ProcessConfig) {
        self.config = config.join_vertices.clone();
    }

    fn execute(&self, scene: &mut Scene) -> Result<(), ProcessError> {
        debug!("JoinVerticesProcess begin");

        let results = map_meshes(&scene.meshes, |index, mesh| self.join_mesh(index, mesh))?;

        let before = scene.vertex_count();
        for (index, (mesh, joined)) in scene.meshes.iter_mut().zip(results).enumerate() {
            if let Some(joined) = joined {
                debug!(
                    "Mesh {} ({}) | Verts in: {} out: {} | {:.1}%",
                    index,
                    mesh.name,
                    mesh.vertex_count(),
                    joined.vertex_count(),
                    100.0 * (1.0 - joined.vertex_count() as f32 / mesh.vertex_count() as f32)
                );
                *mesh = joined;
            }
        }
        let after = scene.vertex_count();

        scene.flags |= SceneFlags::NON_VERBOSE_FORMAT;
        if after < before {
            info!(
                "JoinVerticesProcess finished | Verts in: {} out: {} | ~{:.1}%",
                before,
                after,
                100.0 * (1.0 - after as f32 / before as f32)
            );
        } else {
            debug!("JoinVerticesProcess finished. There was nothing to be done.");
        }
        Ok(())
    }
}

/// Per-vertex bone influences; empty sets when the mesh has no bones.
fn weight_sets(mesh: &Mesh) -> Vec<WeightSet> {
    let mut sets = vec![WeightSet::new(); if mesh.has_bones() { mesh.vertex_count() } else { 0 }];
    for (bone, b) in mesh.bones.iter().enumerate() {
        for w in &b.weights {
            sets[w.vertex_id as usize].push((bone, w.weight.to_bits()));
        }
    }
    for set in &mut sets {
        set.sort_unstable();
    }
    sets
}

fn vertices_equal(mesh: &Mesh, weights: &[WeightSet], a: usize, b: usize, epsilon: f32) -> bool {
    let eps_sq = epsilon * epsilon;
    let close = |channel: &VertexChannel<Vec3>| match channel.as_slice() {
        Some(data) => data[a].distance_squared(data[b]) <= eps_sq,
        None => true,
    };
    let close_color = |channel: &VertexChannel<Color>| match channel.as_slice() {
        Some(data) => data[a].distance_squared(&data[b]) <= eps_sq,
        None => true,
    };

    mesh.positions[a].distance_squared(mesh.positions[b]) <= eps_sq
        && close(&mesh.normals)
        && close(&mesh.tangents)
        && close(&mesh.bitangents)
        && mesh.tex_coords.iter().all(close)
        && mesh.colors.iter().all(close_color)
        && (weights.is_empty() || weights[a] == weights[b])
}

/// Point bone weights at surviving vertices. Weights of merged-away vertices
/// are dropped, bones left without any weight are removed.
fn remap_bones(bones: &[Bone], remap: &[u32], is_survivor: &[bool], mesh_name: &str) -> Vec<Bone> {
    bones
        .iter()
        .filter_map(|bone| {
            let weights: Vec<VertexWeight> = bone
                .weights
                .iter()
                .filter(|w| is_survivor[w.vertex_id as usize])
                .map(|w| VertexWeight {
                    vertex_id: remap[w.vertex_id as usize],
                    weight: w.weight,
                })
                .collect();
            if weights.is_empty() {
                warn!("Removing bone '{}' from mesh '{}': no weights left", bone.name, mesh_name);
                return None;
            }
            Some(Bone {
                name: bone.name.clone(),
                offset_matrix: bone.offset_matrix,
                weights,
            })
        })
        .collect()
}
