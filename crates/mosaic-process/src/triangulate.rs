//! Polygon to triangle conversion
//!
//! Faces with more than three indices are split into `n - 2` triangles that
//! reuse the polygon's own vertex indices. Vertex buffers are never touched.
//! Quads fan from their concave corner (if any); larger polygons are projected
//! onto their dominant plane and ear-clipped, falling back to a fan when the
//! polygon is degenerate.

use glam::{Vec2, Vec3};
use mosaic_scene::{validate, Face, Mesh, PrimitiveTypes, Scene};
use tracing::{debug, info};

use crate::config::ProcessConfig;
use crate::error::{ProcessError, ProcessTarget};
use crate::parallel::map_meshes;
use crate::poly::{newell_normal, point_in_triangle, project_to_plane, signed_area};
use crate::step::{PostProcessSteps, ProcessStep};

const STEP: &str = "Triangulate";

pub struct TriangulateProcess {
    max_polygon_indices: usize,
}

impl TriangulateProcess {
    pub fn new() -> Self {
        Self {
            max_polygon_indices: mosaic_core::MAX_FACE_INDICES,
        }
    }

    /// New face list for `mesh`, or `None` when it has no polygons.
    fn triangulate_mesh(&self, index: usize, mesh: &Mesh) -> Result<Option<Vec<Face>>, ProcessError> {
        validate::validate_faces(index, mesh).map_err(|e| ProcessError::invalid_scene(STEP, e))?;

        let mut triangles_needed = 0;
        let mut has_polygons = false;
        for face in &mesh.faces {
            if face.len() > self.max_polygon_indices {
                return Err(ProcessError::resource_limit(
                    STEP,
                    ProcessTarget::Mesh(index),
                    format!(
                        "face with {} indices exceeds the limit of {}",
                        face.len(),
                        self.max_polygon_indices
                    ),
                ));
            }
            if face.len() > 3 {
                has_polygons = true;
                triangles_needed += face.len() - 2;
            } else {
                triangles_needed += 1;
            }
        }
        if !has_polygons {
            return Ok(None);
        }

        let mut faces = Vec::with_capacity(triangles_needed);
        for face in &mesh.faces {
            match face.len() {
                0..=3 => faces.push(face.clone()),
                4 => triangulate_quad(&face.indices, &mesh.positions, &mut faces),
                _ => triangulate_polygon(&face.indices, &mesh.positions, &mut faces),
            }
        }
        Ok(Some(faces))
    }
}

impl Default for TriangulateProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessStep for TriangulateProcess {
    fn name(&self) -> &'static str {
        STEP
    }

    fn is_active(&self, steps: PostProcessSteps) -> bool {
        steps.contains(PostProcessSteps::TRIANGULATE)
    }

    fn setup(&mut self, config: &ProcessConfig) {
        self.max_polygon_indices = config.triangulate.max_polygon_indices;
    }

    fn execute(&self, scene: &mut Scene) -> Result<(), ProcessError> {
        debug!("TriangulateProcess begin");

        let results = map_meshes(&scene.meshes, |index, mesh| self.triangulate_mesh(index, mesh))?;

        let mut changed = 0;
        for (mesh, faces) in scene.meshes.iter_mut().zip(results) {
            if let Some(faces) = faces {
                mesh.faces = faces;
                changed += 1;
            }
            mesh.primitive_types = mesh.compute_primitive_types();
            debug_assert!(!mesh.primitive_types.contains(PrimitiveTypes::POLYGON));
        }

        if changed > 0 {
            info!("TriangulateProcess finished. Triangulated {} meshes", changed);
        } else {
            debug!("TriangulateProcess finished. There was nothing to be done.");
        }
        Ok(())
    }
}

/// Quads have at most one concave corner; fanning from it keeps both halves inside.
fn triangulate_quad(face: &[u32], positions: &[Vec3], out: &mut Vec<Face>) {
    let corner = |i: usize| positions[face[i % 4] as usize];
    let start = (0..4)
        .find(|&i| {
            let v = corner(i);
            let left = (corner(i + 3) - v).normalize_or_zero();
            let diag = (corner(i + 2) - v).normalize_or_zero();
            let right = (corner(i + 1) - v).normalize_or_zero();
            let angle = left.dot(diag).clamp(-1.0, 1.0).acos() + right.dot(diag).clamp(-1.0, 1.0).acos();
            angle > std::f32::consts::PI
        })
        .unwrap_or(0);

    let at = |k: usize| face[(start + k) % 4];
    out.push(Face::triangle(at(0), at(1), at(2)));
    out.push(Face::triangle(at(0), at(2), at(3)));
}

fn triangulate_polygon(face: &[u32], positions: &[Vec3], out: &mut Vec<Face>) {
    let points: Vec<Vec3> = face.iter().map(|&i| positions[i as usize]).collect();
    let normal = newell_normal(&points);
    if normal.normalize_or_zero() == Vec3::ZERO {
        debug!("Degenerate polygon with {} vertices, using a fan", face.len());
        fan(face, out);
        return;
    }
    let flat = project_to_plane(&points, normal);

    // Positions into `face` of the vertices not yet clipped away.
    let mut remaining: Vec<usize> = (0..face.len()).collect();
    let mut cursor = 0;
    let mut misses = 0;

    while remaining.len() > 3 {
        let len = remaining.len();
        let prev = remaining[(cursor + len - 1) % len];
        let ear = remaining[cursor];
        let next = remaining[(cursor + 1) % len];

        if is_ear(&flat, &remaining, prev, ear, next) {
            out.push(Face::triangle(face[prev], face[ear], face[next]));
            remaining.remove(cursor);
            cursor %= remaining.len();
            misses = 0;
            continue;
        }

        cursor = (cursor + 1) % len;
        misses += 1;
        if misses >= len {
            debug!("No ear found in a polygon with {} vertices left, using a fan", len);
            let rest: Vec<u32> = remaining.iter().map(|&i| face[i]).collect();
            fan(&rest, out);
            return;
        }
    }

    out.push(Face::triangle(face[remaining[0]], face[remaining[1]], face[remaining[2]]));
}

/// `ear` can be clipped when its corner is not reflex and no other remaining
/// vertex lies inside or on the triangle it spans.
fn is_ear(flat: &[Vec2], remaining: &[usize], prev: usize, ear: usize, next: usize) -> bool {
    let (a, b, c) = (flat[prev], flat[ear], flat[next]);
    if signed_area(a, b, c) < 0.0 {
        return false;
    }
    remaining
        .iter()
        .filter(|&&i| i != prev && i != ear && i != next)
        .map(|&i| flat[i])
        .filter(|&p| p != a && p != b && p != c)
        .all(|p| !point_in_triangle(p, a, b, c))
}

fn fan(indices: &[u32], out: &mut Vec<Face>) {
    for pair in indices[1..].windows(2) {
        out.push(Face::triangle(indices[0], pair[0], pair[1]));
    }
}
