use mosaic_scene::{Material, Mesh, Scene, VertexChannel, DEFAULT_MATERIAL_NAME};
use tracing::debug;

/// Fills in derived data importers commonly leave out. Runs before any step.
///
/// - primitive type flags computed from face sizes when unset
/// - `uv_components` defaults to 2 for present texture channels; components
///   beyond the declared count are zeroed
/// - bitangents derived from normals and tangents when only those are given
/// - a default material when the scene has meshes but no materials
#[derive(Debug, Default, Clone, Copy)]
pub struct ScenePreprocessor;

impl ScenePreprocessor {
    pub fn process(&self, scene: &mut Scene) {
        for mesh in &mut scene.meshes {
            process_mesh(mesh);
        }

        if scene.materials.is_empty() && !scene.meshes.is_empty() {
            debug!("Scene has no materials, adding {}", DEFAULT_MATERIAL_NAME);
            let index = scene.add_material(Material::default_material());
            for mesh in &mut scene.meshes {
                mesh.material_index.get_or_insert(index);
            }
        }
    }
}

fn process_mesh(mesh: &mut Mesh) {
    if mesh.primitive_types.is_empty() {
        mesh.primitive_types = mesh.compute_primitive_types();
    }

    for (channel, components) in mesh.tex_coords.iter_mut().zip(mesh.uv_components.iter_mut()) {
        let Some(data) = channel.as_mut_slice() else {
            *components = 0;
            continue;
        };
        if *components == 0 {
            *components = 2;
        }
        for uv in data {
            if *components < 3 {
                uv.z = 0.0;
            }
            if *components < 2 {
                uv.y = 0.0;
            }
        }
    }

    if !mesh.bitangents.is_present() {
        if let (Some(normals), Some(tangents)) = (mesh.normals.as_slice(), mesh.tangents.as_slice()) {
            let bitangents = normals.iter().zip(tangents).map(|(n, t)| n.cross(*t)).collect();
            mesh.bitangents = VertexChannel::Present(bitangents);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use mosaic_scene::{Face, PrimitiveTypes};

    #[test]
    fn fills_missing_mesh_data() {
        let mut mesh = Mesh::new("m", vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        mesh.faces = vec![Face::triangle(0, 1, 2), Face::new(vec![0, 1])];
        mesh.tex_coords[0] = VertexChannel::Present(vec![Vec3::new(0.5, 0.5, 7.0); 3]);
        mesh.normals = VertexChannel::Present(vec![Vec3::Z; 3]);
        mesh.tangents = VertexChannel::Present(vec![Vec3::X; 3]);

        let mut scene = Scene::new("root");
        scene.add_mesh(mesh);
        ScenePreprocessor.process(&mut scene);

        let mesh = &scene.meshes[0];
        assert_eq!(mesh.primitive_types, PrimitiveTypes::TRIANGLE | PrimitiveTypes::LINE);
        assert_eq!(mesh.uv_components[0], 2);
        assert_eq!(mesh.uv_components[1], 0);
        assert_eq!(mesh.tex_coords[0].get(0), Some(&Vec3::new(0.5, 0.5, 0.0)));
        assert_eq!(mesh.bitangents.get(0), Some(&Vec3::Y));
    }

    #[test]
    fn adds_default_material_only_when_needed() {
        let mut scene = Scene::new("root");
        scene.add_mesh(Mesh::new("m", vec![Vec3::ZERO]));
        ScenePreprocessor.process(&mut scene);
        assert_eq!(scene.materials.len(), 1);
        assert_eq!(scene.materials[0].name, DEFAULT_MATERIAL_NAME);
        assert_eq!(scene.meshes[0].material_index, Some(0));

        ScenePreprocessor.process(&mut scene);
        assert_eq!(scene.materials.len(), 1);

        let mut empty = Scene::new("root");
        ScenePreprocessor.process(&mut empty);
        assert!(empty.materials.is_empty());
    }
}
