use glam::{Mat4, Vec3};
use mosaic_core::{Color, MAX_COLOR_SETS, MAX_TEXTURE_COORDS};

use crate::channel::VertexChannel;

bitflags::bitflags! {
    /// Kinds of primitives present in a mesh's face list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PrimitiveTypes: u32 {
        const POINT = 0x1;
        const LINE = 0x2;
        const TRIANGLE = 0x4;
        const POLYGON = 0x8;
    }
}

impl PrimitiveTypes {
    /// Primitive kind of a face with `count` indices.
    pub fn for_index_count(count: usize) -> Self {
        match count {
            0 => Self::empty(),
            1 => Self::POINT,
            2 => Self::LINE,
            3 => Self::TRIANGLE,
            _ => Self::POLYGON,
        }
    }
}

bitflags::bitflags! {
    /// Signature of which optional vertex channels a mesh carries.
    ///
    /// Texture coordinate channel `n` sets bit `0x100 << n` (plus `0x10000 << n`
    /// when it has three components), color channel `n` sets `0x1000000 << n`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VertexFormat: u32 {
        const POSITIONS = 0x1;
        const NORMALS = 0x2;
        const TANGENTS = 0x4;
        const BITANGENTS = 0x8;
        const _ = !0;
    }
}

impl VertexFormat {
    pub fn texcoord(channel: usize) -> Self {
        Self::from_bits_retain(0x100 << channel)
    }

    pub fn texcoord_3d(channel: usize) -> Self {
        Self::from_bits_retain(0x10000 << channel)
    }

    pub fn color(channel: usize) -> Self {
        Self::from_bits_retain(0x100_0000 << channel)
    }
}

/// One polygon of a mesh: an ordered list of vertex indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Face {
    pub indices: Vec<u32>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self {
            indices: vec![a, b, c],
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

impl From<Vec<u32>> for Face {
    fn from(indices: Vec<u32>) -> Self {
        Self { indices }
    }
}

/// Influence of a bone on a single vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

/// A skinning bone. `name` binds it to a node in the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    /// Transforms from mesh space to bone space in bind pose.
    pub offset_matrix: Mat4,
    pub weights: Vec<VertexWeight>,
}

/// Indexed geometry block with optional parallel vertex channels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub name: String,
    pub primitive_types: PrimitiveTypes,
    pub positions: Vec<Vec3>,
    pub normals: VertexChannel<Vec3>,
    pub tangents: VertexChannel<Vec3>,
    pub bitangents: VertexChannel<Vec3>,
    pub tex_coords: [VertexChannel<Vec3>; MAX_TEXTURE_COORDS],
    /// Meaningful components per texture channel (1..=3); 0 when the channel is absent.
    pub uv_components: [u32; MAX_TEXTURE_COORDS],
    pub colors: [VertexChannel<Color>; MAX_COLOR_SETS],
    pub faces: Vec<Face>,
    pub bones: Vec<Bone>,
    /// Index into the scene material list, `None` for "no material".
    pub material_index: Option<usize>,
}

impl Mesh {
    /// Create a mesh with positions only.
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            positions,
            ..Default::default()
        }
    }

    pub fn with_faces(mut self, faces: Vec<Face>) -> Self {
        self.faces = faces;
        self.primitive_types = self.compute_primitive_types();
        self
    }

    pub fn with_material(mut self, material: usize) -> Self {
        self.material_index = Some(material);
        self
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = VertexChannel::from_vec(normals);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn has_faces(&self) -> bool {
        !self.faces.is_empty()
    }

    pub fn has_normals(&self) -> bool {
        self.normals.is_present()
    }

    pub fn has_tangents_and_bitangents(&self) -> bool {
        self.tangents.is_present() && self.bitangents.is_present()
    }

    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }

    /// Number of leading texture channels that are present.
    pub fn num_uv_channels(&self) -> usize {
        self.tex_coords.iter().take_while(|c| c.is_present()).count()
    }

    /// Number of leading color channels that are present.
    pub fn num_color_channels(&self) -> usize {
        self.colors.iter().take_while(|c| c.is_present()).count()
    }

    /// Primitive kinds derived from the current face list.
    pub fn compute_primitive_types(&self) -> PrimitiveTypes {
        self.faces
            .iter()
            .fold(PrimitiveTypes::empty(), |acc, face| {
                acc | PrimitiveTypes::for_index_count(face.len())
            })
    }

    /// Channel presence signature used to decide which meshes may be merged.
    pub fn vertex_format(&self) -> VertexFormat {
        let mut format = VertexFormat::POSITIONS;
        if self.normals.is_present() {
            format |= VertexFormat::NORMALS;
        }
        if self.tangents.is_present() {
            format |= VertexFormat::TANGENTS;
        }
        if self.bitangents.is_present() {
            format |= VertexFormat::BITANGENTS;
        }
        for (n, channel) in self.tex_coords.iter().enumerate() {
            if channel.is_present() {
                format |= VertexFormat::texcoord(n);
                if self.uv_components[n] == 3 {
                    format |= VertexFormat::texcoord_3d(n);
                }
            }
        }
        for (n, channel) in self.colors.iter().enumerate() {
            if channel.is_present() {
                format |= VertexFormat::color(n);
            }
        }
        format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Mesh {
        Mesh::new(
            "quad",
            vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Y],
        )
    }

    #[test]
    fn primitive_types_follow_faces() {
        let mesh = quad().with_faces(vec![
            Face::new(vec![0, 1, 2, 3]),
            Face::triangle(0, 1, 2),
            Face::new(vec![3]),
        ]);
        assert_eq!(
            mesh.primitive_types,
            PrimitiveTypes::POLYGON | PrimitiveTypes::TRIANGLE | PrimitiveTypes::POINT
        );
    }

    #[test]
    fn vertex_format_distinguishes_channels() {
        let plain = quad();
        let with_normals = quad().with_normals(vec![Vec3::Z; 4]);
        assert_eq!(plain.vertex_format(), VertexFormat::POSITIONS);
        assert!(with_normals.vertex_format().contains(VertexFormat::NORMALS));
        assert_ne!(plain.vertex_format(), with_normals.vertex_format());

        let mut uv3 = quad();
        uv3.tex_coords[1] = VertexChannel::Present(vec![Vec3::ZERO; 4]);
        uv3.uv_components[1] = 3;
        let format = uv3.vertex_format();
        assert!(format.contains(VertexFormat::texcoord(1)));
        assert!(format.contains(VertexFormat::texcoord_3d(1)));
        assert!(!format.contains(VertexFormat::texcoord(0)));
    }

    #[test]
    fn tangents_and_bitangents_count_separately() {
        let mut tangents_only = quad();
        tangents_only.tangents = VertexChannel::Present(vec![Vec3::X; 4]);
        let format = tangents_only.vertex_format();
        assert_eq!(format, VertexFormat::POSITIONS | VertexFormat::TANGENTS);
        assert_ne!(format, quad().vertex_format());

        let mut both = tangents_only.clone();
        both.bitangents = VertexChannel::Present(vec![Vec3::Y; 4]);
        assert!(both.vertex_format().contains(VertexFormat::TANGENTS | VertexFormat::BITANGENTS));
        assert_ne!(both.vertex_format(), format);
    }

    #[test]
    fn channel_counts_only_leading_channels() {
        let mut mesh = quad();
        mesh.colors[0] = VertexChannel::Present(vec![Color::WHITE; 4]);
        mesh.colors[2] = VertexChannel::Present(vec![Color::BLACK; 4]);
        assert_eq!(mesh.num_color_channels(), 1);
        assert_eq!(mesh.num_uv_channels(), 0);
    }
}
