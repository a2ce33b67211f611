use glam::{Mat3, Mat4, Vec3};
use mosaic_core::Color;

/// A camera bound by `name` to a node of the hierarchy.
///
/// Position and orientation are relative to that node.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub name: String,
    pub position: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    /// Half horizontal field of view, in radians
    pub horizontal_fov: f32,
    pub clip_near: f32,
    pub clip_far: f32,
    pub aspect: f32,
}

impl Camera {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            up: Vec3::Y,
            horizontal_fov: std::f32::consts::FRAC_PI_4,
            clip_near: 0.1,
            clip_far: 1000.0,
            aspect: 0.0,
        }
    }

    /// Move the camera into the space described by `matrix`.
    pub fn transform(&mut self, matrix: &Mat4) {
        let rotation = Mat3::from_mat4(*matrix);
        self.position = matrix.transform_point3(self.position);
        self.look_at = rotation * self.look_at;
        self.up = rotation * self.up;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    Directional,
    Point,
    Spot,
    Ambient,
}

/// A light source bound by `name` to a node of the hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub diffuse: Color,
    pub specular: Color,
    pub attenuation_constant: f32,
    pub attenuation_linear: f32,
    pub attenuation_quadratic: f32,
}

impl Light {
    pub fn new(name: impl Into<String>, kind: LightKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            diffuse: Color::WHITE,
            specular: Color::WHITE,
            attenuation_constant: 1.0,
            attenuation_linear: 0.0,
            attenuation_quadratic: 0.0,
        }
    }

    pub fn transform(&mut self, matrix: &Mat4) {
        let rotation = Mat3::from_mat4(*matrix);
        self.position = matrix.transform_point3(self.position);
        self.direction = rotation * self.direction;
        self.up = rotation * self.up;
    }
}
