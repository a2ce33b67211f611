//! Matrix helpers and channel limits

use glam::{Mat3, Mat4};

/// Maximum number of texture coordinate channels a mesh may carry
pub const MAX_TEXTURE_COORDS: usize = 8;

/// Maximum number of vertex color channels a mesh may carry
pub const MAX_COLOR_SETS: usize = 8;

/// Largest number of indices a single face may reference
pub const MAX_FACE_INDICES: usize = 0x7fff;

/// Tolerance used when deciding whether a baked transform is a no-op
const IDENTITY_EPSILON: f32 = 1e-6;

/// Whether `matrix` is the identity within a small tolerance
pub fn is_identity(matrix: &Mat4) -> bool {
    matrix.abs_diff_eq(Mat4::IDENTITY, IDENTITY_EPSILON)
}

/// Matrix that maps direction vectors (normals, tangents) under `matrix`.
///
/// This is the inverse-transpose of the upper 3x3. Singular matrices have no
/// inverse; their plain upper 3x3 is returned instead, callers renormalize.
/// Singularity is judged relative to the axis lengths.
pub fn normal_matrix(matrix: &Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(*matrix);
    let volume = linear.x_axis.length() * linear.y_axis.length() * linear.z_axis.length();
    if volume == 0.0 || linear.determinant().abs() <= volume * f32::EPSILON {
        return linear;
    }
    linear.inverse().transpose()
}
