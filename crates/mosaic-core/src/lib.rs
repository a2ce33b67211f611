//! Mosaic Core - Shared math and value types
//!
//! This crate provides the foundational types used by every other Mosaic crate:
//! - Mathematical primitives (re-exported from glam)
//! - `Transform` for building node matrices from translation/rotation/scale
//! - `Color` for vertex colors and material color properties
//! - Matrix helpers used when baking transforms into geometry

pub mod math;
pub mod types;

pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
pub use math::{is_identity, normal_matrix, MAX_COLOR_SETS, MAX_FACE_INDICES, MAX_TEXTURE_COORDS};
pub use types::{Color, Transform};
