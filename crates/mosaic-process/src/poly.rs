//! Polygon helpers used by triangulation

use glam::{Vec2, Vec3};

/// Normal of an arbitrary (possibly non-planar) polygon via Newell's method.
///
/// The result is not normalized; its length is twice the projected area, so a
/// near-zero vector means the polygon is degenerate.
pub fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, current) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (current.y - next.y) * (current.z + next.z);
        normal.y += (current.z - next.z) * (current.x + next.x);
        normal.z += (current.x - next.x) * (current.y + next.y);
    }
    normal
}

/// Project `points` onto the coordinate plane orthogonal to the dominant axis
/// of `normal`. The 2D polygon winds counter-clockwise when viewed from the
/// side `normal` points to.
pub fn project_to_plane(points: &[Vec3], normal: Vec3) -> Vec<Vec2> {
    let abs = normal.abs();
    let (u, v, flip) = if abs.x >= abs.y && abs.x >= abs.z {
        (1, 2, normal.x < 0.0)
    } else if abs.y >= abs.z {
        (2, 0, normal.y < 0.0)
    } else {
        (0, 1, normal.z < 0.0)
    };
    let (u, v) = if flip { (v, u) } else { (u, v) };

    points.iter().map(|p| Vec2::new(p[u], p[v])).collect()
}

/// Twice the signed area of triangle `abc`; positive for counter-clockwise.
pub fn signed_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// Whether `p` lies inside or on the border of the counter-clockwise triangle `abc`.
pub fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    signed_area(a, b, p) >= 0.0 && signed_area(b, c, p) >= 0.0 && signed_area(c, a, p) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newell_normal_of_ccw_square_points_up() {
        let square = [
            Vec3::ZERO,
            Vec3::X,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::Y,
        ];
        let n = newell_normal(&square);
        assert!(n.normalize().abs_diff_eq(Vec3::Z, 1e-6));
        assert_eq!(n.length(), 2.0);
    }

    #[test]
    fn collinear_points_have_zero_normal() {
        let line = [Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::X * 3.0];
        assert_eq!(newell_normal(&line), Vec3::ZERO);
    }

    #[test]
    fn projection_keeps_ccw_winding() {
        // Square in the YZ plane facing -X.
        let square = [
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let normal = newell_normal(&square);
        assert!(normal.x < 0.0);
        let flat = project_to_plane(&square, normal);
        assert!(signed_area(flat[0], flat[1], flat[2]) > 0.0);
    }

    #[test]
    fn point_in_triangle_includes_edges() {
        let (a, b, c) = (Vec2::ZERO, Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0));
        assert!(point_in_triangle(Vec2::new(0.5, 0.5), a, b, c));
        assert!(point_in_triangle(Vec2::new(1.0, 0.0), a, b, c));
        assert!(!point_in_triangle(Vec2::new(2.0, 2.0), a, b, c));
    }
}
