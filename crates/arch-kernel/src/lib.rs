pub mod geometry;
pub mod mesh;
pub mod operations;

pub use geometry::point::{Point2d, Point3d};
pub use geometry::spline::CatmullRom;
pub use geometry::transform::{BoundingBox, Euler, Transform};
pub use geometry::vector::Vec3;
pub use mesh::TriangleMesh;
pub use operations::OperationError;

/// Tolerances for geometric comparisons in scene units.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Points closer than this are considered coincident.
    pub coincidence: f64,
    /// Normals shorter than this are treated as degenerate.
    pub degenerate_normal: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-7,
            degenerate_normal: 1e-12,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point3d, b: &Point3d) -> bool {
        a.distance_to(b) < self.coincidence
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }
}

pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
