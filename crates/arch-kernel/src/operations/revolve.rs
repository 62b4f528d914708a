use std::f64::consts::TAU;
use tracing::{debug, instrument};

use crate::geometry::point::{Point2d, Point3d};
use crate::geometry::vector::Vec3;
use crate::mesh::TriangleMesh;
use crate::operations::{require_segments, OperationError};

/// Point on the surface of revolution: profile radius `r` at height `y`,
/// swept to angle `phi` measured from +Z toward +X.
fn lathe_point(p: &Point2d, phi: f64) -> Point3d {
    let (s, c) = phi.sin_cos();
    Point3d::new(p.x * s, p.y, p.x * c)
}

/// Revolve a profile around the +Y axis into a closed-seam triangle mesh.
///
/// # Arguments
///
/// * `profile` - Ordered `(radius, height)` points, bottom to top. Must have at least 2 points.
/// * `segments` - Number of angular subdivisions. Must be at least 3.
/// * `close_ends` - Fan-fill the bottom and top rings to a pole vertex on the
///   axis. Rings whose radius is already zero are left as-is.
///
/// The seam is shared, so the mesh has `segments * profile.len()` ring
/// vertices plus one per closed end. Normals are averaged from adjacent faces.
#[instrument(skip(profile), fields(profile_len = profile.len()))]
pub fn revolve_profile(
    profile: &[Point2d],
    segments: usize,
    close_ends: bool,
) -> Result<TriangleMesh, OperationError> {
    let n_profile = profile.len();
    if n_profile < 2 {
        return Err(OperationError::InsufficientProfile {
            required: 2,
            provided: n_profile,
        });
    }
    require_segments(segments, 3)?;

    let tol = crate::default_tolerance();
    let mut mesh = TriangleMesh::new();

    // rings[seg][i] == seg * n_profile + i
    for seg in 0..segments {
        let phi = TAU * seg as f64 / segments as f64;
        for p in profile {
            mesh.add_vertex(lathe_point(p, phi), Vec3::ZERO);
        }
    }
    let at = |seg: usize, i: usize| ((seg % segments) * n_profile + i) as u32;

    for seg in 0..segments {
        for i in 0..n_profile - 1 {
            let a = at(seg, i);
            let b = at(seg + 1, i);
            let c = at(seg + 1, i + 1);
            let d = at(seg, i + 1);
            mesh.add_triangle(a, b, d);
            mesh.add_triangle(b, c, d);
        }
    }

    if close_ends {
        let bottom = profile[0];
        if !tol.is_zero_length(bottom.x) {
            let pole = mesh.add_vertex(Point3d::new(0.0, bottom.y, 0.0), -Vec3::Y);
            for seg in 0..segments {
                mesh.add_triangle(pole, at(seg + 1, 0), at(seg, 0));
            }
        }
        let top_idx = n_profile - 1;
        let top = profile[top_idx];
        if !tol.is_zero_length(top.x) {
            let pole = mesh.add_vertex(Point3d::new(0.0, top.y, 0.0), Vec3::Y);
            for seg in 0..segments {
                mesh.add_triangle(pole, at(seg, top_idx), at(seg + 1, top_idx));
            }
        }
    }

    mesh.compute_vertex_normals();
    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "revolved profile"
    );
    Ok(mesh)
}
