//! Closed primitive meshes with analytic normals.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::geometry::point::Point3d;
use crate::geometry::vector::Vec3;
use crate::mesh::TriangleMesh;
use crate::operations::{require_positive, require_segments, OperationError};

/// Unit direction at polar angle `theta` from +Y and azimuth `phi` from +Z toward +X.
fn spherical(theta: f64, phi: f64) -> Vec3 {
    let (st, ct) = theta.sin_cos();
    let (sp, cp) = phi.sin_cos();
    Vec3::new(st * sp, ct, st * cp)
}

/// Latitude-longitude sphere. `width_segments` around Y, `height_segments` pole to pole.
///
/// Vertex count is `width_segments * (height_segments - 1) + 2`.
pub fn uv_sphere(
    center: Point3d,
    radius: f64,
    width_segments: usize,
    height_segments: usize,
) -> Result<TriangleMesh, OperationError> {
    require_positive("radius", radius)?;
    require_segments(width_segments, 3)?;
    require_segments(height_segments, 2)?;
    Ok(latitude_band(center, radius, width_segments, height_segments, PI))
}

/// Upper half of a sphere closed by a flat disc at `center.y`.
pub fn hemisphere(
    center: Point3d,
    radius: f64,
    width_segments: usize,
    height_segments: usize,
) -> Result<TriangleMesh, OperationError> {
    require_positive("radius", radius)?;
    require_segments(width_segments, 3)?;
    require_segments(height_segments, 1)?;

    let mut mesh = latitude_band(center, radius, width_segments, height_segments, FRAC_PI_2);

    // Base disc, flat shaded.
    let down = -Vec3::Y;
    let hub = mesh.add_vertex(center, down);
    let first = mesh.vertex_count() as u32;
    for j in 0..width_segments {
        let dir = spherical(FRAC_PI_2, TAU * j as f64 / width_segments as f64);
        mesh.add_vertex(center + dir * radius, down);
    }
    let w = width_segments as u32;
    for j in 0..w {
        mesh.add_triangle(hub, first + (j + 1) % w, first + j);
    }
    Ok(mesh)
}

/// North pole plus latitude rings from `theta = PI / rows` down to `theta_end`.
/// When `theta_end` reaches PI the last ring collapses to a south pole vertex.
fn latitude_band(
    center: Point3d,
    radius: f64,
    width_segments: usize,
    rows: usize,
    theta_end: f64,
) -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    let closes_south = theta_end >= PI;
    let ring_count = if closes_south { rows - 1 } else { rows };
    let w = width_segments as u32;

    let north = mesh.add_vertex(center + Vec3::Y * radius, Vec3::Y);
    for r in 1..=ring_count {
        let theta = theta_end * r as f64 / rows as f64;
        for j in 0..width_segments {
            let n = spherical(theta, TAU * j as f64 / width_segments as f64);
            mesh.add_vertex(center + n * radius, n);
        }
    }
    let at = |ring: usize, j: u32| 1 + (ring as u32 - 1) * w + j % w;

    for j in 0..w {
        mesh.add_triangle(north, at(1, j), at(1, j + 1));
    }
    for r in 1..ring_count {
        for j in 0..w {
            let a = at(r, j);
            let b = at(r, j + 1);
            let c = at(r + 1, j + 1);
            let d = at(r + 1, j);
            mesh.add_triangle(a, d, b);
            mesh.add_triangle(b, d, c);
        }
    }
    if closes_south {
        let south = mesh.add_vertex(center - Vec3::Y * radius, -Vec3::Y);
        for j in 0..w {
            mesh.add_triangle(south, at(ring_count, j + 1), at(ring_count, j));
        }
    }
    mesh
}

/// Torus around the +Y axis, lying in the XZ plane through `center`.
///
/// `major_radius` is the distance from the axis to the tube center.
pub fn torus(
    center: Point3d,
    major_radius: f64,
    tube_radius: f64,
    radial_segments: usize,
    tubular_segments: usize,
) -> Result<TriangleMesh, OperationError> {
    require_positive("major_radius", major_radius)?;
    require_positive("tube_radius", tube_radius)?;
    require_segments(radial_segments, 3)?;
    require_segments(tubular_segments, 3)?;

    let mut mesh = TriangleMesh::new();
    for i in 0..tubular_segments {
        let phi = TAU * i as f64 / tubular_segments as f64;
        let (sp, cp) = phi.sin_cos();
        let outward = Vec3::new(sp, 0.0, cp);
        let ring_center = center + outward * major_radius;
        for j in 0..radial_segments {
            let (sv, cv) = (TAU * j as f64 / radial_segments as f64).sin_cos();
            let n = outward * cv + Vec3::Y * sv;
            mesh.add_vertex(ring_center + n * tube_radius, n);
        }
    }

    let at = |i: usize, j: usize| {
        ((i % tubular_segments) * radial_segments + j % radial_segments) as u32
    };
    for i in 0..tubular_segments {
        for j in 0..radial_segments {
            let a = at(i, j);
            let b = at(i + 1, j);
            let c = at(i + 1, j + 1);
            let d = at(i, j + 1);
            mesh.add_triangle(a, b, d);
            mesh.add_triangle(b, c, d);
        }
    }
    Ok(mesh)
}
