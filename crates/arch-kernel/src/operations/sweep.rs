use std::f64::consts::TAU;
use tracing::{debug, instrument};

use crate::geometry::point::Point3d;
use crate::geometry::vector::Vec3;
use crate::mesh::TriangleMesh;
use crate::operations::{require_positive, require_segments, OperationError};

/// Orthonormal frame carried along a path. `normal x binormal == tangent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

/// Drop consecutive points closer than the coincidence tolerance.
fn dedup_path(path: &[Point3d]) -> Vec<Point3d> {
    let tol = crate::default_tolerance();
    let mut out: Vec<Point3d> = Vec::with_capacity(path.len());
    for p in path {
        if out.last().map_or(true, |last| !tol.points_coincident(last, p)) {
            out.push(*p);
        }
    }
    out
}

/// Rotation-minimizing frames along a polyline, by double reflection.
///
/// The path must have at least two distinct consecutive points.
pub fn rotation_minimizing_frames(path: &[Point3d]) -> Vec<Frame> {
    let n = path.len();
    let mut frames: Vec<Frame> = Vec::with_capacity(n);
    if n < 2 {
        return frames;
    }

    let t0 = (path[1] - path[0]).normalize_or(Vec3::Z);
    let seed = if t0.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let n0 = (seed - t0 * seed.dot(&t0)).normalize_or(Vec3::Y);
    frames.push(Frame {
        tangent: t0,
        normal: n0,
        binormal: t0.cross(&n0),
    });

    for i in 1..n {
        let prev = frames[i - 1];
        let seg_in = (path[i] - path[i - 1]).normalize_or(prev.tangent);
        let ti = if i < n - 1 {
            let seg_out = (path[i + 1] - path[i]).normalize_or(seg_in);
            (seg_in + seg_out).normalize_or(seg_in)
        } else {
            seg_in
        };

        let v1 = path[i] - path[i - 1];
        let c1 = v1.dot(&v1);
        if c1 < 1e-30 {
            frames.push(Frame { tangent: ti, ..prev });
            continue;
        }
        let r_l = prev.normal - v1 * (2.0 * v1.dot(&prev.normal) / c1);
        let t_l = prev.tangent - v1 * (2.0 * v1.dot(&prev.tangent) / c1);

        let v2 = ti - t_l;
        let c2 = v2.dot(&v2);
        let ni = if c2 < 1e-30 {
            r_l
        } else {
            r_l - v2 * (2.0 * v2.dot(&r_l) / c2)
        };
        // Re-orthogonalize so rounding does not accumulate along long paths.
        let ni = (ni - ti * ni.dot(&ti)).normalize_or(prev.normal);

        frames.push(Frame {
            tangent: ti,
            normal: ni,
            binormal: ti.cross(&ni),
        });
    }

    frames
}

/// Sweep a circle of `radius` along `path`, producing a tube.
///
/// Each path point gets a ring of `radial_segments` vertices (the seam is
/// shared). With `cap_ends` the two open ends are fan-filled with their own
/// flat-shaded vertices.
#[instrument(skip(path), fields(path_len = path.len()))]
pub fn sweep_circle(
    path: &[Point3d],
    radius: f64,
    radial_segments: usize,
    cap_ends: bool,
) -> Result<TriangleMesh, OperationError> {
    require_positive("radius", radius)?;
    require_segments(radial_segments, 3)?;
    let path = dedup_path(path);
    if path.len() < 2 {
        return Err(OperationError::InsufficientPath {
            required: 2,
            provided: path.len(),
        });
    }

    let frames = rotation_minimizing_frames(&path);
    let ring = |i: usize| -> Vec<Point3d> {
        let f = &frames[i];
        (0..radial_segments)
            .map(|j| {
                let theta = TAU * j as f64 / radial_segments as f64;
                let (s, c) = theta.sin_cos();
                path[i] + (f.normal * c + f.binormal * s) * radius
            })
            .collect()
    };

    let mut tube = TriangleMesh::new();
    for i in 0..path.len() {
        for p in ring(i) {
            tube.add_vertex(p, Vec3::ZERO);
        }
    }
    let at = |i: usize, j: usize| (i * radial_segments + j % radial_segments) as u32;
    for i in 0..path.len() - 1 {
        for j in 0..radial_segments {
            let a = at(i, j);
            let b = at(i, j + 1);
            let c = at(i + 1, j + 1);
            let d = at(i + 1, j);
            tube.add_triangle(a, b, d);
            tube.add_triangle(b, c, d);
        }
    }
    tube.compute_vertex_normals();

    if cap_ends {
        let last = path.len() - 1;
        for (i, outward) in [(0, -frames[0].tangent), (last, frames[last].tangent)] {
            let mut cap = TriangleMesh::new();
            let center = cap.add_vertex(path[i], outward);
            let first = cap.vertex_count() as u32;
            for p in ring(i) {
                cap.add_vertex(p, outward);
            }
            for j in 0..radial_segments as u32 {
                let a = first + j;
                let b = first + (j + 1) % radial_segments as u32;
                if i == 0 {
                    cap.add_triangle(center, b, a);
                } else {
                    cap.add_triangle(center, a, b);
                }
            }
            tube.merge(&cap);
        }
    }

    debug!(
        vertices = tube.vertex_count(),
        triangles = tube.triangle_count(),
        "swept circle"
    );
    Ok(tube)
}
