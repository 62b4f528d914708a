use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::geometry::point::Point3d;
use crate::geometry::transform::{BoundingBox, Transform};
use crate::geometry::vector::Vec3;

/// An indexed triangle mesh ready for upload to a renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    /// Vertex positions [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Vertex normals [nx, ny, nz, ...]
    pub normals: Vec<f32>,
    /// Triangle indices [i0, i1, i2, ...]
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn add_vertex(&mut self, pos: Point3d, normal: Vec3) -> u32 {
        let idx = self.vertex_count() as u32;
        self.positions.extend_from_slice(&pos.to_f32_array());
        self.normals
            .extend_from_slice(&[normal.x as f32, normal.y as f32, normal.z as f32]);
        idx
    }

    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    pub fn position(&self, index: usize) -> Point3d {
        let p = &self.positions[index * 3..index * 3 + 3];
        Point3d::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let n = &self.normals[index * 3..index * 3 + 3];
        Vec3::new(n[0] as f64, n[1] as f64, n[2] as f64)
    }

    /// Append another mesh, offsetting its indices.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&idx| idx + offset));
    }

    /// Recompute smooth normals: each vertex gets the normalized sum of the
    /// area-weighted normals of the faces that use it.
    pub fn compute_vertex_normals(&mut self) {
        let count = self.vertex_count();
        let mut acc = vec![Vec3::ZERO; count];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let pa = self.position(a);
            let face = (self.position(b) - pa).cross(&(self.position(c) - pa));
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }

        self.normals.clear();
        self.normals.reserve(count * 3);
        for n in acc {
            let n = n.normalize_or(Vec3::Y);
            self.normals
                .extend_from_slice(&[n.x as f32, n.y as f32, n.z as f32]);
        }
    }

    /// A copy with every vertex and normal mapped through `transform`.
    pub fn transformed(&self, transform: &Transform) -> TriangleMesh {
        let mut out = TriangleMesh::new();
        for i in 0..self.vertex_count() {
            let p = transform.transform_point(&self.position(i));
            let n = transform
                .transform_vector(&self.normal(i))
                .normalize_or(Vec3::Y);
            out.add_vertex(p, n);
        }
        out.indices = self.indices.clone();
        out
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bb = BoundingBox::empty();
        for i in 0..self.vertex_count() {
            bb.expand_to_include(&self.position(i));
        }
        bb
    }

    /// Structural sanity: matching buffer lengths, indices in range, finite data.
    pub fn validate(&self) -> Result<(), String> {
        if self.positions.len() % 3 != 0 || self.indices.len() % 3 != 0 {
            return Err("buffer length is not a multiple of 3".to_string());
        }
        if self.normals.len() != self.positions.len() {
            return Err(format!(
                "normals ({}) and positions ({}) differ in length",
                self.normals.len(),
                self.positions.len()
            ));
        }
        let count = self.vertex_count() as u32;
        if let Some(bad) = self.indices.iter().find(|&&i| i >= count) {
            return Err(format!("index {bad} out of range for {count} vertices"));
        }
        if self.positions.iter().chain(&self.normals).any(|v| !v.is_finite()) {
            return Err("non-finite vertex data".to_string());
        }
        Ok(())
    }

    /// Wavefront OBJ text (1-based indices, with normals).
    pub fn to_obj(&self, name: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "o {name}");
        for p in self.positions.chunks_exact(3) {
            let _ = writeln!(out, "v {} {} {}", p[0], p[1], p[2]);
        }
        for n in self.normals.chunks_exact(3) {
            let _ = writeln!(out, "vn {} {} {}", n[0], n[1], n[2]);
        }
        for t in self.indices.chunks_exact(3) {
            let (a, b, c) = (t[0] + 1, t[1] + 1, t[2] + 1);
            let _ = writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}");
        }
        out
    }
}
