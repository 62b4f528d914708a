//! Per-archetype tooth dimensions and their revolution profiles.

use arch_kernel::{Point2d, Point3d, Vec3};
use chart_types::ToothArchetype;

/// A raised point on the chewing surface, in the tooth's unsquashed local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cusp {
    pub offset: Point3d,
    /// Multiplier on the archetype's `cusp_size`.
    pub size: f64,
}

impl Cusp {
    const fn new(x: f64, y: f64, z: f64, size: f64) -> Self {
        Self {
            offset: Point3d::new(x, y, z),
            size,
        }
    }
}

/// Dimensions of one anatomical archetype. Local +y runs from the neck to
/// the crown top; roots extend toward -y.
#[derive(Debug, Clone, PartialEq)]
pub struct ToothSpec {
    pub crown_height: f64,
    pub root_height: f64,
    pub crown_radius: f64,
    pub neck_radius: f64,
    pub root_radius: f64,
    pub top_radius: f64,
    /// Static anisotropic scale applied to the whole tooth.
    pub squash: Vec3,
    pub cusps: &'static [Cusp],
    pub cusp_size: f64,
}

impl ToothSpec {
    /// Radius of cusp `cusp` as rendered.
    pub fn cusp_radius(&self, cusp: &Cusp) -> f64 {
        self.cusp_size * cusp.size
    }
}

const INCISOR: ToothSpec = ToothSpec {
    crown_height: 8.0,
    root_height: 12.0,
    crown_radius: 2.2,
    neck_radius: 1.6,
    root_radius: 1.2,
    top_radius: 1.8,
    squash: Vec3::new(1.0, 1.0, 0.55),
    cusps: &[],
    cusp_size: 0.0,
};

const CANINE: ToothSpec = ToothSpec {
    crown_height: 9.0,
    root_height: 16.0,
    crown_radius: 2.4,
    neck_radius: 1.8,
    root_radius: 1.4,
    top_radius: 0.9,
    squash: Vec3::new(1.0, 1.0, 0.8),
    cusps: &[Cusp::new(0.0, 8.8, 0.0, 1.0)],
    cusp_size: 0.9,
};

const PREMOLAR: ToothSpec = ToothSpec {
    crown_height: 7.5,
    root_height: 13.0,
    crown_radius: 2.6,
    neck_radius: 2.0,
    root_radius: 1.5,
    top_radius: 2.2,
    squash: Vec3::new(1.0, 1.0, 0.85),
    cusps: &[
        Cusp::new(0.0, 7.3, 1.1, 1.0),
        Cusp::new(0.0, 7.3, -1.1, 0.85),
    ],
    cusp_size: 0.8,
};

const MOLAR: ToothSpec = ToothSpec {
    crown_height: 7.0,
    root_height: 12.0,
    crown_radius: 3.6,
    neck_radius: 2.9,
    root_radius: 2.2,
    top_radius: 3.2,
    squash: Vec3::new(1.1, 1.0, 1.0),
    cusps: &[
        Cusp::new(1.4, 6.8, 1.4, 1.0),
        Cusp::new(-1.4, 6.8, 1.4, 1.0),
        Cusp::new(1.4, 6.8, -1.4, 0.9),
        Cusp::new(-1.4, 6.8, -1.4, 0.9),
    ],
    cusp_size: 0.9,
};

pub fn tooth_spec(archetype: ToothArchetype) -> &'static ToothSpec {
    match archetype {
        ToothArchetype::Incisor => &INCISOR,
        ToothArchetype::Canine => &CANINE,
        ToothArchetype::Premolar => &PREMOLAR,
        ToothArchetype::Molar => &MOLAR,
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// The eight-point lathe profile: root tip, two root-taper points, two
/// neck-transition points, two crown-widen points and the crown top.
///
/// `x` is the radius and `y` the height; `y` is non-decreasing.
pub fn build_profile(spec: &ToothSpec) -> [Point2d; 8] {
    let (ch, rh) = (spec.crown_height, spec.root_height);
    [
        Point2d::new(spec.root_radius * 0.25, -rh),
        Point2d::new(spec.root_radius * 0.7, -rh * 0.7),
        Point2d::new(spec.root_radius, -rh * 0.3),
        Point2d::new(spec.neck_radius, 0.0),
        Point2d::new(lerp(spec.neck_radius, spec.crown_radius, 0.5), ch * 0.15),
        Point2d::new(spec.crown_radius, ch * 0.45),
        Point2d::new(lerp(spec.crown_radius, spec.top_radius, 0.4), ch * 0.8),
        Point2d::new(spec.top_radius, ch),
    ]
}
