//! Placement of the 32 teeth along the upper and lower arches.

use std::f64::consts::PI;

use arch_kernel::{Euler, Point3d, Transform, Vec3};
use chart_types::{Arch, ToothNumber};
use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;

/// Distance from the origin to the incisors along +z.
pub const ARCH_DEPTH: f64 = 30.0;
/// Forward tilt of every tooth (radians).
pub const TILT: f64 = 0.08;
/// Outward roll magnitude (radians), signed by side.
pub const ROLL: f64 = 0.05;
/// Fraction of a half turn the arch sweeps from the midline to the molars.
const ARCH_SWEEP: f64 = 0.6;
/// Lateral offset of the central incisors, as a fraction of the arch radius.
const MIDLINE_GAP: f64 = 0.1;

/// World placement of one tooth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchPosition {
    pub position: Point3d,
    pub rotation: Euler,
}

impl ArchPosition {
    /// Map a point in the tooth's local frame (after scaling) to world space.
    pub fn world_point(&self, local: Vec3) -> Point3d {
        self.position + self.rotation.rotate(&local)
    }

    pub fn transform(&self, scale: Vec3) -> Transform {
        Transform::from_trs(self.position, self.rotation, scale)
    }
}

/// Local-frame directions of a tooth's named faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceAxes {
    /// Sign of local z that points out of the mouth.
    pub facial: f64,
    /// Sign of local x that points toward the midline.
    pub mesial: f64,
}

impl SurfaceAxes {
    pub fn for_tooth(tooth: ToothNumber) -> Self {
        // A pitch of PI turns local +z inward on the upper arch.
        let facial = match tooth.arch() {
            Arch::Upper => -1.0,
            Arch::Lower => 1.0,
        };
        Self {
            facial,
            mesial: -tooth.side(),
        }
    }
}

fn place(tooth: ToothNumber, radius: f64, depth: f64, arch_y: f64, tilt: f64, roll: f64) -> ArchPosition {
    let t = tooth.arch_param();
    let side = tooth.side();
    let x = side * (MIDLINE_GAP + (1.0 - MIDLINE_GAP) * t) * radius;
    let z = (t * PI * ARCH_SWEEP).cos() * depth;
    let pitch = match tooth.arch() {
        Arch::Upper => PI - tilt,
        Arch::Lower => tilt,
    };
    ArchPosition {
        position: Point3d::new(x, arch_y, z),
        rotation: Euler::new(pitch, x.atan2(z), side * roll),
    }
}

/// Position and orientation of `tooth` on an arch of half-width `arch_radius`
/// whose neck plane sits at `arch_y`.
pub fn arch_position(tooth: ToothNumber, arch_radius: f64, arch_y: f64) -> ArchPosition {
    place(tooth, arch_radius, ARCH_DEPTH, arch_y, TILT, ROLL)
}

/// Layout parameters bound from a [`SceneConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchLayout {
    pub arch_radius: f64,
    pub arch_depth: f64,
    pub upper_y: f64,
    pub lower_y: f64,
    pub tilt: f64,
    pub roll: f64,
}

impl Default for ArchLayout {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}

impl ArchLayout {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            arch_radius: config.arch_radius,
            arch_depth: config.arch_depth,
            upper_y: config.upper_arch_y,
            lower_y: config.lower_arch_y,
            tilt: config.tilt,
            roll: config.roll,
        }
    }

    pub fn arch_y(&self, arch: Arch) -> f64 {
        match arch {
            Arch::Upper => self.upper_y,
            Arch::Lower => self.lower_y,
        }
    }

    pub fn position(&self, tooth: ToothNumber) -> ArchPosition {
        place(
            tooth,
            self.arch_radius,
            self.arch_depth,
            self.arch_y(tooth.arch()),
            self.tilt,
            self.roll,
        )
    }

    /// All 32 placements in tooth-number order.
    pub fn positions(&self) -> Vec<(ToothNumber, ArchPosition)> {
        ToothNumber::all().map(|t| (t, self.position(t))).collect()
    }

    /// The 16 placements of one arch, in tooth-number order.
    pub fn arch_positions(&self, arch: Arch) -> Vec<ArchPosition> {
        ToothNumber::all()
            .filter(|t| t.arch() == arch)
            .map(|t| self.position(t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tooth(n: u8) -> ToothNumber {
        ToothNumber::new(n).unwrap()
    }

    #[test]
    fn test_central_incisor_position() {
        let p = arch_position(tooth(1), 26.0, 9.0);
        assert_relative_eq!(p.position.x, 2.6, epsilon = 1e-12);
        assert_relative_eq!(p.position.z, 30.0, epsilon = 1e-12);
        assert_eq!(p.position.y, 9.0);
        assert_relative_eq!(p.rotation.pitch, PI - TILT);
    }

    #[test]
    fn test_last_molar_position() {
        let p = arch_position(tooth(16), 26.0, 9.0);
        assert_relative_eq!(p.position.x, -26.0, epsilon = 1e-12);
        assert_relative_eq!(p.position.z, (0.6 * PI).cos() * 30.0, epsilon = 1e-12);
    }

    #[test]
    fn test_yaw_faces_outward() {
        for t in ToothNumber::all() {
            let p = arch_position(t, 26.0, 0.0);
            let facing = Vec3::new(p.rotation.yaw.sin(), 0.0, p.rotation.yaw.cos());
            let outward = Vec3::new(p.position.x, 0.0, p.position.z).normalize_or(Vec3::Z);
            assert!(facing.dot(&outward) > 0.999);
        }
    }

    #[test]
    fn test_facial_axis_points_out_of_the_mouth() {
        for t in ToothNumber::all() {
            let p = arch_position(t, 26.0, 0.0);
            let axes = SurfaceAxes::for_tooth(t);
            let facial = p.rotation.rotate(&Vec3::new(0.0, 0.0, axes.facial));
            let outward = Vec3::new(p.position.x, 0.0, p.position.z).normalize_or(Vec3::Z);
            assert!(facial.dot(&outward) > 0.9, "tooth {t}");
        }
    }

    #[test]
    fn test_mesial_axis_points_toward_midline_on_incisors() {
        for n in [1, 9, 24, 25] {
            let t = tooth(n);
            let p = arch_position(t, 26.0, 0.0);
            let mesial = p.rotation.rotate(&Vec3::new(SurfaceAxes::for_tooth(t).mesial, 0.0, 0.0));
            assert!(mesial.x * p.position.x < 0.0, "tooth {n}");
        }
    }

    #[test]
    fn test_crowns_point_toward_occlusal_plane() {
        let layout = ArchLayout::default();
        for (t, p) in layout.positions() {
            let up = p.rotation.rotate(&Vec3::Y);
            match t.arch() {
                Arch::Upper => assert!(up.y < -0.9),
                Arch::Lower => assert!(up.y > 0.9),
            }
        }
    }

    #[test]
    fn test_layout_matches_free_function() {
        let layout = ArchLayout::default();
        for t in ToothNumber::all() {
            let y = layout.arch_y(t.arch());
            assert_eq!(layout.position(t), arch_position(t, 26.0, y));
        }
    }

    #[test]
    fn test_arch_positions_split() {
        let layout = ArchLayout::default();
        let upper = layout.arch_positions(Arch::Upper);
        let lower = layout.arch_positions(Arch::Lower);
        assert_eq!(upper.len(), 16);
        assert_eq!(lower.len(), 16);
        assert!(upper.iter().all(|p| p.position.y == 9.0));
        assert!(lower.iter().all(|p| p.position.y == -9.0));
    }
}
