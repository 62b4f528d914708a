//! Maps clinical state to materials, marker styles and marker anchor points.

use arch_kernel::Vec3;
use chart_types::{ClinicalState, Condition, Severity, ToothNumber, ToothSurface};
use serde::{Deserialize, Serialize};

use crate::layout::SurfaceAxes;
use crate::profile::{tooth_spec, ToothSpec};

/// Linear RGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as f32 / 255.0,
            g: ((hex >> 8) & 0xFF) as f32 / 255.0,
            b: (hex & 0xFF) as f32 / 255.0,
        }
    }

    pub fn lerp(&self, other: &Rgb, t: f32) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    /// `#rrggbb`
    pub fn to_css(&self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

/// Fraction of the blend from the condition color toward white for enamel.
pub const ENAMEL_WHITENING: f32 = 0.25;
pub const MISSING_OPACITY: f32 = 0.35;

pub fn base_color(condition: Condition) -> Rgb {
    match condition {
        Condition::Healthy => Rgb::from_hex(0xE8E4D8),
        Condition::Monitor => Rgb::from_hex(0xF4D35E),
        Condition::Cavity => Rgb::from_hex(0xD64545),
        Condition::Filled => Rgb::from_hex(0x9AA5B1),
        Condition::Missing => Rgb::from_hex(0xCCCCCC),
        Condition::Implant => Rgb::from_hex(0x8FA3B8),
        Condition::RootCanal => Rgb::from_hex(0xB565D9),
        Condition::PostOp => Rgb::from_hex(0x4FB0C6),
        Condition::Urgent => Rgb::from_hex(0xFF3B30),
    }
}

pub fn enamel_color(condition: Condition) -> Rgb {
    base_color(condition).lerp(&Rgb::WHITE, ENAMEL_WHITENING)
}

pub fn severity_multiplier(severity: Severity) -> f64 {
    match severity {
        Severity::None => 1.0,
        Severity::Mild => 1.05,
        Severity::Moderate => 1.15,
        Severity::Severe => 1.3,
        Severity::Urgent => 1.45,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerShape {
    Sphere,
    /// Hemisphere resting on the surface.
    Cap,
    /// Torus around the crown axis.
    Ring,
}

impl MarkerShape {
    pub const ALL: [MarkerShape; 3] = [MarkerShape::Sphere, MarkerShape::Cap, MarkerShape::Ring];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerStyle {
    pub color: Rgb,
    pub emissive: Rgb,
    pub shape: MarkerShape,
    pub base_size: f64,
    /// Shift along the tooth's local +y; negative values recess the marker.
    pub depth_offset: f64,
    pub pulses: bool,
}

fn style(
    color: u32,
    emissive: u32,
    shape: MarkerShape,
    base_size: f64,
    depth_offset: f64,
    pulses: bool,
) -> MarkerStyle {
    MarkerStyle {
        color: Rgb::from_hex(color),
        emissive: Rgb::from_hex(emissive),
        shape,
        base_size,
        depth_offset,
        pulses,
    }
}

/// Marker for a condition; healthy and missing teeth carry none.
pub fn marker_style(condition: Condition) -> Option<MarkerStyle> {
    use MarkerShape::{Cap, Ring, Sphere};
    let marker = match condition {
        Condition::Healthy | Condition::Missing => return None,
        Condition::Monitor => style(0xF4D35E, 0x6B5A12, Sphere, 0.9, 0.0, false),
        Condition::Cavity => style(0xD64545, 0x5C1010, Sphere, 1.0, -0.3, false),
        Condition::Filled => style(0x9AA5B1, 0x2A3038, Cap, 1.1, 0.1, false),
        Condition::RootCanal => style(0xB565D9, 0x4A1F5E, Ring, 1.2, 0.0, false),
        Condition::PostOp => style(0x4FB0C6, 0x134A57, Ring, 1.0, 0.05, true),
        Condition::Urgent => style(0xFF3B30, 0x7A0F0A, Sphere, 1.3, 0.2, true),
        Condition::Implant => style(0x8FA3B8, 0x2C3A48, Cap, 1.2, 0.0, false),
    };
    Some(marker)
}

/// Surface material parameters handed to the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialAttributes {
    pub color: Rgb,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub metalness: f32,
    pub roughness: f32,
}

impl MaterialAttributes {
    pub fn enamel(condition: Condition) -> Self {
        let mut material = Self {
            color: enamel_color(condition),
            emissive: Rgb::BLACK,
            emissive_intensity: 0.0,
            opacity: 1.0,
            transparent: false,
            metalness: 0.1,
            roughness: 0.4,
        };
        match condition {
            Condition::Missing => {
                material.opacity = MISSING_OPACITY;
                material.transparent = true;
            }
            Condition::Implant => {
                material.metalness = 0.8;
                material.roughness = 0.25;
            }
            _ => {}
        }
        material
    }

    pub fn marker(style: &MarkerStyle) -> Self {
        Self {
            color: style.color,
            emissive: style.emissive,
            emissive_intensity: 1.0,
            opacity: 1.0,
            transparent: false,
            metalness: 0.2,
            roughness: 0.5,
        }
    }

    pub fn gum() -> Self {
        Self {
            color: Rgb::from_hex(0xE58A8A),
            emissive: Rgb::BLACK,
            emissive_intensity: 0.0,
            opacity: 1.0,
            transparent: false,
            metalness: 0.0,
            roughness: 0.7,
        }
    }
}

/// Everything the scene needs to draw one tooth's clinical state.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualAttributes {
    pub material: MaterialAttributes,
    pub marker_style: Option<MarkerStyle>,
    pub marker_scale: f64,
    /// Marker anchors in the tooth's local frame, one per affected surface.
    pub affected_offsets: Vec<(ToothSurface, Vec3)>,
    /// Treatment count shown next to the tooth, when non-zero.
    pub badge: Option<u32>,
}

/// Anchor of `surface` in the local frame of a tooth built from `spec`,
/// including its static squash.
pub fn surface_offset(surface: ToothSurface, spec: &ToothSpec, axes: SurfaceAxes) -> Vec3 {
    let sq = spec.squash;
    let top = spec.crown_height * sq.y;
    let mid = top * 0.5;
    let depth = spec.crown_radius * sq.z;
    let width = spec.crown_radius * sq.x;
    match surface {
        ToothSurface::Occlusal => Vec3::new(0.0, top, 0.0),
        ToothSurface::Buccal => Vec3::new(0.0, mid, axes.facial * depth),
        ToothSurface::Lingual => Vec3::new(0.0, mid, -axes.facial * depth),
        ToothSurface::Mesial => Vec3::new(axes.mesial * width, mid, 0.0),
        ToothSurface::Distal => Vec3::new(-axes.mesial * width, mid, 0.0),
    }
}

pub fn resolve(state: &ClinicalState, tooth: ToothNumber) -> VisualAttributes {
    let spec = tooth_spec(tooth.archetype());
    let axes = SurfaceAxes::for_tooth(tooth);
    let marker = marker_style(state.condition);

    let (marker_scale, affected_offsets) = match &marker {
        None => (0.0, Vec::new()),
        Some(style) => {
            let scale = style.base_size * severity_multiplier(state.severity);
            let lift = Vec3::new(0.0, style.depth_offset, 0.0);
            let surfaces: Vec<ToothSurface> = if state.affected_surfaces.is_empty() {
                vec![ToothSurface::Occlusal]
            } else {
                state.affected_surfaces.iter().copied().collect()
            };
            let offsets = surfaces
                .into_iter()
                .map(|s| (s, surface_offset(s, spec, axes) + lift))
                .collect();
            (scale, offsets)
        }
    };

    VisualAttributes {
        material: MaterialAttributes::enamel(state.condition),
        marker_style: marker,
        marker_scale,
        affected_offsets,
        badge: (state.treatment_count > 0).then_some(state.treatment_count),
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
    fn test_urgent_marker_scale() {
        let attrs = resolve(&ClinicalState::new(Condition::Urgent, Severity::Urgent), tooth(3));
        assert_relative_eq!(attrs.marker_scale, 1.3 * 1.45);
        assert!(attrs.marker_style.unwrap().pulses);
    }

    #[test]
    fn test_unknown_condition_resolves_healthy() {
        let state = ClinicalState::new(Condition::parse_lenient("bogus-value"), Severity::None);
        let attrs = resolve(&state, tooth(5));
        assert!(attrs.marker_style.is_none());
        assert!(attrs.affected_offsets.is_empty());
        assert_eq!(attrs.material, MaterialAttributes::enamel(Condition::Healthy));
    }

    #[test]
    fn test_enamel_blends_toward_white() {
        let c = enamel_color(Condition::Cavity);
        let base = base_color(Condition::Cavity);
        assert_relative_eq!(c.r, base.r + (1.0 - base.r) * 0.25);
        assert!(c.g > base.g);
    }

    #[test]
    fn test_missing_and_implant_materials() {
        let missing = MaterialAttributes::enamel(Condition::Missing);
        assert!(missing.transparent);
        assert_relative_eq!(missing.opacity, 0.35);
        let implant = MaterialAttributes::enamel(Condition::Implant);
        assert!(implant.metalness > missing.metalness);
        assert!(implant.roughness < missing.roughness);
    }

    #[test]
    fn test_severity_multiplier_is_increasing() {
        let order = [
            Severity::None,
            Severity::Mild,
            Severity::Moderate,
            Severity::Severe,
            Severity::Urgent,
        ];
        for pair in order.windows(2) {
            assert!(severity_multiplier(pair[1]) > severity_multiplier(pair[0]));
        }
    }

    #[test]
    fn test_marker_table_coverage() {
        for condition in Condition::ALL {
            let has_marker = marker_style(condition).is_some();
            let expected = !matches!(condition, Condition::Healthy | Condition::Missing);
            assert_eq!(has_marker, expected, "{condition:?}");
        }
    }

    #[test]
    fn test_empty_surfaces_default_to_occlusal() {
        let attrs = resolve(&ClinicalState::new(Condition::Cavity, Severity::Mild), tooth(8));
        assert_eq!(attrs.affected_offsets.len(), 1);
        let (surface, offset) = attrs.affected_offsets[0];
        assert_eq!(surface, ToothSurface::Occlusal);
        let spec = tooth_spec(tooth(8).archetype());
        assert_relative_eq!(offset.y, spec.crown_height * spec.squash.y - 0.3);
        assert_eq!(offset.x, 0.0);
    }

    #[test]
    fn test_mesial_sign_flips_with_side() {
        let state = ClinicalState::new(Condition::Filled, Severity::None)
            .with_surfaces([ToothSurface::Mesial]);
        let right = resolve(&state, tooth(3)).affected_offsets[0].1;
        let left = resolve(&state, tooth(14)).affected_offsets[0].1;
        assert!(right.x < 0.0);
        assert!(left.x > 0.0);
    }

    #[test]
    fn test_buccal_and_lingual_are_opposite() {
        let state = ClinicalState::new(Condition::Monitor, Severity::None)
            .with_surfaces([ToothSurface::Buccal, ToothSurface::Lingual]);
        let attrs = resolve(&state, tooth(20));
        let buccal = attrs.affected_offsets[0].1;
        let lingual = attrs.affected_offsets[1].1;
        assert_relative_eq!(buccal.z, -lingual.z);
        assert_relative_eq!(buccal.y, lingual.y);
    }

    #[test]
    fn test_badge_only_when_treated() {
        let plain = resolve(&ClinicalState::healthy(), tooth(1));
        assert_eq!(plain.badge, None);
        let treated = resolve(&ClinicalState::healthy().with_treatments(3), tooth(1));
        assert_eq!(treated.badge, Some(3));
    }

    #[test]
    fn test_css_hex() {
        assert_eq!(Rgb::from_hex(0xD64545).to_css(), "#d64545");
    }
}
