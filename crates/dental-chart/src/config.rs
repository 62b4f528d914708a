//! Scene configuration: arch dimensions, mesh detail, animation and gum settings.

use serde::{Deserialize, Serialize};

use crate::error::SceneError;
use crate::layout;

/// Tessellation density for generated meshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshDetail {
    /// Angular subdivisions of each tooth body lathe.
    pub lathe_segments: usize,
    /// Longitude subdivisions of cusp and marker spheres.
    pub sphere_width_segments: usize,
    /// Latitude subdivisions of cusp and marker spheres.
    pub sphere_height_segments: usize,
    /// Subdivisions around the ring marker.
    pub ring_segments: usize,
}

impl Default for MeshDetail {
    fn default() -> Self {
        Self {
            lathe_segments: 36,
            sphere_width_segments: 16,
            sphere_height_segments: 12,
            ring_segments: 32,
        }
    }
}

impl MeshDetail {
    pub fn low() -> Self {
        Self {
            lathe_segments: 12,
            sphere_width_segments: 8,
            sphere_height_segments: 6,
            ring_segments: 12,
        }
    }

    pub fn high() -> Self {
        Self {
            lathe_segments: 72,
            sphere_width_segments: 32,
            sphere_height_segments: 24,
            ring_segments: 64,
        }
    }
}

/// Hover/selection easing and marker pulse parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Fraction of the remaining distance covered per reference frame.
    pub smoothing: f64,
    /// Frame rate at which `smoothing` applies exactly.
    pub reference_fps: f64,
    pub hover_scale: f64,
    pub selected_scale: f64,
    /// Angular frequency of the marker pulse (radians per second).
    pub pulse_frequency: f64,
    pub pulse_amplitude: f64,
    /// Emissive intensity added to a hovered tooth body.
    pub hover_glow: f32,
    /// Emissive intensity added to the selected tooth body.
    pub selected_glow: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            smoothing: 0.1,
            reference_fps: 60.0,
            hover_scale: 1.05,
            selected_scale: 1.15,
            pulse_frequency: 3.0,
            pulse_amplitude: 0.08,
            hover_glow: 0.15,
            selected_glow: 0.3,
        }
    }
}

/// Gum ridge geometry along each arch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GumConfig {
    /// Distance from the tooth neck plane toward the roots.
    pub vertical_offset: f64,
    /// Shift along world z applied to every sample.
    pub depth_offset: f64,
    pub radius: f64,
    pub inner_radius: f64,
    /// Inner ridge samples are scaled toward the arch center by this factor in x and z.
    pub inner_pull: f64,
    /// Samples taken along the spline for the sweep.
    pub tubular_segments: usize,
    pub radial_segments: usize,
}

impl Default for GumConfig {
    fn default() -> Self {
        Self {
            vertical_offset: 1.2,
            depth_offset: -0.5,
            radius: 1.6,
            inner_radius: 0.6,
            inner_pull: 0.88,
            tubular_segments: 64,
            radial_segments: 8,
        }
    }
}

/// Everything the scene needs besides the chart itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Half-width of the arch at the molars.
    pub arch_radius: f64,
    /// Depth of the arch from the incisors to the origin.
    pub arch_depth: f64,
    /// Neck plane of the upper arch.
    pub upper_arch_y: f64,
    /// Neck plane of the lower arch.
    pub lower_arch_y: f64,
    /// Forward tilt applied to every tooth (radians).
    pub tilt: f64,
    /// Outward roll magnitude, signed by side (radians).
    pub roll: f64,
    pub mesh: MeshDetail,
    pub animation: AnimationConfig,
    pub gum: GumConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            arch_radius: 26.0,
            arch_depth: layout::ARCH_DEPTH,
            upper_arch_y: 9.0,
            lower_arch_y: -9.0,
            tilt: layout::TILT,
            roll: layout::ROLL,
            mesh: MeshDetail::default(),
            animation: AnimationConfig::default(),
            gum: GumConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Coarse meshes for previews and tests.
    pub fn low_detail() -> Self {
        Self {
            mesh: MeshDetail::low(),
            gum: GumConfig {
                tubular_segments: 24,
                radial_segments: 6,
                ..GumConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn high_detail() -> Self {
        Self {
            mesh: MeshDetail::high(),
            gum: GumConfig {
                tubular_segments: 128,
                radial_segments: 16,
                ..GumConfig::default()
            },
            ..Self::default()
        }
    }

    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let config: Self = serde_json::from_str(json).map_err(|e| SceneError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        let positive = [
            ("arch_radius", self.arch_radius),
            ("arch_depth", self.arch_depth),
            ("gum.radius", self.gum.radius),
            ("gum.inner_radius", self.gum.inner_radius),
            ("gum.inner_pull", self.gum.inner_pull),
            ("animation.reference_fps", self.animation.reference_fps),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SceneError::InvalidConfig {
                    reason: format!("{name} must be positive, got {value}"),
                });
            }
        }
        if !(0.0..=1.0).contains(&self.animation.smoothing) {
            return Err(SceneError::InvalidConfig {
                reason: format!(
                    "animation.smoothing must be in [0, 1], got {}",
                    self.animation.smoothing
                ),
            });
        }
        if self.upper_arch_y <= self.lower_arch_y {
            return Err(SceneError::InvalidConfig {
                reason: "upper_arch_y must be above lower_arch_y".to_string(),
            });
        }
        Ok(())
    }
}
