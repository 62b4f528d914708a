//! Per-tooth hover/selection animation.

use arch_kernel::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interaction {
    Idle,
    Hovered,
    Selected,
}

/// Frame-rate independent smoothing factor: equals `k` when `dt` is one
/// reference frame, and compounds for longer or shorter steps.
pub fn smoothing_factor(k: f64, dt: f64, reference_fps: f64) -> f64 {
    1.0 - (1.0 - k).powf(dt.max(0.0) * reference_fps)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualState {
    pub current_scale: Vec3,
    pub hovered: bool,
    pub selected: bool,
    /// Seconds of marker pulse accumulated since the chart was loaded.
    pub pulse_phase: f64,
    squash: Vec3,
}

impl VisualState {
    /// Idle state resting at the tooth's static squash.
    pub fn new(squash: Vec3) -> Self {
        Self {
            current_scale: squash,
            hovered: false,
            selected: false,
            pulse_phase: 0.0,
            squash,
        }
    }

    pub fn squash(&self) -> Vec3 {
        self.squash
    }

    /// Selected overrules hovered.
    pub fn interaction(&self) -> Interaction {
        if self.selected {
            Interaction::Selected
        } else if self.hovered {
            Interaction::Hovered
        } else {
            Interaction::Idle
        }
    }

    pub fn target_scale(&self, anim: &AnimationConfig) -> Vec3 {
        let factor = match self.interaction() {
            Interaction::Idle => 1.0,
            Interaction::Hovered => anim.hover_scale,
            Interaction::Selected => anim.selected_scale,
        };
        self.squash * factor
    }

    pub fn advance(&mut self, dt: f64, anim: &AnimationConfig) {
        let k = smoothing_factor(anim.smoothing, dt, anim.reference_fps);
        let target = self.target_scale(anim);
        self.current_scale += (target - self.current_scale) * k;
        self.pulse_phase += dt.max(0.0);
    }

    /// Advance exactly one reference frame.
    pub fn step(&mut self, anim: &AnimationConfig) {
        self.advance(1.0 / anim.reference_fps, anim);
    }

    /// Multiplier for pulsing markers.
    pub fn pulse(&self, anim: &AnimationConfig) -> f64 {
        1.0 + (self.pulse_phase * anim.pulse_frequency).sin() * anim.pulse_amplitude
    }

    /// Current animated growth relative to the static squash.
    pub fn scale_factor(&self) -> f64 {
        if self.squash.y == 0.0 {
            1.0
        } else {
            self.current_scale.y / self.squash.y
        }
    }

    pub fn is_settled(&self, anim: &AnimationConfig, epsilon: f64) -> bool {
        self.current_scale.max_abs_diff(&self.target_scale(anim)) <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_selected_overrules_hovered() {
        let mut state = VisualState::new(Vec3::ONE);
        state.hovered = true;
        assert_eq!(state.interaction(), Interaction::Hovered);
        state.selected = true;
        assert_eq!(state.interaction(), Interaction::Selected);
        assert_relative_eq!(state.target_scale(&AnimationConfig::default()).y, 1.15);
    }

    #[test]
    fn test_fifty_frames_converge_within_one_percent() {
        let anim = AnimationConfig::default();
        let squash = Vec3::new(1.0, 1.0, 0.55);
        let mut state = VisualState::new(squash);
        state.selected = true;
        for _ in 0..50 {
            state.step(&anim);
        }
        let target = squash * 1.15;
        for (c, t) in state.current_scale.to_array().iter().zip(target.to_array()) {
            assert!(((c - t) / t).abs() < 0.01, "{c} vs {t}");
        }
    }

    #[test]
    fn test_one_reference_frame_applies_k() {
        let anim = AnimationConfig::default();
        let mut state = VisualState::new(Vec3::ONE);
        state.selected = true;
        state.step(&anim);
        assert_relative_eq!(state.current_scale.x, 1.0 + 0.15 * 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_frame_rate_independence() {
        let anim = AnimationConfig::default();
        let mut fast = VisualState::new(Vec3::ONE);
        let mut slow = VisualState::new(Vec3::ONE);
        fast.hovered = true;
        slow.hovered = true;
        for _ in 0..120 {
            fast.advance(1.0 / 120.0, &anim);
        }
        for _ in 0..30 {
            slow.advance(1.0 / 30.0, &anim);
        }
        assert_relative_eq!(fast.current_scale.x, slow.current_scale.x, epsilon = 1e-9);
    }

    #[test]
    fn test_release_returns_to_idle() {
        let anim = AnimationConfig::default();
        let mut state = VisualState::new(Vec3::ONE);
        state.hovered = true;
        state.advance(2.0, &anim);
        state.hovered = false;
        state.advance(5.0, &anim);
        assert!(state.is_settled(&anim, 1e-6));
    }

    #[test]
    fn test_pulse_range() {
        let anim = AnimationConfig::default();
        let mut state = VisualState::new(Vec3::ONE);
        assert_relative_eq!(state.pulse(&anim), 1.0);
        for _ in 0..200 {
            state.advance(0.013, &anim);
            let p = state.pulse(&anim);
            assert!((0.92 - 1e-12..=1.08 + 1e-12).contains(&p));
        }
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let anim = AnimationConfig::default();
        let mut state = VisualState::new(Vec3::ONE);
        state.selected = true;
        state.advance(-1.0, &anim);
        assert_eq!(state.current_scale, Vec3::ONE);
        assert_eq!(state.pulse_phase, 0.0);
    }
}
