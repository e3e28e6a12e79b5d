//! Animation tuning.

use serde::{Deserialize, Serialize};

use flippyflop_shared::constants::{
    ANIMATION_DURATION, HOVER_ANIMATION_DURATION, POWERUP_ANIMATION_DURATION, POWERUP_COOLDOWN,
};

use crate::error::{RenderError, RenderResult};

/// Durations and heights for every tile animation.
///
/// Durations are seconds; heights are render units along +Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Duration of each of the jump, flip and fall phases.
    pub animation_duration: f32,
    /// Duration of the powerup stamp.
    pub powerup_animation_duration: f32,
    /// Time to rise fully into hover.
    pub hover_animation_duration: f32,
    /// Minimum seconds after a flip before a powerup stamp may play.
    pub powerup_cooldown: f64,

    /// Peak height reached by the jump and held through the flip.
    pub jump_height: f32,
    /// Dip below rest at the start of the jump.
    pub jump_crouch: f32,
    /// How far below rest the landing overshoots.
    pub fall_overshoot: f32,

    /// Depth of the powerup press.
    pub powerup_press_depth: f32,
    /// Height of the powerup rebound.
    pub powerup_bounce_height: f32,

    /// Hover lift for plain tiles.
    pub hover_height: f32,
    /// Hover lift for powerup tiles.
    pub powerup_hover_height: f32,
    /// Idle bob amplitude for plain tiles.
    pub bob_amplitude: f32,
    /// Idle bob amplitude for powerup tiles.
    pub powerup_bob_amplitude: f32,
    /// Bob angular speed in radians per second.
    pub bob_speed: f32,
    /// Resting lift of powerup tiles.
    pub powerup_float_offset: f32,
    /// Fraction of the distance to the idle target left after one second.
    pub idle_damping: f32,
}

impl AnimationConfig {
    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] for non-positive durations or a
    /// damping factor outside `(0, 1)`.
    pub fn validate(&self) -> RenderResult<()> {
        let durations = [
            ("animation_duration", self.animation_duration),
            ("powerup_animation_duration", self.powerup_animation_duration),
            ("hover_animation_duration", self.hover_animation_duration),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(RenderError::InvalidConfig(format!("{name} must be positive, got {value}")));
            }
        }
        if self.powerup_cooldown.is_nan() || self.powerup_cooldown < 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "powerup_cooldown must be non-negative, got {}",
                self.powerup_cooldown
            )));
        }
        if !(self.idle_damping > 0.0 && self.idle_damping < 1.0) {
            return Err(RenderError::InvalidConfig(format!(
                "idle_damping must be in (0, 1), got {}",
                self.idle_damping
            )));
        }
        Ok(())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            animation_duration: ANIMATION_DURATION,
            powerup_animation_duration: POWERUP_ANIMATION_DURATION,
            hover_animation_duration: HOVER_ANIMATION_DURATION,
            powerup_cooldown: POWERUP_COOLDOWN,
            jump_height: 0.6,
            jump_crouch: 0.08,
            fall_overshoot: 0.06,
            powerup_press_depth: 0.12,
            powerup_bounce_height: 0.18,
            hover_height: 0.15,
            powerup_hover_height: 0.3,
            bob_amplitude: 0.0,
            powerup_bob_amplitude: 0.05,
            bob_speed: 2.0,
            powerup_float_offset: 0.1,
            idle_damping: 0.001,
        }
    }
}
