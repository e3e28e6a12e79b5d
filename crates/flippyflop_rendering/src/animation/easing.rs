//! Easing curves for tile motion.

use std::f32::consts::FRAC_PI_2;

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Fast start, soft landing: `1 - (1 - t)^3`.
    #[default]
    CubicOut,
    /// Gentler ease-out: `1 - (1 - t)^2`.
    QuadOut,
    /// Accelerating: `t^2`.
    QuadIn,
    /// Quarter sine: `sin(t * pi/2)`.
    SineOut,
}

impl Easing {
    /// Applies the easing function to a t value (0-1).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::CubicOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::QuadOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv
            }
            Self::QuadIn => t * t,
            Self::SineOut => (t * FRAC_PI_2).sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [Easing::Linear, Easing::CubicOut, Easing::QuadOut, Easing::QuadIn, Easing::SineOut] {
            assert!(easing.apply(0.0).abs() < 1e-6, "{easing:?}");
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-6, "{easing:?}");
        }
    }

    #[test]
    fn test_out_curves_lead_linear() {
        assert!(Easing::CubicOut.apply(0.3) > 0.3);
        assert!(Easing::QuadOut.apply(0.3) > 0.3);
        assert!(Easing::QuadIn.apply(0.3) < 0.3);
    }

    #[test]
    fn test_clamps_input() {
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
    }
}
