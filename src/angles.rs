//! Measurement-basis angles for the quantum strategy.
//!
//! Angles are real-plane basis angles: measuring at `θ` projects onto
//! `cos θ |0⟩ + sin θ |1⟩`. Rotating a basis by `π` only flips the sign of its
//! vectors, so every quantity derived from the angles is `π`-periodic in each
//! component.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_8, PI};

use crate::error::{ChshError, Result};

/// Search bounds for each angle component.
pub const ANGLE_BOUNDS: (f64, f64) = (-FRAC_PI_2, FRAC_PI_2);

/// The three angle offsets `(diff_a, diff_0, diff_b)` in radians.
///
/// - Alice measures at `0` for `x = 0` and at `diff_a` for `x = 1`.
/// - Bob measures at `diff_0` for `y = 0` and at `diff_0 + diff_b` for `y = 1`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AngleParameters {
    pub diff_a: f64,
    pub diff_0: f64,
    pub diff_b: f64,
}

impl AngleParameters {
    pub fn new(diff_a: f64, diff_0: f64, diff_b: f64) -> Result<Self> {
        for (name, value) in [("diff_a", diff_a), ("diff_0", diff_0), ("diff_b", diff_b)] {
            if !value.is_finite() {
                return Err(ChshError::invalid(name, value, "angle must be finite"));
            }
        }
        Ok(Self {
            diff_a,
            diff_0,
            diff_b,
        })
    }

    /// The textbook optimum `(π/4, π/8, −π/4)`, reaching `cos²(π/8)`.
    pub fn optimal() -> Self {
        Self {
            diff_a: FRAC_PI_4,
            diff_0: FRAC_PI_8,
            diff_b: -FRAC_PI_4,
        }
    }

    /// All four bases aligned with the computational basis.
    pub fn aligned() -> Self {
        Self {
            diff_a: 0.0,
            diff_0: 0.0,
            diff_b: 0.0,
        }
    }

    pub fn from_array(values: [f64; 3]) -> Result<Self> {
        Self::new(values[0], values[1], values[2])
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.diff_a, self.diff_0, self.diff_b]
    }

    /// Alice's basis angle for question bit `x`.
    pub fn alice_angle(&self, x: bool) -> f64 {
        if x {
            self.diff_a
        } else {
            0.0
        }
    }

    /// Bob's basis angle for question bit `y`.
    pub fn bob_angle(&self, y: bool) -> f64 {
        if y {
            self.diff_0 + self.diff_b
        } else {
            self.diff_0
        }
    }

    /// Fold every component into `[-π/2, π/2)`.
    pub fn normalized(&self) -> Self {
        Self {
            diff_a: wrap_half_turn(self.diff_a),
            diff_0: wrap_half_turn(self.diff_0),
            diff_b: wrap_half_turn(self.diff_b),
        }
    }

    /// `(diff_a, diff_0, diff_b)` in degrees.
    pub fn to_degrees(&self) -> [f64; 3] {
        self.as_array().map(f64::to_degrees)
    }
}

fn wrap_half_turn(theta: f64) -> f64 {
    theta - PI * ((theta + FRAC_PI_2) / PI).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_bases() {
        let angles = AngleParameters::optimal();
        assert_eq!(angles.alice_angle(false), 0.0);
        assert!((angles.alice_angle(true) - FRAC_PI_4).abs() < 1e-12);
        assert!((angles.bob_angle(false) - FRAC_PI_8).abs() < 1e-12);
        assert!((angles.bob_angle(true) + FRAC_PI_8).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_angles_rejected() {
        assert!(AngleParameters::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(AngleParameters::new(0.0, f64::INFINITY, 0.0).is_err());
        assert!(AngleParameters::from_array([0.0, 0.0, f64::NEG_INFINITY]).is_err());
    }

    #[test]
    fn test_normalization_is_periodic() {
        let angles = AngleParameters::new(FRAC_PI_4 + PI, FRAC_PI_8 - 3.0 * PI, -FRAC_PI_4 + 2.0 * PI)
            .unwrap()
            .normalized();
        let expected = AngleParameters::optimal();
        for (got, want) in angles.as_array().iter().zip(expected.as_array()) {
            assert!((got - want).abs() < 1e-9, "normalized {} expected {}", got, want);
        }
    }

    #[test]
    fn test_normalized_range_is_half_open() {
        for &theta in &[-10.0, -FRAC_PI_2, 0.3, FRAC_PI_2, 7.5] {
            let w = wrap_half_turn(theta);
            assert!(w >= -FRAC_PI_2 && w < FRAC_PI_2, "{} wrapped to {}", theta, w);
        }
        assert!((wrap_half_turn(FRAC_PI_2) + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_degrees() {
        let deg = AngleParameters::optimal().to_degrees();
        assert!((deg[0] - 45.0).abs() < 1e-9);
        assert!((deg[1] - 22.5).abs() < 1e-9);
        assert!((deg[2] + 45.0).abs() < 1e-9);
    }
}
