//! Preparation noise for the shared entangled pair.
//!
//! The depolarizing model: with probability `err` the source emits the fully
//! mixed two-qubit state instead of `|Φ+⟩`, i.e. the players share the Werner
//! state `(1 − err)|Φ+⟩⟨Φ+| + err · I/4`. Measuring the mixed part yields a
//! uniformly random answer pair, whatever the bases.

use rand::Rng;

use crate::error::{ChshError, Result};

/// Probability `err ∈ [0, 1]` that a round's pair is fully depolarized.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct NoiseRate(f64);

impl NoiseRate {
    pub fn new(err: f64) -> Result<Self> {
        if !err.is_finite() {
            return Err(ChshError::invalid("err", err, "noise rate must be finite"));
        }
        if !(0.0..=1.0).contains(&err) {
            return Err(ChshError::invalid("err", err, "noise rate must lie in [0, 1]"));
        }
        Ok(Self(err))
    }

    /// A noiseless source.
    pub fn ideal() -> Self {
        Self(0.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Decide whether this round's pair is depolarized.
    pub fn depolarizes<R: Rng + ?Sized>(self, rng: &mut R) -> bool {
        // gen_bool panics outside [0, 1]; the constructor guarantees the range.
        self.0 > 0.0 && rng.gen_bool(self.0)
    }

    /// Mix an ideal probability with the fully random outcome `uniform`.
    pub fn mix(self, ideal: f64, uniform: f64) -> f64 {
        (1.0 - self.0) * ideal + self.0 * uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rejects_out_of_range() {
        for &err in &[-0.01, 1.0001, f64::NAN, f64::INFINITY] {
            assert!(NoiseRate::new(err).is_err(), "err = {} should be rejected", err);
        }
        assert!(NoiseRate::new(0.0).is_ok());
        assert!(NoiseRate::new(1.0).is_ok());
    }

    #[test]
    fn test_error_names_the_parameter() {
        let msg = NoiseRate::new(2.0).unwrap_err().to_string();
        assert!(msg.contains("err"), "unexpected message: {}", msg);
    }

    #[test]
    fn test_depolarization_frequency() {
        let mut rng = StdRng::seed_from_u64(3);
        let noise = NoiseRate::new(0.3).unwrap();
        let n = 100_000;
        let hits = (0..n).filter(|_| noise.depolarizes(&mut rng)).count();
        let frac = hits as f64 / n as f64;
        assert!((frac - 0.3).abs() < 0.01, "depolarized fraction {}", frac);

        assert!(!(0..1000).any(|_| NoiseRate::ideal().depolarizes(&mut rng)));
        let full = NoiseRate::new(1.0).unwrap();
        assert!((0..1000).all(|_| full.depolarizes(&mut rng)));
    }

    #[test]
    fn test_mix_interpolates() {
        let noise = NoiseRate::new(0.25).unwrap();
        assert!((noise.mix(1.0, 0.5) - 0.875).abs() < 1e-12);
    }
}
