//! The three strategy families: deterministic classical, uniform random, and
//! measurements on a shared (possibly depolarized) entangled pair.
//!
//! The quantum model samples from the closed-form outcome distribution of
//! measuring `|Φ+⟩ = (|00⟩ + |11⟩)/√2` in real-plane bases at angles
//! `θ_a` and `θ_b`:
//!
//! ```text
//! P(a = b) = cos²(θ_a − θ_b),   P(a) = P(b) = 1/2
//! ```
//!
//! Only the statistics are observable, so no state vector is simulated.

use rand::Rng;

use crate::angles::AngleParameters;
use crate::error::Result;
use crate::game::{Answers, GameBatch, Questions};
use crate::noise::NoiseRate;
use crate::sampler;

/// A way for Alice and Bob to answer the referee's questions.
pub trait Strategy: Sync {
    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// Answer one round.
    fn answer<R: Rng + ?Sized>(&self, questions: Questions, rng: &mut R) -> Answers;

    /// Answer a whole chunk of rounds.
    fn answer_all<R: Rng + ?Sized>(&self, questions: &[Questions], rng: &mut R) -> Vec<Answers> {
        questions.iter().map(|&q| self.answer(q, rng)).collect()
    }

    /// Exact win probability with uniformly drawn questions.
    fn expected_win_rate(&self) -> f64;

    /// Play `n` rounds.
    fn play<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Result<GameBatch>
    where
        Self: Sized,
    {
        sampler::generate_batch(n, self, rng)
    }
}

/// Deterministic classical strategy: `a = alice[x]`, `b = bob[y]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Classical {
    pub alice: [bool; 2],
    pub bob: [bool; 2],
}

impl Classical {
    /// Both players always answer `bit`.
    pub fn constant(bit: bool) -> Self {
        Self {
            alice: [bit; 2],
            bob: [bit; 2],
        }
    }

    /// All 16 deterministic strategies.
    pub fn all() -> Vec<Classical> {
        (0u8..16)
            .map(|m| Classical {
                alice: [m & 1 != 0, m & 2 != 0],
                bob: [m & 4 != 0, m & 8 != 0],
            })
            .collect()
    }
}

impl Strategy for Classical {
    fn name(&self) -> &'static str {
        "classical"
    }

    fn answer<R: Rng + ?Sized>(&self, q: Questions, _rng: &mut R) -> Answers {
        Answers::new(self.alice[usize::from(q.x)], self.bob[usize::from(q.y)])
    }

    fn expected_win_rate(&self) -> f64 {
        let won = Questions::all()
            .iter()
            .filter(|q| {
                let a = self.alice[usize::from(q.x)];
                let b = self.bob[usize::from(q.y)];
                (a ^ b) == q.winning_parity()
            })
            .count();
        won as f64 / 4.0
    }
}

/// Both players answer with independent fair coin flips.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct RandomGuess;

impl Strategy for RandomGuess {
    fn name(&self) -> &'static str {
        "random"
    }

    fn answer<R: Rng + ?Sized>(&self, _q: Questions, rng: &mut R) -> Answers {
        Answers::new(rng.gen(), rng.gen())
    }

    fn expected_win_rate(&self) -> f64 {
        0.5
    }
}

/// Which player's qubit is measured first.
///
/// The first outcome is uniform and the second is drawn conditionally on it.
/// The joint distribution is the same either way.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MeasurementOrder {
    #[default]
    AliceFirst,
    BobFirst,
}

/// Measurements on a shared `|Φ+⟩` pair under depolarizing noise.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quantum {
    pub noise: NoiseRate,
    pub angles: AngleParameters,
    pub order: MeasurementOrder,
}

impl Quantum {
    pub fn new(noise: NoiseRate, angles: AngleParameters) -> Self {
        Self {
            noise,
            angles,
            order: MeasurementOrder::default(),
        }
    }

    pub fn with_order(mut self, order: MeasurementOrder) -> Self {
        self.order = order;
        self
    }

    /// Basis angles `(θ_a, θ_b)` used for these questions.
    pub fn bases(&self, q: Questions) -> (f64, f64) {
        (self.angles.alice_angle(q.x), self.angles.bob_angle(q.y))
    }

    /// Probability of equal answers for these questions, noise included.
    pub fn agreement_probability(&self, q: Questions) -> f64 {
        let (theta_a, theta_b) = self.bases(q);
        let ideal = (theta_a - theta_b).cos().powi(2);
        self.noise.mix(ideal, 0.5)
    }

    /// Exact outcome distribution, indexed `[a][b]`.
    pub fn joint_distribution(&self, q: Questions) -> [[f64; 2]; 2] {
        let same = self.agreement_probability(q) / 2.0;
        let differ = 0.5 - same;
        [[same, differ], [differ, same]]
    }

    /// Win probability for one question cell.
    pub fn cell_win_probability(&self, q: Questions) -> f64 {
        let same = self.agreement_probability(q);
        if q.winning_parity() {
            1.0 - same
        } else {
            same
        }
    }
}

impl Strategy for Quantum {
    fn name(&self) -> &'static str {
        "quantum"
    }

    fn answer<R: Rng + ?Sized>(&self, q: Questions, rng: &mut R) -> Answers {
        if self.noise.depolarizes(rng) {
            return Answers::new(rng.gen(), rng.gen());
        }
        let (theta_a, theta_b) = self.bases(q);
        let p_same = (theta_a - theta_b).cos().powi(2);
        let first: bool = rng.gen();
        let second = if rng.gen::<f64>() < p_same { first } else { !first };
        match self.order {
            MeasurementOrder::AliceFirst => Answers::new(first, second),
            MeasurementOrder::BobFirst => Answers::new(second, first),
        }
    }

    fn expected_win_rate(&self) -> f64 {
        Questions::all()
            .iter()
            .map(|&q| self.cell_win_probability(q))
            .sum::<f64>()
            / 4.0
    }
}

/// Play `n` rounds with both players always answering 0.
pub fn play_classical<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<GameBatch> {
    Classical::constant(false).play(n, rng)
}

/// Play `n` rounds with independent random answers.
pub fn play_random<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<GameBatch> {
    RandomGuess.play(n, rng)
}

/// Play `n` rounds of the quantum strategy at noise rate `err`.
pub fn play_quantum<R: Rng + ?Sized>(
    n: usize,
    err: f64,
    angles: AngleParameters,
    rng: &mut R,
) -> Result<GameBatch> {
    Quantum::new(NoiseRate::new(err)?, angles).play(n, rng)
}
