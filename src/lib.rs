//! # chsh-game-sim
//!
//! Monte Carlo simulation of the CHSH nonlocal game and a noisy global search
//! for the best quantum measurement angles.
//!
//! A referee sends uniformly random bits `x` to Alice and `y` to Bob; they
//! answer `a` and `b` without communicating and win iff `a ⊕ b = x · y`.
//!
//! ## Strategies
//!
//! - **Classical**: deterministic answers, at most 3/4 (the CHSH bound).
//! - **Random**: independent coin flips, 1/2.
//! - **Quantum**: projective measurements on a shared `|Φ+⟩` pair, up to
//!   `cos²(π/8) ≈ 0.8536` (the Tsirelson bound), degraded by depolarizing
//!   preparation noise toward 1/2.
//!
//! ## Usage
//!
//! ```no_run
//! use chsh_game_sim::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let batch = play_quantum(500_000, 0.0, AngleParameters::optimal(), &mut rng)?;
//! let result = analyze(&batch)?;
//! println!("{}", result);
//!
//! let search = search_optimal_angles(0.05, 100_000, &OptimizerConfig::default(), &mut rng)?;
//! println!("best angles {:?} ({})", search.angles.to_degrees(), search.status.label());
//! # Ok::<(), chsh_game_sim::error::ChshError>(())
//! ```
//!
//! Every quantity derived from sampling is random: compare with statistical
//! tolerances, never exact equality.

pub mod error;
pub mod game;
pub mod sampler;
pub mod angles;
pub mod noise;
pub mod strategy;
pub mod analysis;
pub mod optimizer;
pub mod experiment;
pub mod report;

pub mod prelude {
    pub use crate::error::ChshError;
    pub use crate::game::*;
    pub use crate::sampler::*;
    pub use crate::angles::*;
    pub use crate::noise::*;
    pub use crate::strategy::*;
    pub use crate::analysis::*;
    pub use crate::optimizer::*;
    pub use crate::experiment::*;
    pub use crate::report::*;
}
