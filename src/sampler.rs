//! Randomness for the referee and the batch driver shared by all strategies.
//!
//! A batch is split into chunks of [`CHUNK_SIZE`] rounds. One seed per chunk
//! is drawn from the caller's source before any chunk is rendered, and each
//! chunk then runs on its own `StdRng` stream. The same caller seed therefore
//! yields the same batch whether or not chunks are rendered in parallel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{ChshError, Result};
use crate::game::{GameBatch, GameRecord, Questions};
use crate::strategy::Strategy;

/// Rounds per independently seeded stream.
pub const CHUNK_SIZE: usize = 1 << 14;

/// Draw `n` question pairs, each bit independent and uniform.
pub fn draw_questions<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Questions> {
    (0..n)
        .map(|_| Questions::new(rng.gen(), rng.gen()))
        .collect()
}

/// Split `n` rounds into `(length, seed)` chunks.
pub fn chunk_plan<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<(usize, u64)> {
    let mut plan = Vec::with_capacity(n.div_ceil(CHUNK_SIZE));
    let mut remaining = n;
    while remaining > 0 {
        let len = remaining.min(CHUNK_SIZE);
        plan.push((len, rng.gen()));
        remaining -= len;
    }
    plan
}

/// Play `n` rounds of `strategy`, chunk by chunk.
///
/// Each chunk draws all of its questions first and then asks the strategy
/// for all of its answers.
pub fn generate_batch<S, R>(n: usize, strategy: &S, rng: &mut R) -> Result<GameBatch>
where
    S: Strategy,
    R: Rng + ?Sized,
{
    if n == 0 {
        return Err(ChshError::DegenerateBatch);
    }

    let plan = chunk_plan(n, rng);
    log::trace!("{}: {} rounds in {} chunks", strategy.name(), n, plan.len());
    let render = |&(len, seed): &(usize, u64)| -> Vec<GameRecord> {
        let mut stream = StdRng::seed_from_u64(seed);
        let questions = draw_questions(len, &mut stream);
        let answers = strategy.answer_all(&questions, &mut stream);
        questions
            .into_iter()
            .zip(answers)
            .map(|(q, a)| GameRecord::new(q, a))
            .collect()
    };

    #[cfg(feature = "parallel")]
    let chunks: Vec<Vec<GameRecord>> = plan.par_iter().map(render).collect();
    #[cfg(not(feature = "parallel"))]
    let chunks: Vec<Vec<GameRecord>> = plan.iter().map(render).collect();

    Ok(GameBatch::from_records(chunks.concat()))
}
