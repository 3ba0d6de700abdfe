//! Derivative-free global search over measurement angles.
//!
//! The objective `f(θ) = −WinRate(Analyze(PlayQuantum(n, err, θ)))` is
//! stochastic: two evaluations at the same point differ by sampling noise of
//! order `sqrt(p(1 − p)/n)`. It is also multimodal, since rotating or
//! reflecting all bases gives the same statistics. Differential evolution
//! (`best1bin`, dithered mutation, binomial crossover) copes with both and
//! needs no gradient.
//!
//! A generation's trial vectors are evaluated together and only then compared
//! with their targets, so evaluations can run concurrently. Each evaluation
//! draws from its own pre-seeded stream.
//!
//! Termination is bounded by `max_generations` (and `max_evaluations` when
//! set). Convergence of the population is reported but never guaranteed:
//! against a noisy objective the result is always best-effort.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::analysis::analyze;
use crate::angles::{AngleParameters, ANGLE_BOUNDS};
use crate::error::{ChshError, Result};
use crate::noise::NoiseRate;
use crate::strategy::{Quantum, Strategy};

/// Differential evolution settings.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Population size as a multiple of the problem dimension.
    pub population_factor: usize,
    /// Generation cap.
    pub max_generations: usize,
    /// Optional cap on objective evaluations, initial population included.
    pub max_evaluations: Option<usize>,
    /// Dithering range for the mutation factor `F`.
    pub mutation: (f64, f64),
    /// Crossover probability.
    pub recombination: f64,
    /// Relative convergence tolerance on the spread of population energies.
    pub tol: f64,
    /// Absolute convergence tolerance.
    pub atol: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_factor: 15,
            max_generations: 1000,
            max_evaluations: None,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            tol: 0.01,
            atol: 0.0,
        }
    }
}

impl OptimizerConfig {
    /// Small population and generation budget for tests and smoke runs.
    pub fn quick() -> Self {
        Self {
            population_factor: 5,
            max_generations: 60,
            ..Self::default()
        }
    }

    pub fn validate(&self, dimension: usize) -> Result<()> {
        let population = self.population_factor * dimension;
        if population < 4 {
            return Err(ChshError::invalid(
                "population",
                population as f64,
                "differential evolution needs at least 4 members",
            ));
        }
        if self.max_generations == 0 {
            return Err(ChshError::invalid(
                "max_generations",
                0.0,
                "at least one generation is required",
            ));
        }
        if let Some(cap) = self.max_evaluations {
            if cap < population {
                return Err(ChshError::invalid(
                    "max_evaluations",
                    cap as f64,
                    "budget must cover the initial population",
                ));
            }
        }
        let (lo, hi) = self.mutation;
        if !(0.0..=2.0).contains(&lo) || !(0.0..=2.0).contains(&hi) || lo > hi {
            return Err(ChshError::invalid(
                "mutation",
                if lo > hi { lo } else { hi },
                "mutation bounds must satisfy 0 <= lo <= hi <= 2",
            ));
        }
        if !(0.0..=1.0).contains(&self.recombination) {
            return Err(ChshError::invalid(
                "recombination",
                self.recombination,
                "crossover probability must lie in [0, 1]",
            ));
        }
        if !(self.tol >= 0.0) || !(self.atol >= 0.0) {
            return Err(ChshError::invalid(
                "tol",
                self.tol.min(self.atol),
                "tolerances must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Why the search stopped.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    /// Population energies settled within tolerance.
    Converged,
    /// The generation or evaluation budget ran out first.
    BudgetExhausted,
}

impl SearchStatus {
    pub fn label(self) -> &'static str {
        match self {
            SearchStatus::Converged => "converged",
            SearchStatus::BudgetExhausted => "budget exhausted",
        }
    }
}

/// Outcome of a minimization.
#[derive(Debug, Clone)]
pub struct Minimum<const D: usize> {
    pub x: [f64; D],
    pub fun: f64,
    pub generations: usize,
    pub evaluations: usize,
    pub status: SearchStatus,
}

/// Bounded `best1bin` differential evolution minimizer.
#[derive(Debug, Clone)]
pub struct DifferentialEvolution<const D: usize> {
    bounds: [(f64, f64); D],
    config: OptimizerConfig,
}

impl<const D: usize> DifferentialEvolution<D> {
    pub fn new(bounds: [(f64, f64); D], config: OptimizerConfig) -> Result<Self> {
        config.validate(D)?;
        for &(lo, hi) in &bounds {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(ChshError::invalid("bounds", lo, "bounds must be finite with lo < hi"));
            }
        }
        Ok(Self { bounds, config })
    }

    fn scale(&self, unit: &[f64; D]) -> [f64; D] {
        let mut x = [0.0; D];
        for (j, (&u, &(lo, hi))) in unit.iter().zip(&self.bounds).enumerate() {
            x[j] = lo + u * (hi - lo);
        }
        x
    }

    /// Latin hypercube in the unit cube: one member per stratum per axis.
    fn initial_population<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Vec<[f64; D]> {
        let mut population = vec![[0.0; D]; size];
        let segment = 1.0 / size as f64;
        for j in 0..D {
            let mut strata: Vec<usize> = (0..size).collect();
            strata.shuffle(rng);
            for (member, &k) in population.iter_mut().zip(&strata) {
                member[j] = (k as f64 + rng.gen::<f64>()) * segment;
            }
        }
        population
    }

    fn evaluate<F>(&self, jobs: &[([f64; D], u64)], objective: &F) -> Result<Vec<f64>>
    where
        F: Fn([f64; D], &mut StdRng) -> Result<f64> + Sync,
    {
        let run = |(unit, seed): &([f64; D], u64)| {
            let mut stream = StdRng::seed_from_u64(*seed);
            objective(self.scale(unit), &mut stream)
        };
        #[cfg(feature = "parallel")]
        let energies: Result<Vec<f64>> = jobs.par_iter().map(run).collect();
        #[cfg(not(feature = "parallel"))]
        let energies: Result<Vec<f64>> = jobs.iter().map(run).collect();
        energies
    }

    fn converged(&self, energies: &[f64]) -> bool {
        let n = energies.len() as f64;
        let mean = energies.iter().sum::<f64>() / n;
        let var = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
        var.sqrt() <= self.config.atol + self.config.tol * mean.abs()
    }

    /// Build the trial vector for member `i`.
    fn trial<R: Rng + ?Sized>(
        &self,
        population: &[[f64; D]],
        best: usize,
        i: usize,
        f: f64,
        rng: &mut R,
    ) -> [f64; D] {
        let (r1, r2) = loop {
            let r1 = rng.gen_range(0..population.len());
            let r2 = rng.gen_range(0..population.len());
            if r1 != r2 && r1 != i && r2 != i {
                break (r1, r2);
            }
        };
        let forced = rng.gen_range(0..D);
        let mut trial = population[i];
        for j in 0..D {
            if j == forced || rng.gen::<f64>() < self.config.recombination {
                let v = population[best][j] + f * (population[r1][j] - population[r2][j]);
                trial[j] = if (0.0..=1.0).contains(&v) { v } else { rng.gen() };
            }
        }
        trial
    }

    /// Minimize `objective` over the bounds.
    ///
    /// The objective receives a point in bound coordinates and a private
    /// random stream.
    pub fn minimize<F, R>(&self, objective: F, rng: &mut R) -> Result<Minimum<D>>
    where
        F: Fn([f64; D], &mut StdRng) -> Result<f64> + Sync,
        R: Rng + ?Sized,
    {
        let size = self.config.population_factor * D;
        let mut population = self.initial_population(size, rng);
        let jobs: Vec<([f64; D], u64)> = population.iter().map(|&p| (p, rng.gen())).collect();
        let mut energies = self.evaluate(&jobs, &objective)?;
        let mut evaluations = size;
        let mut generations = 0;
        let mut status = SearchStatus::BudgetExhausted;

        while generations < self.config.max_generations {
            if let Some(cap) = self.config.max_evaluations {
                if evaluations + size > cap {
                    break;
                }
            }
            let (lo, hi) = self.config.mutation;
            let f = if hi > lo { rng.gen_range(lo..hi) } else { lo };
            let best = argmin(&energies);

            let jobs: Vec<([f64; D], u64)> = (0..size)
                .map(|i| (self.trial(&population, best, i, f, rng), rng.gen()))
                .collect();
            let trial_energies = self.evaluate(&jobs, &objective)?;
            evaluations += size;
            generations += 1;

            for (i, ((trial, _), energy)) in jobs.into_iter().zip(trial_energies).enumerate() {
                if energy <= energies[i] {
                    population[i] = trial;
                    energies[i] = energy;
                }
            }

            log::debug!(
                "generation {}: best {:.6}, {} evaluations",
                generations,
                energies[argmin(&energies)],
                evaluations
            );

            if self.converged(&energies) {
                status = SearchStatus::Converged;
                break;
            }
        }

        let best = argmin(&energies);
        Ok(Minimum {
            x: self.scale(&population[best]),
            fun: energies[best],
            generations,
            evaluations,
            status,
        })
    }
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i)
}

/// Best angles found by a search, with its bookkeeping.
#[derive(Debug, Clone)]
pub struct AngleSearch {
    /// Best angles, normalized to `[-π/2, π/2)`.
    pub angles: AngleParameters,
    /// Win rate observed at the best angles during the search. Biased upward
    /// by selection on noisy evaluations; re-evaluate for an unbiased figure.
    pub win_rate: f64,
    pub generations: usize,
    pub evaluations: usize,
    pub status: SearchStatus,
}

/// Search the angle cube for the highest win rate at noise `err`, playing
/// `games` rounds per objective evaluation.
pub fn search_optimal_angles<R: Rng + ?Sized>(
    err: f64,
    games: usize,
    config: &OptimizerConfig,
    rng: &mut R,
) -> Result<AngleSearch> {
    let noise = NoiseRate::new(err)?;
    if games == 0 {
        return Err(ChshError::DegenerateBatch);
    }
    let de = DifferentialEvolution::new([ANGLE_BOUNDS; 3], config.clone())?;

    let objective = |point: [f64; 3], stream: &mut StdRng| -> Result<f64> {
        let angles = AngleParameters::from_array(point)?;
        let batch = Quantum::new(noise, angles).play(games, stream)?;
        Ok(-analyze(&batch)?.win_rate)
    };
    let minimum = de.minimize(objective, rng)?;
    let angles = AngleParameters::from_array(minimum.x)?.normalized();

    match minimum.status {
        SearchStatus::Converged => log::info!(
            "angle search at err {} converged after {} generations: {:?} wins {:.5}",
            err,
            minimum.generations,
            angles,
            -minimum.fun
        ),
        SearchStatus::BudgetExhausted => log::warn!(
            "angle search at err {} stopped without converging after {} generations ({} evaluations); best-effort {:?} wins {:.5}",
            err,
            minimum.generations,
            minimum.evaluations,
            angles,
            -minimum.fun
        ),
    }

    Ok(AngleSearch {
        angles,
        win_rate: -minimum.fun,
        generations: minimum.generations,
        evaluations: minimum.evaluations,
        status: minimum.status,
    })
}

/// Best angle triple for noise `err` with `games` rounds per evaluation,
/// using the default configuration and an entropy-seeded source.
pub fn find_optimal_angles(err: f64, games: usize) -> Result<AngleParameters> {
    let mut rng = StdRng::from_entropy();
    search_optimal_angles(err, games, &OptimizerConfig::default(), &mut rng).map(|s| s.angles)
}
