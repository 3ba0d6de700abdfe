//! Standard experiments: strategy comparison, noise sweep at fixed angles,
//! and the optimal-angle survey across noise rates.
//!
//! Every function returns structured results; serialization lives in
//! [`crate::report`].

use rand::Rng;

use crate::analysis::{analyze, AnalysisResult};
use crate::angles::AngleParameters;
use crate::error::Result;
use crate::optimizer::{search_optimal_angles, AngleSearch, OptimizerConfig};
use crate::strategy::{play_classical, play_quantum, play_random};

/// Settings for a full experiment run.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Rounds per simulation run (comparison, sweep, re-evaluation).
    pub games: usize,
    /// Rounds per objective evaluation during angle search.
    pub search_games: usize,
    /// Noise rates at which the optimal angles are searched.
    pub survey_rates: Vec<f64>,
    /// Noise rates of the fixed-angle sweep.
    pub sweep_rates: Vec<f64>,
    /// Angles used by the sweep.
    pub sweep_angles: AngleParameters,
    pub optimizer: OptimizerConfig,
    /// Master seed; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl ExperimentConfig {
    /// Half a million games per run, the reference survey rates and a
    /// 101-point sweep.
    pub fn full() -> Self {
        Self {
            games: 500_000,
            search_games: 100_000,
            survey_rates: vec![0.0, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 0.99],
            sweep_rates: noise_grid(100),
            sweep_angles: AngleParameters::optimal(),
            optimizer: OptimizerConfig::default(),
            seed: None,
        }
    }

    /// Small budgets for smoke runs.
    pub fn quick() -> Self {
        Self {
            games: 50_000,
            search_games: 10_000,
            survey_rates: vec![0.0, 0.1, 0.5],
            sweep_rates: noise_grid(10),
            sweep_angles: AngleParameters::optimal(),
            optimizer: OptimizerConfig::quick(),
            seed: None,
        }
    }
}

/// `steps + 1` evenly spaced noise rates from 0 to 1.
pub fn noise_grid(steps: usize) -> Vec<f64> {
    if steps == 0 {
        return vec![0.0];
    }
    (0..=steps).map(|i| i as f64 / steps as f64).collect()
}

/// One labeled strategy result.
#[derive(Debug, Clone)]
pub struct StrategyComparison {
    pub label: &'static str,
    pub result: AnalysisResult,
}

/// Classical, random, aligned-basis quantum and optimal-basis quantum play.
pub fn compare_strategies<R: Rng + ?Sized>(
    games: usize,
    rng: &mut R,
) -> Result<Vec<StrategyComparison>> {
    let runs = [
        ("Classical Strategy", play_classical(games, rng)?),
        ("Pure Random", play_random(games, rng)?),
        (
            "Perfect Quantum Strategy with 0/1 Basis",
            play_quantum(games, 0.0, AngleParameters::aligned(), rng)?,
        ),
        (
            "Perfect Quantum Strategy with Optimal Basis",
            play_quantum(games, 0.0, AngleParameters::optimal(), rng)?,
        ),
    ];
    runs.iter()
        .map(|&(label, ref batch)| -> Result<StrategyComparison> {
            let result = analyze(batch)?;
            log::info!("{}: win rate {:.5}", label, result.win_rate);
            Ok(StrategyComparison { label, result })
        })
        .collect()
}

/// Win statistics at one noise rate.
#[derive(Debug, Clone)]
pub struct NoisePoint {
    pub err: f64,
    pub result: AnalysisResult,
}

/// Play the quantum strategy at fixed angles for each noise rate.
pub fn noise_sweep<R: Rng + ?Sized>(
    angles: AngleParameters,
    rates: &[f64],
    games: usize,
    rng: &mut R,
) -> Result<Vec<NoisePoint>> {
    rates
        .iter()
        .map(|&err| -> Result<NoisePoint> {
            let result = analyze(&play_quantum(games, err, angles, rng)?)?;
            log::debug!("err {}: win rate {:.5}", err, result.win_rate);
            Ok(NoisePoint { err, result })
        })
        .collect()
}

/// Noise rate at which the sweep's win rate first falls to `level`,
/// interpolated linearly between neighbouring points.
///
/// Points must be sorted by noise rate. Returns `None` if the sweep never
/// crosses `level`.
pub fn estimate_break_even(points: &[NoisePoint], level: f64) -> Option<f64> {
    if let Some(first) = points.first() {
        if first.result.win_rate == level {
            return Some(first.err);
        }
    }
    for window in points.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        let (ra, rb) = (a.result.win_rate, b.result.win_rate);
        if ra > level && rb <= level {
            let frac = (ra - level) / (ra - rb);
            return Some(a.err + frac * (b.err - a.err));
        }
    }
    None
}

/// Angle search result at one noise rate, re-evaluated with fresh games.
#[derive(Debug, Clone)]
pub struct SurveyEntry {
    pub err: f64,
    pub search: AngleSearch,
    pub result: AnalysisResult,
}

/// Search the best angles at each noise rate and re-evaluate them.
pub fn optimal_angle_survey<R: Rng + ?Sized>(
    rates: &[f64],
    search_games: usize,
    games: usize,
    optimizer: &OptimizerConfig,
    rng: &mut R,
) -> Result<Vec<SurveyEntry>> {
    rates
        .iter()
        .map(|&err| -> Result<SurveyEntry> {
            let search = search_optimal_angles(err, search_games, optimizer, rng)?;
            let result = analyze(&play_quantum(games, err, search.angles, rng)?)?;
            log::info!(
                "err {}: angles {:?} re-evaluated at {:.5}",
                err,
                search.angles.to_degrees(),
                result.win_rate
            );
            Ok(SurveyEntry {
                err,
                search,
                result,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::CellStats;
    use crate::noise::NoiseRate;
    use crate::strategy::{Quantum, Strategy};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A result carrying only an overall win rate.
    fn point(err: f64, win_rate: f64) -> NoisePoint {
        let games = 1_000_000u64;
        let wins = (win_rate * games as f64).round() as u64;
        NoisePoint {
            err,
            result: AnalysisResult {
                cells: [CellStats::default(); 4],
                games,
                wins,
                win_rate,
            },
        }
    }

    #[test]
    fn test_grid_spacing() {
        let grid = noise_grid(100);
        assert_eq!(grid.len(), 101);
        assert_eq!(grid[0], 0.0);
        assert_eq!(grid[100], 1.0);
        assert!((grid[37] - 0.37).abs() < 1e-12);
        assert_eq!(noise_grid(0), vec![0.0]);
    }

    #[test]
    fn test_comparison_orders_strategies() {
        let mut rng = StdRng::seed_from_u64(51);
        let rows = compare_strategies(200_000, &mut rng).unwrap();
        let labels: Vec<&str> = rows.iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![
                "Classical Strategy",
                "Pure Random",
                "Perfect Quantum Strategy with 0/1 Basis",
                "Perfect Quantum Strategy with Optimal Basis",
            ]
        );
        let rates: Vec<f64> = rows.iter().map(|r| r.result.win_rate).collect();
        assert!((rates[0] - 0.75).abs() < 0.01);
        assert!((rates[1] - 0.5).abs() < 0.01);
        assert!((rates[2] - 0.75).abs() < 0.01);
        assert!(rates[3] > rates[0] + 0.08, "quantum should beat classical: {:?}", rates);
    }

    #[test]
    fn test_sweep_degrades_toward_random() {
        let mut rng = StdRng::seed_from_u64(52);
        let rates = noise_grid(4);
        let points = noise_sweep(AngleParameters::optimal(), &rates, 200_000, &mut rng).unwrap();
        assert_eq!(points.len(), 5);
        for pair in points.windows(2) {
            assert!(pair[1].result.win_rate <= pair[0].result.win_rate + 0.005);
        }
        assert!((points[4].result.win_rate - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_break_even_matches_werner_threshold() {
        // Exact win rates along the optimal-angle sweep.
        let points: Vec<NoisePoint> = noise_grid(100)
            .into_iter()
            .map(|err| {
                let q = Quantum::new(NoiseRate::new(err).unwrap(), AngleParameters::optimal());
                point(err, q.expected_win_rate())
            })
            .collect();
        let crossing = estimate_break_even(&points, 0.75).unwrap();
        let expected = 1.0 - 1.0 / 2f64.sqrt();
        assert!(
            (crossing - expected).abs() < 1e-3,
            "break-even at {} vs {}",
            crossing,
            expected
        );
    }

    #[test]
    fn test_break_even_absent_when_never_crossed() {
        let points = vec![point(0.0, 0.9), point(0.5, 0.85), point(1.0, 0.8)];
        assert_eq!(estimate_break_even(&points, 0.75), None);
        assert_eq!(estimate_break_even(&[], 0.75), None);
    }

    #[test]
    fn test_survey_reports_each_rate() {
        let mut rng = StdRng::seed_from_u64(53);
        let config = OptimizerConfig {
            max_generations: 5,
            ..OptimizerConfig::quick()
        };
        let entries = optimal_angle_survey(&[0.0, 1.0], 2_000, 20_000, &config, &mut rng).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].err, 0.0);
        assert!(entries[0].search.generations <= 5);
        assert!((entries[1].result.win_rate - 0.5).abs() < 0.02);
    }
}
