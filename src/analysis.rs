//! Reduction of a game batch to win statistics.
//!
//! Counting is chunked and, with the `parallel` feature, reduced on the rayon
//! pool. Counts are integers, so the result never depends on scheduling.

use std::fmt;
use std::ops::Add;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{ChshError, Result};
use crate::game::{GameBatch, GameRecord, Questions};
use crate::sampler::CHUNK_SIZE;

/// Games played and won for one `(x, y)` question combination.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CellStats {
    pub games: u64,
    pub wins: u64,
}

impl CellStats {
    /// `None` when no game in the batch had these questions.
    pub fn win_rate(&self) -> Option<f64> {
        if self.games == 0 {
            None
        } else {
            Some(self.wins as f64 / self.games as f64)
        }
    }
}

impl Add for CellStats {
    type Output = CellStats;

    fn add(self, other: CellStats) -> CellStats {
        CellStats {
            games: self.games + other.games,
            wins: self.wins + other.wins,
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
struct Tally([CellStats; 4]);

impl Tally {
    fn of(records: &[GameRecord]) -> Tally {
        let mut cells = [CellStats::default(); 4];
        for r in records {
            let cell = &mut cells[r.questions().cell_index()];
            cell.games += 1;
            cell.wins += u64::from(r.wins());
        }
        Tally(cells)
    }

    fn merge(self, other: Tally) -> Tally {
        let mut cells = self.0;
        for (c, o) in cells.iter_mut().zip(other.0) {
            *c = *c + o;
        }
        Tally(cells)
    }
}

/// Aggregate statistics of one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Per-cell counts in the order `00, 01, 10, 11`.
    pub cells: [CellStats; 4],
    pub games: u64,
    pub wins: u64,
    pub win_rate: f64,
}

impl AnalysisResult {
    pub fn cell(&self, q: Questions) -> CellStats {
        self.cells[q.cell_index()]
    }

    pub fn cell_win_rate(&self, q: Questions) -> Option<f64> {
        self.cell(q).win_rate()
    }

    /// Binomial standard error of the overall win rate.
    pub fn standard_error(&self) -> f64 {
        (self.win_rate * (1.0 - self.win_rate) / self.games as f64).sqrt()
    }

    /// The CHSH correlator sum `S = Σ (2·p_xy − 1)`.
    ///
    /// Local strategies satisfy `S ≤ 2`; quantum ones reach `2√2`.
    pub fn chsh_value(&self) -> Option<f64> {
        self.cells
            .iter()
            .map(|c| c.win_rate().map(|p| 2.0 * p - 1.0))
            .sum()
    }
}

/// Reduce a batch to its win statistics.
pub fn analyze(batch: &GameBatch) -> Result<AnalysisResult> {
    if batch.is_empty() {
        return Err(ChshError::DegenerateBatch);
    }

    let records = batch.records();
    #[cfg(feature = "parallel")]
    let tally = records
        .par_chunks(CHUNK_SIZE)
        .map(Tally::of)
        .reduce(Tally::default, Tally::merge);
    #[cfg(not(feature = "parallel"))]
    let tally = records
        .chunks(CHUNK_SIZE)
        .map(Tally::of)
        .fold(Tally::default(), Tally::merge);

    let cells = tally.0;
    let games: u64 = cells.iter().map(|c| c.games).sum();
    let wins: u64 = cells.iter().map(|c| c.wins).sum();
    Ok(AnalysisResult {
        cells,
        games,
        wins,
        win_rate: wins as f64 / games as f64,
    })
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for q in Questions::all() {
            let cell = self.cell(q);
            write!(
                f,
                "Winning rate with x = {} and y = {}: ",
                u8::from(q.x),
                u8::from(q.y)
            )?;
            match cell.win_rate() {
                Some(rate) => write!(f, "{}", rate)?,
                None => write!(f, "n/a")?,
            }
            writeln!(f, "( {} / {} )", cell.wins, cell.games)?;
        }
        write!(
            f,
            "Overall winning rate: {}( {} / {} )",
            self.win_rate, self.wins, self.games
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angles::AngleParameters;
    use crate::game::Answers;
    use crate::strategy::play_quantum;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(x: bool, y: bool, a: bool, b: bool) -> GameRecord {
        GameRecord::new(Questions::new(x, y), Answers::new(a, b))
    }

    fn sample_batch() -> GameBatch {
        GameBatch::from_records(vec![
            record(false, false, false, false), // win
            record(false, false, true, false),  // loss
            record(false, true, true, true),    // win
            record(true, false, false, true),   // loss
            record(true, true, true, false),    // win
            record(true, true, true, true),     // loss
            record(true, true, false, true),    // win
        ])
    }

    #[test]
    fn test_counts_by_cell() {
        let result = analyze(&sample_batch()).unwrap();
        assert_eq!(result.games, 7);
        assert_eq!(result.wins, 4);
        assert!((result.win_rate - 4.0 / 7.0).abs() < 1e-12);
        assert_eq!(result.cell(Questions::new(false, false)), CellStats { games: 2, wins: 1 });
        assert_eq!(result.cell(Questions::new(false, true)), CellStats { games: 1, wins: 1 });
        assert_eq!(result.cell(Questions::new(true, false)), CellStats { games: 1, wins: 0 });
        assert_eq!(result.cell(Questions::new(true, true)), CellStats { games: 3, wins: 2 });
    }

    #[test]
    fn test_empty_batch_is_degenerate() {
        let err = analyze(&GameBatch::default()).unwrap_err();
        assert!(matches!(err, ChshError::DegenerateBatch));
    }

    #[test]
    fn test_analyze_is_pure() {
        let mut rng = StdRng::seed_from_u64(31);
        let batch = play_quantum(100_000, 0.1, AngleParameters::optimal(), &mut rng).unwrap();
        let first = analyze(&batch).unwrap();
        let second = analyze(&batch).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_win_rate_in_unit_interval() {
        let mut rng = StdRng::seed_from_u64(32);
        for &err in &[0.0, 0.5, 1.0] {
            let batch = play_quantum(5_000, err, AngleParameters::optimal(), &mut rng).unwrap();
            let result = analyze(&batch).unwrap();
            assert!((0.0..=1.0).contains(&result.win_rate));
            assert_eq!(result.games, 5_000);
        }
    }

    #[test]
    fn test_empty_cell_has_no_rate() {
        let batch = GameBatch::from_records(vec![record(false, false, false, false)]);
        let result = analyze(&batch).unwrap();
        assert_eq!(result.cell_win_rate(Questions::new(true, true)), None);
        assert_eq!(result.chsh_value(), None);
        assert!(result.to_string().contains("x = 1 and y = 1: n/a( 0 / 0 )"));
    }

    #[test]
    fn test_text_rendering_is_stable() {
        let result = analyze(&sample_batch()).unwrap();
        let text = result.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Winning rate with x = 0 and y = 0: 0.5( 1 / 2 )");
        assert_eq!(lines[1], "Winning rate with x = 0 and y = 1: 1( 1 / 1 )");
        assert_eq!(lines[2], "Winning rate with x = 1 and y = 0: 0( 0 / 1 )");
        assert!(lines[4].starts_with("Overall winning rate: 0.5714285714285714( 4 / 7 )"));
    }

    #[test]
    fn test_chsh_value_beats_local_bound() {
        let mut rng = StdRng::seed_from_u64(33);
        let batch = play_quantum(400_000, 0.0, AngleParameters::optimal(), &mut rng).unwrap();
        let s = analyze(&batch).unwrap().chsh_value().unwrap();
        assert!(s > 2.0, "S = {} should violate the local bound", s);
        assert!((s - 2.0 * 2f64.sqrt()).abs() < 0.03, "S = {} vs 2√2", s);
    }

    #[test]
    fn test_standard_error_shrinks_with_batch_size() {
        let mut rng = StdRng::seed_from_u64(34);
        let small = analyze(&play_quantum(1_000, 0.0, AngleParameters::optimal(), &mut rng).unwrap()).unwrap();
        let large = analyze(&play_quantum(100_000, 0.0, AngleParameters::optimal(), &mut rng).unwrap()).unwrap();
        assert!(large.standard_error() < small.standard_error());
        assert!(large.standard_error() < 0.002);
    }
}
