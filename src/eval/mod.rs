//! State evaluation: dual-mode weighted feature scoring plus two fixed
//! structural penalties.
//!
//! The evaluator carries two independent weight vectors. Boards with fewer
//! than [`PANIC_EMPTY_THRESHOLD`] empty cells are scored with the "panic"
//! vector and harsher penalties; everything else uses the "normal" vector.
//! The switch is a hard threshold: a single empty-cell change can flip the
//! active mode.

pub mod features;

use serde::{Deserialize, Serialize};

use crate::engine::{Board, SIZE};
pub use features::{extract, FeatureVector, NUM_FEATURES};

/// Boards with fewer empty cells than this are scored in panic mode.
pub const PANIC_EMPTY_THRESHOLD: usize = 4;

/// Smoothness penalty weight in normal mode.
pub const NORMAL_SMOOTHNESS_WEIGHT: f64 = 1.0;
/// Isolation penalty weight in normal mode.
pub const NORMAL_ISOLATION_WEIGHT: f64 = 5.0;
/// Smoothness penalty weight in panic mode.
pub const PANIC_SMOOTHNESS_WEIGHT: f64 = 2.0;
/// Isolation penalty weight in panic mode.
pub const PANIC_ISOLATION_WEIGHT: f64 = 10.0;

/// A learned weight vector over the six features.
///
/// Serialized transparently as an array of six floats. Every component stays
/// non-negative after TD updates (the learner projects onto the positive
/// orthant).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights(pub [f64; NUM_FEATURES]);

impl Weights {
    pub const ZERO: Weights = Weights([0.0; NUM_FEATURES]);

    /// All components set to the same value.
    pub fn uniform(v: f64) -> Self {
        Weights([v; NUM_FEATURES])
    }

    /// Dot product against a feature vector.
    #[inline]
    pub fn dot(&self, features: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(features.iter())
            .map(|(w, f)| w * f)
            .sum()
    }

    /// True if every component is >= 0.
    pub fn is_non_negative(&self) -> bool {
        self.0.iter().all(|&w| w >= 0.0)
    }
}

impl Default for Weights {
    /// Untrained starting point: 0.5 in every slot.
    fn default() -> Self {
        Weights::uniform(0.5)
    }
}

/// The two weight vectors, one per evaluation mode.
///
/// A pair is `Copy`: benchmark workers take read-only snapshots by value,
/// while training mutates a single pair sequentially.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeightPair {
    pub normal: Weights,
    pub panic: Weights,
}

impl WeightPair {
    /// Both modes share the given vector. Used when loading legacy archives
    /// that predate the panic split.
    pub fn splat(weights: Weights) -> Self {
        WeightPair {
            normal: weights,
            panic: weights,
        }
    }
}

/// Which weight vector and penalty strengths apply to a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Panic,
}

impl Mode {
    /// Hard-threshold mode selection on the empty-cell count.
    #[inline]
    pub fn for_empty_count(empty: usize) -> Mode {
        if empty < PANIC_EMPTY_THRESHOLD {
            Mode::Panic
        } else {
            Mode::Normal
        }
    }
}

/// Score a board: weighted features plus smoothness and isolation penalties.
///
/// ```
/// use td2048::engine::Board;
/// use td2048::eval::{evaluate, WeightPair};
/// let weights = WeightPair::default();
/// let b = Board::EMPTY.with_tile(0, 0, 64).with_tile(0, 1, 64);
/// assert!(evaluate(&b, &weights).is_finite());
/// ```
pub fn evaluate(board: &Board, weights: &WeightPair) -> f64 {
    let features = extract(board);
    let mode = Mode::for_empty_count(board.count_empty());
    let (active, smoothness_weight, isolation_weight) = match mode {
        Mode::Normal => (
            &weights.normal,
            NORMAL_SMOOTHNESS_WEIGHT,
            NORMAL_ISOLATION_WEIGHT,
        ),
        Mode::Panic => (
            &weights.panic,
            PANIC_SMOOTHNESS_WEIGHT,
            PANIC_ISOLATION_WEIGHT,
        ),
    };
    let base = active.dot(&features);
    base + smoothness(board) * smoothness_weight - isolation(board) as f64 * isolation_weight
}

/// Negative sum of absolute log2 differences over all adjacent nonzero pairs.
/// Homogeneous neighborhoods score closer to zero.
pub fn smoothness(board: &Board) -> f64 {
    let cells = board.cells();
    let log = |v: u32| f64::from(v).log2();
    let mut total = 0.0;
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = cells[r][c];
            if v == 0 {
                continue;
            }
            if c + 1 < SIZE && cells[r][c + 1] != 0 {
                total -= (log(v) - log(cells[r][c + 1])).abs();
            }
            if r + 1 < SIZE && cells[r + 1][c] != 0 {
                total -= (log(v) - log(cells[r + 1][c])).abs();
            }
        }
    }
    total
}

/// Count of nonzero cells with no equal-valued direct neighbor: singletons
/// with nothing to merge into.
pub fn isolation(board: &Board) -> usize {
    let cells = board.cells();
    let mut isolated = 0;
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = cells[r][c];
            if v == 0 {
                continue;
            }
            let has_partner = features::orthogonal_neighbors(r, c)
                .any(|(nr, nc)| cells[nr][nc] == v);
            if !has_partner {
                isolated += 1;
            }
        }
    }
    isolated
}
