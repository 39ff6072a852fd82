//! One-ply expectimax over the random tile-spawn distribution.
//!
//! Given a post-move board (shifted but with no tile spawned yet), the
//! search averages the evaluator over the possible spawns. With more than
//! [`SPAWN_SAMPLE_CAP`] empty cells it down-samples to that many distinct
//! cells, trading exactness for speed on sparsely-filled boards; otherwise
//! the expectation is exact.

use rand::Rng;

use crate::engine::Board;
use crate::eval::{evaluate, WeightPair};

/// Maximum number of empty cells evaluated per expectation; above this the
/// cells are drawn uniformly without replacement.
pub const SPAWN_SAMPLE_CAP: usize = 3;

/// Probability that a spawned tile is a 2.
pub const SPAWN_TWO_PROB: f64 = 0.9;
/// Probability that a spawned tile is a 4.
pub const SPAWN_FOUR_PROB: f64 = 0.1;

/// Expected evaluation of `board` after one random tile spawn.
///
/// The board is copied internally; the caller's board is never mutated. A
/// full board short-circuits to a direct evaluation.
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use td2048::engine::Board;
/// use td2048::eval::{evaluate, WeightPair};
/// use td2048::search::expected_value;
///
/// let weights = WeightPair::default();
/// let mut rng = StdRng::seed_from_u64(5);
/// // Exactly one empty cell: the expectation is exact.
/// let b = Board::from_cells([[2, 4, 8, 16], [32, 64, 128, 256], [2, 4, 8, 16], [32, 64, 128, 0]]);
/// let ev = expected_value(&b, &weights, &mut rng);
/// let exact = 0.9 * evaluate(&b.with_tile(3, 3, 2), &weights)
///     + 0.1 * evaluate(&b.with_tile(3, 3, 4), &weights);
/// assert!((ev - exact).abs() < 1e-12);
/// ```
pub fn expected_value<R: Rng + ?Sized>(
    board: &Board,
    weights: &WeightPair,
    rng: &mut R,
) -> f64 {
    let scratch = *board;
    let empty = scratch.empty_cells();
    if empty.is_empty() {
        return evaluate(&scratch, weights);
    }

    let sampled: Vec<(usize, usize)> = if empty.len() > SPAWN_SAMPLE_CAP {
        rand::seq::index::sample(rng, empty.len(), SPAWN_SAMPLE_CAP)
            .iter()
            .map(|i| empty[i])
            .collect()
    } else {
        empty
    };

    let mut total = 0.0;
    for &(r, c) in &sampled {
        let with_two = scratch.with_tile(r, c, 2);
        let with_four = scratch.with_tile(r, c, 4);
        total += SPAWN_TWO_PROB * evaluate(&with_two, weights)
            + SPAWN_FOUR_PROB * evaluate(&with_four, weights);
    }
    total / sampled.len() as f64
}
