//! Episode driver: move selection, reward shaping, and the learning loop.
//!
//! This is the top-level consumer of the core: epsilon-greedy exploration
//! over the legal moves, one-ply expectimax scoring of each candidate, and a
//! TD(0) update per accepted move. Benchmark runs use the same driver with
//! exploration and learning switched off.

use rand::Rng;

use crate::engine::{Game, Move};
use crate::eval::{evaluate, extract, WeightPair};
use crate::learn::td_update;
use crate::search::expected_value;

/// Bonus added to the shaped reward whenever the move merged anything.
pub const ACTIVITY_BONUS: f64 = 1.0;

/// Subtracted from the shaped reward to form the terminal target, instead of
/// bootstrapping from a next-state value.
pub const TERMINAL_PENALTY: f64 = 30.0;

/// Driver hyperparameters. Defaults match the start of a training run.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Probability of picking a uniformly random legal move.
    pub epsilon: f64,
    /// TD step size.
    pub learning_rate: f64,
    /// Discount factor for the bootstrap target.
    pub gamma: f64,
    /// Optional hard cap on moves per episode.
    pub max_moves: Option<usize>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.2,
            learning_rate: 1e-3,
            gamma: 0.99,
            max_moves: None,
        }
    }
}

impl DriverConfig {
    /// Pure-exploitation configuration: no exploration, no learning signal
    /// is consumed. Used by benchmark workers.
    pub fn greedy() -> Self {
        Self {
            epsilon: 0.0,
            ..Self::default()
        }
    }
}

/// Episode-level aggregates reported to logging/benchmark layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeSummary {
    pub score: u64,
    pub max_tile: u32,
    pub moves: usize,
}

/// Shape a raw per-move score delta for the TD target: log2 of the merged
/// value sum plus a fixed activity bonus, or 0 when nothing merged.
pub fn shaped_reward(raw: u32) -> f64 {
    if raw == 0 {
        0.0
    } else {
        f64::from(raw).log2() + ACTIVITY_BONUS
    }
}

/// Runs episodes against a [`Game`], optionally updating weights online.
#[derive(Debug, Clone, Default)]
pub struct EpisodeDriver {
    pub config: DriverConfig,
}

impl EpisodeDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Pick a move for `game`'s current board: with probability epsilon a
    /// uniformly random legal move, otherwise the legal move whose post-shift
    /// board has the highest one-ply expected value. Ties keep the move
    /// encountered first in `valid_moves()` order. `None` when no move is
    /// legal.
    pub fn select_move<R: Rng + ?Sized>(
        &self,
        game: &Game,
        weights: &WeightPair,
        rng: &mut R,
    ) -> Option<Move> {
        let board = game.board();
        let valid = board.valid_moves();
        if valid.is_empty() {
            return None;
        }
        if self.config.epsilon > 0.0 && rng.gen::<f64>() < self.config.epsilon {
            return Some(valid[rng.gen_range(0..valid.len())]);
        }
        let mut best = valid[0];
        let mut best_value = f64::NEG_INFINITY;
        for &dir in &valid {
            let shifted = board.shift(dir);
            let value = expected_value(&shifted.board, weights, rng);
            if value > best_value {
                best_value = value;
                best = dir;
            }
        }
        Some(best)
    }

    /// Play one full training episode, mutating `weights` online.
    ///
    /// Per accepted move: features of the pre-move board are extracted, the
    /// move is applied for real, the shaped reward forms the TD target
    /// (bootstrapped through the evaluator unless the episode ended, in
    /// which case the terminal penalty applies), and the learner updates the
    /// active weight vector.
    pub fn run_episode<R: Rng + ?Sized>(
        &self,
        weights: &mut WeightPair,
        rng: &mut R,
    ) -> EpisodeSummary {
        let mut game = Game::new(rng);
        let mut moves = 0;
        loop {
            let pre_board = game.board();
            let Some(dir) = self.select_move(&game, weights, rng) else {
                break;
            };
            let features = extract(&pre_board);
            let current_value = evaluate(&pre_board, weights);

            let outcome = game.apply_move(dir, rng);
            moves += 1;

            let reward = shaped_reward(outcome.reward);
            let target = if outcome.terminal {
                reward - TERMINAL_PENALTY
            } else {
                reward + self.config.gamma * evaluate(&outcome.board, weights)
            };
            td_update(
                weights,
                &features,
                target - current_value,
                self.config.learning_rate,
            );

            if outcome.terminal {
                break;
            }
            if self.config.max_moves.is_some_and(|cap| moves >= cap) {
                break;
            }
        }
        EpisodeSummary {
            score: game.score(),
            max_tile: game.board().max_tile(),
            moves,
        }
    }

    /// Play one episode without touching the weights (benchmark path).
    pub fn play_episode<R: Rng + ?Sized>(
        &self,
        weights: &WeightPair,
        rng: &mut R,
    ) -> EpisodeSummary {
        let mut game = Game::new(rng);
        let mut moves = 0;
        while let Some(dir) = self.select_move(&game, weights, rng) {
            let outcome = game.apply_move(dir, rng);
            moves += 1;
            if outcome.terminal {
                break;
            }
            if self.config.max_moves.is_some_and(|cap| moves >= cap) {
                break;
            }
        }
        EpisodeSummary {
            score: game.score(),
            max_tile: game.board().max_tile(),
            moves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Board;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shaped_reward_maps_zero_to_zero() {
        assert_eq!(shaped_reward(0), 0.0);
        assert_eq!(shaped_reward(8), 3.0 + ACTIVITY_BONUS);
        assert_eq!(shaped_reward(4), 2.0 + ACTIVITY_BONUS);
    }

    #[test]
    fn select_move_returns_none_when_stuck() {
        let stuck = Board::from_cells([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let game = Game::from_parts(stuck, 0);
        let driver = EpisodeDriver::new(DriverConfig::greedy());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(driver.select_move(&game, &WeightPair::default(), &mut rng), None);
    }

    #[test]
    fn select_move_is_legal() {
        let mut rng = StdRng::seed_from_u64(11);
        let driver = EpisodeDriver::new(DriverConfig::default());
        let weights = WeightPair::default();
        for _ in 0..20 {
            let game = Game::new(&mut rng);
            let dir = driver
                .select_move(&game, &weights, &mut rng)
                .expect("fresh games always have a legal move");
            assert!(game.board().valid_moves().contains(&dir));
        }
    }

    #[test]
    fn training_episode_terminates_and_reports() {
        let mut rng = StdRng::seed_from_u64(1234);
        let driver = EpisodeDriver::new(DriverConfig {
            max_moves: Some(200),
            ..DriverConfig::default()
        });
        let mut weights = WeightPair::default();
        let summary = driver.run_episode(&mut weights, &mut rng);
        assert!(summary.moves > 0);
        assert!(summary.max_tile >= 4);
        assert!(weights.normal.is_non_negative());
        assert!(weights.panic.is_non_negative());
    }

    #[test]
    fn greedy_episode_leaves_weights_alone() {
        let mut rng = StdRng::seed_from_u64(77);
        let driver = EpisodeDriver::new(DriverConfig::greedy());
        let weights = WeightPair::default();
        let before = weights;
        let summary = driver.play_episode(&weights, &mut rng);
        assert!(summary.moves > 0);
        assert_eq!(weights, before);
    }
}
