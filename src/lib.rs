//! td2048: a 2048 game engine with heuristic evaluation, one-ply expectimax,
//! and online TD(0) weight learning.
//!
//! This crate provides:
//! - A strongly-typed 4x4 `Board` and a `Game` wrapper with the full move
//!   rules (`engine` module)
//! - Six-feature extraction and a dual-mode weighted evaluator with
//!   structural penalties (`eval` module)
//! - A one-ply expectimax over the tile-spawn distribution (`search` module)
//! - A semi-gradient TD(0) learner with clipping and non-negativity
//!   projection (`learn` module)
//! - An episode driver tying the above into training and benchmark runs
//!   (`episode` module) and JSON checkpointing (`checkpoint` module)
//!
//! The core is pure computation: no I/O, no threads, no hidden randomness.
//! Every randomized operation takes a caller-supplied RNG, so seeding at the
//! boundary makes whole runs reproducible.
//!
//! Quick start:
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use td2048::engine::Game;
//! use td2048::episode::{DriverConfig, EpisodeDriver};
//! use td2048::eval::WeightPair;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let driver = EpisodeDriver::new(DriverConfig::greedy());
//! let mut game = Game::new(&mut rng);
//! let weights = WeightPair::default();
//! while let Some(dir) = driver.select_move(&game, &weights, &mut rng) {
//!     if game.apply_move(dir, &mut rng).terminal {
//!         break;
//!     }
//! }
//! assert!(game.score() > 0);
//! ```
//!
//! Training loop (simplest possible):
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use td2048::episode::{DriverConfig, EpisodeDriver};
//! use td2048::eval::WeightPair;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let driver = EpisodeDriver::new(DriverConfig {
//!     max_moves: Some(50),
//!     ..DriverConfig::default()
//! });
//! let mut weights = WeightPair::default();
//! let summary = driver.run_episode(&mut weights, &mut rng);
//! assert!(summary.moves > 0);
//! assert!(weights.normal.is_non_negative() && weights.panic.is_non_negative());
//! ```

pub mod checkpoint;
pub mod engine;
pub mod episode;
pub mod eval;
pub mod learn;
pub mod search;
