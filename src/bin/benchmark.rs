use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use td2048::checkpoint::Checkpoint;
use td2048::episode::{DriverConfig, EpisodeDriver, EpisodeSummary};
use td2048::eval::WeightPair;

#[derive(Debug, Parser)]
#[command(name = "benchmark", about = "Parallel greedy-play benchmark for the 2048 agent")]
struct Args {
    /// Number of independent games to play
    #[arg(long, default_value_t = 1000)]
    games: u64,

    /// Checkpoint file with trained weights (untrained defaults when omitted)
    #[arg(long)]
    checkpoint: Option<PathBuf>,

    /// Base seed; game i runs on seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    let args = Args::parse();

    let weights = match &args.checkpoint {
        Some(path) => match Checkpoint::load(path) {
            Ok(ckpt) => {
                println!(
                    "Benchmarking weights trained for {} episodes",
                    ckpt.episodes
                );
                ckpt.weights
            }
            Err(e) => {
                eprintln!("Failed to load {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => {
            println!("No checkpoint given; benchmarking untrained weights");
            WeightPair::default()
        }
    };

    let start = Instant::now();
    // Each worker gets its own game, RNG, and a copied weight snapshot;
    // nothing is shared mutably across games.
    let summaries: Vec<EpisodeSummary> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(args.seed.wrapping_add(i));
            let driver = EpisodeDriver::new(DriverConfig::greedy());
            driver.play_episode(&weights, &mut rng)
        })
        .collect();
    let elapsed = start.elapsed();

    report(&summaries, elapsed.as_secs_f64());
}

fn report(summaries: &[EpisodeSummary], elapsed_s: f64) {
    let games = summaries.len();
    let total_score: u64 = summaries.iter().map(|s| s.score).sum();
    let best = summaries.iter().max_by_key(|s| s.score);
    let total_moves: usize = summaries.iter().map(|s| s.moves).sum();

    let mut tile_counts: BTreeMap<u32, usize> = BTreeMap::new();
    for s in summaries {
        *tile_counts.entry(s.max_tile).or_default() += 1;
    }

    println!();
    println!("Games:        {games}");
    println!("Elapsed:      {elapsed_s:.2}s");
    println!(
        "Avg score:    {:.1}",
        total_score as f64 / games.max(1) as f64
    );
    if let Some(best) = best {
        println!(
            "Best game:    score {} (max tile {}, {} moves)",
            best.score, best.max_tile, best.moves
        );
    }
    println!(
        "Avg moves:    {:.1}",
        total_moves as f64 / games.max(1) as f64
    );
    println!("Max tile distribution:");
    for (tile, count) in tile_counts.iter().rev() {
        let pct = 100.0 * *count as f64 / games.max(1) as f64;
        println!("  {tile:>6}: {count:>5} ({pct:.1}%)");
    }
}
