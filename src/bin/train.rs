use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use td2048::checkpoint::Checkpoint;
use td2048::episode::{DriverConfig, EpisodeDriver, EpisodeSummary};
use td2048::eval::WeightPair;

const ALPHA_START: f64 = 1e-3;
const ALPHA_END: f64 = 1e-4;
const EPSILON_START: f64 = 0.2;
const EPSILON_MIN: f64 = 0.01;
/// Episode count over which alpha and epsilon anneal linearly.
const ANNEAL_EPISODES: u64 = 5000;
/// Checkpoint and CSV flush cadence.
const SAVE_EVERY: u64 = 200;

#[derive(Debug, Parser)]
#[command(name = "train", about = "Online TD(0) training for the 2048 agent")]
struct Args {
    /// Number of episodes to run in this session
    #[arg(long, default_value_t = 5000)]
    episodes: u64,

    /// Checkpoint file to resume from and save to
    #[arg(long, default_value = "td2048_checkpoint.json")]
    checkpoint: PathBuf,

    /// CSV file of per-episode training history
    #[arg(long, default_value = "training_history.csv")]
    history: PathBuf,

    /// Seed for the run RNG (entropy-seeded when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Discount factor for the bootstrap target
    #[arg(long, default_value_t = 0.99)]
    gamma: f64,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Training failed: {e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut checkpoint = Checkpoint::load_or_default(&args.checkpoint)?;
    if checkpoint.episodes > 0 {
        println!("Resuming training from episode {}", checkpoint.episodes);
    } else {
        println!("Starting a fresh training run");
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut history = HistoryWriter::open(&args.history)?;

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.episodes);
        pb.set_style(ProgressStyle::with_template(
            "{bar:40} {pos}/{len} | {elapsed_precise} | {msg}",
        )?);
        pb
    };

    let target = checkpoint.episodes + args.episodes;
    let mut recent_scores: Vec<u64> = Vec::new();

    while checkpoint.episodes < target {
        // Anneal alpha and epsilon over total progress, floored after the
        // schedule runs out.
        let (alpha, epsilon) = if checkpoint.episodes < ANNEAL_EPISODES {
            let progress = checkpoint.episodes as f64 / ANNEAL_EPISODES as f64;
            (
                ALPHA_START - (ALPHA_START - ALPHA_END) * progress,
                (EPSILON_START * (1.0 - progress)).max(EPSILON_MIN),
            )
        } else {
            (ALPHA_END, EPSILON_MIN)
        };

        let driver = EpisodeDriver::new(DriverConfig {
            epsilon,
            learning_rate: alpha,
            gamma: args.gamma,
            max_moves: None,
        });

        let episode_start = Instant::now();
        let summary = driver.run_episode(&mut checkpoint.weights, &mut rng);
        checkpoint.episodes += 1;

        history.buffer(
            checkpoint.episodes,
            &summary,
            episode_start.elapsed().as_secs_f64(),
            &checkpoint.weights,
        );

        recent_scores.push(summary.score);
        if recent_scores.len() > 100 {
            recent_scores.remove(0);
        }

        if checkpoint.episodes % SAVE_EVERY == 0 {
            checkpoint.save(&args.checkpoint)?;
            history.flush()?;
        }

        pb.inc(1);
        if checkpoint.episodes % 50 == 0 {
            let avg = recent_scores.iter().sum::<u64>() as f64 / recent_scores.len() as f64;
            pb.set_message(format!("avg score (last 100): {avg:.0}"));
        }
    }

    checkpoint.save(&args.checkpoint)?;
    history.flush()?;
    pb.finish_and_clear();

    println!(
        "Done. {} total episodes trained; checkpoint at {}",
        checkpoint.episodes,
        args.checkpoint.display()
    );
    println!("normal weights: {:?}", checkpoint.weights.normal.0);
    println!("panic weights:  {:?}", checkpoint.weights.panic.0);
    Ok(())
}

/// Buffered append-only CSV history, header written on creation.
struct HistoryWriter {
    writer: csv::Writer<std::fs::File>,
}

impl HistoryWriter {
    fn open(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let fresh = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if fresh {
            let mut header = vec![
                "episode".to_string(),
                "score".to_string(),
                "max_tile".to_string(),
                "moves".to_string(),
                "duration_s".to_string(),
            ];
            for name in ["empty", "max", "snake", "merge", "corner", "neigh"] {
                header.push(format!("n_{name}"));
            }
            for name in ["empty", "max", "snake", "merge", "corner", "neigh"] {
                header.push(format!("p_{name}"));
            }
            writer.write_record(&header)?;
        }
        Ok(Self { writer })
    }

    fn buffer(&mut self, episode: u64, summary: &EpisodeSummary, duration: f64, weights: &WeightPair) {
        let mut record = vec![
            episode.to_string(),
            summary.score.to_string(),
            summary.max_tile.to_string(),
            summary.moves.to_string(),
            format!("{duration:.4}"),
        ];
        for w in weights.normal.0.iter().chain(weights.panic.0.iter()) {
            record.push(format!("{w:.5}"));
        }
        // csv buffers internally; rows only reach disk on flush.
        let _ = self.writer.write_record(&record);
    }

    fn flush(&mut self) -> Result<(), std::io::Error> {
        self.writer.flush()
    }
}
