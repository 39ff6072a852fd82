use rand::rngs::StdRng;
use rand::SeedableRng;

use td2048::checkpoint::Checkpoint;
use td2048::engine::Game;
use td2048::episode::{DriverConfig, EpisodeDriver};

const CHECKPOINT_FILE: &str = "td2048_checkpoint.json";

fn main() {
    let checkpoint = match Checkpoint::load_or_default(CHECKPOINT_FILE) {
        Ok(ckpt) => ckpt,
        Err(e) => {
            eprintln!("Failed to read {CHECKPOINT_FILE}: {e}");
            return;
        }
    };
    if checkpoint.episodes > 0 {
        println!("Loaded weights trained for {} episodes", checkpoint.episodes);
    } else {
        println!("No checkpoint found; playing with untrained weights");
    }

    let mut rng = StdRng::from_entropy();
    let driver = EpisodeDriver::new(DriverConfig::greedy());
    let mut game = Game::new(&mut rng);
    println!("{}", game.board());

    let mut move_count = 0;
    while let Some(dir) = driver.select_move(&game, &checkpoint.weights, &mut rng) {
        let outcome = game.apply_move(dir, &mut rng);
        move_count += 1;
        println!("{}", outcome.board);
        if outcome.terminal {
            break;
        }
    }
    println!(
        "Moves made: {}, Score: {}, Highest tile: {}",
        move_count,
        game.score(),
        game.board().max_tile()
    );
}
