use criterion::{criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

use td2048::engine::{Board, Game, Move};
use td2048::eval::{evaluate, extract, WeightPair};
use td2048::search::expected_value;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(1337);
    let mut boards = Vec::new();
    boards.push(Board::EMPTY);
    let mut game = Game::new(&mut rng);
    boards.push(game.board());
    let seq = [Move::Left, Move::Up, Move::Right, Move::Down];
    for i in 0..48 {
        if game.is_terminal() {
            break;
        }
        game.apply_move(seq[i % seq.len()], &mut rng);
        boards.push(game.board());
    }
    boards
}

fn bench_extract(c: &mut Criterion) {
    let boards = corpus();
    c.bench_function("eval/extract", |b| {
        b.iter(|| {
            let mut acc = 0f64;
            for bd in &boards {
                acc += extract(bd)[2];
            }
            black_box(acc)
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let boards = corpus();
    let weights = WeightPair::default();
    c.bench_function("eval/evaluate", |b| {
        b.iter(|| {
            let mut acc = 0f64;
            for bd in &boards {
                acc += evaluate(bd, &weights);
            }
            black_box(acc)
        })
    });
}

fn bench_expected_value(c: &mut Criterion) {
    let boards = corpus();
    let weights = WeightPair::default();
    c.bench_function("search/expected_value", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| {
            let mut acc = 0f64;
            for bd in &boards {
                acc += expected_value(bd, &weights, &mut rng);
            }
            black_box(acc)
        })
    });
}

criterion_group!(eval, bench_extract, bench_evaluate, bench_expected_value);
criterion_main!(eval);
