//! Feature extraction: a board is mapped to six normalized scalar signals.
//!
//! All magnitude-sensitive features work in log2 space so the exponential
//! tile scale becomes linear. The normalization constants below are tuned
//! values inherited from the heuristic design; `MAX_LOG_NORM` assumes tiles
//! up to 2^16. `max_log_norm` and `best_gradient_score` are deliberately not
//! clamped to [0, 1]: boards past the assumed ceiling extrapolate linearly
//! through the evaluator rather than saturating, which is part of the
//! learned-weight semantics.

use std::sync::OnceLock;

use crate::engine::{Board, CELLS, SIZE};

/// Number of features produced by [`extract`].
pub const NUM_FEATURES: usize = 6;

/// Ordered feature vector:
/// `[empty_ratio, max_log_norm, best_gradient_score, merge_density, is_corner, neighbor_support]`.
pub type FeatureVector = [f64; NUM_FEATURES];

/// Divisor for the max-tile log feature (assumes tiles up to 2^16).
pub const MAX_LOG_NORM: f64 = 16.0;

/// Divisor bringing the best gradient dot product to O(1).
pub const GRADIENT_NORM: f64 = 1000.0;

/// Divisor for the adjacent-equal-pair count, saturating at 1.0.
pub const MERGE_NORM: f64 = 10.0;

/// Divisor for the summed neighbor logs around the max tile, saturating at 1.0.
pub const NEIGHBOR_NORM: f64 = 40.0;

type Mask = [[f64; SIZE]; SIZE];

/// Snake priority ordering, highest priority in the top-left corner and
/// descending along alternating rows.
const BASE_GRADIENT: [[i32; SIZE]; SIZE] = [
    [15, 14, 13, 12],
    [8, 9, 10, 11],
    [7, 6, 5, 4],
    [0, 1, 2, 3],
];

static GRADIENT_MASKS: OnceLock<[Mask; 8]> = OnceLock::new();

/// The eight snake gradient masks: four rotations of [`BASE_GRADIENT`] plus
/// the mirror of each. Built once, shared by all evaluations.
pub fn gradient_masks() -> &'static [Mask; 8] {
    GRADIENT_MASKS.get_or_init(|| {
        let mut masks = [[[0.0; SIZE]; SIZE]; 8];
        let mut current = BASE_GRADIENT;
        for k in 0..4 {
            masks[2 * k] = to_f64(current);
            masks[2 * k + 1] = to_f64(mirror(current));
            current = rotate_ccw(current);
        }
        masks
    })
}

fn to_f64(m: [[i32; SIZE]; SIZE]) -> Mask {
    let mut out = [[0.0; SIZE]; SIZE];
    for (r, row) in m.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            out[r][c] = f64::from(v);
        }
    }
    out
}

fn rotate_ccw(m: [[i32; SIZE]; SIZE]) -> [[i32; SIZE]; SIZE] {
    let mut out = [[0; SIZE]; SIZE];
    for (r, row) in out.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = m[c][SIZE - 1 - r];
        }
    }
    out
}

fn mirror(m: [[i32; SIZE]; SIZE]) -> [[i32; SIZE]; SIZE] {
    let mut out = m;
    for row in out.iter_mut() {
        row.reverse();
    }
    out
}

#[inline]
fn log2_cell(v: u32) -> f64 {
    if v == 0 {
        0.0
    } else {
        f64::from(v).log2()
    }
}

/// Extract the six-feature vector for a board. Pure function.
///
/// ```
/// use td2048::engine::Board;
/// use td2048::eval::features::extract;
/// let f = extract(&Board::EMPTY);
/// assert_eq!(f[0], 1.0); // all cells empty
/// assert_eq!(f[1], 0.0);
/// ```
pub fn extract(board: &Board) -> FeatureVector {
    let cells = board.cells();

    let mut log_board = [[0.0f64; SIZE]; SIZE];
    for (r, row) in cells.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            log_board[r][c] = log2_cell(v);
        }
    }

    let empty_ratio = board.count_empty() as f64 / CELLS as f64;

    let max_log = log_board
        .iter()
        .flatten()
        .copied()
        .fold(0.0f64, f64::max);
    let max_log_norm = max_log / MAX_LOG_NORM;

    let best_gradient_score = gradient_masks()
        .iter()
        .map(|mask| {
            let mut dot = 0.0;
            for r in 0..SIZE {
                for c in 0..SIZE {
                    dot += log_board[r][c] * mask[r][c];
                }
            }
            dot
        })
        .fold(f64::NEG_INFINITY, f64::max)
        / GRADIENT_NORM;

    let merge_density = (adjacent_equal_pairs(board) as f64 / MERGE_NORM).min(1.0);

    let (max_r, max_c) = max_cell_position(board);
    let is_corner = if (max_r == 0 || max_r == SIZE - 1) && (max_c == 0 || max_c == SIZE - 1) {
        1.0
    } else {
        0.0
    };

    let mut support = 0.0;
    for (nr, nc) in orthogonal_neighbors(max_r, max_c) {
        support += log_board[nr][nc];
    }
    let neighbor_support = (support / NEIGHBOR_NORM).min(1.0);

    [
        empty_ratio,
        max_log_norm,
        best_gradient_score,
        merge_density,
        is_corner,
        neighbor_support,
    ]
}

/// Count horizontally or vertically adjacent equal nonzero pairs.
pub(crate) fn adjacent_equal_pairs(board: &Board) -> usize {
    let cells = board.cells();
    let mut pairs = 0;
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = cells[r][c];
            if v == 0 {
                continue;
            }
            if c + 1 < SIZE && cells[r][c + 1] == v {
                pairs += 1;
            }
            if r + 1 < SIZE && cells[r + 1][c] == v {
                pairs += 1;
            }
        }
    }
    pairs
}

/// Position of the maximum-valued cell, first-encountered in row-major order.
fn max_cell_position(board: &Board) -> (usize, usize) {
    let cells = board.cells();
    let max = board.max_tile();
    for r in 0..SIZE {
        for c in 0..SIZE {
            if cells[r][c] == max {
                return (r, c);
            }
        }
    }
    (0, 0)
}

pub(crate) fn orthogonal_neighbors(r: usize, c: usize) -> impl Iterator<Item = (usize, usize)> {
    let mut out = Vec::with_capacity(4);
    if r > 0 {
        out.push((r - 1, c));
    }
    if r + 1 < SIZE {
        out.push((r + 1, c));
    }
    if c > 0 {
        out.push((r, c - 1));
    }
    if c + 1 < SIZE {
        out.push((r, c + 1));
    }
    out.into_iter()
}
