use rand::Rng;
use std::fmt;

/// Board edge length. The move pipeline is written against this constant,
/// but the normalization constants in `eval::features` assume 4.
pub const SIZE: usize = 4;

/// Total cell count.
pub const CELLS: usize = SIZE * SIZE;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Left,
    Right,
    Up,
    Down,
}

impl Move {
    /// All directions, in the deterministic order used by [`Board::valid_moves`].
    pub const ALL: [Move; 4] = [Move::Left, Move::Right, Move::Up, Move::Down];

    /// Number of counter-clockwise quarter turns that bring this direction
    /// onto canonical left.
    #[inline]
    fn turns(self) -> usize {
        match self {
            Move::Left => 0,
            Move::Up => 1,
            Move::Right => 2,
            Move::Down => 3,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Move::Left => "left",
            Move::Right => "right",
            Move::Up => "up",
            Move::Down => "down",
        };
        f.write_str(s)
    }
}

/// A 4x4 2048 board.
///
/// Cells hold actual tile values (0 = empty, otherwise a power of two >= 2).
/// `Board` is `Copy`; simulation always works on copies, so a shifted or
/// hypothetical board never aliases the authoritative one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board([[u32; SIZE]; SIZE]);

/// Result of a deterministic shift: no score bookkeeping, no spawned tile.
#[derive(Debug, Clone, Copy)]
pub struct Shift {
    pub board: Board,
    pub reward: u32,
    pub moved: bool,
}

/// Result of a full stateful move on a [`Game`].
#[derive(Debug, Clone, Copy)]
pub struct MoveOutcome {
    pub board: Board,
    pub reward: u32,
    pub terminal: bool,
    pub moved: bool,
}

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// Construct a board from raw cells.
    #[inline]
    pub fn from_cells(cells: [[u32; SIZE]; SIZE]) -> Self {
        Board(cells)
    }

    /// Borrow the raw cells.
    #[inline]
    pub fn cells(&self) -> &[[u32; SIZE]; SIZE] {
        &self.0
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u32 {
        self.0[row][col]
    }

    /// Copy of this board with `value` written at `(row, col)`.
    #[inline]
    pub fn with_tile(mut self, row: usize, col: usize, value: u32) -> Self {
        self.0[row][col] = value;
        self
    }

    /// Count the number of empty cells.
    pub fn count_empty(&self) -> usize {
        self.0.iter().flatten().filter(|&&v| v == 0).count()
    }

    /// Row-major list of empty cell coordinates.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (r, row) in self.0.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                if v == 0 {
                    cells.push((r, c));
                }
            }
        }
        cells
    }

    /// Highest tile value on the board (0 when empty).
    pub fn max_tile(&self) -> u32 {
        self.0.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Slide/merge tiles in `dir` without spawning a tile or touching score.
    ///
    /// The grid is rotated so that the requested direction becomes canonical
    /// left, every row is compressed, merged pairwise left-to-right (a tile
    /// produced by a merge never merges again in the same pass), compressed
    /// again, and the grid is rotated back. The summed value of merged tiles
    /// is returned as the step reward.
    ///
    /// ```
    /// use td2048::engine::{Board, Move};
    /// let b = Board::from_cells([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
    /// let s = b.shift(Move::Left);
    /// assert_eq!(s.board.cells()[0], [4, 4, 0, 0]);
    /// assert_eq!(s.reward, 8);
    /// assert!(s.moved);
    /// ```
    pub fn shift(&self, dir: Move) -> Shift {
        let turns = dir.turns();
        let mut working = *self;
        for _ in 0..turns {
            working = working.rotate_ccw();
        }
        let mut reward = 0;
        for row in working.0.iter_mut() {
            let (slid, points) = slide_row(*row);
            *row = slid;
            reward += points;
        }
        for _ in 0..turns {
            working = working.rotate_cw();
        }
        Shift {
            board: working,
            reward,
            moved: working != *self,
        }
    }

    /// True if shifting in `dir` would change the board.
    ///
    /// Single scan per line in the rotated orientation: a direction is legal
    /// when some tile has a gap before it or equals its immediate nonzero
    /// predecessor. Nothing is compressed or allocated.
    pub fn can_move(&self, dir: Move) -> bool {
        let mut working = *self;
        for _ in 0..dir.turns() {
            working = working.rotate_ccw();
        }
        for row in &working.0 {
            let mut seen_gap = false;
            let mut prev = 0u32;
            for &v in row {
                if v == 0 {
                    seen_gap = true;
                } else {
                    if seen_gap || v == prev {
                        return true;
                    }
                    prev = v;
                }
            }
        }
        false
    }

    /// Legal directions, always in the order left, right, up, down.
    pub fn valid_moves(&self) -> Vec<Move> {
        Move::ALL
            .iter()
            .copied()
            .filter(|&dir| self.can_move(dir))
            .collect()
    }

    /// True iff the board is full and no direction is legal.
    pub fn is_terminal(&self) -> bool {
        self.count_empty() == 0 && Move::ALL.iter().all(|&dir| !self.can_move(dir))
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty
    /// cell, using the provided RNG. Returns `false` (and leaves the board
    /// untouched) when no empty cell exists.
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use td2048::engine::Board;
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let mut b = Board::EMPTY;
    /// assert!(b.spawn_random_tile(&mut rng));
    /// assert_eq!(b.count_empty(), 15);
    /// ```
    pub fn spawn_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return false;
        }
        let (r, c) = empty[rng.gen_range(0..empty.len())];
        self.0[r][c] = if rng.gen_range(0..10) < 9 { 2 } else { 4 };
        true
    }

    /// Quarter turn counter-clockwise (numpy `rot90` orientation).
    pub(crate) fn rotate_ccw(&self) -> Board {
        let mut out = [[0u32; SIZE]; SIZE];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.0[c][SIZE - 1 - r];
            }
        }
        Board(out)
    }

    /// Quarter turn clockwise; inverse of [`Board::rotate_ccw`].
    pub(crate) fn rotate_cw(&self) -> Board {
        let mut out = [[0u32; SIZE]; SIZE];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.0[SIZE - 1 - c][r];
            }
        }
        Board(out)
    }
}

/// Compress and merge one row toward the left. Returns the new row and the
/// summed value of tiles produced by merges.
fn slide_row(row: [u32; SIZE]) -> ([u32; SIZE], u32) {
    let mut line = compress(row);
    let mut reward = 0;
    for i in 0..SIZE - 1 {
        if line[i] != 0 && line[i] == line[i + 1] {
            line[i] *= 2;
            reward += line[i];
            line[i + 1] = 0;
        }
    }
    (compress(line), reward)
}

fn compress(row: [u32; SIZE]) -> [u32; SIZE] {
    let mut out = [0u32; SIZE];
    let mut n = 0;
    for &v in &row {
        if v != 0 {
            out[n] = v;
            n += 1;
        }
    }
    out
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0 {
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
            writeln!(f, "--------------------------------")?;
        }
        Ok(())
    }
}

fn format_val(val: u32) -> String {
    if val == 0 {
        "       ".to_string()
    } else {
        format!("{val:^7}")
    }
}

/// A running game: authoritative board plus score.
///
/// Score is monotonically non-decreasing across [`Game::apply_move`] calls
/// within an episode and is only reset by [`Game::reset`].
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    score: u64,
}

impl Game {
    /// Start a fresh game: empty grid, two random starting tiles, score 0.
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use td2048::engine::Game;
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let game = Game::new(&mut rng);
    /// assert_eq!(game.board().count_empty(), 14);
    /// assert_eq!(game.score(), 0);
    /// ```
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut game = Game {
            board: Board::EMPTY,
            score: 0,
        };
        game.reset(rng);
        game
    }

    /// Rebuild a game around an existing position. Used by tests and by the
    /// driver when replaying from a known state.
    pub fn from_parts(board: Board, score: u64) -> Self {
        Game { board, score }
    }

    /// Zero the grid and score, then place two random tiles.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Board {
        self.board = Board::EMPTY;
        self.score = 0;
        self.board.spawn_random_tile(rng);
        self.board.spawn_random_tile(rng);
        self.board
    }

    #[inline]
    pub fn board(&self) -> Board {
        self.board
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Perform a move for real: shift, and if anything changed, add the step
    /// reward to the score and spawn a random tile. Recomputes the terminal
    /// flag afterwards.
    pub fn apply_move<R: Rng + ?Sized>(&mut self, dir: Move, rng: &mut R) -> MoveOutcome {
        let shift = self.board.shift(dir);
        self.board = shift.board;
        if shift.moved {
            self.score += u64::from(shift.reward);
            self.board.spawn_random_tile(rng);
        }
        MoveOutcome {
            board: self.board,
            reward: shift.reward,
            terminal: self.board.is_terminal(),
            moved: shift.moved,
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.board.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn row_board(row: [u32; 4]) -> Board {
        Board::from_cells([row, [0; 4], [0; 4], [0; 4]])
    }

    #[test]
    fn slide_row_cases() {
        assert_eq!(slide_row([0, 0, 0, 0]), ([0, 0, 0, 0], 0));
        assert_eq!(slide_row([2, 0, 0, 2]), ([4, 0, 0, 0], 4));
        assert_eq!(slide_row([2, 2, 4, 4]), ([4, 8, 0, 0], 12));
        assert_eq!(slide_row([2, 4, 2, 4]), ([2, 4, 2, 4], 0));
        assert_eq!(slide_row([0, 2, 2, 2]), ([4, 2, 0, 0], 4));
    }

    #[test]
    fn merge_is_single_pass() {
        // [2,2,2,2] merges to two 4s, never a single 8.
        let s = row_board([2, 2, 2, 2]).shift(Move::Left);
        assert_eq!(s.board.cells()[0], [4, 4, 0, 0]);
        assert_eq!(s.reward, 8);
        assert!(s.moved);
    }

    #[test]
    fn compressed_row_is_noop() {
        let s = row_board([2, 4, 8, 16]).shift(Move::Left);
        assert_eq!(s.board.cells()[0], [2, 4, 8, 16]);
        assert_eq!(s.reward, 0);
        assert!(!s.moved);
    }

    #[test]
    fn shift_right() {
        let s = row_board([2, 2, 0, 4]).shift(Move::Right);
        assert_eq!(s.board.cells()[0], [0, 0, 4, 4]);
        assert_eq!(s.reward, 4);
    }

    #[test]
    fn shift_up_down() {
        let b = Board::from_cells([[2, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 0]]);
        let up = b.shift(Move::Up);
        assert_eq!(
            up.board.cells(),
            &[[4, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]
        );
        assert_eq!(up.reward, 4);
        let down = b.shift(Move::Down);
        assert_eq!(
            down.board.cells(),
            &[[0, 0, 0, 0], [0, 0, 0, 0], [4, 0, 0, 0], [4, 0, 0, 0]]
        );
        assert_eq!(down.reward, 4);
    }

    #[test]
    fn shift_matches_rotate_then_left() {
        let b = Board::from_cells([[2, 4, 0, 2], [0, 2, 2, 8], [4, 0, 4, 0], [2, 2, 0, 0]]);
        for dir in Move::ALL {
            let direct = b.shift(dir);
            let mut rotated = b;
            for _ in 0..dir.turns() {
                rotated = rotated.rotate_ccw();
            }
            let via_left = rotated.shift(Move::Left);
            let mut back = via_left.board;
            for _ in 0..dir.turns() {
                back = back.rotate_cw();
            }
            assert_eq!(direct.board, back, "direction {dir}");
            assert_eq!(direct.reward, via_left.reward, "direction {dir}");
        }
    }

    #[test]
    fn rotations_are_inverse() {
        let b = Board::from_cells([[1, 2, 3, 4], [5, 6, 7, 8], [9, 10, 11, 12], [13, 14, 15, 16]]);
        assert_eq!(b.rotate_ccw().rotate_cw(), b);
        assert_eq!(b.rotate_ccw().rotate_ccw().rotate_ccw().rotate_ccw(), b);
    }

    #[test]
    fn can_move_detects_gaps_and_merges() {
        assert!(row_board([0, 2, 0, 0]).can_move(Move::Left));
        assert!(!row_board([2, 0, 0, 0]).can_move(Move::Left));
        assert!(row_board([2, 0, 0, 0]).can_move(Move::Right));
        assert!(row_board([2, 2, 0, 0]).can_move(Move::Left));
        assert!(row_board([2, 0, 0, 2]).can_move(Move::Left));
        assert!(!row_board([2, 4, 8, 16]).can_move(Move::Left));
    }

    #[test]
    fn stuck_board_is_terminal() {
        // Full checkerboard: no empty cell, no equal neighbors on any axis.
        let b = Board::from_cells([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(b.is_terminal());
        assert!(b.valid_moves().is_empty());
    }

    #[test]
    fn full_board_with_merge_is_not_terminal() {
        let b = Board::from_cells([[2, 2, 4, 8], [4, 8, 2, 4], [2, 4, 8, 2], [4, 2, 4, 8]]);
        assert!(!b.is_terminal());
        assert_eq!(b.valid_moves(), vec![Move::Left, Move::Right]);
    }

    #[test]
    fn spawn_fills_board() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = Board::EMPTY;
        for _ in 0..CELLS {
            assert!(b.spawn_random_tile(&mut rng));
        }
        assert_eq!(b.count_empty(), 0);
        assert!(!b.spawn_random_tile(&mut rng));
        assert!(b.cells().iter().flatten().all(|&v| v == 2 || v == 4));
    }

    #[test]
    fn score_is_monotone() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut game = Game::new(&mut rng);
        let mut last = game.score();
        let mut dirs = Move::ALL.iter().cycle();
        for _ in 0..500 {
            if game.is_terminal() {
                break;
            }
            let dir = *dirs.next().unwrap();
            game.apply_move(dir, &mut rng);
            assert!(game.score() >= last);
            last = game.score();
        }
    }

    #[test]
    fn unchanged_move_spawns_nothing() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = Game::from_parts(row_board([2, 4, 8, 16]), 0);
        let out = game.apply_move(Move::Left, &mut rng);
        assert!(!out.moved);
        assert_eq!(out.board, row_board([2, 4, 8, 16]));
        assert_eq!(game.score(), 0);
    }
}
