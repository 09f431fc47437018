use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::GameError;
use crate::moves::{Move, Pos};
use crate::piece::{Color, Square};

pub const NUM_ROWS: usize = 8;
pub const NUM_COLS: usize = 8;
pub const NUM_PIECES: usize = 12;

/// Turns each side must go without capturing or promoting before the game
/// is drawn by inactivity.
pub const TURNS_DRAW: u32 = 40;

pub type Grid = [[Square; NUM_COLS]; NUM_ROWS];

/// What happened after a move was applied.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MoveOutcome {
    /// The capturing piece must keep jumping. The side to move is unchanged
    /// and these are its only legal moves.
    Continue(Vec<Move>),
    /// The turn ended and the other side is now to move.
    TurnPassed,
    /// The turn ended and the position is drawn.
    Draw,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Board {
    pub squares: Grid,
    pub current_turn: Color,
    /// Number of the current round; goes up whenever play returns to White.
    pub loop_count: u32,
    /// Square of the piece in the middle of a capture chain.
    pub chain_from: Option<Pos>,
    /// Per side (indexed by `Color::index`), turns since its last capture.
    pub turns_since_capture: [u32; 2],
    /// Per side, turns since its last promotion.
    pub turns_since_promotion: [u32; 2],
    /// Grids seen at turn boundaries since the last capture or promotion.
    pub position_history: Vec<Grid>,
    captured_this_turn: bool,
    promoted_this_turn: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create an empty board with no pieces. Useful for setting up test positions.
    pub fn empty() -> Self {
        let mut board = Board {
            squares: [[Square::Empty; NUM_COLS]; NUM_ROWS],
            current_turn: Color::White,
            loop_count: 1,
            chain_from: None,
            turns_since_capture: [0; 2],
            turns_since_promotion: [0; 2],
            position_history: Vec::new(),
            captured_this_turn: false,
            promoted_this_turn: false,
        };
        board.position_history.push(board.squares);
        board
    }

    /// Standard opening: twelve men per side on the dark squares of the
    /// three rows nearest each player.
    pub fn new() -> Self {
        let mut board = Board::empty();
        for color in [Color::White, Color::Black] {
            for i in 0..NUM_PIECES {
                let mut row = (2 * i) / NUM_COLS;
                let mut col = (2 * i) % NUM_COLS + row % 2;
                if color == Color::Black {
                    row = NUM_ROWS - 1 - row;
                    col = NUM_COLS - 1 - col;
                }
                board.squares[row][col] = Square::man(color);
            }
        }
        board.reset_history();
        board
    }

    /// Discard the repetition history and record the current grid as its
    /// first entry. Call after placing pieces on a constructed board.
    pub fn reset_history(&mut self) {
        self.position_history.clear();
        self.position_history.push(self.squares);
    }

    fn in_bounds(row: i32, col: i32) -> bool {
        (0..NUM_ROWS as i32).contains(&row) && (0..NUM_COLS as i32).contains(&col)
    }

    fn offset(pos: Pos, dr: i32, dc: i32) -> Option<Pos> {
        let r = pos.0 as i32 + dr;
        let c = pos.1 as i32 + dc;
        if Self::in_bounds(r, c) {
            Some((r as usize, c as usize))
        } else {
            None
        }
    }

    pub fn get(&self, pos: Pos) -> Square {
        self.squares[pos.0][pos.1]
    }

    pub fn set(&mut self, pos: Pos, square: Square) {
        self.squares[pos.0][pos.1] = square;
    }

    pub fn in_chain(&self) -> bool {
        self.chain_from.is_some()
    }

    pub fn piece_count(&self) -> usize {
        self.squares
            .iter()
            .flatten()
            .filter(|sq| !sq.is_empty())
            .count()
    }

    pub fn count(&self, square: Square) -> usize {
        self.squares.iter().flatten().filter(|&&sq| sq == square).count()
    }

    /// The grid as rows of small integers (0, ±1, ±2).
    pub fn rows(&self) -> Vec<Vec<i8>> {
        self.squares
            .iter()
            .map(|row| row.iter().map(|sq| sq.to_i8()).collect())
            .collect()
    }

    /// Build a board from integer rows, White to move. Returns `None` if the
    /// grid is not 8x8 or holds a value outside the square encoding.
    pub fn from_rows(rows: &[Vec<i8>]) -> Option<Board> {
        if rows.len() != NUM_ROWS {
            return None;
        }
        let mut board = Board::empty();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != NUM_COLS {
                return None;
            }
            for (c, &value) in row.iter().enumerate() {
                board.squares[r][c] = Square::from_i8(value)?;
            }
        }
        board.reset_history();
        Some(board)
    }

    fn pieces_of(&self, color: Color) -> impl Iterator<Item = Pos> + '_ {
        (0..NUM_ROWS)
            .flat_map(|r| (0..NUM_COLS).map(move |c| (r, c)))
            .filter(move |&pos| self.get(pos).color() == Some(color))
    }

    fn generate_jumps_from(&self, from: Pos, moves: &mut Vec<Move>) {
        let piece = self.get(from);
        let Some(color) = piece.color() else {
            return;
        };
        for &(dr, dc) in piece.directions() {
            let Some(over) = Self::offset(from, dr, dc) else {
                continue;
            };
            let Some(to) = Self::offset(from, 2 * dr, 2 * dc) else {
                continue;
            };
            let opposing = self.get(over).color() == Some(color.opposite());
            if opposing && self.get(to).is_empty() {
                moves.push(Move { from, to });
            }
        }
    }

    fn generate_steps_from(&self, from: Pos, moves: &mut Vec<Move>) {
        for &(dr, dc) in self.get(from).directions() {
            if let Some(to) = Self::offset(from, dr, dc) {
                if self.get(to).is_empty() {
                    moves.push(Move { from, to });
                }
            }
        }
    }

    /// Jumps available to the piece on `from`.
    pub fn jumps_from(&self, from: Pos) -> Vec<Move> {
        let mut moves = Vec::new();
        self.generate_jumps_from(from, &mut moves);
        moves
    }

    /// Legal moves for the side to move. Captures are compulsory: if any
    /// jump exists only jumps are returned. In the middle of a chain only
    /// the chaining piece may move.
    pub fn legal_moves(&self) -> Vec<Move> {
        if let Some(from) = self.chain_from {
            return self.jumps_from(from);
        }

        let color = self.current_turn;
        let mut jumps = Vec::new();
        for pos in self.pieces_of(color) {
            self.generate_jumps_from(pos, &mut jumps);
        }
        if !jumps.is_empty() {
            return jumps;
        }

        let mut steps = Vec::new();
        for pos in self.pieces_of(color) {
            self.generate_steps_from(pos, &mut steps);
        }
        steps
    }

    /// Apply a move taken from [`Board::legal_moves`].
    ///
    /// Moves the piece, removes any captured piece and promotes a man that
    /// reaches the far row. If the move was a jump and the same piece can
    /// jump again, the turn continues. Otherwise the turn passes, the
    /// position is recorded and the draw rules are checked.
    ///
    /// Passing a move that is not legal is a logic error; the board is left
    /// in an unspecified (but memory-safe) state. Use
    /// [`Board::try_apply_move`] for untrusted input.
    pub fn apply_move(&mut self, m: &Move) -> MoveOutcome {
        let color = self.current_turn;
        let piece = self.get(m.from);
        debug_assert_eq!(piece.color(), Some(color), "moving a piece that is not ours");
        debug_assert!(self.get(m.to).is_empty(), "landing on an occupied square");

        self.set(m.from, Square::Empty);
        self.set(m.to, piece);

        if let Some(captured) = m.captured() {
            self.set(captured, Square::Empty);
            self.captured_this_turn = true;
        }

        if piece.is_man() && m.to.0 == color.crowning_row() {
            self.set(m.to, piece.crowned());
            self.promoted_this_turn = true;
        }

        if m.is_jump() {
            let more = self.jumps_from(m.to);
            if !more.is_empty() {
                self.chain_from = Some(m.to);
                trace!(%m, continuations = more.len(), "capture chain continues");
                return MoveOutcome::Continue(more);
            }
        }

        self.end_turn();
        if self.draws() {
            MoveOutcome::Draw
        } else {
            MoveOutcome::TurnPassed
        }
    }

    /// Apply a move after checking it against the legal set.
    pub fn try_apply_move(&mut self, m: &Move) -> Result<MoveOutcome, GameError> {
        if !self.legal_moves().contains(m) {
            return Err(GameError::IllegalMove { mv: *m });
        }
        Ok(self.apply_move(m))
    }

    fn end_turn(&mut self) {
        let side = self.current_turn.index();

        if self.captured_this_turn || self.promoted_this_turn {
            self.position_history.clear();
        }
        self.position_history.push(self.squares);

        if self.captured_this_turn {
            self.turns_since_capture[side] = 0;
        } else {
            self.turns_since_capture[side] += 1;
        }
        if self.promoted_this_turn {
            self.turns_since_promotion[side] = 0;
        } else {
            self.turns_since_promotion[side] += 1;
        }

        self.captured_this_turn = false;
        self.promoted_this_turn = false;
        self.chain_from = None;
        self.current_turn = self.current_turn.opposite();
        if self.current_turn == Color::White {
            self.loop_count += 1;
        }
    }

    /// The current grid has been seen at least three times since the last
    /// capture or promotion.
    pub fn is_repetition(&self) -> bool {
        let current = &self.squares;
        let count = self
            .position_history
            .iter()
            .filter(|&grid| grid == current)
            .count();
        count >= 3
    }

    /// Both sides have gone `TURNS_DRAW` turns without capturing or promoting.
    pub fn is_inactive(&self) -> bool {
        self.turns_since_capture
            .iter()
            .chain(self.turns_since_promotion.iter())
            .all(|&turns| turns >= TURNS_DRAW)
    }

    pub fn draws(&self) -> bool {
        self.is_repetition() || self.is_inactive()
    }
}
