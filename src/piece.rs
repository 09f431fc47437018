use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// +1 for White, -1 for Black. Matches the sign of the square encoding.
    pub fn sign(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Slot in per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "WHITES",
            Color::Black => "BLACKS",
        }
    }

    /// Row a man of this colour is promoted on.
    pub fn crowning_row(self) -> usize {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

/// Contents of one board square. The integer form is 0 for empty, ±1 for a
/// man and ±2 for a king, with the sign giving the side.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug, Default)]
pub enum Square {
    #[default]
    Empty,
    WhiteMan,
    WhiteKing,
    BlackMan,
    BlackKing,
}

/// Forward diagonals for a White man. Black mirrors the row delta.
const MAN_DIRS: [(i32, i32); 2] = [(1, -1), (1, 1)];
const KING_DIRS: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, -1), (-1, 1)];
const BLACK_MAN_DIRS: [(i32, i32); 2] = [(-1, -1), (-1, 1)];

impl Square {
    pub fn man(color: Color) -> Square {
        match color {
            Color::White => Square::WhiteMan,
            Color::Black => Square::BlackMan,
        }
    }

    pub fn king(color: Color) -> Square {
        match color {
            Color::White => Square::WhiteKing,
            Color::Black => Square::BlackKing,
        }
    }

    pub fn to_i8(self) -> i8 {
        match self {
            Square::Empty => 0,
            Square::WhiteMan => 1,
            Square::WhiteKing => 2,
            Square::BlackMan => -1,
            Square::BlackKing => -2,
        }
    }

    pub fn from_i8(value: i8) -> Option<Square> {
        match value {
            0 => Some(Square::Empty),
            1 => Some(Square::WhiteMan),
            2 => Some(Square::WhiteKing),
            -1 => Some(Square::BlackMan),
            -2 => Some(Square::BlackKing),
            _ => None,
        }
    }

    pub fn color(self) -> Option<Color> {
        match self {
            Square::Empty => None,
            Square::WhiteMan | Square::WhiteKing => Some(Color::White),
            Square::BlackMan | Square::BlackKing => Some(Color::Black),
        }
    }

    pub fn is_empty(self) -> bool {
        self == Square::Empty
    }

    pub fn is_king(self) -> bool {
        matches!(self, Square::WhiteKing | Square::BlackKing)
    }

    pub fn is_man(self) -> bool {
        matches!(self, Square::WhiteMan | Square::BlackMan)
    }

    /// The king this piece becomes on promotion. Kings and empty squares are
    /// returned unchanged.
    pub fn crowned(self) -> Square {
        match self {
            Square::WhiteMan => Square::WhiteKing,
            Square::BlackMan => Square::BlackKing,
            other => other,
        }
    }

    /// Material weight: a king counts double.
    pub fn material(self) -> i32 {
        i32::from(self.to_i8()).abs()
    }

    /// Diagonal steps this piece may take. Men only move towards the
    /// opponent's home row.
    pub fn directions(self) -> &'static [(i32, i32)] {
        match self {
            Square::Empty => &[],
            Square::WhiteMan => &MAN_DIRS,
            Square::BlackMan => &BLACK_MAN_DIRS,
            Square::WhiteKing | Square::BlackKing => &KING_DIRS,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Square::Empty => ' ',
            Square::WhiteMan => '⛀',
            Square::WhiteKing => '⛁',
            Square::BlackMan => '⛂',
            Square::BlackKing => '⛃',
        }
    }
}
