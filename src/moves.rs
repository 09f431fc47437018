use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A board coordinate as (row, col). Row 0 is White's home row.
pub type Pos = (usize, usize);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Move {
    pub from: Pos,
    pub to: Pos,
}

impl Move {
    pub fn new(from: Pos, to: Pos) -> Move {
        Move { from, to }
    }

    /// A jump covers two rows and captures the piece it passes over.
    pub fn is_jump(&self) -> bool {
        self.from.0.abs_diff(self.to.0) == 2
    }

    /// Square of the captured piece, if this is a jump.
    pub fn captured(&self) -> Option<Pos> {
        if self.is_jump() {
            Some(((self.from.0 + self.to.0) / 2, (self.from.1 + self.to.1) / 2))
        } else {
            None
        }
    }

    /// Wire form: `[[from_row, from_col], [to_row, to_col]]`.
    pub fn to_pairs(&self) -> [[usize; 2]; 2] {
        [[self.from.0, self.from.1], [self.to.0, self.to.1]]
    }

    pub fn from_pairs(pairs: [[usize; 2]; 2]) -> Move {
        Move {
            from: (pairs[0][0], pairs[0][1]),
            to: (pairs[1][0], pairs[1][1]),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})->({},{})",
            self.from.0, self.from.1, self.to.0, self.to.1
        )
    }
}

impl Serialize for Move {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_pairs().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Move {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[[usize; 2]; 2]>::deserialize(deserializer).map(Move::from_pairs)
    }
}
