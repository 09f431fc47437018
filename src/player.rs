use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::board::Board;
use crate::display::Display;
use crate::engine::{AiConfig, SearchEngine};
use crate::error::GameError;
use crate::moves::Move;
use crate::piece::Color;

/// Picks uniformly among the legal moves with its own seeded generator.
pub struct RandomPlayer {
    rng: StdRng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        RandomPlayer {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn choose_move(&mut self, moves: &[Move]) -> Option<Move> {
        if moves.is_empty() {
            return None;
        }
        Some(moves[self.rng.gen_range(0..moves.len())])
    }
}

/// Plays the move found by an alpha-beta search.
pub struct MinimaxPlayer {
    engine: SearchEngine,
}

impl MinimaxPlayer {
    pub fn new(side: Color, config: AiConfig, seed: u64) -> Self {
        MinimaxPlayer {
            engine: SearchEngine::new(side, config, seed),
        }
    }

    pub fn engine(&self) -> &SearchEngine {
        &self.engine
    }

    /// A single legal move is returned without searching.
    pub fn choose_move(&mut self, board: &Board, moves: &[Move]) -> Option<Move> {
        match moves {
            [] => None,
            [only] => Some(*only),
            _ => self.engine.search(board, moves).mv,
        }
    }
}

pub enum Player {
    Random(RandomPlayer),
    Minimax(MinimaxPlayer),
    /// Moves are collected from the display.
    Human,
}

impl Player {
    pub fn random(seed: u64) -> Self {
        Player::Random(RandomPlayer::new(seed))
    }

    pub fn minimax(side: Color, config: AiConfig, seed: u64) -> Self {
        Player::Minimax(MinimaxPlayer::new(side, config, seed))
    }

    pub fn from_kind(kind: PlayerKind, side: Color, config: &AiConfig, seed: u64) -> Self {
        match kind {
            PlayerKind::Human => Player::Human,
            PlayerKind::Random => Player::random(seed),
            PlayerKind::Minimax => Player::minimax(side, config.clone(), seed),
        }
    }

    pub fn kind(&self) -> PlayerKind {
        match self {
            Player::Random(_) => PlayerKind::Random,
            Player::Minimax(_) => PlayerKind::Minimax,
            Player::Human => PlayerKind::Human,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Player::Human)
    }

    /// Choose one of `moves` (which must be non-empty) for the side to move
    /// on `board`. A human player blocks on the display until it answers.
    #[instrument(skip_all, fields(kind = ?self.kind(), candidates = moves.len()))]
    pub fn choose_move(
        &mut self,
        board: &Board,
        moves: &[Move],
        display: &mut dyn Display,
    ) -> Result<Move, GameError> {
        let chosen = match self {
            Player::Random(p) => p.choose_move(moves),
            Player::Minimax(p) => p.choose_move(board, moves),
            Player::Human => Some(display.select_move(moves)?),
        };
        match chosen {
            Some(mv) => {
                debug!(%mv, "move chosen");
                Ok(mv)
            }
            None => Err(GameError::NoMoveAvailable),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Random,
    Minimax,
}

impl FromStr for PlayerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(PlayerKind::Human),
            "random" => Ok(PlayerKind::Random),
            "minimax" | "ai" => Ok(PlayerKind::Minimax),
            other => Err(format!("unknown player kind `{other}`")),
        }
    }
}
