//! The turn loop: asks players for moves, applies them, and reports to the
//! display until one side cannot move or the game is drawn.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::board::{Board, MoveOutcome};
use crate::display::Display;
use crate::error::GameError;
use crate::moves::Move;
use crate::piece::Color;
use crate::player::Player;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum GameResult {
    Winner(Color),
    Draw,
}

impl GameResult {
    /// +1 if White won, -1 if Black won, 0 for a draw.
    pub fn code(self) -> i8 {
        match self {
            GameResult::Winner(color) => color.sign(),
            GameResult::Draw => 0,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameState {
    /// `Color` starts a new turn.
    AwaitingMove(Color),
    /// `Color` is in the middle of a capture chain and must pick one of
    /// these jumps.
    ChainContinuation(Color, Vec<Move>),
    GameOver(GameResult),
}

/// Final result and the number of rounds played.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GameRecord {
    pub result: GameResult,
    pub loops: u32,
}

pub struct Game {
    board: Board,
    players: [Player; 2],
    state: GameState,
}

impl Game {
    pub fn new(board: Board, white: Player, black: Player) -> Self {
        let state = GameState::AwaitingMove(board.current_turn);
        Game {
            board,
            players: [white, black],
            state,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self, color: Color) -> &Player {
        &self.players[color.index()]
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::GameOver(_))
    }

    /// Play until the game is over.
    #[instrument(skip_all)]
    pub fn run(&mut self, display: &mut dyn Display) -> Result<GameRecord, GameError> {
        info!(
            white = ?self.players[0].kind(),
            black = ?self.players[1].kind(),
            "new game"
        );
        display.render_board(&self.board)?;
        loop {
            if let GameState::GameOver(result) = *self.step(display)? {
                let record = GameRecord {
                    result,
                    loops: self.board.loop_count,
                };
                info!(?record.result, loops = record.loops, "game over");
                return Ok(record);
            }
        }
    }

    /// Perform one transition of the state machine and return the new state.
    ///
    /// The state always agrees with the board. An error before a move is
    /// applied leaves both untouched; once a move is applied the new state is
    /// recorded before the display is told about it, so a display failure
    /// never leaves the side to move out of step with the board.
    pub fn step(&mut self, display: &mut dyn Display) -> Result<&GameState, GameError> {
        match self.state.clone() {
            GameState::AwaitingMove(side) => {
                let moves = self.board.legal_moves();
                if moves.is_empty() {
                    self.finish(GameResult::Winner(side.opposite()), display)?;
                } else {
                    display.new_turn(side)?;
                    self.play(side, moves, display)?;
                }
            }
            GameState::ChainContinuation(side, moves) => self.play(side, moves, display)?,
            GameState::GameOver(_) => {}
        }
        Ok(&self.state)
    }

    fn play(
        &mut self,
        side: Color,
        moves: Vec<Move>,
        display: &mut dyn Display,
    ) -> Result<(), GameError> {
        let mv = self.players[side.index()].choose_move(&self.board, &moves, display)?;
        if !moves.contains(&mv) {
            return Err(GameError::IllegalMove { mv });
        }

        let outcome = self.board.apply_move(&mv);
        debug!(?side, %mv, ?outcome, "move applied");
        self.state = match outcome {
            MoveOutcome::Continue(more) => GameState::ChainContinuation(side, more),
            MoveOutcome::Draw => GameState::GameOver(GameResult::Draw),
            MoveOutcome::TurnPassed => GameState::AwaitingMove(side.opposite()),
        };

        display.render_board(&self.board)?;
        match &self.state {
            GameState::GameOver(result) => display.end_game(*result)?,
            GameState::AwaitingMove(_) => display.end_turn(side)?,
            GameState::ChainContinuation(..) => {}
        }
        Ok(())
    }

    fn finish(&mut self, result: GameResult, display: &mut dyn Display) -> Result<(), GameError> {
        self.state = GameState::GameOver(result);
        display.end_game(result)?;
        Ok(())
    }
}
