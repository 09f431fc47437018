//! Newline-delimited JSON protocol for remote front ends.
//!
//! Every message is an object with an `event` field. Boards travel as rows of
//! small integers (0 empty, ±1 man, ±2 king) and moves as
//! `[[from_row, from_col], [to_row, to_col]]`.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::board::Board;
use crate::display::Display;
use crate::error::DisplayError;
use crate::game::GameResult;
use crate::moves::Move;
use crate::piece::Color;
use crate::player::PlayerKind;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    NewGame {
        player_w: PlayerKind,
        player_b: PlayerKind,
    },
    RenderBoard {
        board: Vec<Vec<i8>>,
    },
    NewTurn {
        player: i8,
    },
    EndTurn {
        player: i8,
    },
    EndGame {
        /// 1 or -1 for the winning side, 0 for a draw.
        winner: i8,
    },
    SelectMove {
        moves: Vec<Move>,
    },
    Notify {
        message: String,
        confirm: bool,
    },
}

/// Display speaking the JSON protocol over any reader/writer pair.
pub struct JsonDisplay<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> JsonDisplay<R, W> {
    pub fn new(input: R, output: W) -> Self {
        JsonDisplay { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    pub fn send(&mut self, event: &Event) -> Result<(), DisplayError> {
        serde_json::to_writer(&mut self.output, event)?;
        writeln!(self.output)?;
        self.output.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, DisplayError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(DisplayError::Closed);
        }
        Ok(line)
    }

    /// Wait for the opening `new_game` message.
    #[instrument(skip_all)]
    pub fn read_new_game(&mut self) -> Result<(PlayerKind, PlayerKind), DisplayError> {
        let line = self.read_line()?;
        match serde_json::from_str::<Event>(line.trim())? {
            Event::NewGame { player_w, player_b } => {
                debug!(?player_w, ?player_b, "new game requested");
                Ok((player_w, player_b))
            }
            other => Err(DisplayError::Malformed {
                reason: format!("expected new_game, got {other:?}"),
            }),
        }
    }
}

/// Parse a `select_move` reply and check it names one of `moves`.
pub fn parse_selection(line: &str, moves: &[Move]) -> Result<Move, DisplayError> {
    let mv: Move = serde_json::from_str(line.trim())?;
    if moves.contains(&mv) {
        Ok(mv)
    } else {
        Err(DisplayError::Malformed {
            reason: format!("{mv} is not one of the offered moves"),
        })
    }
}

impl<R: BufRead, W: Write> Display for JsonDisplay<R, W> {
    /// Sends the grid and waits for the front end to acknowledge it.
    fn render_board(&mut self, board: &Board) -> Result<(), DisplayError> {
        self.send(&Event::RenderBoard {
            board: board.rows(),
        })?;
        self.read_line()?;
        Ok(())
    }

    fn notify(&mut self, message: &str, confirm: bool) -> Result<(), DisplayError> {
        self.send(&Event::Notify {
            message: message.to_string(),
            confirm,
        })?;
        if confirm {
            self.read_line()?;
        }
        Ok(())
    }

    #[instrument(skip_all, fields(candidates = moves.len()))]
    fn select_move(&mut self, moves: &[Move]) -> Result<Move, DisplayError> {
        loop {
            self.send(&Event::SelectMove {
                moves: moves.to_vec(),
            })?;
            let line = self.read_line()?;
            match parse_selection(&line, moves) {
                Ok(mv) => return Ok(mv),
                Err(err) => warn!(%err, input = line.trim(), "rejected move selection"),
            }
        }
    }

    fn new_turn(&mut self, color: Color) -> Result<(), DisplayError> {
        self.send(&Event::NewTurn {
            player: color.sign(),
        })
    }

    fn end_turn(&mut self, color: Color) -> Result<(), DisplayError> {
        self.send(&Event::EndTurn {
            player: color.sign(),
        })
    }

    fn end_game(&mut self, result: GameResult) -> Result<(), DisplayError> {
        self.send(&Event::EndGame {
            winner: result.code(),
        })
    }
}
