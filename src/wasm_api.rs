use crate::board::{Board, MoveOutcome};
use crate::engine::{AiConfig, SearchEngine};
use crate::game::GameResult;
use crate::moves::Move;
use crate::piece::Color;
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct BoardState {
    squares: Vec<Vec<i8>>,
    current_turn: String,
    loop_count: u32,
    in_chain: bool,
    game_over: bool,
    result: Option<String>,
    legal_moves: Vec<Move>,
    last_move: Option<Move>,
}

#[derive(Serialize)]
struct MoveResult {
    #[serde(flatten)]
    board_state: Option<BoardState>,
    error: Option<String>,
}

fn color_to_string(c: Color) -> String {
    match c {
        Color::White => "White".to_string(),
        Color::Black => "Black".to_string(),
    }
}

fn result_to_string(result: GameResult) -> String {
    match result {
        GameResult::Winner(color) => format!("{} wins", color_to_string(color)),
        GameResult::Draw => "Draw".to_string(),
    }
}

#[wasm_bindgen]
pub struct Game {
    board: Board,
    ai_config: AiConfig,
    engine_seed: u64,
    result: Option<GameResult>,
    last_move: Option<Move>,
    last_evals: u64,
}

impl Game {
    fn build_board_state(&self) -> BoardState {
        let legal_moves = if self.result.is_some() {
            Vec::new()
        } else {
            self.board.legal_moves()
        };
        BoardState {
            squares: self.board.rows(),
            current_turn: color_to_string(self.board.current_turn),
            loop_count: self.board.loop_count,
            in_chain: self.board.in_chain(),
            game_over: self.result.is_some(),
            result: self.result.map(result_to_string),
            legal_moves,
            last_move: self.last_move,
        }
    }

    fn state_value(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.build_board_state()).unwrap_or(JsValue::NULL)
    }

    fn error_value(message: &str) -> JsValue {
        let err = MoveResult {
            board_state: None,
            error: Some(message.to_string()),
        };
        serde_wasm_bindgen::to_value(&err).unwrap_or(JsValue::NULL)
    }

    /// Apply a legal move and settle the game result if the side now to
    /// move is stuck or the position is drawn.
    fn play(&mut self, mv: Move) {
        self.last_move = Some(mv);
        match self.board.apply_move(&mv) {
            MoveOutcome::Draw => self.result = Some(GameResult::Draw),
            MoveOutcome::Continue(_) => {}
            MoveOutcome::TurnPassed => {
                if self.board.legal_moves().is_empty() {
                    let winner = self.board.current_turn.opposite();
                    self.result = Some(GameResult::Winner(winner));
                }
            }
        }
    }
}

#[wasm_bindgen]
impl Game {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Game {
        Game {
            board: Board::new(),
            ai_config: AiConfig::new(),
            engine_seed: js_sys::Date::now() as u64,
            result: None,
            last_move: None,
            last_evals: 0,
        }
    }

    pub fn set_depth(&mut self, depth: u32) {
        self.ai_config.depth = depth.clamp(1, 8);
    }

    pub fn set_conservative(&mut self, conservative: bool) {
        self.ai_config.conservative = conservative;
    }

    pub fn get_board_state(&self) -> JsValue {
        self.state_value()
    }

    pub fn make_move(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
    ) -> JsValue {
        if self.result.is_some() {
            return Self::error_value("Game is already over");
        }

        let requested = Move::new((from_row, from_col), (to_row, to_col));
        if !self.board.legal_moves().contains(&requested) {
            return Self::error_value("Illegal move");
        }
        self.play(requested);
        self.state_value()
    }

    /// Let the engine play for the side to move. Only one jump of a chain
    /// is made per call, so the front end can animate each step.
    pub fn make_ai_move(&mut self) -> JsValue {
        if self.result.is_some() {
            return self.state_value();
        }

        let moves = self.board.legal_moves();
        self.engine_seed = self.engine_seed.wrapping_add(1);
        let mut engine =
            SearchEngine::new(self.board.current_turn, self.ai_config.clone(), self.engine_seed);
        let result = engine.search(&self.board, &moves);
        self.last_evals = result.evals;
        if let Some(mv) = result.mv {
            self.play(mv);
        }
        self.state_value()
    }

    pub fn get_legal_moves_for_square(&self, row: usize, col: usize) -> JsValue {
        let targets: Vec<[usize; 2]> = self
            .board
            .legal_moves()
            .iter()
            .filter(|m| m.from == (row, col))
            .map(|m| [m.to.0, m.to.1])
            .collect();
        serde_wasm_bindgen::to_value(&targets).unwrap_or(JsValue::NULL)
    }

    pub fn get_last_evals(&self) -> u64 {
        self.last_evals
    }
}
