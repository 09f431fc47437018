use std::io::Cursor;

use damas::board::{Board, MoveOutcome, NUM_COLS, NUM_ROWS};
use damas::game::{Game, GameResult};
use damas::moves::Move;
use damas::piece::{Color, Square};
use damas::player::Player;
use damas::protocol::JsonDisplay;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

/// Upper bound on moves in a playout. The inactivity rule ends every game
/// long before this.
const MAX_PLIES: usize = 5_000;

fn side_has_capture(board: &Board) -> bool {
    (0..NUM_ROWS)
        .flat_map(|r| (0..NUM_COLS).map(move |c| (r, c)))
        .filter(|&pos| board.get(pos).color() == Some(board.current_turn))
        .any(|pos| !board.jumps_from(pos).is_empty())
}

fn no_uncrowned_men(board: &Board) -> bool {
    (0..NUM_COLS).all(|c| {
        board.get((Color::White.crowning_row(), c)) != Square::WhiteMan
            && board.get((Color::Black.crowning_row(), c)) != Square::BlackMan
    })
}

/// Play random legal moves from the opening, checking the move rules at
/// every step. Returns true if the game ended by a draw.
fn checked_playout(seed: u64) -> bool {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = Board::new();

    for _ in 0..MAX_PLIES {
        let moves = board.legal_moves();
        if moves.is_empty() {
            assert!(!board.in_chain(), "a chain always has a next jump");
            return false;
        }

        let side = board.current_turn;
        if !board.in_chain() {
            assert_eq!(
                side_has_capture(&board),
                moves.iter().all(Move::is_jump),
                "captures are forced and only forced when available"
            );
        }
        for m in &moves {
            assert_eq!(board.get(m.from).color(), Some(side));
            assert!(m.to.0 < NUM_ROWS && m.to.1 < NUM_COLS);
            assert!(board.get(m.to).is_empty());
        }

        let mv = moves[rng.gen_range(0..moves.len())];
        let was_king = board.get(mv.from).is_king();
        let before = board.piece_count();
        let outcome = board.apply_move(&mv);

        let expected_loss = usize::from(mv.is_jump());
        assert_eq!(before - board.piece_count(), expected_loss);
        assert!(no_uncrowned_men(&board));
        if was_king {
            assert!(board.get(mv.to).is_king(), "kings are never uncrowned");
        }

        match outcome {
            MoveOutcome::Continue(more) => {
                assert!(mv.is_jump());
                assert_eq!(board.current_turn, side);
                assert!(more.iter().all(|m| m.from == mv.to && m.is_jump()));
                assert_eq!(board.legal_moves(), more);
            }
            MoveOutcome::TurnPassed => {
                assert_eq!(board.current_turn, side.opposite());
                assert!(!board.draws());
            }
            MoveOutcome::Draw => {
                assert!(board.draws());
                return true;
            }
        }
    }
    panic!("playout with seed {seed} did not finish");
}

#[test]
fn random_playouts_respect_the_rules() {
    for seed in 0..40 {
        checked_playout(seed);
    }
}

#[test]
fn opening_position() {
    let board = Board::new();
    assert_eq!(board.count(Square::WhiteMan), 12);
    assert_eq!(board.count(Square::BlackMan), 12);
    assert_eq!(board.current_turn, Color::White);
    assert_eq!(board.loop_count, 1);
    for r in 0..NUM_ROWS {
        for c in 0..NUM_COLS {
            let sq = board.get((r, c));
            if !sq.is_empty() {
                assert_eq!((r + c) % 2, 0, "pieces stand on dark squares only");
            }
            match sq.color() {
                Some(Color::White) => assert!(r <= 2),
                Some(Color::Black) => assert!(r >= 5),
                None => {}
            }
        }
    }
    let moves = board.legal_moves();
    assert_eq!(moves.len(), 7);
    assert!(moves.iter().all(|m| m.from.0 == 2 && m.to.0 == 3));
}

#[test]
fn every_opening_move_leaves_black_a_reply() {
    let opening = Board::new();
    let moves = opening.legal_moves();
    assert_eq!(moves.len(), 7);
    for mv in moves {
        let mut board = opening.clone();
        assert_eq!(board.apply_move(&mv), MoveOutcome::TurnPassed, "{mv}");
        assert_eq!(board.current_turn, Color::Black);
        let replies = board.legal_moves();
        assert!(!replies.is_empty(), "Black is stuck after {mv}");
        assert!(replies.iter().all(|r| !r.is_jump()), "no capture is possible after {mv}");
        assert!(replies.iter().all(|r| r.from.0 == 5 && r.to.0 == 4));
    }
}

#[test]
fn double_capture_is_one_turn() {
    let mut board = Board::empty();
    board.set((0, 0), Square::WhiteMan);
    board.set((1, 1), Square::BlackMan);
    board.set((3, 3), Square::BlackMan);
    board.set((7, 7), Square::BlackMan);
    board.reset_history();

    let first = Move::new((0, 0), (2, 2));
    assert_eq!(board.legal_moves(), vec![first]);
    let outcome = board.try_apply_move(&first).unwrap();
    assert_eq!(outcome, MoveOutcome::Continue(vec![Move::new((2, 2), (4, 4))]));
    assert_eq!(board.loop_count, 1);

    let second = Move::new((2, 2), (4, 4));
    assert_eq!(board.try_apply_move(&second).unwrap(), MoveOutcome::TurnPassed);
    assert_eq!(board.current_turn, Color::Black);
    assert_eq!(board.count(Square::BlackMan), 1);
    assert_eq!(board.get((4, 4)), Square::WhiteMan);
    assert_eq!(board.turns_since_capture[Color::White.index()], 0);
    assert_eq!(board.position_history, vec![board.squares]);
}

#[test]
fn shuffling_kings_draw_by_repetition() {
    let mut board = Board::empty();
    board.set((0, 0), Square::WhiteKing);
    board.set((7, 7), Square::BlackKing);
    board.reset_history();

    let cycle = [
        Move::new((0, 0), (1, 1)),
        Move::new((7, 7), (6, 6)),
        Move::new((1, 1), (0, 0)),
        Move::new((6, 6), (7, 7)),
    ];
    let mut outcomes = Vec::new();
    for mv in cycle.iter().chain(cycle.iter()) {
        outcomes.push(board.try_apply_move(mv).unwrap());
    }

    // The opening grid is seen for the third time after the eighth turn.
    assert!(outcomes[..7].iter().all(|o| *o == MoveOutcome::TurnPassed));
    assert_eq!(outcomes[7], MoveOutcome::Draw);
    assert!(board.is_repetition());
    assert!(!board.is_inactive());
}

#[test]
fn game_over_json_stream() {
    let acks = "ok\n".repeat(MAX_PLIES);
    let mut display = JsonDisplay::new(Cursor::new(acks.into_bytes()), Vec::new());
    let mut game = Game::new(Board::new(), Player::random(7), Player::random(8));
    let record = game.run(&mut display).unwrap();

    let (_, out) = display.into_inner();
    let events: Vec<Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events[0]["event"], "render_board");
    assert_eq!(events[1]["event"], "new_turn");
    assert_eq!(events[1]["player"], 1);

    let last = events.last().unwrap();
    assert_eq!(last["event"], "end_game");
    assert_eq!(last["winner"], i64::from(record.result.code()));
    assert!(events.iter().all(|e| e["event"] != "select_move"));

    if let GameResult::Winner(winner) = record.result {
        let loser = winner.opposite();
        assert!(game.board().legal_moves().is_empty());
        assert_eq!(game.board().current_turn, loser);
    }
}
