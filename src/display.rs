//! Display collaborators: everything the game loop needs from a user
//! interface.

use std::io::Write;

use tracing::{debug, instrument, warn};

use crate::board::{Board, NUM_COLS, NUM_ROWS};
use crate::error::DisplayError;
use crate::game::GameResult;
use crate::moves::Move;
use crate::piece::Color;

/// Keys used to pick a move, in the order moves are listed.
pub const KEY_ALPHABET: &str = "1234567890qwertyuiopasdfghjklzxcvbnm";

/// Key for the move at `index`, if the alphabet is long enough.
pub fn key_for(index: usize) -> Option<char> {
    KEY_ALPHABET.chars().nth(index)
}

/// Index of the move bound to `key` (case-insensitive).
pub fn index_for(key: char) -> Option<usize> {
    let key = key.to_ascii_lowercase();
    KEY_ALPHABET.chars().position(|k| k == key)
}

pub trait Display {
    fn render_board(&mut self, board: &Board) -> Result<(), DisplayError>;

    /// Show a message. When `confirm` is set, block until the user
    /// acknowledges it.
    fn notify(&mut self, message: &str, confirm: bool) -> Result<(), DisplayError>;

    /// Ask the user to pick one of `moves`. Must return one of them.
    fn select_move(&mut self, moves: &[Move]) -> Result<Move, DisplayError>;

    fn new_turn(&mut self, color: Color) -> Result<(), DisplayError> {
        self.notify(&format!("TURN FOR {}", color.name()), false)
    }

    fn end_turn(&mut self, _color: Color) -> Result<(), DisplayError> {
        Ok(())
    }

    fn end_game(&mut self, result: GameResult) -> Result<(), DisplayError> {
        let message = match result {
            GameResult::Winner(color) => format!("{} WIN", color.name()),
            GameResult::Draw => "DRAW".to_string(),
        };
        self.notify(&message, true)
    }
}

/// Headless display for benchmarks and AI-only games.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDisplay;

impl Display for NoDisplay {
    fn render_board(&mut self, _board: &Board) -> Result<(), DisplayError> {
        Ok(())
    }

    fn notify(&mut self, _message: &str, _confirm: bool) -> Result<(), DisplayError> {
        Ok(())
    }

    fn select_move(&mut self, _moves: &[Move]) -> Result<Move, DisplayError> {
        Err(DisplayError::NoInput)
    }
}

/// Source of single keypresses for [`TerminalDisplay`].
pub trait KeyInput {
    /// Block until the next key is pressed. Quitting (Esc, Ctrl-C or the end
    /// of input) is reported as [`DisplayError::Closed`].
    fn read_key(&mut self) -> Result<char, DisplayError>;
}

/// Keypresses from the real terminal. Raw mode is on for as long as this
/// value lives, so a key is delivered without waiting for Enter.
#[cfg(not(target_arch = "wasm32"))]
pub struct RawKeys {
    _raw: (),
}

#[cfg(not(target_arch = "wasm32"))]
impl RawKeys {
    pub fn new() -> Result<Self, DisplayError> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(RawKeys { _raw: () })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for RawKeys {
    fn drop(&mut self) {
        if let Err(err) = crossterm::terminal::disable_raw_mode() {
            warn!(%err, "failed to restore the terminal");
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyInput for RawKeys {
    fn read_key(&mut self) -> Result<char, DisplayError> {
        use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

        loop {
            let Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) = event::read()?
            else {
                continue;
            };
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(DisplayError::Closed)
                }
                KeyCode::Esc => return Err(DisplayError::Closed),
                KeyCode::Char(c) => return Ok(c),
                KeyCode::Enter => return Ok('\n'),
                _ => {}
            }
        }
    }
}

/// Key that shows the next page when there are more moves than keys.
pub const NEXT_PAGE_KEY: char = ' ';

/// Terminal display driven by single keypresses. The board is drawn with
/// row 7 at the top; moves are listed one per line with their key and
/// picked by pressing it. Lines end in `\r\n` so output stays aligned in
/// raw mode.
pub struct TerminalDisplay<K, W> {
    keys: K,
    output: W,
}

impl<K: KeyInput, W: Write> TerminalDisplay<K, W> {
    pub fn new(keys: K, output: W) -> Self {
        TerminalDisplay { keys, output }
    }

    pub fn into_inner(self) -> (K, W) {
        (self.keys, self.output)
    }

    fn line(&mut self, text: &str) -> Result<(), DisplayError> {
        write!(self.output, "{text}\r\n")?;
        Ok(())
    }
}

impl<K: KeyInput, W: Write> Display for TerminalDisplay<K, W> {
    fn render_board(&mut self, board: &Board) -> Result<(), DisplayError> {
        self.line("")?;
        for row in (0..NUM_ROWS).rev() {
            let mut text = format!("{row} |");
            for col in 0..NUM_COLS {
                text.push(board.squares[row][col].glyph());
                text.push('|');
            }
            self.line(&text)?;
        }
        let footer: String = (0..NUM_COLS).map(|col| format!("{col} ")).collect();
        self.line(&format!("   {footer}"))?;
        self.output.flush()?;
        Ok(())
    }

    fn notify(&mut self, message: &str, confirm: bool) -> Result<(), DisplayError> {
        if confirm {
            self.line(&format!("{message} - PRESS ANY KEY TO CONTINUE"))?;
            self.output.flush()?;
            self.keys.read_key()?;
        } else {
            self.line(message)?;
            self.output.flush()?;
        }
        Ok(())
    }

    #[instrument(skip_all, fields(candidates = moves.len()))]
    fn select_move(&mut self, moves: &[Move]) -> Result<Move, DisplayError> {
        let pages: Vec<&[Move]> = moves.chunks(KEY_ALPHABET.len()).collect();
        if pages.is_empty() {
            return Err(DisplayError::Malformed {
                reason: "no moves to choose from".to_string(),
            });
        }

        let mut page = 0;
        loop {
            self.line("")?;
            for (m, key) in pages[page].iter().zip(KEY_ALPHABET.chars()) {
                self.line(&format!("{}: {m}", key.to_ascii_uppercase()))?;
            }
            if pages.len() > 1 {
                self.line(&format!(
                    "SPACE: more moves (page {} of {})",
                    page + 1,
                    pages.len()
                ))?;
            }
            self.output.flush()?;

            loop {
                let key = self.keys.read_key()?;
                if key == NEXT_PAGE_KEY && pages.len() > 1 {
                    page = (page + 1) % pages.len();
                    break;
                }
                match index_for(key).filter(|&i| i < pages[page].len()) {
                    Some(i) => return Ok(pages[page][i]),
                    None => debug!(?key, "unmapped key, waiting for another"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Replays a fixed sequence of keypresses, then reports the input closed.
    struct Keys(VecDeque<char>);

    impl KeyInput for Keys {
        fn read_key(&mut self) -> Result<char, DisplayError> {
            self.0.pop_front().ok_or(DisplayError::Closed)
        }
    }

    fn terminal(keys: &str) -> TerminalDisplay<Keys, Vec<u8>> {
        TerminalDisplay::new(Keys(keys.chars().collect()), Vec::new())
    }

    fn output(display: TerminalDisplay<Keys, Vec<u8>>) -> (String, Vec<char>) {
        let (keys, out) = display.into_inner();
        (String::from_utf8(out).unwrap(), keys.0.into_iter().collect())
    }

    #[test]
    fn keys_map_both_ways() {
        assert_eq!(key_for(0), Some('1'));
        assert_eq!(key_for(10), Some('q'));
        assert_eq!(index_for('Q'), Some(10));
        assert_eq!(index_for('!'), None);
        assert_eq!(key_for(KEY_ALPHABET.len()), None);
    }

    #[test]
    fn renders_top_row_first() {
        let mut display = terminal("");
        display.render_board(&Board::new()).unwrap();
        let (text, _) = output(display);
        assert!(text.ends_with("\r\n"));
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert!(lines[0].starts_with("7 |"));
        assert!(lines[7].starts_with("0 |"));
        assert!(lines[7].contains('⛀'));
        assert!(lines[0].contains('⛂'));
    }

    #[test]
    fn a_single_keypress_selects() {
        let moves = [Move::new((2, 0), (3, 1)), Move::new((2, 2), (3, 3))];
        let mut display = terminal("2q");
        assert_eq!(display.select_move(&moves).unwrap(), moves[1]);
        let (text, rest) = output(display);
        assert!(text.contains("1: (2,0)->(3,1)"));
        assert!(text.contains("2: (2,2)->(3,3)"));
        assert_eq!(rest, vec!['q'], "later keys are left for the next prompt");
    }

    #[test]
    fn ignores_unmapped_keys() {
        let moves = [Move::new((2, 0), (3, 1)), Move::new((2, 2), (3, 3))];
        let mut display = terminal("x9\n1");
        assert_eq!(display.select_move(&moves).unwrap(), moves[0]);
    }

    #[test]
    fn long_move_lists_are_paged() {
        let moves: Vec<Move> = (0..40)
            .map(|i| Move::new((i / NUM_COLS, i % NUM_COLS), (7, 7)))
            .collect();
        let mut display = terminal(" 2");
        assert_eq!(display.select_move(&moves).unwrap(), moves[KEY_ALPHABET.len() + 1]);
        let (text, _) = output(display);
        assert!(text.contains("SPACE: more moves (page 1 of 2)"));
        assert!(text.contains("SPACE: more moves (page 2 of 2)"));
        assert!(text.contains("M: (4,3)->(7,7)"), "last key of the first page");
    }

    #[test]
    fn space_is_ignored_on_a_single_page() {
        let moves = [Move::new((2, 0), (3, 1))];
        let mut display = terminal(" 1");
        assert_eq!(display.select_move(&moves).unwrap(), moves[0]);
        let (text, _) = output(display);
        assert!(!text.contains("SPACE"));
    }

    #[test]
    fn closed_input_is_an_error() {
        let mut display = terminal("z");
        let err = display.select_move(&[Move::new((2, 0), (3, 1))]).unwrap_err();
        assert!(matches!(err, DisplayError::Closed));
    }

    #[test]
    fn confirmed_notice_waits_for_a_key() {
        let mut display = terminal("x");
        display.notify("BLACKS WIN", true).unwrap();
        display.notify("no wait", false).unwrap();
        assert!(matches!(display.notify("again", true), Err(DisplayError::Closed)));
    }

    #[test]
    fn headless_display_cannot_select() {
        let mut display = NoDisplay;
        assert!(display.render_board(&Board::new()).is_ok());
        assert!(matches!(display.select_move(&[]), Err(DisplayError::NoInput)));
    }
}
