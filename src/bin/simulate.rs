use std::io::Write;

use damas::board::Board;
use damas::display::NoDisplay;
use damas::engine::AiConfig;
use damas::game::{Game, GameResult};
use damas::piece::Color;
use damas::player::{Player, PlayerKind};

const GAMES_PER_MATCHUP: u64 = 10;

#[derive(Debug, Default, PartialEq)]
struct MatchResult {
    a_wins: u32,
    b_wins: u32,
    draws: u32,
    /// Games that stopped on an error and have no result.
    aborted: u32,
}

impl MatchResult {
    /// Count one game, seen from entrant A who played `a_side`.
    fn record(&mut self, outcome: Option<GameResult>, a_side: Color) {
        match outcome {
            Some(GameResult::Winner(winner)) if winner == a_side => self.a_wins += 1,
            Some(GameResult::Winner(_)) => self.b_wins += 1,
            Some(GameResult::Draw) => self.draws += 1,
            None => self.aborted += 1,
        }
    }
}

/// A player configuration taking part in the tournament.
#[derive(Clone, Debug)]
struct Entrant {
    label: &'static str,
    kind: PlayerKind,
    config: AiConfig,
}

impl Entrant {
    fn minimax(label: &'static str, depth: u32, conservative: bool) -> Self {
        Entrant {
            label,
            kind: PlayerKind::Minimax,
            config: AiConfig {
                depth,
                conservative,
            },
        }
    }

    fn random(label: &'static str) -> Self {
        Entrant {
            label,
            kind: PlayerKind::Random,
            config: AiConfig::default(),
        }
    }

    fn player(&self, side: Color, seed: u64) -> Player {
        Player::from_kind(self.kind, side, &self.config, seed)
    }
}

fn play_game(white: &Entrant, black: &Entrant, seed: u64) -> Option<GameResult> {
    let mut game = Game::new(
        Board::new(),
        white.player(Color::White, seed),
        black.player(Color::Black, seed.wrapping_add(1)),
    );
    match game.run(&mut NoDisplay) {
        Ok(record) => Some(record.result),
        Err(err) => {
            eprintln!("  game aborted: {err}");
            None
        }
    }
}

fn run_matchup(a: &Entrant, b: &Entrant, num_games: u64) -> MatchResult {
    let mut result = MatchResult::default();
    let half = num_games / 2;

    // A as white, B as black
    for seed in 0..half {
        result.record(play_game(a, b, seed), Color::White);
    }

    // B as white, A as black
    for seed in half..num_games {
        result.record(play_game(b, a, seed), Color::Black);
    }

    println!(
        "  {} vs {}: {} wins {}, {} wins {}, draws {}, aborted {} (out of {num_games})",
        a.label,
        b.label,
        a.label,
        result.a_wins,
        b.label,
        result.b_wins,
        result.draws,
        result.aborted
    );
    std::io::stdout().flush().ok();
    result
}

fn main() {
    println!("=== Checkers player tournament ===");
    println!("Games per matchup: {GAMES_PER_MATCHUP}, colours swapped halfway\n");

    let entrants = vec![
        Entrant::random("random"),
        Entrant::minimax("d1", 1, false),
        Entrant::minimax("d2", 2, false),
        Entrant::minimax("d2_cons", 2, true),
        Entrant::minimax("d4", 4, false),
        Entrant::minimax("d4_cons", 4, true),
    ];

    println!("--- Round robin ---\n");
    let mut scores: Vec<(&str, i32)> = entrants.iter().map(|e| (e.label, 0)).collect();

    for i in 0..entrants.len() {
        for j in (i + 1)..entrants.len() {
            let result = run_matchup(&entrants[i], &entrants[j], GAMES_PER_MATCHUP);
            let net = result.a_wins as i32 - result.b_wins as i32;
            scores[i].1 += net;
            scores[j].1 -= net;
        }
    }

    scores.sort_by(|a, b| b.1.cmp(&a.1));

    println!("\n--- Rankings (net wins) ---\n");
    for (label, net) in &scores {
        let indicator = if *net > 0 {
            "+"
        } else if *net < 0 {
            ""
        } else {
            " "
        };
        println!("  {indicator}{net:>3}  {label}");
    }
}
