//! Time a batch of minimax-vs-minimax games. Each line of output is
//! `game  winner  loops  seconds`, with the winner as 1 (White), -1 (Black)
//! or 0 (draw).

use std::io::{self, Write};
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use damas::board::Board;
use damas::display::NoDisplay;
use damas::engine::AiConfig;
use damas::game::Game;
use damas::piece::Color;
use damas::player::Player;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "benchmark", version)]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value = "10")]
    games: u64,

    /// Search depth for both sides
    #[arg(short, long, default_value = "2")]
    depth: u32,

    #[arg(long)]
    conservative: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = AiConfig {
        depth: args.depth,
        conservative: args.conservative,
    };

    let mut out = io::stdout().lock();
    let mut total_secs = 0.0;
    for i in 0..args.games {
        // Both sides share the game index as their seed.
        let white = Player::minimax(Color::White, config.clone(), i);
        let black = Player::minimax(Color::Black, config.clone(), i);
        let mut game = Game::new(Board::new(), white, black);

        let start = Instant::now();
        let record = game.run(&mut NoDisplay)?;
        let secs = start.elapsed().as_secs_f64();
        total_secs += secs;

        writeln!(out, "{i}\t{}\t{}\t{secs:.4}", record.result.code(), record.loops)?;
        out.flush()?;
    }

    if args.games > 0 {
        eprintln!(
            "{} games in {total_secs:.3}s ({:.4}s per game)",
            args.games,
            total_secs / args.games as f64
        );
    }
    Ok(())
}
