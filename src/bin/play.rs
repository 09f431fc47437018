//! Play a game of checkers in the terminal, headless, or over the JSON
//! protocol on stdin/stdout.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use damas::board::Board;
use damas::display::{Display, NoDisplay, RawKeys, TerminalDisplay};
use damas::engine::AiConfig;
use damas::game::{Game, GameResult};
use damas::piece::Color;
use damas::player::{Player, PlayerKind};
use damas::protocol::JsonDisplay;
use tracing::info;
use tracing_subscriber::EnvFilter;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Checkers against the computer, another human, or a remote front end.
#[derive(Parser, Debug)]
#[command(name = "play")]
#[command(version, long_version = LONG_VERSION)]
struct Cli {
    /// Who plays White: human, random or minimax
    #[arg(long, default_value = "human")]
    white: PlayerKind,

    /// Who plays Black: human, random or minimax
    #[arg(long, default_value = "minimax")]
    black: PlayerKind,

    /// Search depth for minimax players (overrides the config file)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Seed for the players' random generators
    #[arg(short, long, default_value = "1")]
    seed: u64,

    /// Make minimax players reluctant to trade pieces
    #[arg(long)]
    conservative: bool,

    /// Run without a display (AI players only)
    #[arg(long, conflicts_with = "json")]
    headless: bool,

    /// Speak the JSON protocol on stdin/stdout; players come from the
    /// opening new_game message
    #[arg(long)]
    json: bool,

    /// JSON file holding an AI configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn ai_config(&self) -> Result<AiConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => AiConfig::default(),
        };
        if let Some(depth) = self.depth {
            config.depth = depth;
        }
        if self.conservative {
            config.conservative = true;
        }
        Ok(config)
    }
}

fn players(white: PlayerKind, black: PlayerKind, config: &AiConfig, seed: u64) -> (Player, Player) {
    (
        Player::from_kind(white, Color::White, config, seed),
        Player::from_kind(black, Color::Black, config, seed),
    )
}

fn play(white: Player, black: Player, display: &mut dyn Display) -> Result<GameResult> {
    let mut game = Game::new(Board::new(), white, black);
    let record = game.run(display)?;
    info!(result = ?record.result, loops = record.loops, "finished");
    Ok(record.result)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = cli.ai_config()?;
    info!(?config, "AI configuration");

    let result = if cli.json {
        let mut display = JsonDisplay::new(io::stdin().lock(), io::stdout().lock());
        let (white, black) = display.read_new_game()?;
        let (white, black) = players(white, black, &config, cli.seed);
        play(white, black, &mut display)?
    } else if cli.headless {
        if cli.white == PlayerKind::Human || cli.black == PlayerKind::Human {
            bail!("a headless game needs two computer players");
        }
        let (white, black) = players(cli.white, cli.black, &config, cli.seed);
        play(white, black, &mut NoDisplay)?
    } else {
        let mut display = TerminalDisplay::new(RawKeys::new()?, io::stdout().lock());
        let (white, black) = players(cli.white, cli.black, &config, cli.seed);
        play(white, black, &mut display)?
    };

    if cli.headless {
        println!("{}", result.code());
    }
    Ok(())
}
