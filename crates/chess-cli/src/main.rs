//! chess-rules - command-line front end for the rules engine.
//!
//! Reads FEN, coordinate moves and PGN; prints positions, legal
//! destinations and normalized PGN.

mod config;

use anyhow::{bail, Context};
use chess_engine::{Board, EngineMove, Game, MoveFormat, Square};
use clap::{Parser, Subcommand};
use config::ChessConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chess-rules")]
#[command(about = "Chess rules: legality, notation and PGN")]
struct Cli {
    /// Configuration file (defaults to ./chess.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a PGN game and print its final FEN
    Fen {
        /// PGN file
        pgn: PathBuf,
    },
    /// Print the squares a piece can legally move to
    Moves {
        /// Position in FEN
        fen: String,
        /// Square of the piece, e.g. e2
        square: String,
    },
    /// Play moves and print the resulting game as PGN
    Play {
        /// Starting position in FEN
        #[arg(long)]
        fen: Option<String>,
        /// Notation of the moves (engine, san or auto)
        #[arg(long)]
        format: Option<String>,
        /// Moves separated by spaces, or one coordinate string like e2e4e7e5
        moves: String,
    },
    /// Re-emit a PGN file with canonical tags and wrapping
    Convert {
        /// PGN file
        pgn: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ChessConfig::load(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Fen { pgn } => {
            let game = load_game(&pgn)?;
            println!("{}", game.to_fen());
        }
        Commands::Moves { fen, square } => {
            let mut board = Board::from_fen_str(&fen)?;
            let Some(from) = Square::from_algebraic(&square) else {
                bail!("not a square: {square}");
            };
            let destinations: Vec<String> = board
                .allowed_destinations(from)
                .into_iter()
                .map(Square::to_algebraic)
                .collect();
            println!("{}", destinations.join(" "));
        }
        Commands::Play { fen, format, moves } => {
            let format = match format {
                Some(name) => parse_format(&name)?,
                None => config.format,
            };
            let mut game = play(fen.as_deref(), format, &moves)?;
            config.pgn.fill_tags(game.tags_mut());
            print!("{}", game.to_pgn(&config.pgn.options));
        }
        Commands::Convert { pgn } => {
            let text = read(&pgn)?;
            let games = Game::from_pgn_many(&text)
                .with_context(|| format!("reading {}", pgn.display()))?;
            tracing::info!("converting {} games", games.len());
            for (index, mut game) in games.into_iter().enumerate() {
                if index > 0 {
                    println!();
                }
                config.pgn.fill_tags(game.tags_mut());
                print!("{}", game.to_pgn(&config.pgn.options));
                println!("; {}", game.engine_moves());
            }
        }
    }
    Ok(())
}

fn read(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_game(path: &Path) -> anyhow::Result<Game> {
    let text = read(path)?;
    Game::from_pgn(&text).with_context(|| format!("reading {}", path.display()))
}

fn parse_format(name: &str) -> anyhow::Result<MoveFormat> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "engine" => MoveFormat::Engine,
        "san" => MoveFormat::San,
        "auto" => MoveFormat::Auto,
        other => bail!("unknown move format: {other}"),
    })
}

/// Splits `moves` into move texts. A single token is tried as a
/// delimiter-free coordinate sequence first.
fn split_moves(moves: &str) -> Vec<String> {
    let tokens: Vec<&str> = moves.split_whitespace().collect();
    if let [single] = tokens.as_slice() {
        if let Ok(sequence) = EngineMove::parse_sequence(single) {
            return sequence.iter().map(ToString::to_string).collect();
        }
    }
    tokens.into_iter().map(str::to_string).collect()
}

fn play(fen: Option<&str>, format: MoveFormat, moves: &str) -> anyhow::Result<Game> {
    let game = match fen {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };
    let mut game = game.with_format(format);
    for (ply, text) in split_moves(moves).iter().enumerate() {
        game.play(text)
            .with_context(|| format!("move {} ({text})", ply + 1))?;
    }
    Ok(game)
}
