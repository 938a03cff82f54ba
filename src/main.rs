use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use maxchess::cli::{self, CliConfig};
use maxchess::search::DEFAULT_TT_MB;
use maxchess::selfplay::{self, SelfPlayConfig};
use maxchess::uci::options::UciOptions;
use maxchess::uci::UciEngine;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Transposition table size in MB
    #[arg(long, global = true, default_value_t = DEFAULT_TT_MB)]
    hash: usize,

    /// Search depth when White is to move
    #[arg(long, global = true, env = "DEPTH_WHITE", default_value_t = 3)]
    depth_white: u32,

    /// Search depth when Black is to move
    #[arg(long, global = true, env = "DEPTH_BLACK", default_value_t = 3)]
    depth_black: u32,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Play against the engine in the terminal
    Cli {
        /// Let the engine take the white pieces
        #[arg(
            long,
            env = "ENGINE_PLAYS_WHITE",
            action = ArgAction::Set,
            value_parser = parse_flag,
            default_value = "0"
        )]
        engine_plays_white: bool,
    },
    /// Engine plays itself and appends the games to a PGN file
    Selfplay(SelfplayArgs),
    /// Speak UCI on stdin/stdout
    Uci,
}

#[derive(Parser, Debug)]
struct SelfplayArgs {
    /// Number of games
    #[arg(long, env = "N_GAMES", default_value_t = 1)]
    games: u32,

    /// Adjudicate a draw after this many plies
    #[arg(long, env = "PLY_LIMIT", default_value_t = 300)]
    ply_limit: u32,

    /// Directory receiving selfplay.pgn
    #[arg(long, env = "OUT_DIR", default_value = "testing/self_play")]
    out_dir: PathBuf,

    /// Omit the eval comments
    #[arg(long)]
    no_annotate: bool,
}

/// Accepts the truthy spellings used in environment variables.
fn parse_flag(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" | "" => Ok(false),
        other => Err(format!("expected a boolean, got '{other}'")),
    }
}

fn init_logging(debug: bool) {
    let log_level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .format(|buf, record| writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args()))
    .write_style(env_logger::WriteStyle::Never)
    .target(env_logger::Target::Stderr)
    .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    // No subcommand: self-play, still honouring its environment variables.
    let mode = args
        .mode
        .unwrap_or_else(|| Mode::Selfplay(SelfplayArgs::parse_from(["selfplay"])));

    match mode {
        Mode::Cli { engine_plays_white } => {
            let config = CliConfig {
                depth_white: args.depth_white,
                depth_black: args.depth_black,
                engine_plays_white,
                tt_mb: args.hash,
            };
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            cli::play(&config, stdin.lock(), &mut stdout).context("interactive game failed")?;
        }
        Mode::Selfplay(sp) => {
            let config = SelfPlayConfig {
                games: sp.games,
                depth_white: args.depth_white,
                depth_black: args.depth_black,
                ply_limit: sp.ply_limit,
                out_dir: sp.out_dir,
                annotate_eval: !sp.no_annotate,
                tt_mb: args.hash,
                ..SelfPlayConfig::default()
            };
            let summary = selfplay::run(&config).context("self-play failed")?;
            println!("{summary}");
        }
        Mode::Uci => {
            let mut engine = UciEngine::new(UciOptions::new(args.hash));
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            engine
                .run(stdin.lock(), &mut stdout)
                .context("UCI loop failed")?;
        }
    }

    Ok(())
}
