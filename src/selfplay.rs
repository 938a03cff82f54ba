//! Engine-vs-engine games exported as PGN.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;

use log::info;
use shakmaty::Color;

use crate::error::PlayError;
use crate::position::Position;
use crate::search::{white_eval, SearchLimits, SearchOutcome, SearchState, DEFAULT_TT_MB};

/// File name of the PGN archive inside the output directory.
pub const PGN_FILE_NAME: &str = "selfplay.pgn";

const PGN_LINE_WIDTH: usize = 80;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelfPlayConfig {
    pub games: u32,
    pub depth_white: u32,
    pub depth_black: u32,
    /// Games reaching this many plies are adjudicated drawn.
    pub ply_limit: u32,
    pub out_dir: PathBuf,
    pub white_name: String,
    pub black_name: String,
    pub event: String,
    /// Attach `{eval +N cp}` comments to every move.
    pub annotate_eval: bool,
    pub tt_mb: usize,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            games: 1,
            depth_white: 3,
            depth_black: 3,
            ply_limit: 300,
            out_dir: PathBuf::from("testing/self_play"),
            white_name: "Engine (White)".to_string(),
            black_name: "Engine (Black)".to_string(),
            event: "Self-Play".to_string(),
            annotate_eval: true,
            tt_mb: DEFAULT_TT_MB,
        }
    }
}

impl SelfPlayConfig {
    fn depth_for(&self, color: Color) -> u32 {
        match color {
            Color::White => self.depth_white,
            Color::Black => self.depth_black,
        }
    }

    #[must_use]
    pub fn pgn_path(&self) -> PathBuf {
        self.out_dir.join(PGN_FILE_NAME)
    }
}

/// One finished game, ready for export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    pub headers: Vec<(String, String)>,
    /// SAN moves with optional comments.
    pub moves: Vec<(String, Option<String>)>,
    pub result: String,
}

impl GameRecord {
    /// Append the game in PGN export format.
    pub fn write_pgn<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (name, value) in &self.headers {
            writeln!(out, "[{name} \"{}\"]", value.replace('"', "'"))?;
        }
        writeln!(out)?;

        let mut tokens = Vec::with_capacity(self.moves.len() * 3 + 1);
        let mut after_comment = false;
        for (i, (san, comment)) in self.moves.iter().enumerate() {
            let number = i / 2 + 1;
            if i % 2 == 0 {
                tokens.push(format!("{number}."));
            } else if after_comment {
                tokens.push(format!("{number}..."));
            }
            tokens.push(san.clone());
            after_comment = comment.is_some();
            if let Some(text) = comment {
                tokens.push(format!("{{ {text} }}"));
            }
        }
        tokens.push(self.result.clone());

        let mut line = String::new();
        for token in tokens {
            if !line.is_empty() && line.len() + 1 + token.len() > PGN_LINE_WIDTH {
                writeln!(out, "{line}")?;
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&token);
        }
        writeln!(out, "{line}")?;
        writeln!(out)?;
        writeln!(out)
    }
}

/// Win/draw/loss tally from White's point of view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelfPlaySummary {
    pub white_wins: u32,
    pub draws: u32,
    pub black_wins: u32,
    pub pgn_path: PathBuf,
}

impl SelfPlaySummary {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.white_wins + self.draws + self.black_wins
    }

    fn record(&mut self, result: &str) {
        match result {
            "1-0" => self.white_wins += 1,
            "0-1" => self.black_wins += 1,
            _ => self.draws += 1,
        }
    }
}

impl fmt::Display for SelfPlaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Summary ===")?;
        writeln!(f, "Total games: {}", self.total())?;
        writeln!(
            f,
            "W-D-L: {}-{}-{}",
            self.white_wins, self.draws, self.black_wins
        )?;
        write!(f, "PGN: {}", self.pgn_path.display())
    }
}

/// Play one game from the start position.
pub fn play_game(
    config: &SelfPlayConfig,
    state: &mut SearchState,
    round: u32,
) -> Result<GameRecord, PlayError> {
    let mut pos = Position::startpos();
    let mut moves = Vec::new();
    state.clear();

    let mut ply = 0;
    while !pos.status().is_terminal() && ply < config.ply_limit {
        let started = Instant::now();
        let turn = pos.turn();
        let limits = SearchLimits::depth(config.depth_for(turn));

        let SearchOutcome::BestMove(result) = state.search(&mut pos, &limits)? else {
            info!("no legal move found, terminating early");
            break;
        };

        let san = pos.san(result.best_move);
        pos.play(result.best_move);
        let depth = config.depth_for(pos.turn());
        let eval = white_eval(state, &mut pos, depth)?;
        info!(
            "game {round} ply {} {san} ({eval:+} cp) in {:.2}s",
            ply + 1,
            started.elapsed().as_secs_f64()
        );

        let comment = config.annotate_eval.then(|| format!("eval {eval:+} cp"));
        moves.push((san, comment));
        ply += 1;
    }

    let status = pos.status();
    // Ply limit reached: adjudicated draw
    let result = if status.is_terminal() {
        status.result_string()
    } else {
        "1/2-1/2"
    };

    let headers = vec![
        ("Event".to_string(), config.event.clone()),
        ("Site".to_string(), "Local".to_string()),
        (
            "Date".to_string(),
            chrono::Utc::now().format("%Y.%m.%d").to_string(),
        ),
        ("Round".to_string(), round.to_string()),
        ("White".to_string(), config.white_name.clone()),
        ("Black".to_string(), config.black_name.clone()),
        ("Result".to_string(), result.to_string()),
    ];

    Ok(GameRecord {
        headers,
        moves,
        result: result.to_string(),
    })
}

/// Play `config.games` games, appending each to the PGN archive.
pub fn run(config: &SelfPlayConfig) -> Result<SelfPlaySummary, PlayError> {
    fs::create_dir_all(&config.out_dir)?;
    let pgn_path = config.pgn_path();
    let mut state = SearchState::new(config.tt_mb);
    let mut summary = SelfPlaySummary {
        pgn_path: pgn_path.clone(),
        ..SelfPlaySummary::default()
    };

    for round in 1..=config.games {
        info!("starting game {round}/{}", config.games);
        let game = play_game(config, &mut state, round)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&pgn_path)?;
        game.write_pgn(&mut file)?;

        info!("game {round} finished ({})", game.result);
        summary.record(&game.result);
    }

    Ok(summary)
}
