//! Universal Chess Interface (UCI) protocol implementation.
//!
//! Handles communication with chess GUIs following the UCI specification.
//! The engine runs over any `BufRead`/`Write` pair; `go` searches
//! synchronously, so `stop` has nothing to interrupt.

use std::fmt;
use std::io::{self, BufRead, Write};

use log::{debug, warn};

use crate::error::PositionError;
use crate::position::Position;
use crate::search::{SearchLimits, SearchOutcome, SearchState, MAX_DEPTH};

pub mod command;
pub mod options;
pub mod report;

use command::{parse_go_depth, parse_uci_command, UciCommand};
use options::{parse_setoption, UciOptionAction, UciOptions};

/// Error type for UCI position command parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    /// Invalid or illegal FEN
    InvalidPosition(PositionError),
    /// Invalid move in the move list
    InvalidMove { move_str: String, error: PositionError },
    /// Missing required parts in the command
    MissingParts,
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::InvalidPosition(e) => write!(f, "{e}"),
            UciError::InvalidMove { move_str, error } => {
                write!(f, "Invalid move '{move_str}': {error}")
            }
            UciError::MissingParts => write!(f, "Missing required parts in position command"),
        }
    }
}

impl std::error::Error for UciError {}

impl From<PositionError> for UciError {
    fn from(e: PositionError) -> Self {
        UciError::InvalidPosition(e)
    }
}

/// Parse a UCI position command into a fresh position.
///
/// Supports both "position startpos" and "position fen <fen>" formats,
/// optionally followed by "moves <move1> <move2> ...".
pub fn try_parse_position_command(parts: &[&str]) -> Result<Position, UciError> {
    let mut i = 1;

    if i >= parts.len() {
        return Err(UciError::MissingParts);
    }

    let mut position = if parts[i] == "startpos" {
        i += 1;
        Position::startpos()
    } else if parts[i] == "fen" {
        if i + 6 >= parts.len() {
            return Err(UciError::MissingParts);
        }
        let fen = parts[i + 1..i + 7].join(" ");
        i += 7;
        Position::from_fen(&fen)?
    } else {
        return Err(UciError::MissingParts);
    };

    if i < parts.len() && parts[i] == "moves" {
        for move_str in &parts[i + 1..] {
            let mv = position
                .parse_uci_move(move_str)
                .map_err(|error| UciError::InvalidMove {
                    move_str: (*move_str).to_string(),
                    error,
                })?;
            position.play(mv);
        }
    }

    Ok(position)
}

/// UCI front end over one [`SearchState`].
pub struct UciEngine {
    position: Position,
    state: SearchState,
    options: UciOptions,
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new(UciOptions::default())
    }
}

impl UciEngine {
    #[must_use]
    pub fn new(options: UciOptions) -> Self {
        UciEngine {
            position: Position::startpos(),
            state: SearchState::new(options.hash_mb),
            options,
        }
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    #[must_use]
    pub fn options(&self) -> &UciOptions {
        &self.options
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let Some(cmd) = parse_uci_command(&line) else {
                continue;
            };
            let keep_going = self.handle_command(cmd, out)?;
            out.flush()?;
            if !keep_going {
                break;
            }
        }
        Ok(())
    }

    /// Execute one command. Returns `false` on `quit`.
    pub fn handle_command<W: Write>(&mut self, cmd: UciCommand, out: &mut W) -> io::Result<bool> {
        match cmd {
            UciCommand::Uci => self.options.print(out)?,
            UciCommand::IsReady => report::print_ready(out)?,
            UciCommand::UciNewGame => {
                self.state.clear();
                self.position = Position::startpos();
            }
            UciCommand::Position(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                match try_parse_position_command(&parts) {
                    Ok(position) => self.position = position,
                    Err(e) => warn!("position rejected: {e}"),
                }
            }
            UciCommand::Go(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                self.go(&parts, out)?;
            }
            UciCommand::SetOption(parts) => {
                let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
                if let Some((name, value)) = parse_setoption(&parts) {
                    if let Some(UciOptionAction::ReinitHash(mb)) =
                        self.options.apply_setoption(&name, value.as_deref())
                    {
                        self.state.resize_tt(mb);
                    }
                }
            }
            UciCommand::Stop => {}
            UciCommand::Quit => return Ok(false),
            UciCommand::Unknown(line) => warn!("unknown command: {line}"),
        }
        Ok(true)
    }

    fn go<W: Write>(&mut self, parts: &[&str], out: &mut W) -> io::Result<()> {
        let depth = match parse_go_depth(parts) {
            Some(d) if (1..=MAX_DEPTH).contains(&d) => d,
            Some(d) => {
                warn!("go depth {d} out of range, using {}", self.options.depth);
                self.options.depth
            }
            None => self.options.depth,
        };
        debug!("go depth {depth} fen {}", self.position.to_fen());

        match self
            .state
            .search(&mut self.position, &SearchLimits::depth(depth))
        {
            Ok(SearchOutcome::BestMove(result)) => {
                report::print_info(out, &result, self.state.tt().hashfull_per_mille())?;
                report::print_bestmove(out, Some(result.best_move))
            }
            Ok(SearchOutcome::NoMove { .. }) => report::print_bestmove(out, None),
            Err(e) => {
                warn!("search refused: {e}");
                report::print_bestmove(out, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::START_FEN;

    fn session(input: &str) -> (UciEngine, String) {
        let mut engine = UciEngine::new(UciOptions::new(1));
        let mut out = Vec::new();
        engine.run(input.as_bytes(), &mut out).unwrap();
        (engine, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_handshake() {
        let (_, out) = session("uci\nisready\nquit\n");
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("id name"));
        assert!(lines.contains(&"uciok"));
        assert_eq!(lines.last(), Some(&"readyok"));
    }

    #[test]
    fn test_position_startpos_with_moves() {
        let parts = ["position", "startpos", "moves", "e2e4", "e7e5"];
        let pos = try_parse_position_command(&parts).unwrap();
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }

    #[test]
    fn test_position_fen() {
        let line = format!("position fen {START_FEN} moves g1f3");
        let parts: Vec<&str> = line.split_whitespace().collect();
        let pos = try_parse_position_command(&parts).unwrap();
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppppppp/8/8/8/5N2/PPPPPPPP/RNBQKB1R b KQkq - 1 1"
        );
    }

    #[test]
    fn test_position_errors() {
        assert_eq!(
            try_parse_position_command(&["position"]).unwrap_err(),
            UciError::MissingParts
        );
        assert_eq!(
            try_parse_position_command(&["position", "fen", "8/8/8"]).unwrap_err(),
            UciError::MissingParts
        );
        assert!(matches!(
            try_parse_position_command(&["position", "startpos", "moves", "e2e5"]),
            Err(UciError::InvalidMove { .. })
        ));
    }

    #[test]
    fn test_bad_position_keeps_previous() {
        let (engine, _) = session("position startpos moves e2e4\nposition startpos moves e2e5\n");
        assert_eq!(
            engine.position().to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn test_go_depth_reports_bestmove() {
        let (_, out) = session("position fen 6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1\ngo depth 2\n");
        assert!(out.contains("info depth 2 score mate 1"));
        assert!(out.trim_end().ends_with("bestmove e1e8"));
    }

    #[test]
    fn test_go_without_legal_moves() {
        let (_, out) = session("position fen k7/8/1QK5/8/8/8/8/8 b - - 0 1\ngo depth 3\n");
        assert_eq!(out.trim_end(), "bestmove 0000");
    }

    #[test]
    fn test_go_other_tokens_use_default_depth() {
        let (_, out) = session("position startpos\ngo wtime 1000 btime 1000\nstop\n");
        assert!(out.contains("info depth 3 "));
        assert!(out.contains("bestmove "));
    }

    #[test]
    fn test_setoption_depth() {
        let (engine, out) = session("setoption name Depth value 1\ngo\nquit\ngo\n");
        assert_eq!(engine.options().depth, 1);
        assert!(out.contains("info depth 1 "));
        assert_eq!(out.matches("bestmove").count(), 1, "nothing after quit");
    }
}
