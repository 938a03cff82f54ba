//! Interactive human-vs-engine play in the terminal.

use std::io::{BufRead, Write};

use log::debug;
use shakmaty::{Board, Color, Square};

use crate::error::PlayError;
use crate::position::{GameStatus, Position};
use crate::search::{white_eval, SearchLimits, SearchOutcome, SearchState, DEFAULT_TT_MB};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    pub depth_white: u32,
    pub depth_black: u32,
    pub engine_plays_white: bool,
    pub tt_mb: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            depth_white: 3,
            depth_black: 3,
            engine_plays_white: false,
            tt_mb: DEFAULT_TT_MB,
        }
    }
}

impl CliConfig {
    fn depth_for(&self, color: Color) -> u32 {
        match color {
            Color::White => self.depth_white,
            Color::Black => self.depth_black,
        }
    }

    fn engine_moves(&self, color: Color) -> bool {
        (color == Color::White) == self.engine_plays_white
    }
}

/// Board diagram, rank 8 first, `.` for empty squares.
#[must_use]
pub fn board_diagram(board: &Board) -> String {
    let mut text = String::with_capacity(8 * 16);
    for rank in (0..8u32).rev() {
        let row: Vec<String> = (0..8u32)
            .map(|file| {
                board
                    .piece_at(Square::new(rank * 8 + file))
                    .map_or('.', |p| p.char())
                    .to_string()
            })
            .collect();
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    text
}

fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// White-relative static and searched evaluation of the current position.
fn show_eval<W: Write>(
    out: &mut W,
    state: &mut SearchState,
    pos: &mut Position,
    config: &CliConfig,
) -> Result<(), PlayError> {
    let static_white = state.evaluator().evaluate_white(pos);
    let search_white = white_eval(state, pos, config.depth_for(pos.turn()))?;
    writeln!(
        out,
        "[{} to move] static: {static_white:+} cp | search: {search_white:+} cp",
        side_name(pos.turn())
    )?;
    Ok(())
}

/// Play one game against the engine, reading moves (SAN or UCI) from `input`.
///
/// Returns the final status; `Ongoing` when input ends or the player types
/// `quit` before the game is decided.
pub fn play<R: BufRead, W: Write>(
    config: &CliConfig,
    mut input: R,
    out: &mut W,
) -> Result<GameStatus, PlayError> {
    let mut pos = Position::startpos();
    let mut state = SearchState::new(config.tt_mb);

    writeln!(out, "{}", board_diagram(pos.board()))?;

    loop {
        let status = pos.status();
        if status.is_terminal() {
            writeln!(out, "Game over: {}", status.result_string())?;
            return Ok(status);
        }

        let turn = pos.turn();
        if config.engine_moves(turn) {
            let limits = SearchLimits::depth(config.depth_for(turn));
            let SearchOutcome::BestMove(result) = state.search(&mut pos, &limits)? else {
                break;
            };
            debug!("engine pv length {} score {}", result.pv.len(), result.score);
            writeln!(
                out,
                "Engine ({}) plays: {}",
                side_name(turn),
                pos.san(result.best_move)
            )?;
            pos.play(result.best_move);
            show_eval(out, &mut state, &mut pos, config)?;
        } else {
            write!(out, "Your move: ")?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let text = line.trim();
            if text == "quit" {
                break;
            }
            match pos.parse_move(text) {
                Ok(mv) => {
                    pos.play(mv);
                    show_eval(out, &mut state, &mut pos, config)?;
                }
                Err(e) => {
                    debug!("rejected input: {e}");
                    writeln!(out, "Illegal/unknown move, try again.")?;
                    continue;
                }
            }
        }
        writeln!(out, "{}", board_diagram(pos.board()))?;
    }

    let status = pos.status();
    writeln!(out, "Game over: {}", status.result_string())?;
    Ok(status)
}
