use std::io::{self, Write};

use shakmaty::Move;

use crate::position::uci_string;
use crate::score::format_uci;
use crate::search::SearchResult;

pub fn print_ready<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "readyok")
}

pub fn print_info<W: Write>(out: &mut W, result: &SearchResult, hashfull: u32) -> io::Result<()> {
    let pv: Vec<String> = result.pv.iter().map(|mv| uci_string(*mv)).collect();
    writeln!(
        out,
        "info depth {} score {} nodes {} hashfull {} pv {}",
        result.depth,
        format_uci(result.score),
        result.stats.total_nodes(),
        hashfull,
        pv.join(" ")
    )
}

pub fn print_bestmove<W: Write>(out: &mut W, best_move: Option<Move>) -> io::Result<()> {
    match best_move {
        Some(mv) => writeln!(out, "bestmove {}", uci_string(mv)),
        None => writeln!(out, "bestmove 0000"),
    }
}
