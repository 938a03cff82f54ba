use std::io::{self, Write};

use log::warn;

use crate::search::{DEFAULT_TT_MB, MAX_DEPTH};

/// Search depth used by `go` without a `depth` token.
pub const DEFAULT_UCI_DEPTH: u32 = 3;

pub enum UciOptionAction {
    ReinitHash(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UciOptions {
    pub hash_mb: usize,
    pub depth: u32,
}

impl Default for UciOptions {
    fn default() -> Self {
        UciOptions::new(DEFAULT_TT_MB)
    }
}

impl UciOptions {
    #[must_use]
    pub fn new(hash_mb: usize) -> Self {
        UciOptions {
            hash_mb,
            depth: DEFAULT_UCI_DEPTH,
        }
    }

    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name maxchess {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "id author maxchess developers")?;
        writeln!(
            out,
            "option name Hash type spin default {} min 1 max 65536",
            self.hash_mb
        )?;
        writeln!(
            out,
            "option name Depth type spin default {} min 1 max {MAX_DEPTH}",
            self.depth
        )?;
        writeln!(out, "uciok")
    }

    pub fn apply_setoption(&mut self, name: &str, value: Option<&str>) -> Option<UciOptionAction> {
        let normalized = name.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "hash" => {
                let mb = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(DEFAULT_TT_MB)
                    .clamp(1, 65536);
                if mb != self.hash_mb {
                    self.hash_mb = mb;
                    return Some(UciOptionAction::ReinitHash(mb));
                }
            }
            "depth" => match value.and_then(|v| v.parse::<u32>().ok()) {
                Some(d) if (1..=MAX_DEPTH).contains(&d) => self.depth = d,
                _ => warn!("ignoring Depth value {value:?}"),
            },
            _ => warn!("unknown option '{name}'"),
        }
        None
    }
}

#[must_use]
pub fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
    if parts.is_empty() || parts[0] != "setoption" {
        return None;
    }

    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    if name_parts.is_empty() {
        return None;
    }

    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() {
        None
    } else {
        Some(value_parts.join(" "))
    };

    Some((name, value))
}
