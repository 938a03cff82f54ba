//! Error types for position setup and search.

use std::fmt;

/// Error type for position construction and move parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// FEN string could not be parsed
    InvalidFen { fen: String, reason: String },
    /// FEN parsed but describes an illegal position
    IllegalPosition { fen: String, reason: String },
    /// Move text is not valid UCI or SAN notation
    InvalidMove { notation: String },
    /// Move is well-formed but not legal in the current position
    IllegalMove { notation: String },
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::InvalidFen { fen, reason } => {
                write!(f, "Invalid FEN '{fen}': {reason}")
            }
            PositionError::IllegalPosition { fen, reason } => {
                write!(f, "Illegal position '{fen}': {reason}")
            }
            PositionError::InvalidMove { notation } => {
                write!(f, "Invalid move notation '{notation}'")
            }
            PositionError::IllegalMove { notation } => {
                write!(f, "Illegal move '{notation}'")
            }
        }
    }
}

impl std::error::Error for PositionError {}

/// Error type for rejected search requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Requested depth is outside `1..=max`
    InvalidDepth { depth: u32, max: u32 },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::InvalidDepth { depth, max } => {
                write!(f, "Search depth {depth} out of range (must be 1-{max})")
            }
        }
    }
}

impl std::error::Error for SearchError {}

/// Error type for the game-playing front ends (interactive play, self-play)
#[derive(Debug)]
pub enum PlayError {
    /// Reading input or writing output/PGN failed
    Io(std::io::Error),
    /// The configured depth was rejected by the search
    Search(SearchError),
}

impl fmt::Display for PlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayError::Io(e) => write!(f, "I/O error: {e}"),
            PlayError::Search(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayError::Io(e) => Some(e),
            PlayError::Search(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for PlayError {
    fn from(e: std::io::Error) -> Self {
        PlayError::Io(e)
    }
}

impl From<SearchError> for PlayError {
    fn from(e: SearchError) -> Self {
        PlayError::Search(e)
    }
}
