//! Position adapter over the `shakmaty` rules provider.
//!
//! `shakmaty` supplies legality, move generation and terminal detection. This
//! module adds what the search needs on top of it:
//! - make/unmake with a scoped [`MoveGuard`] that restores the position on drop
//! - a cached [`Signature`] for the transposition table
//! - repetition history for draw detection

use std::ops::{Deref, DerefMut};

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{
    Board, CastlingMode, Chess, Color, EnPassantMode, Move, MoveList, Position as _,
};

use crate::error::PositionError;
use crate::zobrist::Signature;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Reason a game is drawn by rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawKind {
    Repetition,
    FiftyMoves,
    InsufficientMaterial,
}

/// Terminal classification reported by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    Draw(DrawKind),
}

impl GameStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }

    /// PGN result token.
    #[must_use]
    pub fn result_string(self) -> &'static str {
        match self {
            GameStatus::Checkmate { winner: Color::White } => "1-0",
            GameStatus::Checkmate { winner: Color::Black } => "0-1",
            GameStatus::Stalemate | GameStatus::Draw(_) => "1/2-1/2",
            GameStatus::Ongoing => "*",
        }
    }
}

#[derive(Clone, Debug)]
struct Undo {
    chess: Chess,
    signature: Signature,
}

/// Everything that make/unmake must restore, in comparable form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub fen: String,
    pub signature: Signature,
    pub history_len: usize,
}

/// Game position with reversible move application.
#[derive(Clone, Debug)]
pub struct Position {
    chess: Chess,
    signature: Signature,
    undo: Vec<Undo>,
    /// Signatures of every position since setup, current one last.
    history: Vec<Signature>,
}

impl Default for Position {
    fn default() -> Self {
        Position::startpos()
    }
}

impl Position {
    #[must_use]
    pub fn startpos() -> Self {
        Position::from_chess(Chess::default())
    }

    #[must_use]
    pub fn from_chess(chess: Chess) -> Self {
        let signature = Signature::of(&chess);
        Position {
            chess,
            signature,
            undo: Vec::with_capacity(64),
            history: vec![signature],
        }
    }

    /// Parse and validate a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let trimmed = fen.trim();
        let parsed: Fen = trimmed.parse().map_err(|e| PositionError::InvalidFen {
            fen: trimmed.to_string(),
            reason: format!("{e}"),
        })?;
        let chess: Chess =
            parsed
                .into_position(CastlingMode::Standard)
                .map_err(|e| PositionError::IllegalPosition {
                    fen: trimmed.to_string(),
                    reason: format!("{e}"),
                })?;
        Ok(Position::from_chess(chess))
    }

    #[must_use]
    pub fn to_fen(&self) -> String {
        Fen::from_position(&self.chess, EnPassantMode::Legal).to_string()
    }

    #[must_use]
    pub fn chess(&self) -> &Chess {
        &self.chess
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.chess.board()
    }

    #[must_use]
    pub fn turn(&self) -> Color {
        self.chess.turn()
    }

    #[must_use]
    pub fn signature(&self) -> Signature {
        self.signature
    }

    #[must_use]
    pub fn halfmoves(&self) -> u32 {
        self.chess.halfmoves()
    }

    #[must_use]
    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    #[must_use]
    pub fn legal_moves(&self) -> MoveList {
        self.chess.legal_moves()
    }

    #[must_use]
    pub fn is_legal(&self, mv: &Move) -> bool {
        self.chess.legal_moves().iter().any(|m| m == mv)
    }

    /// Whether playing `mv` leaves the opponent in check.
    #[must_use]
    pub fn gives_check(&self, mv: Move) -> bool {
        let mut after = self.chess.clone();
        after.play_unchecked(mv);
        after.is_check()
    }

    /// Apply a legal move for the lifetime of the returned guard.
    ///
    /// Dropping the guard restores the position exactly, signature included.
    pub fn make(&mut self, mv: Move) -> MoveGuard<'_> {
        self.push(mv);
        MoveGuard { pos: self }
    }

    /// Apply a legal move permanently (a game move, not a search trial).
    pub fn play(&mut self, mv: Move) {
        let before = self.chess.clone();
        self.apply(&before, mv);
    }

    fn push(&mut self, mv: Move) {
        let before = self.chess.clone();
        let signature = self.signature;
        self.apply(&before, mv);
        self.undo.push(Undo {
            chess: before,
            signature,
        });
    }

    /// Play `mv` and update the signature from the move.
    fn apply(&mut self, before: &Chess, mv: Move) {
        self.chess.play_unchecked(mv);
        self.signature = self.signature.after_move(before, mv, &self.chess);
        self.history.push(self.signature);
    }

    fn pop(&mut self) {
        if let Some(undo) = self.undo.pop() {
            self.chess = undo.chess;
            self.signature = undo.signature;
            self.history.pop();
        }
    }

    /// Number of search moves currently applied on top of the game position.
    #[must_use]
    pub fn applied_moves(&self) -> usize {
        self.undo.len()
    }

    /// Count of earlier occurrences of the current position, limited to the
    /// reversible stretch since the last capture or pawn move.
    fn repetitions(&self) -> usize {
        let window = self.chess.halfmoves() as usize + 1;
        self.history
            .iter()
            .rev()
            .take(window)
            .skip(1)
            .filter(|sig| **sig == self.signature)
            .count()
    }

    #[must_use]
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetitions() >= 2
    }

    /// Draw by rule, ignoring whether moves remain.
    #[must_use]
    pub fn draw_kind(&self) -> Option<DrawKind> {
        if self.chess.is_insufficient_material() {
            Some(DrawKind::InsufficientMaterial)
        } else if self.chess.halfmoves() >= 100 {
            Some(DrawKind::FiftyMoves)
        } else if self.is_threefold_repetition() {
            Some(DrawKind::Repetition)
        } else {
            None
        }
    }

    /// Full terminal classification. Mate and stalemate take precedence over
    /// draws by rule.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        if self.chess.legal_moves().is_empty() {
            return if self.chess.is_check() {
                GameStatus::Checkmate {
                    winner: !self.chess.turn(),
                }
            } else {
                GameStatus::Stalemate
            };
        }
        match self.draw_kind() {
            Some(kind) => GameStatus::Draw(kind),
            None => GameStatus::Ongoing,
        }
    }

    /// Parse a move in UCI notation (e.g. "e2e4", "e7e8q").
    pub fn parse_uci_move(&self, text: &str) -> Result<Move, PositionError> {
        let uci: UciMove = text.trim().parse().map_err(|_| PositionError::InvalidMove {
            notation: text.to_string(),
        })?;
        uci.to_move(&self.chess).map_err(|_| PositionError::IllegalMove {
            notation: text.to_string(),
        })
    }

    /// Parse a move in SAN (e.g. "Nf3", "exd5", "O-O", "Qh5+").
    pub fn parse_san_move(&self, text: &str) -> Result<Move, PositionError> {
        let san: SanPlus = text.trim().parse().map_err(|_| PositionError::InvalidMove {
            notation: text.to_string(),
        })?;
        san.san
            .to_move(&self.chess)
            .map_err(|_| PositionError::IllegalMove {
                notation: text.to_string(),
            })
    }

    /// Parse SAN first, then UCI.
    pub fn parse_move(&self, text: &str) -> Result<Move, PositionError> {
        self.parse_san_move(text)
            .or_else(|_| self.parse_uci_move(text))
    }

    /// SAN for a legal move, with `+`/`#` suffix.
    #[must_use]
    pub fn san(&self, mv: Move) -> String {
        let mut text = San::from_move(&self.chess, mv).to_string();
        let mut after = self.chess.clone();
        after.play_unchecked(mv);
        if after.is_checkmate() {
            text.push('#');
        } else if after.is_check() {
            text.push('+');
        }
        text
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            fen: self.to_fen(),
            signature: self.signature,
            history_len: self.history.len(),
        }
    }
}

/// UCI text of a move in standard castling notation (e1g1).
#[must_use]
pub fn uci_string(mv: Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}

/// A move applied to a [`Position`]; reverted when dropped.
pub struct MoveGuard<'a> {
    pos: &'a mut Position,
}

impl Deref for MoveGuard<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.pos
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.pos
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.pos.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_round_trips_fen() {
        let pos = Position::startpos();
        assert_eq!(pos.to_fen(), START_FEN);
        assert_eq!(pos.legal_moves().len(), 20);
    }

    #[test]
    fn fen_keeps_castling_and_legal_en_passant() {
        for fen in [
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "r3k2r/8/8/8/8/8/8/R3K2R b Kq - 5 20",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
        // No pawn can take on e3, so the square is omitted
        let pos = Position::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        assert_eq!(
            pos.to_fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn guard_restores_position_on_drop() {
        let mut pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        let before = pos.snapshot();
        for mv in pos.legal_moves() {
            {
                let child = pos.make(mv);
                assert_ne!(child.signature(), before.signature);
                assert_eq!(child.applied_moves(), 1);
            }
            assert_eq!(pos.snapshot(), before);
        }
    }

    #[test]
    fn nested_guards_unwind_in_order() {
        let mut pos = Position::startpos();
        let before = pos.snapshot();
        let e4 = pos.parse_uci_move("e2e4").unwrap();
        {
            let mut child = pos.make(e4);
            let after_e4 = child.snapshot();
            let e5 = child.parse_uci_move("e7e5").unwrap();
            {
                let grandchild = child.make(e5);
                assert_eq!(grandchild.applied_moves(), 2);
            }
            assert_eq!(child.snapshot(), after_e4);
        }
        assert_eq!(pos.snapshot(), before);
    }

    #[test]
    fn en_passant_and_promotion_restore() {
        let mut pos =
            Position::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3")
                .unwrap();
        let before = pos.snapshot();
        let ep = pos.parse_uci_move("e5f6").unwrap();
        assert!(ep.is_en_passant());
        drop(pos.make(ep));
        assert_eq!(pos.snapshot(), before);

        let mut pos = Position::from_fen("8/P7/8/8/8/8/8/K1k5 w - - 0 1").unwrap();
        let before = pos.snapshot();
        let promo = pos.parse_uci_move("a7a8q").unwrap();
        drop(pos.make(promo));
        assert_eq!(pos.snapshot(), before);
    }

    #[test]
    fn rejects_malformed_and_illegal_fen() {
        assert!(matches!(
            Position::from_fen("not a fen"),
            Err(PositionError::InvalidFen { .. })
        ));
        // Two white kings.
        assert!(matches!(
            Position::from_fen("4k3/8/8/8/8/8/8/K3K3 w - - 0 1"),
            Err(PositionError::IllegalPosition { .. })
        ));
    }

    #[test]
    fn detects_threefold_repetition() {
        let mut pos = Position::startpos();
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1"] {
            let mv = pos.parse_uci_move(uci).unwrap();
            pos.play(mv);
            assert_eq!(pos.status(), GameStatus::Ongoing, "after {uci}");
        }
        let mv = pos.parse_uci_move("f6g8").unwrap();
        pos.play(mv);
        assert_eq!(pos.status(), GameStatus::Draw(DrawKind::Repetition));
    }

    #[test]
    fn classifies_terminal_positions() {
        let mated =
            Position::from_fen("rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 0 1")
                .unwrap();
        assert_eq!(
            mated.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );
        assert_eq!(mated.status().result_string(), "0-1");

        let stalemate = Position::from_fen("k7/8/1QK5/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(stalemate.status(), GameStatus::Stalemate);

        let fifty = Position::from_fen("8/8/8/8/8/8/4R3/K1k5 w - - 100 80").unwrap();
        assert_eq!(fifty.status(), GameStatus::Draw(DrawKind::FiftyMoves));

        let bare = Position::from_fen("8/8/8/8/8/8/8/K1k5 w - - 0 1").unwrap();
        assert_eq!(
            bare.status(),
            GameStatus::Draw(DrawKind::InsufficientMaterial)
        );
    }

    #[test]
    fn parses_san_and_uci() {
        let pos = Position::startpos();
        let a = pos.parse_move("Nf3").unwrap();
        let b = pos.parse_move("g1f3").unwrap();
        assert_eq!(a, b);
        assert_eq!(uci_string(a), "g1f3");
        assert_eq!(pos.san(a), "Nf3");
        assert!(matches!(
            pos.parse_uci_move("e2e5"),
            Err(PositionError::IllegalMove { .. })
        ));
        assert!(pos.parse_move("zz").is_err());
    }

    #[test]
    fn san_marks_mate() {
        let pos = Position::from_fen("6k1/5ppp/8/8/8/8/8/4Q2K w - - 0 1").unwrap();
        let mv = pos.parse_uci_move("e1e8").unwrap();
        assert_eq!(pos.san(mv), "Qe8#");
        assert!(pos.gives_check(mv));
    }
}
