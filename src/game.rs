//! The game state machine: owns a position, the cached legal-move list for
//! the side to move, and the Zobrist-keyed repetition counts.

use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

use crate::board::{Board, FenError, Piece};
use crate::hash::zobrist::hash_board;
use crate::moves::execute::{generate_legal, make_move};
use crate::moves::magic::tables;
use crate::moves::square_control::in_check;
use crate::moves::types::{Move, MoveBuffer, MoveList, MoveType};
use crate::san::move_to_san;
use crate::square::Square;
use crate::status::{self, GameStatus};

/// Error type for move submission at the validating boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("illegal move: {0}")]
    IllegalMove(String),
    #[error("invalid UCI move text: {0}")]
    InvalidUci(String),
}

/// A running game.
///
/// The position is never mutated from outside: callers submit moves through
/// [`Game::push_move`] (or the validating variants) and read everything else
/// through queries. The legal-move list is regenerated after every push, so
/// terminal predicates are always in sync with the position.
pub struct Game {
    board: Board,
    legal: MoveList,
    scratch: Vec<Move>,
    /// Occurrence count per Zobrist key since the last irreversible move.
    repetitions: HashMap<u64, u8>,
    /// Hash of the current (normalized) position.
    key: u64,
}

impl Game {
    /// A game at the standard initial position.
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    /// A game starting from an arbitrary FEN position.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_board(Board::from_str(fen)?))
    }

    fn from_board(board: Board) -> Self {
        let mut game = Game {
            board,
            legal: MoveList::new(),
            scratch: Vec::with_capacity(256),
            repetitions: HashMap::new(),
            key: 0,
        };
        game.regenerate();
        game.normalize_en_passant();
        game.key = hash_board(&game.board);
        game.repetitions.insert(game.key, 1);
        game
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Legal moves for the side to move, king moves first.
    #[inline]
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal
    }

    /// Fast-path legality check against the cached list.
    #[inline]
    pub fn is_move_legal(&self, mv: Move) -> bool {
        self.legal.contains(&mv)
    }

    /// Applies a move the caller already knows to be legal.
    ///
    /// Pushing a move that is not in [`Game::legal_moves`] is a programming
    /// error; debug builds assert on it. Embedders handling untrusted input
    /// should use [`Game::try_push`] instead.
    pub fn push_move(&mut self, mv: Move) {
        debug_assert!(
            self.is_move_legal(mv),
            "push_move precondition violated: {} is not legal here",
            mv
        );

        // Irreversibility must be judged against the pre-move board.
        let is_capture =
            self.board.piece_at(mv.to()).is_some() || mv.kind() == MoveType::EnPassant;
        let is_pawn_move = self.board.piece_type_at(mv.from()) == Some(Piece::Pawn);
        let irreversible = is_capture
            || is_pawn_move
            || mv.kind() == MoveType::Castling
            || mv.kind() == MoveType::Promotion;

        let _ = make_move(&mut self.board, mv);
        self.regenerate();

        // No position from before an irreversible move can recur.
        if irreversible {
            self.repetitions.clear();
        }

        self.normalize_en_passant();
        self.key = hash_board(&self.board);
        *self.repetitions.entry(self.key).or_insert(0) += 1;
    }

    /// Validating push for untrusted moves.
    pub fn try_push(&mut self, mv: Move) -> Result<(), GameError> {
        if !self.is_move_legal(mv) {
            return Err(GameError::IllegalMove(mv.to_uci()));
        }
        self.push_move(mv);
        Ok(())
    }

    /// Accepts a move in UCI text (`e2e4`, `e7e8q`) and plays it if legal.
    pub fn push_uci(&mut self, uci: &str) -> Result<(), GameError> {
        let (from, to, promo) = parse_uci(uci).ok_or_else(|| GameError::InvalidUci(uci.into()))?;

        let matched = self
            .legal
            .iter()
            .copied()
            .find(|m| m.from() == from && m.to() == to && m.promotion_piece() == promo)
            .ok_or_else(|| GameError::IllegalMove(uci.into()))?;

        self.push_move(matched);
        Ok(())
    }

    fn regenerate(&mut self) {
        MoveBuffer::clear(&mut self.legal);
        generate_legal(&mut self.board, tables(), &mut self.legal, &mut self.scratch);
    }

    /// FIDE repetition identity: an en-passant target nothing can legally
    /// capture onto collapses to "none" so that otherwise-identical
    /// positions hash identically.
    fn normalize_en_passant(&mut self) {
        if self.board.en_passant.is_some()
            && !self.legal.iter().any(|m| m.kind() == MoveType::EnPassant)
        {
            self.board.en_passant = None;
        }
    }

    /// True once any position has occurred three times since the last
    /// irreversible move.
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetitions.values().any(|&count| count >= 3)
    }

    /// Times the current position has occurred.
    pub fn repetition_count(&self) -> u8 {
        self.repetitions.get(&self.key).copied().unwrap_or(0)
    }

    pub fn is_insufficient_material(&self) -> bool {
        status::is_insufficient_material(&self.board)
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        status::is_draw_by_fifty_move(&self.board)
    }

    pub fn is_check(&self) -> bool {
        in_check(&self.board, self.board.side_to_move, tables())
    }

    pub fn is_checkmate(&self) -> bool {
        self.legal.is_empty() && self.is_check()
    }

    pub fn is_stalemate(&self) -> bool {
        self.legal.is_empty() && !self.is_check()
    }

    /// Rolls the terminal queries into one answer. Mate and stalemate are
    /// checked first: a move that delivers mate ends the game even if a
    /// draw condition was reached by the same move.
    pub fn status(&self) -> GameStatus {
        if self.legal.is_empty() {
            return if self.is_check() {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.is_insufficient_material() {
            return GameStatus::DrawInsufficient;
        }
        if self.is_threefold_repetition() {
            return GameStatus::DrawThreefold;
        }
        if self.is_fifty_move_draw() {
            return GameStatus::DrawFiftyMove;
        }
        GameStatus::InPlay
    }

    pub fn to_fen(&self) -> String {
        self.board.to_fen()
    }

    /// SAN for a legal move in the current position.
    pub fn move_to_san(&self, mv: Move) -> String {
        move_to_san(&self.board, &self.legal, mv)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_uci(uci: &str) -> Option<(Square, Square, Option<Piece>)> {
    if !uci.is_ascii() || (uci.len() != 4 && uci.len() != 5) {
        return None;
    }
    let from = uci[0..2].parse().ok()?;
    let to = uci[2..4].parse().ok()?;
    let promo = match uci.as_bytes().get(4) {
        None => None,
        Some(b'n') => Some(Piece::Knight),
        Some(b'b') => Some(Piece::Bishop),
        Some(b'r') => Some(Piece::Rook),
        Some(b'q') => Some(Piece::Queen),
        Some(_) => return None,
    };
    Some((from, to, promo))
}
