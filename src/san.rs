//! Standard Algebraic Notation encoding (PGN §8.2.3).
//!
//! The encoder takes the position *before* the move and the current legal
//! move list (for disambiguation). Parsing SAN is left to the embedder.

use crate::board::{Board, Piece};
use crate::moves::execute::{generate_legal, make_move};
use crate::moves::magic::{MagicTables, tables};
use crate::moves::square_control::in_check;
use crate::moves::types::{Move, MoveType};

/// Encodes a legal move as SAN, e.g. `e4`, `Nbd2`, `dxe8=Q`, `O-O-O#`.
pub fn move_to_san(board: &Board, legal: &[Move], mv: Move) -> String {
    let tables = tables();

    // Castling is keyed on the king's destination file: g-file is short,
    // c-file is long.
    if mv.kind() == MoveType::Castling {
        let base = if mv.to().file() == 6 { "O-O" } else { "O-O-O" };
        return format!("{}{}", base, check_suffix(board, mv, tables));
    }

    let piece = board
        .piece_type_at(mv.from())
        .expect("move_to_san: no piece on the from-square");
    let is_capture = board.piece_at(mv.to()).is_some() || mv.kind() == MoveType::EnPassant;

    let mut san = String::new();

    if piece == Piece::Pawn {
        if is_capture {
            san.push((b'a' + mv.from().file()) as char);
            san.push('x');
        }
    } else {
        san.push(piece_letter(piece));
        san.push_str(&disambiguation(board, legal, mv, piece));
        if is_capture {
            san.push('x');
        }
    }

    san.push_str(&mv.to().to_string());

    if let Some(promo) = mv.promotion_piece() {
        san.push('=');
        san.push(piece_letter(promo));
    }

    san.push_str(&check_suffix(board, mv, tables));
    san
}

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
        Piece::Pawn => unreachable!("pawns carry no letter in SAN"),
    }
}

/// Minimal disambiguation among legal moves of the same piece kind to the
/// same destination: file if the files differ, else rank if the ranks
/// differ, else both.
fn disambiguation(board: &Board, legal: &[Move], mv: Move, piece: Piece) -> String {
    let from = mv.from();
    let rivals: Vec<_> = legal
        .iter()
        .filter(|m| {
            m.to() == mv.to()
                && m.from() != from
                && board.piece_type_at(m.from()) == Some(piece)
        })
        .map(|m| m.from())
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|r| r.file() != from.file()) {
        return ((b'a' + from.file()) as char).to_string();
    }
    if rivals.iter().all(|r| r.rank() != from.rank()) {
        return ((b'1' + from.rank()) as char).to_string();
    }
    from.to_string()
}

/// `+` or `#`, decided after the move is applied and the opponent's legal
/// list regenerated.
fn check_suffix(board: &Board, mv: Move, tables: &MagicTables) -> String {
    let mut probe = board.clone();
    make_move(&mut probe, mv);

    let defender = probe.side_to_move;
    if probe.pieces(Piece::King, defender) == 0 {
        return String::new();
    }
    if !in_check(&probe, defender, tables) {
        return String::new();
    }

    let mut replies = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(&mut probe, tables, &mut replies, &mut scratch);

    if replies.is_empty() { "#" } else { "+" }.to_string()
}
