use crate::bitboard::BitboardExt;
use crate::board::castle_bits::*;
use crate::board::{Board, Color, Piece};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::{generate_king_moves, generate_pseudo_legal};
use crate::moves::square_control::{attacks_by, checkers, in_check};
use crate::moves::types::{Move, MoveBuffer, MoveType, Undo};
use crate::square::Square;

/// Castling rook relocation keyed by the king's destination square.
#[inline(always)]
fn rook_castle_squares(king_to_idx: u8) -> Option<(Square, Square)> {
    match king_to_idx {
        6 => Some((Square::from_index(7), Square::from_index(5))), // White O-O
        2 => Some((Square::from_index(0), Square::from_index(3))), // White O-O-O
        62 => Some((Square::from_index(63), Square::from_index(61))), // Black O-O
        58 => Some((Square::from_index(56), Square::from_index(59))), // Black O-O-O
        _ => None,
    }
}

#[inline(always)]
fn rights_mask_to_clear_for_rook(color: Color, rook_sq: u8) -> u8 {
    match (color, rook_sq) {
        (Color::White, 0) => CASTLE_WQ,  // a1
        (Color::White, 7) => CASTLE_WK,  // h1
        (Color::Black, 56) => CASTLE_BQ, // a8
        (Color::Black, 63) => CASTLE_BK, // h8
        _ => 0,
    }
}

#[inline(always)]
fn remove_piece(board: &mut Board, color: Color, piece: Piece, idx: usize) {
    let new_bb = board.pieces(piece, color) & !(1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

#[inline(always)]
fn place_piece(board: &mut Board, color: Color, piece: Piece, idx: usize) {
    let new_bb = board.pieces(piece, color) | (1u64 << idx);
    board.set_bb(color, piece, new_bb);
}

/// Applies `mv` in place and returns the record needed to reverse it.
///
/// The move must be pseudo-legal for the side to move; callers wanting
/// strict legality run this through the trial filter in `generate_legal`.
pub fn make_move(board: &mut Board, mv: Move) -> Undo {
    let color = board.side_to_move;
    let from_idx = mv.from().index() as usize;
    let to_idx = mv.to().index() as usize;
    let piece = board
        .piece_type_at(mv.from())
        .expect("make_move: no piece on the from-square");

    let prev_en_passant = board.en_passant;
    let prev_halfmove_clock = board.halfmove_clock;
    let prev_fullmove_number = board.fullmove_number;
    let prev_castling_rights = board.castling_rights;

    // Capture removal. En passant takes the pawn one rank behind the
    // destination; everything else takes whatever sits on the destination.
    let mut capture = None;
    if mv.kind() == MoveType::EnPassant {
        let cap_sq = match color {
            Color::White => to_idx - 8,
            Color::Black => to_idx + 8,
        };
        capture = Some((color.opposite(), Piece::Pawn, Square::from_index(cap_sq as u8)));
        remove_piece(board, color.opposite(), Piece::Pawn, cap_sq);
    } else if let Some((cap_color, cap_piece)) = board.piece_at(mv.to()) {
        capture = Some((cap_color, cap_piece, mv.to()));
        remove_piece(board, cap_color, cap_piece, to_idx);
    }

    // Move the piece; a promotion places the chosen piece instead of the pawn.
    remove_piece(board, color, piece, from_idx);
    if let Some(promo) = mv.promotion_piece() {
        debug_assert!(piece == Piece::Pawn, "only pawns can promote");
        place_piece(board, color, promo, to_idx);
    } else {
        place_piece(board, color, piece, to_idx);
    }

    // Relocate the rook on castling.
    let castling_rook = if mv.kind() == MoveType::Castling {
        rook_castle_squares(to_idx as u8)
    } else {
        None
    };
    if let Some((rook_from, rook_to)) = castling_rook {
        remove_piece(board, color, Piece::Rook, rook_from.index() as usize);
        place_piece(board, color, Piece::Rook, rook_to.index() as usize);
    }

    // A double push exposes the square behind the pawn to en passant;
    // every other move clears the target.
    board.en_passant = None;
    if piece == Piece::Pawn && from_idx.abs_diff(to_idx) == 16 {
        let ep_sq = (from_idx + to_idx) / 2;
        board.en_passant = Some(Square::from_index(ep_sq as u8));
    }

    // Castling rights: a king move clears both of its side's bits; moving or
    // capturing a rook on its home corner clears that corner's bit.
    let mut mask_to_clear: u8 = 0;
    if piece == Piece::King {
        mask_to_clear |= match color {
            Color::White => CASTLE_WK | CASTLE_WQ,
            Color::Black => CASTLE_BK | CASTLE_BQ,
        };
    }
    if piece == Piece::Rook {
        mask_to_clear |= rights_mask_to_clear_for_rook(color, mv.from().index());
    }
    if let Some((cap_color, cap_piece, cap_sq)) = capture
        && cap_piece == Piece::Rook
    {
        mask_to_clear |= rights_mask_to_clear_for_rook(cap_color, cap_sq.index());
    }
    board.castling_rights &= !mask_to_clear;

    // Clocks and side to move.
    if capture.is_some() || piece == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock = prev_halfmove_clock + 1;
    }
    if color == Color::Black {
        board.fullmove_number = prev_fullmove_number + 1;
    }
    board.side_to_move = color.opposite();

    #[cfg(debug_assertions)]
    debug_assert_valid_ep(board);

    Undo {
        mv,
        piece,
        color,
        capture,
        castling_rook,
        prev_castling_rights,
        prev_en_passant,
        prev_halfmove_clock,
        prev_fullmove_number,
    }
}

/// Reverses the move recorded in `undo`, restoring the exact prior state.
pub fn undo_move(board: &mut Board, undo: Undo) {
    board.side_to_move = undo.color;
    board.castling_rights = undo.prev_castling_rights;
    board.en_passant = undo.prev_en_passant;
    board.halfmove_clock = undo.prev_halfmove_clock;
    board.fullmove_number = undo.prev_fullmove_number;

    let from_idx = undo.mv.from().index() as usize;
    let to_idx = undo.mv.to().index() as usize;

    // Take the moved piece back; a promotion removes the promoted piece and
    // restores the pawn.
    if let Some(promo) = undo.mv.promotion_piece() {
        remove_piece(board, undo.color, promo, to_idx);
        place_piece(board, undo.color, Piece::Pawn, from_idx);
    } else {
        remove_piece(board, undo.color, undo.piece, to_idx);
        place_piece(board, undo.color, undo.piece, from_idx);
    }

    // Restore any capture (the stored square handles en passant victims).
    if let Some((cap_color, cap_piece, cap_sq)) = undo.capture {
        place_piece(board, cap_color, cap_piece, cap_sq.index() as usize);
    }

    // Walk the castling rook back.
    if let Some((rook_from, rook_to)) = undo.castling_rook {
        remove_piece(board, undo.color, Piece::Rook, rook_to.index() as usize);
        place_piece(board, undo.color, Piece::Rook, rook_from.index() as usize);
    }
}

/// Appends every strictly legal move for the side to move.
///
/// King moves come first: they are filtered against the opponent's attack
/// map (computed with our king lifted off the board) and need no trial.
/// Under double check nothing else can be legal, so generation stops there.
/// The remaining pseudo-legal moves go through a make/undo trial and are
/// kept iff the mover's king is not left in check.
///
/// `moves` is appended to, not cleared; `scratch` is internal workspace.
pub fn generate_legal(
    board: &mut Board,
    tables: &MagicTables,
    moves: &mut impl MoveBuffer,
    scratch: &mut impl MoveBuffer,
) {
    let us = board.side_to_move;
    let them = us.opposite();

    let attacked = attacks_by(board, them, tables);
    generate_king_moves(board, attacked, moves);

    if checkers(board, them, tables).popcount() >= 2 {
        return;
    }

    scratch.clear();
    generate_pseudo_legal(board, tables, scratch);

    for i in 0..scratch.len() {
        let mv = scratch[i];
        let undo = make_move(board, mv);
        let illegal = in_check(board, us, tables);
        undo_move(board, undo);
        if !illegal {
            moves.push(mv);
        }
    }
}

#[cfg(debug_assertions)]
#[inline]
pub(crate) fn debug_assert_valid_ep(board: &Board) {
    if let Some(ep) = board.en_passant {
        let ep_rank = ep.rank();
        match board.side_to_move {
            Color::White => {
                // Black just double-pushed -> target sits on rank 6.
                debug_assert!(
                    ep_rank == 5,
                    "EP must be on rank 6 when White is to move, got {:?}",
                    ep
                );
            }
            Color::Black => {
                debug_assert!(
                    ep_rank == 2,
                    "EP must be on rank 3 when Black is to move, got {:?}",
                    ep
                );
            }
        }
    }
}
