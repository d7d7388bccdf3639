use crate::board::{Board, CastleSide, Color, Piece};
use crate::moves::magic::MagicTables;
use crate::moves::magic::attacks::{KING_ATTACKS, KNIGHT_ATTACKS, pawn_attacks};
use crate::moves::types::{Move, MoveBuffer, MoveType};
use crate::square::Square;
use crate::utils::pop_lsb;

// Predefined rank constants
const RANK1: u64 = 0x0000_0000_0000_00FF;
const RANK2: u64 = 0x0000_0000_0000_FF00;
const RANK7: u64 = 0x00FF_0000_0000_0000;
const RANK8: u64 = 0xFF00_0000_0000_0000;

// Promotion pieces in generation order
const PROMOS: [Piece; 4] = [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen];

/// Pops every target bit and pushes a Normal move from `from`.
#[inline(always)]
fn push_piece_moves(from: u8, mut targets: u64, move_list: &mut impl MoveBuffer) {
    let from_sq = Square::from_index(from);
    while targets != 0 {
        let to = pop_lsb(&mut targets);
        move_list.push(Move::new(from_sq, Square::from_index(to), MoveType::Normal));
    }
}

pub fn generate_knight_moves(board: &Board, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());

    let mut bb = board.pieces(Piece::Knight, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let targets = KNIGHT_ATTACKS[from as usize] & !friendly & !enemy_king;
        push_piece_moves(from, targets, move_list);
    }
}

pub fn generate_bishop_moves(board: &Board, tables: &MagicTables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let blockers = board.occupied();

    let mut bb = board.pieces(Piece::Bishop, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let attacks = tables.bishop.get_attacks(from as usize, blockers);
        push_piece_moves(from, attacks & !friendly & !enemy_king, move_list);
    }
}

pub fn generate_rook_moves(board: &Board, tables: &MagicTables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let blockers = board.occupied();

    let mut bb = board.pieces(Piece::Rook, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let attacks = tables.rook.get_attacks(from as usize, blockers);
        push_piece_moves(from, attacks & !friendly & !enemy_king, move_list);
    }
}

pub fn generate_queen_moves(board: &Board, tables: &MagicTables, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let friendly = board.occupancy(color);
    let enemy_king = board.pieces(Piece::King, color.opposite());
    let blockers = board.occupied();

    let mut bb = board.pieces(Piece::Queen, color);
    while bb != 0 {
        let from = pop_lsb(&mut bb);
        let attacks = tables.queen_attacks(from as usize, blockers);
        push_piece_moves(from, attacks & !friendly & !enemy_king, move_list);
    }
}

/// Emits the side-to-move's king moves, already strictly legal.
///
/// `attacked` must be the opponent's attack bitboard computed with this
/// king removed from the occupancy (see `square_control::attacks_by`), so
/// every destination surviving the mask is safe. Castling goes through
/// `Board::can_castle`, which checks the rook, the empty path, and the
/// king's walk against `attacked`.
pub fn generate_king_moves(board: &Board, attacked: u64, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let king_bb = board.pieces(Piece::King, color);

    if king_bb == 0 {
        return; // illegal position safeguard
    }

    let from = king_bb.trailing_zeros() as u8;
    let friendly = board.occupancy(color);

    let targets = KING_ATTACKS[from as usize] & !friendly & !attacked;
    push_piece_moves(from, targets, move_list);

    let occ = board.occupied();
    let from_sq = Square::from_index(from);

    for side in [CastleSide::King, CastleSide::Queen] {
        if board.can_castle(color, side, attacked, occ) {
            let to = Square::from_index(crate::board::castle_king_to(color, side));
            move_list.push(Move::new(from_sq, to, MoveType::Castling));
        }
    }
}

pub fn generate_pawn_moves(board: &Board, move_list: &mut impl MoveBuffer) {
    let color = board.side_to_move;
    let pawns = board.pieces(Piece::Pawn, color);
    let enemy_without_king =
        board.opponent_occupancy(color) & !board.pieces(Piece::King, color.opposite());
    let empty = !board.occupied();

    let (home_rank, promo_from_rank, promo_rank) = match color {
        Color::White => (RANK2, RANK7, RANK8),
        Color::Black => (RANK7, RANK2, RANK1),
    };

    // ===== 1) Quiet single pushes (excluding promotions) =====
    let single_pushes = match color {
        Color::White => ((pawns << 8) & empty) & !promo_rank,
        Color::Black => ((pawns >> 8) & empty) & !promo_rank,
    };
    let mut bb = single_pushes;
    while bb != 0 {
        let to = pop_lsb(&mut bb);
        let from = match color {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            MoveType::Normal,
        ));
    }

    // ===== 2) Double pushes from the home rank =====
    let double_pushes = match color {
        Color::White => ((((pawns & home_rank) << 8) & empty) << 8) & empty,
        Color::Black => ((((pawns & home_rank) >> 8) & empty) >> 8) & empty,
    };
    let mut bb = double_pushes;
    while bb != 0 {
        let to = pop_lsb(&mut bb);
        let from = match color {
            Color::White => to - 16,
            Color::Black => to + 16,
        };
        move_list.push(Move::new(
            Square::from_index(from),
            Square::from_index(to),
            MoveType::Normal,
        ));
    }

    // ===== 3) Captures (excluding promotions) =====
    let mut attackers = pawns & !promo_from_rank;
    while attackers != 0 {
        let from = pop_lsb(&mut attackers);
        let mut targets = pawn_attacks(from as usize, color) & enemy_without_king;
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            move_list.push(Move::new(
                Square::from_index(from),
                Square::from_index(to),
                MoveType::Normal,
            ));
        }
    }

    // ===== 4) Promotion pushes =====
    let promo_pushes = match color {
        Color::White => ((pawns & promo_from_rank) << 8) & empty,
        Color::Black => ((pawns & promo_from_rank) >> 8) & empty,
    };
    let mut bb = promo_pushes;
    while bb != 0 {
        let to = pop_lsb(&mut bb);
        let from = match color {
            Color::White => to - 8,
            Color::Black => to + 8,
        };
        for &promo in PROMOS.iter() {
            move_list.push(Move::promotion(
                Square::from_index(from),
                Square::from_index(to),
                promo,
            ));
        }
    }

    // ===== 5) Promotion captures =====
    let mut promo_attackers = pawns & promo_from_rank;
    while promo_attackers != 0 {
        let from = pop_lsb(&mut promo_attackers);
        let mut targets = pawn_attacks(from as usize, color) & enemy_without_king & promo_rank;
        while targets != 0 {
            let to = pop_lsb(&mut targets);
            for &promo in PROMOS.iter() {
                move_list.push(Move::promotion(
                    Square::from_index(from),
                    Square::from_index(to),
                    promo,
                ));
            }
        }
    }

    // ===== 6) En passant =====
    if let Some(ep_sq) = board.en_passant {
        let ep = ep_sq.index();
        if empty & ep_sq.bitboard() != 0 {
            let cap_sq = match color {
                Color::White => ep - 8,
                Color::Black => ep + 8,
            };
            let enemy_pawns = board.pieces(Piece::Pawn, color.opposite());
            if enemy_pawns & (1u64 << cap_sq) != 0 {
                let mut atk = pawns;
                while atk != 0 {
                    let from = pop_lsb(&mut atk);
                    if pawn_attacks(from as usize, color) & ep_sq.bitboard() != 0 {
                        move_list.push(Move::new(
                            Square::from_index(from),
                            ep_sq,
                            MoveType::EnPassant,
                        ));
                    }
                }
            }
        }
    }
}

/// Appends all pseudo-legal non-king moves for the side to move. King moves
/// are generated separately (and already legal) by `generate_king_moves`.
pub fn generate_pseudo_legal(board: &Board, tables: &MagicTables, moves: &mut impl MoveBuffer) {
    generate_pawn_moves(board, moves);
    generate_knight_moves(board, moves);
    generate_bishop_moves(board, tables, moves);
    generate_rook_moves(board, tables, moves);
    generate_queen_moves(board, tables, moves);
}
