// src/hash/zobrist.rs

use crate::board::{Board, Color};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

#[cfg(feature = "deterministic_zobrist")]
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

fn make_zobrist_rng() -> StdRng {
    #[cfg(feature = "deterministic_zobrist")]
    {
        StdRng::seed_from_u64(ZOBRIST_SEED)
    }
    #[cfg(not(feature = "deterministic_zobrist"))]
    {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        StdRng::from_seed(seed)
    }
}

/// The full Zobrist key set: 12*64 piece keys, 64 en-passant keys, 16
/// castling-rights keys, one side-to-move key.
pub struct ZobristKeys {
    /// [color][piece][square] with {White=0, Black=1} and {P,N,B,R,Q,K}={0..5}
    pub piece: [[[u64; 64]; 6]; 2],
    /// Indexed by the en-passant target square.
    pub ep: [u64; 64],
    /// Indexed by the 4-bit castling-rights mask.
    pub castling: [u64; 16],
    /// XOR-ed in when Black is to move.
    pub side_to_move: u64,
}

/// Global keys, initialized on first use and identical for the rest of the
/// process.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_zobrist_keys_with_rng(make_zobrist_rng()))
}

fn generate_zobrist_keys_with_rng(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(r: &mut StdRng) -> u64 {
        // avoid zero keys to reduce degenerate collisions
        let mut v = r.next_u64();
        while v == 0 {
            v = r.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[[0u64; 64]; 6]; 2],
        ep: [0u64; 64],
        castling: [0u64; 16],
        side_to_move: 0,
    };

    for c in 0..2 {
        for p in 0..6 {
            for sq in 0..64 {
                keys.piece[c][p][sq] = non_zero(&mut rng);
            }
        }
    }

    for sq in 0..64 {
        keys.ep[sq] = non_zero(&mut rng);
    }

    for rights in 0..16 {
        keys.castling[rights] = non_zero(&mut rng);
    }

    keys.side_to_move = non_zero(&mut rng);

    keys
}

/// Hashes a position: XOR of the piece keys for every occupied square, the
/// en-passant key when a target is set, the castling-rights key, and the
/// side key when Black moves.
///
/// Callers that feed hashes into repetition detection must normalize the
/// en-passant target first: a target no legal move can capture onto has to
/// be cleared so FIDE-identical positions hash identically. `Game` does
/// this before every hash.
pub fn hash_board(board: &Board) -> u64 {
    let keys = zobrist_keys();
    let mut hash: u64 = 0;

    for ci in 0..2 {
        for pi in 0..6 {
            let mut bb = board.piece_bb[ci][pi];
            while bb != 0 {
                let sq = bb.trailing_zeros() as usize;
                hash ^= keys.piece[ci][pi][sq];
                bb &= bb - 1; // pop LSB
            }
        }
    }

    if let Some(ep) = board.en_passant {
        hash ^= keys.ep[ep.index() as usize];
    }

    hash ^= keys.castling[(board.castling_rights & 0xF) as usize];

    if board.side_to_move == Color::Black {
        hash ^= keys.side_to_move;
    }

    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn keys_init_is_idempotent() {
        let first = zobrist_keys() as *const ZobristKeys;
        let second = zobrist_keys() as *const ZobristKeys;
        assert_eq!(first, second);
    }

    #[test]
    fn keys_are_non_zero() {
        let keys = zobrist_keys();
        assert_ne!(keys.side_to_move, 0);
        assert!(keys.ep.iter().all(|&k| k != 0));
        assert!(keys.castling.iter().all(|&k| k != 0));
        assert!(
            keys.piece
                .iter()
                .flatten()
                .flatten()
                .all(|&k| k != 0)
        );
    }

    #[test]
    fn hash_distinguishes_side_to_move() {
        let w = Board::from_str("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let b = Board::from_str("4k3/8/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(hash_board(&w), hash_board(&b));
        assert_eq!(
            hash_board(&w) ^ hash_board(&b),
            zobrist_keys().side_to_move
        );
    }

    #[test]
    fn hash_distinguishes_castling_rights() {
        let all = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let none = Board::from_str("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert_ne!(hash_board(&all), hash_board(&none));
    }

    #[test]
    fn hash_ignores_clocks() {
        let a = Board::from_str("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let b = Board::from_str("4k3/8/8/8/8/8/8/4K3 w - - 42 99").unwrap();
        assert_eq!(hash_board(&a), hash_board(&b));
    }

    #[test]
    fn hash_depends_on_en_passant_target() {
        let with_ep = Board::from_str("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        let without = Board::from_str("4k3/8/8/8/4P3/8/8/4K3 b - - 0 1").unwrap();
        assert_ne!(hash_board(&with_ep), hash_board(&without));
    }

    #[test]
    fn hash_matches_for_transposed_move_orders() {
        use crate::moves::execute::make_move;
        use crate::moves::types::{Move, MoveType};
        use crate::square::Square;

        let mv = |f: u8, t: u8| {
            Move::new(Square::from_index(f), Square::from_index(t), MoveType::Normal)
        };

        // Nf3/Nc6 then e3/e6 versus e3/e6 then Nf3/Nc6 reach the same
        // position; the hash must agree.
        let mut a = Board::new();
        make_move(&mut a, mv(6, 21)); // Ng1f3
        make_move(&mut a, mv(57, 42)); // Nb8c6
        make_move(&mut a, mv(12, 20)); // e2e3
        make_move(&mut a, mv(52, 44)); // e7e6

        let mut b = Board::new();
        make_move(&mut b, mv(12, 20));
        make_move(&mut b, mv(52, 44));
        make_move(&mut b, mv(6, 21));
        make_move(&mut b, mv(57, 42));

        assert_eq!(hash_board(&a), hash_board(&b));
    }
}
