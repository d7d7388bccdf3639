//! Structural invariants checked along random legal walks: bitboard
//! disjointness, aggregate-occupancy consistency, king counts, legality of
//! every generated move, and FEN round-tripping.

use arbiter::bitboard::BitboardExt;
use arbiter::board::{Board, Color, Piece};
use arbiter::game::Game;
use arbiter::moves::execute::{generate_legal, make_move, undo_move};
use arbiter::moves::magic::tables;
use arbiter::moves::square_control::in_check;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::str::FromStr;

const WALK_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
];

fn assert_structural_invariants(board: &Board) {
    // Disjointness of the twelve piece bitboards.
    board.validate().expect("piece bitboards overlap");

    // Aggregates match the piece boards they summarize.
    let white: u64 = (0..6).fold(0, |acc, p| acc | board.piece_bb[0][p]);
    let black: u64 = (0..6).fold(0, |acc, p| acc | board.piece_bb[1][p]);
    assert_eq!(board.occ_white, white);
    assert_eq!(board.occ_black, black);
    assert_eq!(board.occ_all, white | black);

    // Exactly one king per side.
    assert_eq!(board.pieces(Piece::King, Color::White).popcount(), 1);
    assert_eq!(board.pieces(Piece::King, Color::Black).popcount(), 1);
}

#[test]
fn random_walks_preserve_structural_invariants() {
    let tables = tables();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    for &fen in WALK_FENS {
        for _round in 0..4 {
            let mut board = Board::from_str(fen).unwrap();
            for _ply in 0..120 {
                assert_structural_invariants(&board);

                let mut moves = Vec::new();
                let mut scratch = Vec::with_capacity(256);
                generate_legal(&mut board, tables, &mut moves, &mut scratch);
                if moves.is_empty() {
                    break;
                }

                let mover = board.side_to_move;
                let mv = moves[rng.random_range(0..moves.len())];
                let _ = make_move(&mut board, mv);

                // Every generated move must leave its own king safe.
                assert!(
                    !in_check(&board, mover, tables),
                    "{} left the mover in check",
                    mv
                );
            }
        }
    }
}

#[test]
fn every_generated_move_round_trips_through_make_undo() {
    let tables = tables();

    for &fen in WALK_FENS {
        let mut board = Board::from_str(fen).unwrap();
        let snapshot = board.clone();

        let mut moves = Vec::new();
        let mut scratch = Vec::with_capacity(256);
        generate_legal(&mut board, tables, &mut moves, &mut scratch);

        for mv in moves {
            let undo = make_move(&mut board, mv);
            assert_structural_invariants(&board);
            undo_move(&mut board, undo);
            assert_eq!(board, snapshot, "undo of {} diverged", mv);
        }
    }
}

#[test]
fn fen_round_trips_along_a_played_game() {
    let mut game = Game::new();
    let line = [
        "e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6", "b1c3", "a7a6",
        "c1e3", "e7e6", "f2f3", "b7b5", "d1d2", "f8e7", "e1c1", "e8g8",
    ];
    for mv in line {
        game.push_uci(mv).expect("well-known opening line");
        let fen = game.to_fen();
        let reparsed = Board::from_str(&fen).unwrap();
        assert_eq!(&reparsed, game.board(), "FEN round-trip diverged at {fen}");
        assert_eq!(reparsed.to_fen(), fen);
    }
}

#[test]
fn zobrist_keys_and_magic_tables_survive_double_init() {
    use arbiter::hash::zobrist::zobrist_keys;
    let k1 = zobrist_keys() as *const _;
    let k2 = zobrist_keys() as *const _;
    assert_eq!(k1, k2);

    let t1 = tables() as *const _;
    let t2 = tables() as *const _;
    assert_eq!(t1, t2);
}
