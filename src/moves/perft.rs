//! Leaf-counting validation walker. Counts positions at a fixed depth so the
//! move generator can be checked against published reference values.

use crate::board::Board;
use crate::moves::{
    execute::{generate_legal, make_move, undo_move},
    magic::MagicTables,
    types::Move,
};
use tracing::{debug, instrument};

const MAX_PERFT_DEPTH: usize = 16;

fn create_move_buffers() -> [Vec<Move>; MAX_PERFT_DEPTH] {
    std::array::from_fn(|_| Vec::with_capacity(64))
}

fn create_scratch_buffers() -> [Vec<Move>; MAX_PERFT_DEPTH] {
    std::array::from_fn(|_| Vec::with_capacity(256))
}

// Recursive walk with per-ply reusable buffers.
fn perft_recursive(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
    ply: usize,
    move_buffers: &mut [Vec<Move>],
    scratch_buffers: &mut [Vec<Move>],
) -> u64 {
    if depth == 0 {
        return 1;
    }

    {
        let moves = &mut move_buffers[ply];
        let scratch = &mut scratch_buffers[ply];
        moves.clear();
        generate_legal(board, tables, moves, scratch);
    }

    if depth == 1 {
        return move_buffers[ply].len() as u64;
    }

    let move_count = move_buffers[ply].len();
    let mut nodes = 0;

    for i in 0..move_count {
        let mv = move_buffers[ply][i];
        let undo = make_move(board, mv);
        nodes += perft_recursive(
            board,
            tables,
            depth - 1,
            ply + 1,
            move_buffers,
            scratch_buffers,
        );
        undo_move(board, undo);
    }

    nodes
}

/// Number of leaf positions reachable in exactly `depth` plies.
#[instrument(skip(board, tables), fields(depth))]
pub fn perft(board: &mut Board, tables: &MagicTables, depth: u32) -> u64 {
    assert!(
        (depth as usize) <= MAX_PERFT_DEPTH,
        "depth {} exceeds MAX_PERFT_DEPTH {}",
        depth,
        MAX_PERFT_DEPTH
    );

    let mut move_buffers = create_move_buffers();
    let mut scratch_buffers = create_scratch_buffers();

    perft_recursive(
        board,
        tables,
        depth,
        0,
        &mut move_buffers,
        &mut scratch_buffers,
    )
}

/// Per-root-move leaf counts, for pinning down a generation bug by
/// diffing against another engine's divide output.
#[instrument(skip(board, tables), fields(depth))]
pub fn perft_divide(board: &mut Board, tables: &MagicTables, depth: u32) -> Vec<(Move, u64)> {
    assert!(
        depth >= 1 && (depth as usize) <= MAX_PERFT_DEPTH,
        "divide depth {} out of range",
        depth
    );

    let mut move_buffers = create_move_buffers();
    let mut scratch_buffers = create_scratch_buffers();

    {
        let moves = &mut move_buffers[0];
        let scratch = &mut scratch_buffers[0];
        moves.clear();
        generate_legal(board, tables, moves, scratch);
        debug!(depth, moves = moves.len(), "divide: root legal moves");
    }

    let move_count = move_buffers[0].len();
    let mut rows = Vec::with_capacity(move_count);
    let mut total = 0u64;

    for i in 0..move_count {
        let mv = move_buffers[0][i];
        let undo = make_move(board, mv);
        let count = if depth == 1 {
            1
        } else {
            perft_recursive(
                board,
                tables,
                depth - 1,
                1,
                &mut move_buffers,
                &mut scratch_buffers,
            )
        };
        undo_move(board, undo);

        debug!(%mv, nodes = count, "divide: root child total");
        rows.push((mv, count));
        total += count;
    }

    debug!(depth, total, "divide: total");
    rows
}
