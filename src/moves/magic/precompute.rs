//! Builds the per-square magic attack tables: enumerate every subset of the
//! relevant-occupancy mask, ray-walk its true attack set, then search for a
//! magic number that perfect-hashes the subsets into a dense table.

use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use super::attacks::{
    bishop_attacks_per_square, bishop_relevant_mask, rook_attacks_per_square, rook_relevant_mask,
};
use super::search::find_magic_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};

#[cfg(feature = "deterministic_magic")]
const MAGIC_SEED: u64 = 0xD6E8_FEB8_6659_FD93;

/// Seed policy for the magic-number search.
#[derive(Debug, Clone, Copy)]
pub enum MagicTableSeed {
    Fixed(u64),
    Entropy,
}

/// Enumerates all subsets of `mask` with the carry-rippler trick, the empty
/// set included.
pub fn blocker_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1usize << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }
    subsets
}

fn build_entry<R: RngCore>(
    square: usize,
    mask: u64,
    attacks_for: fn(usize, u64) -> u64,
    rng: &mut R,
) -> Result<MagicEntry, String> {
    let bits = mask.count_ones();
    let shift = 64 - bits;

    let blockers = blocker_subsets(mask);
    let attacks: Vec<u64> = blockers.iter().map(|&b| attacks_for(square, b)).collect();

    let (magic, table) = find_magic_for_square(&blockers, &attacks, shift, rng)
        .map_err(|e| format!("square {}: {}", square, e))?;

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table,
    })
}

/// Generates both slider tables. With a fixed seed the chosen magics are
/// reproducible; the attack sets the tables answer with are identical for
/// any valid magic.
pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(s),
        MagicTableSeed::Entropy => {
            let mut bytes = [0u8; 32];
            rand::rng().fill_bytes(&mut bytes);
            StdRng::from_seed(bytes)
        }
    };

    let rook_entries = (0..64)
        .map(|sq| build_entry(sq, rook_relevant_mask(sq), rook_attacks_per_square, &mut rng))
        .collect::<Result<Vec<_>, _>>()?;

    let bishop_entries = (0..64)
        .map(|sq| {
            build_entry(
                sq,
                bishop_relevant_mask(sq),
                bishop_attacks_per_square,
                &mut rng,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("magic tables generated for 64 rook and 64 bishop squares");

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}

fn default_seed() -> MagicTableSeed {
    #[cfg(feature = "deterministic_magic")]
    {
        MagicTableSeed::Fixed(MAGIC_SEED)
    }
    #[cfg(not(feature = "deterministic_magic"))]
    {
        MagicTableSeed::Entropy
    }
}

/// Process-wide tables, built behind a one-shot guard on first use and
/// immutable afterwards. Every call returns the same `'static` reference.
pub fn tables() -> &'static MagicTables {
    static TABLES: OnceCell<MagicTables> = OnceCell::new();
    TABLES.get_or_init(|| {
        generate_magic_tables(default_seed()).expect("magic table generation failed")
    })
}
