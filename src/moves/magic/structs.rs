use serde::{Deserialize, Serialize};

/// A single magic bitboard entry used to compute sliding piece attacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicEntry {
    /// The magic number used to hash blocker bitboards into attack indices.
    pub magic: u64,

    /// The number of bits to shift after multiplication to get the table index.
    pub shift: u32,

    /// The precomputed vision mask for this square.
    pub mask: u64,

    /// The precomputed attack table indexed by (blockers * magic) >> shift.
    pub table: Box<[u64]>,
}

impl MagicEntry {
    #[inline(always)]
    fn attacks(&self, blockers: u64) -> u64 {
        let masked = blockers & self.mask;
        let index = (masked.wrapping_mul(self.magic) >> self.shift) as usize;
        self.table[index]
    }
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RookMagicTables {
    pub entries: Vec<MagicEntry>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BishopMagicTables {
    pub entries: Vec<MagicEntry>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagicTables {
    pub rook: RookMagicTables,
    pub bishop: BishopMagicTables,
}

impl RookMagicTables {
    /// Returns the rook attack bitboard for a given square and blockers.
    #[inline(always)]
    pub fn get_attacks(&self, square: usize, blockers: u64) -> u64 {
        self.entries[square].attacks(blockers)
    }
}

impl BishopMagicTables {
    /// Returns the bishop attack bitboard for a given square and blockers.
    #[inline(always)]
    pub fn get_attacks(&self, square: usize, blockers: u64) -> u64 {
        self.entries[square].attacks(blockers)
    }
}

impl MagicTables {
    /// Returns queen attacks by combining rook and bishop magic lookups.
    #[inline(always)]
    pub fn queen_attacks(&self, square: usize, blockers: u64) -> u64 {
        self.rook.get_attacks(square, blockers) | self.bishop.get_attacks(square, blockers)
    }

    /// Serialized form for embedders that persist the tables instead of
    /// regenerating them at startup.
    pub fn to_bytes(&self) -> Vec<u8> {
        bincode::serialize(self).expect("magic tables serialize")
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        bincode::deserialize(bytes).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::attacks::{bishop_attacks_per_square, rook_attacks_per_square};
    use crate::moves::magic::precompute::{MagicTableSeed, generate_magic_tables};

    /// One constant seed for repeatable results.
    const TEST_SEED: u64 = 0x45;

    fn build_tables() -> MagicTables {
        generate_magic_tables(MagicTableSeed::Fixed(TEST_SEED))
            .expect("Failed to generate magic tables")
    }

    #[test]
    fn bishop_magic_lookup_matches_scan() {
        let square = 27; // d4
        let blockers = (1u64 << 41) | (1u64 << 21); // b6 + f3

        let expected = bishop_attacks_per_square(square, blockers);
        let tables = build_tables();
        assert_eq!(
            tables.bishop.get_attacks(square, blockers),
            expected,
            "Magic lookup result does not match scan-based bishop attack generation"
        );
    }

    #[test]
    fn rook_magic_lookup_matches_scan() {
        let square = 27; // d4
        let blockers = (1u64 << 19) | (1u64 << 35); // d3 + d5

        let expected = rook_attacks_per_square(square, blockers);
        let tables = build_tables();
        assert_eq!(
            tables.rook.get_attacks(square, blockers),
            expected,
            "Magic lookup result does not match scan-based rook attack generation"
        );
    }

    #[test]
    fn queen_magic_lookup_matches_combined() {
        let square = 27; // d4
        let blockers = (1u64 << 19) | (1u64 << 35) | (1u64 << 41) | (1u64 << 21);

        let expected = rook_attacks_per_square(square, blockers)
            | bishop_attacks_per_square(square, blockers);
        let tables = build_tables();
        assert_eq!(tables.queen_attacks(square, blockers), expected);
    }

    #[test]
    fn serialized_tables_round_trip() {
        let tables = build_tables();
        let bytes = tables.to_bytes();
        let restored = MagicTables::from_bytes(&bytes).expect("deserialize magic tables");
        assert_eq!(restored, tables);

        // Restored tables answer queries identically.
        for square in [0usize, 7, 27, 36, 63] {
            let blockers = 0x0042_0010_0800_2400u64;
            assert_eq!(
                restored.rook.get_attacks(square, blockers),
                tables.rook.get_attacks(square, blockers)
            );
            assert_eq!(
                restored.bishop.get_attacks(square, blockers),
                tables.bishop.get_attacks(square, blockers)
            );
        }
    }
}
