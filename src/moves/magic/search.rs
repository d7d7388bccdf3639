use rand::RngCore;

/// Generate a sparse 64-bit number by AND-ing three random values. Sparse
/// candidates collide less often in the magic index.
#[inline(always)]
pub fn random_sparse_u64<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

/// Attempts to build the attack table for one candidate magic.
///
/// Returns `None` on a destructive collision (two blocker sets hashing to
/// the same index with different attack sets). Constructive collisions are
/// allowed; they are what makes the table smaller than the subset count.
pub fn try_fill_table(
    blockers: &[u64],
    attacks: &[u64],
    magic: u64,
    shift: u32,
) -> Option<Box<[u64]>> {
    let size = 1usize << (64 - shift);
    let mut table = vec![0u64; size];
    let mut used = vec![false; size];

    for (&blocker, &attack) in blockers.iter().zip(attacks) {
        let index = (blocker.wrapping_mul(magic) >> shift) as usize;
        if used[index] {
            if table[index] != attack {
                return None;
            }
        } else {
            used[index] = true;
            table[index] = attack;
        }
    }
    Some(table.into_boxed_slice())
}

/// Searches random sparse candidates until one hashes every blocker subset
/// without a destructive collision, returning the magic and its filled
/// table.
pub fn find_magic_for_square<R: RngCore>(
    blockers: &[u64],
    attacks: &[u64],
    shift: u32,
    rng: &mut R,
) -> Result<(u64, Box<[u64]>), String> {
    for _attempt in 0..1_000_000 {
        let magic = random_sparse_u64(rng);
        if let Some(table) = try_fill_table(blockers, attacks, magic, shift) {
            return Ok((magic, table));
        }
    }
    Err("no valid magic number found after 1,000,000 attempts".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sparse_candidates_have_few_bits_on_average() {
        let mut rng = StdRng::seed_from_u64(7);
        let total: u32 = (0..256)
            .map(|_| random_sparse_u64(&mut rng).count_ones())
            .sum();
        // Expectation is 8 set bits; allow generous slack.
        assert!(total / 256 < 16);
    }

    #[test]
    fn destructive_collision_is_rejected() {
        // Two blocker sets, same index under magic=0 (everything maps to 0),
        // different attack sets: must be refused.
        let blockers = [0b01u64, 0b10u64];
        let attacks = [0xAAu64, 0x55u64];
        assert!(try_fill_table(&blockers, &attacks, 0, 63).is_none());

        // Identical attack sets may share an index.
        let attacks_same = [0xAAu64, 0xAAu64];
        assert!(try_fill_table(&blockers, &attacks_same, 0, 63).is_some());
    }
}
