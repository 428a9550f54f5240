//! Pairing-function hashing for the unique-table and the apply-cache.

use crate::node::Ref;

/// [Szudzik pairing function][szudzik-pairing], wrapping on overflow.
///
/// ```text
/// (a, b) -> if (a < b) then (b^2 + a) else (a^2 + a + b)
/// ```
///
/// [szudzik-pairing]: http://szudzik.com/ElegantPairing.pdf
pub fn pairing2(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

/// Pairing function for three `u64` values.
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing2(pairing2(a, b), c)
}

/// Cheap structural hash used by the bucketed tables. Unlike `std::hash`,
/// implementors produce the full key directly, which keeps bucket selection
/// a single mask.
pub trait KeyHash {
    fn key_hash(&self) -> u64;
}

impl KeyHash for (u32, Ref, Ref) {
    fn key_hash(&self) -> u64 {
        pairing3(self.0 as u64, self.1.index() as u64, self.2.index() as u64)
    }
}

impl KeyHash for (u8, Ref, Ref) {
    fn key_hash(&self) -> u64 {
        pairing3(self.0 as u64, self.1.index() as u64, self.2.index() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairing2_is_injective_on_small_grid() {
        let mut seen = std::collections::HashSet::new();
        for a in 0..32u64 {
            for b in 0..32u64 {
                assert!(seen.insert(pairing2(a, b)), "collision at ({a}, {b})");
            }
        }
    }

    #[test]
    fn test_pairing2_values() {
        // a\b  0  1  2  3
        // ---------------
        // 0    0  1  4  9
        // 1    2  3  5 10
        // 2    6  7  8 11
        // 3   12 13 14 15
        assert_eq!(pairing2(0, 0), 0);
        assert_eq!(pairing2(0, 1), 1);
        assert_eq!(pairing2(1, 0), 2);
        assert_eq!(pairing2(1, 1), 3);
        assert_eq!(pairing2(3, 0), 12);
        assert_eq!(pairing2(3, 3), 15);
    }

    #[test]
    fn test_triple_hash_distinguishes_order() {
        let a = (0u32, Ref::ZERO, Ref::ONE).key_hash();
        let b = (0u32, Ref::ONE, Ref::ZERO).key_hash();
        assert_ne!(a, b);
    }
}
