//! Direct-mapped operation cache for the BDD manager.
//!
//! A fixed-size table indexed by the masked key hash. Colliding inserts
//! overwrite; that is safe because every cached value can be recomputed.
//! Hit and miss counters are kept in `Cell`s so read paths stay `&self`.

use std::cell::Cell;

use crate::utils::KeyHash;

pub struct OpCache<K, V> {
    slots: Vec<Option<(K, V)>>,
    bitmask: u64,
    hits: Cell<usize>,
    misses: Cell<usize>,
}

impl<K, V> OpCache<K, V> {
    /// Create a cache with `2^bits` slots.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "cache bits should be in the range 0..=31");
        let size = 1usize << bits;
        OpCache {
            slots: std::iter::repeat_with(|| None).take(size).collect(),
            bitmask: (size - 1) as u64,
            hits: Cell::new(0),
            misses: Cell::new(0),
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.get()
    }

    pub fn misses(&self) -> usize {
        self.misses.get()
    }

    pub fn clear(&mut self) {
        self.slots.fill_with(|| None);
    }
}

impl<K, V> OpCache<K, V>
where
    K: KeyHash + Eq,
    V: Copy,
{
    fn slot(&self, key: &K) -> usize {
        (key.key_hash() & self.bitmask) as usize
    }

    pub fn get(&self, key: &K) -> Option<V> {
        match &self.slots[self.slot(key)] {
            Some((stored, value)) if stored == key => {
                self.hits.set(self.hits.get() + 1);
                Some(*value)
            }
            _ => {
                self.misses.set(self.misses.get() + 1);
                None
            }
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        let slot = self.slot(&key);
        self.slots[slot] = Some((key, value));
    }
}
