//! Arena storage with a bucket-chained unique-table.
//!
//! Nodes live in a growable vector addressed by [`Ref`] handles; the first
//! two cells are the terminals. The unique-table is intrusive: each node
//! carries the index of the next node in its bucket, so `put` either finds
//! an existing `(level, low, high)` triple or appends a fresh node. Nodes
//! are never freed individually; the whole store drops as a unit.

use crate::node::{BddNode, Ref, TERMINAL_LEVEL};
use crate::utils::KeyHash;

pub struct NodeStore {
    nodes: Vec<BddNode>,
    buckets: Vec<u32>,
    bitmask: u64,
}

impl NodeStore {
    /// Create a store with `2^bits` unique-table buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "bucket bits should be in the range 0..=31");
        let terminal = |value: bool| BddNode::new(TERMINAL_LEVEL, Ref::ZERO, if value { Ref::ONE } else { Ref::ZERO });
        NodeStore {
            nodes: vec![terminal(false), terminal(true)],
            buckets: vec![0; 1 << bits],
            bitmask: ((1u64 << bits) - 1) as u64,
        }
    }

    /// Total number of allocated nodes, terminals included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        false // the terminals are always present
    }

    pub fn node(&self, r: Ref) -> &BddNode {
        &self.nodes[r.index() as usize]
    }

    fn bucket_of(&self, level: u32, low: Ref, high: Ref) -> usize {
        ((level, low, high).key_hash() & self.bitmask) as usize
    }

    /// Find or insert the node `(level, low, high)`.
    pub fn put(&mut self, level: u32, low: Ref, high: Ref) -> Ref {
        let bucket = self.bucket_of(level, low, high);
        let mut index = self.buckets[bucket];

        if index == 0 {
            let fresh = self.push(level, low, high);
            self.buckets[bucket] = fresh;
            return Ref::new(fresh);
        }

        loop {
            let node = &self.nodes[index as usize];
            if node.level == level && node.low == low && node.high == high {
                return Ref::new(index);
            }
            let next = node.next;
            if next == 0 {
                let fresh = self.push(level, low, high);
                self.nodes[index as usize].next = fresh;
                return Ref::new(fresh);
            }
            index = next;
        }
    }

    fn push(&mut self, level: u32, low: Ref, high: Ref) -> u32 {
        let index = self.nodes.len() as u32;
        self.nodes.push(BddNode::new(level, low, high));
        index
    }
}
