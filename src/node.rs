//! Node handles and the stored node record of a BDD manager.

use std::fmt::{self, Display, Formatter};

/// Handle to a node inside one manager's arena.
///
/// Handles `0` and `1` are reserved for the terminals `⊥` and `⊤` and mean
/// the same thing in every manager; all other handles are only meaningful
/// within the manager that produced them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct Ref(u32);

impl Ref {
    /// The `⊥` terminal.
    pub const ZERO: Ref = Ref(0);
    /// The `⊤` terminal.
    pub const ONE: Ref = Ref(1);
    /// Sentinel standing in for the absent right operand of unary cache keys.
    pub const NONE: Ref = Ref(u32::MAX);

    pub(crate) const fn new(index: u32) -> Self {
        Ref(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }

    pub const fn is_terminal(self) -> bool {
        self.0 <= 1
    }

    /// Terminal truth value; only meaningful for terminals.
    pub const fn terminal_value(self) -> bool {
        self.0 == 1
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Ref::ZERO => f.write_str("⊥"),
            Ref::ONE => f.write_str("⊤"),
            Ref(i) => write!(f, "@{}", i),
        }
    }
}

/// Level assigned to terminals, below every real variable level.
pub const TERMINAL_LEVEL: u32 = u32::MAX;

/// One stored decision node: `(level, low, high)` plus the intrusive chain
/// link of the unique-table bucket it hashes into.
#[derive(Debug, Copy, Clone)]
pub struct BddNode {
    pub level: u32,
    pub low: Ref,
    pub high: Ref,
    /// Next node index in the same bucket; `0` terminates the chain.
    pub next: u32,
}

impl BddNode {
    pub fn new(level: u32, low: Ref, high: Ref) -> Self {
        BddNode {
            level,
            low,
            high,
            next: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals() {
        assert!(Ref::ZERO.is_terminal());
        assert!(Ref::ONE.is_terminal());
        assert!(!Ref::new(2).is_terminal());
        assert!(!Ref::ZERO.terminal_value());
        assert!(Ref::ONE.terminal_value());
    }

    #[test]
    fn test_display() {
        assert_eq!(Ref::ZERO.to_string(), "⊥");
        assert_eq!(Ref::ONE.to_string(), "⊤");
        assert_eq!(Ref::new(7).to_string(), "@7");
    }
}
