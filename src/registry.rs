//! The operator registry: precedences, associativity, node factories,
//! aliases and suggestion parameters.
//!
//! Both parser strategies and the tokenizer consult the same registry, so a
//! registered alias is immediately usable everywhere. All lookups are
//! case-insensitive. A process-wide default registry lives behind a lock and
//! is expected to be configured at startup, before parsing begins.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::ast::{BinaryOp, Expr};

/// Builds an AST node from a single operand.
pub type UnaryFactory = fn(Expr) -> Expr;
/// Builds an AST node from two operands (left, right).
pub type BinaryFactory = fn(Expr, Expr) -> Expr;

/// Symbol table shared by the tokenizer and both parser strategies.
#[derive(Clone)]
pub struct OperatorRegistry {
    precedence: HashMap<String, u8>,
    right_assoc: HashSet<String>,
    unary_factories: HashMap<String, UnaryFactory>,
    binary_factories: HashMap<String, BinaryFactory>,
    /// Lowercased alias -> canonical symbol.
    operator_aliases: HashMap<String, String>,
    /// Lowercased alias -> constant value.
    constant_aliases: HashMap<String, bool>,
    /// Lowercased word forms of negation, checked before operator aliases.
    negation_words: HashSet<String>,
    /// All symbolic (non-alphabetic) spellings, longest first. Rebuilt on
    /// every registration.
    symbol_candidates: Vec<(String, String)>,
    suggestion_max_distance: usize,
    suggestion_max_items: usize,
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        let mut reg = OperatorRegistry {
            precedence: HashMap::new(),
            right_assoc: HashSet::new(),
            unary_factories: HashMap::new(),
            binary_factories: HashMap::new(),
            operator_aliases: HashMap::new(),
            constant_aliases: HashMap::new(),
            negation_words: HashSet::new(),
            symbol_candidates: Vec::new(),
            suggestion_max_distance: 2,
            suggestion_max_items: 3,
        };

        reg.register_unary("~", 5, Expr::not);
        reg.register_binary("&", 4, false, Expr::and);
        reg.register_binary("!&", 4, false, |l, r| Expr::binary(BinaryOp::Nand, l, r));
        reg.register_binary("^", 3, false, Expr::xor);
        reg.register_binary("|", 2, false, Expr::or);
        reg.register_binary("!|", 2, false, |l, r| Expr::binary(BinaryOp::Nor, l, r));
        reg.register_binary("=>", 1, true, Expr::imply);
        reg.register_binary("<=>", 0, false, Expr::iff);

        for alias in ["AND", "∧", "&&", "·"] {
            reg.register_operator_alias(alias, "&");
        }
        for alias in ["OR", "∨", "||", "+"] {
            reg.register_operator_alias(alias, "|");
        }
        for alias in ["NOT", "¬", "!", "не"] {
            reg.register_operator_alias(alias, "~");
        }
        for alias in ["XOR", "⊕", "⊻"] {
            reg.register_operator_alias(alias, "^");
        }
        for alias in ["IMPLIES", "IMPL", "→", "->"] {
            reg.register_operator_alias(alias, "=>");
        }
        for alias in ["IFF", "EQUIV", "≡", "⇔", "↔", "<->"] {
            reg.register_operator_alias(alias, "<=>");
        }
        reg.register_operator_alias("NAND", "!&");
        reg.register_operator_alias("↑", "!&");
        reg.register_operator_alias("NOR", "!|");
        reg.register_operator_alias("↓", "!|");

        for alias in ["true", "T", "⊤"] {
            reg.register_constant_alias(alias, true);
        }
        for alias in ["false", "F", "⊥"] {
            reg.register_constant_alias(alias, false);
        }

        reg
    }
}

impl OperatorRegistry {
    /// Register a unary operator under its canonical symbol.
    pub fn register_unary(&mut self, symbol: &str, precedence: u8, factory: UnaryFactory) {
        let key = symbol.to_lowercase();
        self.precedence.insert(key.clone(), precedence);
        // Prefix operators always bind to the right.
        self.right_assoc.insert(key.clone());
        self.unary_factories.insert(key, factory);
        self.rebuild_candidates();
    }

    /// Register a binary operator under its canonical symbol.
    pub fn register_binary(&mut self, symbol: &str, precedence: u8, right_assoc: bool, factory: BinaryFactory) {
        let key = symbol.to_lowercase();
        self.precedence.insert(key.clone(), precedence);
        if right_assoc {
            self.right_assoc.insert(key.clone());
        }
        self.binary_factories.insert(key, factory);
        self.rebuild_candidates();
    }

    /// Register an alias for an existing operator. Word-form aliases of the
    /// negation operator are additionally remembered as prefix words so the
    /// tokenizer can classify them before general alias resolution.
    pub fn register_operator_alias(&mut self, alias: &str, canonical: &str) {
        let key = alias.to_lowercase();
        let canonical = canonical.to_lowercase();
        if self.unary_factories.contains_key(&canonical) && key.chars().all(|c| c.is_alphabetic()) {
            self.negation_words.insert(key.clone());
        }
        self.operator_aliases.insert(key, canonical);
        self.rebuild_candidates();
    }

    pub fn register_constant_alias(&mut self, alias: &str, value: bool) {
        self.constant_aliases.insert(alias.to_lowercase(), value);
        self.rebuild_candidates();
    }

    pub fn set_suggestion_params(&mut self, max_distance: usize, max_items: usize) {
        self.suggestion_max_distance = max_distance;
        self.suggestion_max_items = max_items;
    }

    fn rebuild_candidates(&mut self) {
        let mut candidates: Vec<(String, String)> = Vec::new();
        for symbol in self.precedence.keys() {
            if !symbol.chars().all(|c| c.is_alphabetic()) {
                candidates.push((symbol.clone(), symbol.clone()));
            }
        }
        for (alias, canonical) in &self.operator_aliases {
            if !alias.chars().all(|c| c.is_alphabetic()) {
                candidates.push((alias.clone(), canonical.clone()));
            }
        }
        // Longest first, so `<=>` wins over `<=` and `&&` over `&`.
        candidates.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });
        self.symbol_candidates = candidates;
    }

    /// Resolve any spelling (canonical or alias) to the canonical symbol.
    pub fn resolve_operator(&self, text: &str) -> Option<&str> {
        let key = text.to_lowercase();
        if self.precedence.contains_key(&key) {
            return self.precedence.get_key_value(&key).map(|(k, _)| k.as_str());
        }
        self.operator_aliases.get(&key).map(|s| s.as_str())
    }

    pub fn resolve_constant(&self, text: &str) -> Option<bool> {
        self.constant_aliases.get(&text.to_lowercase()).copied()
    }

    pub fn is_negation_word(&self, text: &str) -> bool {
        self.negation_words.contains(&text.to_lowercase())
    }

    pub fn precedence(&self, symbol: &str) -> Option<u8> {
        self.precedence.get(&symbol.to_lowercase()).copied()
    }

    pub fn is_right_associative(&self, symbol: &str) -> bool {
        self.right_assoc.contains(&symbol.to_lowercase())
    }

    pub fn is_unary(&self, symbol: &str) -> bool {
        self.unary_factories.contains_key(&symbol.to_lowercase())
    }

    pub fn is_binary(&self, symbol: &str) -> bool {
        self.binary_factories.contains_key(&symbol.to_lowercase())
    }

    pub fn unary_factory(&self, symbol: &str) -> Option<UnaryFactory> {
        self.unary_factories.get(&symbol.to_lowercase()).copied()
    }

    pub fn binary_factory(&self, symbol: &str) -> Option<BinaryFactory> {
        self.binary_factories.get(&symbol.to_lowercase()).copied()
    }

    /// Longest operator spelling that is a prefix of `rest`, with its
    /// canonical symbol and its length in chars.
    pub fn longest_match(&self, rest: &[char]) -> Option<(&str, usize)> {
        for (spelling, canonical) in &self.symbol_candidates {
            let len = spelling.chars().count();
            if rest.len() >= len && rest.iter().take(len).copied().eq(spelling.chars()) {
                return Some((canonical.as_str(), len));
            }
        }
        None
    }

    /// Registered spellings nearest to `text` by Levenshtein distance, within
    /// the configured threshold, best first.
    pub fn suggestions_for(&self, text: &str) -> Vec<String> {
        let needle = text.to_lowercase();
        let mut scored: Vec<(usize, &String)> = self
            .precedence
            .keys()
            .chain(self.operator_aliases.keys())
            .chain(self.constant_aliases.keys())
            .map(|known| (levenshtein(&needle, known), known))
            .filter(|(d, _)| *d <= self.suggestion_max_distance)
            .collect();
        scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(self.suggestion_max_items)
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn suggestion_max_distance(&self) -> usize {
        self.suggestion_max_distance
    }

    pub fn suggestion_max_items(&self) -> usize {
        self.suggestion_max_items
    }
}

/// Edit distance between two strings, by the usual two-row dynamic program.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let subst = prev[j] + usize::from(ca != cb);
            curr[j + 1] = subst.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

static GLOBAL: Lazy<RwLock<OperatorRegistry>> = Lazy::new(|| RwLock::new(OperatorRegistry::default()));

/// Snapshot of the process-wide registry.
pub fn global() -> OperatorRegistry {
    GLOBAL.read().unwrap_or_else(|e| e.into_inner()).clone()
}

/// Mutate the process-wide registry. Intended for startup configuration;
/// concurrent mutation while parsing is not supported.
pub fn with_global_mut<R>(f: impl FnOnce(&mut OperatorRegistry) -> R) -> R {
    let mut guard = GLOBAL.write().unwrap_or_else(|e| e.into_inner());
    f(&mut guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_precedences() {
        let reg = OperatorRegistry::default();
        assert_eq!(reg.precedence("~"), Some(5));
        assert_eq!(reg.precedence("&"), Some(4));
        assert_eq!(reg.precedence("!&"), Some(4));
        assert_eq!(reg.precedence("^"), Some(3));
        assert_eq!(reg.precedence("|"), Some(2));
        assert_eq!(reg.precedence("!|"), Some(2));
        assert_eq!(reg.precedence("=>"), Some(1));
        assert_eq!(reg.precedence("<=>"), Some(0));
        assert!(reg.is_right_associative("=>"));
        assert!(reg.is_right_associative("~"));
        assert!(!reg.is_right_associative("&"));
    }

    #[test]
    fn test_alias_resolution_is_case_insensitive() {
        let reg = OperatorRegistry::default();
        assert_eq!(reg.resolve_operator("AND"), Some("&"));
        assert_eq!(reg.resolve_operator("and"), Some("&"));
        assert_eq!(reg.resolve_operator("∧"), Some("&"));
        assert_eq!(reg.resolve_operator("Implies"), Some("=>"));
        assert_eq!(reg.resolve_operator("nonsense"), None);
        assert_eq!(reg.resolve_constant("TRUE"), Some(true));
        assert_eq!(reg.resolve_constant("⊥"), Some(false));
    }

    #[test]
    fn test_negation_words() {
        let reg = OperatorRegistry::default();
        assert!(reg.is_negation_word("NOT"));
        assert!(reg.is_negation_word("не"));
        assert!(!reg.is_negation_word("AND"));
    }

    #[test]
    fn test_longest_match_prefers_longer_spelling() {
        let reg = OperatorRegistry::default();
        let chars: Vec<char> = "<=> A".chars().collect();
        assert_eq!(reg.longest_match(&chars), Some(("<=>", 3)));
        let chars: Vec<char> = "&& B".chars().collect();
        assert_eq!(reg.longest_match(&chars), Some(("&", 2)));
        let chars: Vec<char> = "& B".chars().collect();
        assert_eq!(reg.longest_match(&chars), Some(("&", 1)));
    }

    #[test]
    fn test_registration_updates_candidates() {
        let mut reg = OperatorRegistry::default();
        let chars: Vec<char> = "<~> x".chars().collect();
        assert_eq!(reg.longest_match(&chars), None);
        reg.register_operator_alias("<~>", "<=>");
        assert_eq!(reg.longest_match(&chars), Some(("<=>", 3)));
    }

    #[test]
    fn test_suggestions_ranked_by_distance() {
        let reg = OperatorRegistry::default();
        let hints = reg.suggestions_for("ANDD");
        assert!(hints.contains(&"and".to_string()), "{hints:?}");
        assert!(hints.len() <= 3);
        assert!(reg.suggestions_for("zzzzzz").is_empty());
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("a", ""), 1);
        assert_eq!(levenshtein("and", "nand"), 1);
        assert_eq!(levenshtein("xor", "or"), 1);
        assert_eq!(levenshtein("iff", "impl"), 3);
    }

    #[test]
    fn test_custom_binary_registration() {
        let mut reg = OperatorRegistry::default();
        // Exclusive-nor desugars to negated xor.
        reg.register_binary("<+>", 3, false, |l, r| Expr::not(Expr::xor(l, r)));
        assert!(reg.is_binary("<+>"));
        let factory = reg.binary_factory("<+>").unwrap();
        let e = factory(Expr::var("a"), Expr::var("b"));
        assert_eq!(e.to_string(), "~(a ^ b)");
    }
}
