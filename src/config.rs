//! Crate-wide configuration and the two process-wide caches.
//!
//! When a cache reaches its configured maximum it is cleared (entirely, or
//! down by the configured percentage). Entries are recomputable values, so
//! a lost entry costs time, never correctness, and last-write-wins between
//! racing threads is acceptable.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock};
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

use crate::ast::Expr;
use crate::eval::CompiledEvaluator;
use crate::parse::ParserStrategy;
use crate::registry;

/// Tunable options recognized by the parsing and evaluation pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Parser algorithm.
    pub strategy: ParserStrategy,
    /// Attach Levenshtein hints to unknown-token errors.
    pub enable_alias_suggestions: bool,
    /// Parsed-AST cache capacity.
    pub ast_max_cache_size: usize,
    /// Share of AST cache entries dropped on overflow; 100 clears the
    /// whole cache.
    pub ast_evict_percent: usize,
    /// Expire AST cache entries by age.
    pub enable_ast_ttl_eviction: bool,
    /// Age limit for AST cache entries when TTL eviction is on.
    pub ast_ttl: Duration,
    /// Compiled-evaluator cache capacity.
    pub delegate_max_cache_size: usize,
    /// Share of compiled-evaluator entries dropped on overflow.
    pub delegate_evict_percent: usize,
    /// Apply NFKC normalization before tokenizing.
    pub enable_unicode_normalization: bool,
    /// Maximum edit distance for unknown-token suggestions.
    pub suggestion_max_distance: usize,
    /// Maximum number of unknown-token suggestions.
    pub suggestion_max_items: usize,
    /// Compile `&`/`|` with short-circuiting.
    pub use_short_circuiting: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            strategy: ParserStrategy::ShuntingYard,
            enable_alias_suggestions: true,
            ast_max_cache_size: 1024,
            ast_evict_percent: 100,
            enable_ast_ttl_eviction: false,
            ast_ttl: Duration::from_secs(300),
            delegate_max_cache_size: 2048,
            delegate_evict_percent: 100,
            enable_unicode_normalization: true,
            suggestion_max_distance: 2,
            suggestion_max_items: 3,
            use_short_circuiting: true,
        }
    }
}

static SETTINGS: Lazy<RwLock<Settings>> = Lazy::new(|| RwLock::new(Settings::default()));

/// Install new process-wide settings. The suggestion parameters are pushed
/// into the global operator registry as well.
pub fn configure(settings: Settings) {
    registry::with_global_mut(|reg| {
        reg.set_suggestion_params(settings.suggestion_max_distance, settings.suggestion_max_items)
    });
    *SETTINGS.write().unwrap_or_else(|e| e.into_inner()) = settings;
}

/// Snapshot of the process-wide settings.
pub fn settings() -> Settings {
    SETTINGS.read().unwrap_or_else(|e| e.into_inner()).clone()
}

struct AstEntry {
    ast: Expr,
    stored_at: Instant,
}

static AST_CACHE: Lazy<Mutex<HashMap<String, AstEntry>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn ast_cache() -> MutexGuard<'static, HashMap<String, AstEntry>> {
    AST_CACHE.lock().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn ast_cache_get(key: &str, settings: &Settings) -> Option<Expr> {
    let mut cache = ast_cache();
    if settings.enable_ast_ttl_eviction {
        if let Some(entry) = cache.get(key) {
            if entry.stored_at.elapsed() > settings.ast_ttl {
                cache.remove(key);
                return None;
            }
        }
    }
    cache.get(key).map(|entry| entry.ast.clone())
}

/// Drop `percent` of a full cache; 100 (the default) clears it entirely.
fn evict<K: Clone + std::hash::Hash + Eq, V>(cache: &mut HashMap<K, V>, percent: usize) {
    if percent >= 100 {
        cache.clear();
        return;
    }
    let victims = cache.len() * percent / 100;
    let keys: Vec<K> = cache.keys().take(victims.max(1)).cloned().collect();
    for key in keys {
        cache.remove(&key);
    }
}

pub(crate) fn ast_cache_put(key: String, ast: Expr, settings: &Settings) {
    let mut cache = ast_cache();
    if cache.len() >= settings.ast_max_cache_size {
        evict(&mut cache, settings.ast_evict_percent);
    }
    cache.insert(
        key,
        AstEntry {
            ast,
            stored_at: Instant::now(),
        },
    );
}

/// Drop every cached parse result.
pub fn clear_ast_cache() {
    ast_cache().clear();
}

/// Number of cached parse results, for diagnostics.
pub fn ast_cache_len() -> usize {
    ast_cache().len()
}

type DelegateKey = (bool, String, Vec<String>);

static DELEGATE_CACHE: Lazy<Mutex<HashMap<DelegateKey, CompiledEvaluator>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn delegate_cache() -> MutexGuard<'static, HashMap<DelegateKey, CompiledEvaluator>> {
    DELEGATE_CACHE.lock().unwrap_or_else(|e| e.into_inner())
}

pub(crate) fn delegate_cache_get(key: &DelegateKey) -> Option<CompiledEvaluator> {
    delegate_cache().get(key).cloned()
}

pub(crate) fn delegate_cache_put(key: DelegateKey, evaluator: CompiledEvaluator, settings: &Settings) {
    let mut cache = delegate_cache();
    if cache.len() >= settings.delegate_max_cache_size {
        evict(&mut cache, settings.delegate_evict_percent);
    }
    cache.insert(key, evaluator);
}

/// Drop every cached compiled evaluator.
pub fn clear_delegate_cache() {
    delegate_cache().clear();
}

/// Number of cached compiled evaluators, for diagnostics.
pub fn delegate_cache_len() -> usize {
    delegate_cache().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.strategy, ParserStrategy::ShuntingYard);
        assert!(s.enable_alias_suggestions);
        assert_eq!(s.ast_max_cache_size, 1024);
        assert_eq!(s.delegate_max_cache_size, 2048);
        assert!(s.enable_unicode_normalization);
        assert!(s.use_short_circuiting);
    }

    #[test]
    fn test_ast_cache_eviction_is_full_clear() {
        let settings = Settings {
            ast_max_cache_size: 2,
            ..Settings::default()
        };
        clear_ast_cache();
        ast_cache_put("k1".to_string(), Expr::Const(true), &settings);
        ast_cache_put("k2".to_string(), Expr::Const(false), &settings);
        // Hitting the maximum clears everything before inserting.
        ast_cache_put("k3".to_string(), Expr::Const(true), &settings);
        assert!(ast_cache_get("k1", &settings).is_none());
        assert!(ast_cache_get("k2", &settings).is_none());
        assert_eq!(ast_cache_get("k3", &settings), Some(Expr::Const(true)));
        clear_ast_cache();
    }

    #[test]
    fn test_partial_eviction_keeps_some_entries() {
        let mut cache: HashMap<String, u32> = (0..10).map(|i| (format!("k{i}"), i)).collect();
        evict(&mut cache, 30);
        assert_eq!(cache.len(), 7);
        evict(&mut cache, 100);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ast_cache_ttl() {
        let settings = Settings {
            enable_ast_ttl_eviction: true,
            ast_ttl: Duration::ZERO,
            ..Settings::default()
        };
        clear_ast_cache();
        ast_cache_put("stale".to_string(), Expr::Const(true), &settings);
        std::thread::sleep(Duration::from_millis(2));
        assert!(ast_cache_get("stale", &settings).is_none());
        clear_ast_cache();
    }
}
