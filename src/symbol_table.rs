//! # Symbol Table
//!
//! Bidirectional string interning. Symbols are stored once and handed out as
//! dense `RamDomain` ids starting at 0, so a symbol column costs the same as a
//! number column inside a tuple.
//!
//! Interning goes through `&self`: relations hand out shared references to
//! their table while tuples bound to them are being written. The maps sit
//! behind a `parking_lot::RwLock`, so resolves can run concurrently.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::schema::RamDomain;

#[derive(Debug, Default)]
struct Symbols {
    by_name: HashMap<Arc<str>, RamDomain>,
    by_id: Vec<Arc<str>>,
}

/// Deduplicating string <-> id directory shared by all relations of a program
#[derive(Debug, Default)]
pub struct SymbolTable {
    inner: RwLock<Symbols>,
}

impl SymbolTable {
    /// Create an empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a symbol table pre-populated with `symbols`, in order
    pub fn with_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = Self::new();
        for symbol in symbols {
            table.lookup(symbol.as_ref());
        }
        table
    }

    /// Intern `symbol`, returning its id. Inserts on first sight.
    pub fn lookup(&self, symbol: &str) -> RamDomain {
        if let Some(&id) = self.inner.read().by_name.get(symbol) {
            return id;
        }

        let mut symbols = self.inner.write();
        // Another writer may have won the race between the two locks
        if let Some(&id) = symbols.by_name.get(symbol) {
            return id;
        }
        let id = RamDomain::try_from(symbols.by_id.len())
            .unwrap_or_else(|_| panic!("symbol table exhausted the domain"));
        let shared: Arc<str> = Arc::from(symbol);
        symbols.by_name.insert(Arc::clone(&shared), id);
        symbols.by_id.push(shared);
        id
    }

    /// Resolve an id back to its symbol.
    ///
    /// Panics if `id` was never handed out by this table.
    pub fn resolve(&self, id: RamDomain) -> String {
        self.try_resolve(id)
            .unwrap_or_else(|| panic!("unknown symbol id {id}"))
    }

    /// Resolve an id, returning `None` for ids this table never issued
    pub fn try_resolve(&self, id: RamDomain) -> Option<String> {
        let idx = usize::try_from(id).ok()?;
        self.inner.read().by_id.get(idx).map(|s| s.to_string())
    }

    /// Whether `symbol` has been interned
    pub fn contains(&self, symbol: &str) -> bool {
        self.inner.read().by_name.contains_key(symbol)
    }

    /// Number of interned symbols
    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().by_id.is_empty()
    }

    /// Snapshot of all symbols in id order
    pub fn symbols(&self) -> Vec<String> {
        self.inner.read().by_id.iter().map(|s| s.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_idempotent() {
        let table = SymbolTable::new();
        let a = table.lookup("alice");
        let b = table.lookup("bob");
        assert_ne!(a, b);
        assert_eq!(table.lookup("alice"), a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_ids_are_dense() {
        let table = SymbolTable::with_symbols(["x", "y", "z"]);
        assert_eq!(table.lookup("x"), 0);
        assert_eq!(table.lookup("y"), 1);
        assert_eq!(table.lookup("z"), 2);
        assert_eq!(table.symbols(), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_resolve_round_trip() {
        let table = SymbolTable::new();
        let id = table.lookup("hello world");
        assert_eq!(table.resolve(id), "hello world");
        assert!(table.contains("hello world"));
        assert!(!table.contains("hello"));
    }

    #[test]
    fn test_try_resolve_unknown() {
        let table = SymbolTable::new();
        assert!(table.is_empty());
        assert_eq!(table.try_resolve(0), None);
        assert_eq!(table.try_resolve(-1), None);
    }

    #[test]
    #[should_panic(expected = "unknown symbol id")]
    fn test_resolve_unknown_panics() {
        SymbolTable::new().resolve(7);
    }

    #[test]
    fn test_empty_string_is_a_symbol() {
        let table = SymbolTable::new();
        let id = table.lookup("");
        assert_eq!(table.resolve(id), "");
    }
}
