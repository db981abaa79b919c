//! # In-Memory Relation
//!
//! [`MemoryRelation`] keeps its tuples as a sorted list of distinct rows.
//! Inserts binary-search for their slot and drop duplicates, so iteration
//! order is ascending by raw domain values and stays stable until the next
//! mutation.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::iterator::{CorePosition, IteratorCore, RelationIter};
use crate::relation::Relation;
use crate::schema::{AttrType, RamDomain, RelationSchema};
use crate::symbol_table::SymbolTable;
use crate::tuple::Tuple;

/// Kind id reported by [`MemoryIter`]
pub const MEMORY_ITER_KIND: u32 = 1;

/// Set-semantics relation backed by a sorted `Vec` of rows
#[derive(Debug)]
pub struct MemoryRelation {
    schema: RelationSchema,
    symbols: Arc<SymbolTable>,
    /// Sorted list of distinct rows
    rows: RwLock<Vec<Vec<RamDomain>>>,
}

impl MemoryRelation {
    pub fn new(schema: RelationSchema, symbols: Arc<SymbolTable>) -> Self {
        MemoryRelation {
            schema,
            symbols,
            rows: RwLock::new(Vec::new()),
        }
    }

    pub fn schema(&self) -> &RelationSchema {
        &self.schema
    }

    /// Insert a raw row. Returns `false` if it was already present.
    pub fn insert_values(&self, values: Vec<RamDomain>) -> bool {
        debug_assert_eq!(
            values.len(),
            self.schema.arity(),
            "row width does not match arity of relation '{}'",
            self.schema.name
        );
        let mut rows = self.rows.write();
        match rows.binary_search(&values) {
            Ok(_) => false,
            Err(slot) => {
                rows.insert(slot, values);
                true
            }
        }
    }

    /// Insert many raw rows at once. Returns how many were new.
    pub fn extend_values(&self, values: impl IntoIterator<Item = Vec<RamDomain>>) -> usize {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.extend(values);
        rows.sort_unstable();
        rows.dedup();
        rows.len() - before
    }

    pub fn contains_values(&self, values: &[RamDomain]) -> bool {
        self.rows
            .read()
            .binary_search_by(|row| row.as_slice().cmp(values))
            .is_ok()
    }

    /// Copy of the stored rows, in iteration order
    pub fn rows(&self) -> Vec<Vec<RamDomain>> {
        self.rows.read().clone()
    }

    fn row(&self, offset: usize) -> Vec<RamDomain> {
        self.rows.read()[offset].clone()
    }
}

impl Relation for MemoryRelation {
    fn insert(&self, tuple: &Tuple<'_>) {
        debug_assert_eq!(
            tuple.relation().signature(),
            self.signature(),
            "tuple bound to '{}' inserted into '{}'",
            tuple.relation().name(),
            self.schema.name
        );
        self.insert_values(tuple.values().to_vec());
    }

    fn contains(&self, tuple: &Tuple<'_>) -> bool {
        self.contains_values(tuple.values())
    }

    fn begin(&self) -> RelationIter<'_> {
        RelationIter::new(Box::new(MemoryIter {
            relation: self,
            offset: 0,
        }))
    }

    fn end(&self) -> RelationIter<'_> {
        RelationIter::new(Box::new(MemoryIter {
            relation: self,
            offset: self.size(),
        }))
    }

    fn size(&self) -> usize {
        self.rows.read().len()
    }

    fn name(&self) -> &str {
        &self.schema.name
    }

    fn arity(&self) -> usize {
        self.schema.arity()
    }

    fn attr_type(&self, idx: usize) -> AttrType {
        self.schema.attr_type(idx)
    }

    fn attr_name(&self, idx: usize) -> &str {
        self.schema.attr_name(idx)
    }

    fn attr_type_name(&self, idx: usize) -> Option<&str> {
        self.schema.attr_type_name(idx)
    }

    fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    fn purge(&self) {
        let mut rows = self.rows.write();
        debug!(relation = %self.schema.name, purged = rows.len(), "relation_purged");
        rows.clear();
    }
}

/// Cursor over a [`MemoryRelation`]: the relation plus a row offset
#[derive(Debug, Clone)]
pub struct MemoryIter<'a> {
    relation: &'a MemoryRelation,
    offset: usize,
}

impl<'a> IteratorCore<'a> for MemoryIter<'a> {
    fn kind_id(&self) -> u32 {
        MEMORY_ITER_KIND
    }

    fn advance(&mut self) {
        self.offset += 1;
    }

    fn get(&self) -> Tuple<'a> {
        Tuple::from_storage(self.relation, self.relation.row(self.offset))
    }

    fn position(&self) -> CorePosition {
        CorePosition::new(self.relation, self.offset)
    }

    fn clone_core(&self) -> Box<dyn IteratorCore<'a> + 'a> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;

    fn edge() -> MemoryRelation {
        MemoryRelation::new(
            RelationSchema::new(
                "edge",
                vec![
                    Attribute::new("src", AttrType::Symbol),
                    Attribute::new("weight", AttrType::Signed),
                ],
            ),
            Arc::new(SymbolTable::new()),
        )
    }

    #[test]
    fn test_insert_deduplicates() {
        let rel = edge();
        assert!(rel.insert_values(vec![0, 5]));
        assert!(!rel.insert_values(vec![0, 5]));
        assert_eq!(rel.size(), 1);
    }

    #[test]
    fn test_rows_stay_sorted() {
        let rel = edge();
        rel.insert_values(vec![2, 0]);
        rel.insert_values(vec![0, 9]);
        rel.insert_values(vec![1, 1]);
        assert_eq!(rel.rows(), vec![vec![0, 9], vec![1, 1], vec![2, 0]]);
    }

    #[test]
    fn test_extend_counts_new_rows() {
        let rel = edge();
        rel.insert_values(vec![1, 1]);
        let added = rel.extend_values(vec![vec![1, 1], vec![2, 2], vec![2, 2], vec![0, 3]]);
        assert_eq!(added, 2);
        assert_eq!(rel.size(), 3);
    }

    #[test]
    fn test_tuple_insert_and_contains() {
        let rel = edge();
        let mut t = Tuple::new(&rel);
        t.append_symbol("a").append_number(4);
        rel.insert(&t);
        assert!(rel.contains(&t));

        let mut other = Tuple::new(&rel);
        other.append_symbol("a").append_number(5);
        assert!(!rel.contains(&other));
    }

    #[test]
    fn test_begin_equals_end_when_empty() {
        let rel = edge();
        assert_eq!(rel.begin(), rel.end());
    }

    #[test]
    fn test_dereferenced_tuple_is_rewound() {
        let rel = edge();
        let dyn_rel: &dyn Relation = &rel;
        dyn_rel.insert_row(("x", 3)).unwrap();
        let mut t = rel.begin().get();
        assert_eq!(t.position(), 0);
        assert_eq!(t.read_symbol(), "x");
        assert_eq!(t.read_number(), 3);
    }

    #[test]
    fn test_cursors_over_different_relations_differ() {
        let a = edge();
        let b = edge();
        assert_ne!(a.begin(), b.begin());
    }

    #[test]
    fn test_purge_empties() {
        let rel = edge();
        rel.insert_values(vec![0, 0]);
        rel.purge();
        assert_eq!(rel.size(), 0);
        assert_eq!(rel.iter().count(), 0);
    }
}
