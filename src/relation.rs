//! # Relation Contract
//!
//! [`Relation`] is the uniform capability set every relation of a compiled
//! program exposes, whatever storage sits underneath: insert, membership,
//! size, schema introspection, half-open iteration and purge.
//!
//! Mutating operations take `&self`. Tuples hold a shared back-reference to
//! their relation, so storage is expected to use interior mutability (see
//! [`crate::memory::MemoryRelation`]).

use std::fmt;

use crate::error::{InterfaceError, InterfaceResult};
use crate::iterator::{RelationIter, Tuples};
use crate::schema::AttrType;
use crate::symbol_table::SymbolTable;
use crate::tuple::{IntoRow, Tuple};

/// A named, schema-typed collection of tuples
pub trait Relation: fmt::Debug + Send + Sync {
    /// Add `tuple`. Whether duplicates are kept is up to the storage.
    ///
    /// `tuple` must be bound to a relation with this relation's schema.
    fn insert(&self, tuple: &Tuple<'_>);

    /// Membership test
    fn contains(&self, tuple: &Tuple<'_>) -> bool;

    /// Cursor at the first tuple, equal to [`Relation::end`] when empty
    fn begin(&self) -> RelationIter<'_>;

    /// Sentinel one past the last tuple
    fn end(&self) -> RelationIter<'_>;

    /// Number of stored tuples
    fn size(&self) -> usize;

    fn name(&self) -> &str;

    fn arity(&self) -> usize;

    /// Type of column `idx`; `idx` must be below the arity
    fn attr_type(&self, idx: usize) -> AttrType;

    /// Name of column `idx`; `idx` must be below the arity
    fn attr_name(&self, idx: usize) -> &str;

    /// Symbol table used for the symbol columns
    fn symbol_table(&self) -> &SymbolTable;

    /// Remove every tuple. Iterators issued before the purge are invalid.
    fn purge(&self);

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Declared type name of column `idx` (`Node` for `s:Node`), if any
    fn attr_type_name(&self, idx: usize) -> Option<&str> {
        let _ = idx;
        None
    }

    /// Column types as `<t0,t1,...>`, or `<>` for a nullary relation.
    ///
    /// Each entry is the type tag, followed by `:name` when the column was
    /// declared with a type name: `<s:Node,i>`.
    fn signature(&self) -> String {
        let columns: Vec<String> = (0..self.arity())
            .map(|idx| {
                let tag = self.attr_type(idx).tag();
                match self.attr_type_name(idx) {
                    Some(type_name) => format!("{tag}:{type_name}"),
                    None => tag.to_string(),
                }
            })
            .collect();
        format!("<{}>", columns.join(","))
    }

    /// Walk `begin()..end()` as a std iterator
    fn iter(&self) -> Tuples<'_> {
        Tuples::new(self.begin(), self.end())
    }
}

impl<'r> dyn Relation + 'r {
    /// Encode a Rust tuple into a fresh [`Tuple`] and insert it.
    ///
    /// Fails with [`InterfaceError::ArityMismatch`] when the row width
    /// differs from the arity; nothing is encoded or inserted then.
    pub fn insert_row<R: IntoRow>(&self, row: R) -> InterfaceResult<()> {
        let tuple = self.encode_row(row)?;
        self.insert(&tuple);
        Ok(())
    }

    /// Encode a Rust tuple and test membership
    pub fn contains_row<R: IntoRow>(&self, row: R) -> InterfaceResult<bool> {
        let tuple = self.encode_row(row)?;
        Ok(self.contains(&tuple))
    }

    fn encode_row<R: IntoRow>(&self, row: R) -> InterfaceResult<Tuple<'_>> {
        if row.width() != self.arity() {
            return Err(InterfaceError::ArityMismatch {
                relation: self.name().to_string(),
                expected: self.arity(),
                actual: row.width(),
            });
        }
        let mut tuple = Tuple::new(self);
        row.append_row(&mut tuple);
        Ok(tuple)
    }
}

impl<'a> IntoIterator for &'a dyn Relation {
    type Item = Tuple<'a>;
    type IntoIter = Tuples<'a>;

    fn into_iter(self) -> Tuples<'a> {
        self.iter()
    }
}
