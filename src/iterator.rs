//! # Iteration Protocol
//!
//! Relations are traversed through two layers:
//!
//! - [`IteratorCore`]: the per-storage cursor, reached through dynamic
//!   dispatch. Each storage kind reports a `kind_id` so cursors of different
//!   kinds compare unequal without a deeper look.
//! - [`RelationIter`]: a value-semantic handle that owns exactly one core.
//!   Cloning the handle clones the core, so two handles never share cursor
//!   state.
//!
//! [`Tuples`] adapts a `begin()..end()` pair to `std::iter::Iterator`.

use std::fmt;
use std::iter::FusedIterator;

use crate::tuple::Tuple;

/// Where a cursor points: which storage, and how far into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorePosition {
    /// Address identifying the storage the cursor walks
    pub source: usize,
    /// Offset of the current tuple within that storage
    pub offset: usize,
}

impl CorePosition {
    pub fn new<T: ?Sized>(source: &T, offset: usize) -> Self {
        CorePosition {
            source: std::ptr::from_ref(source).cast::<()>().addr(),
            offset,
        }
    }
}

/// Storage-specific cursor behind a [`RelationIter`]
pub trait IteratorCore<'a>: fmt::Debug {
    /// Identifies the storage kind; cores of different kinds never compare equal
    fn kind_id(&self) -> u32;

    /// Move to the next tuple. Not valid at the end.
    fn advance(&mut self);

    /// The tuple under the cursor, rewound for reading. Not valid at the end.
    fn get(&self) -> Tuple<'a>;

    fn position(&self) -> CorePosition;

    /// Structural equality against a core of the same kind
    fn equal(&self, other: &dyn IteratorCore<'a>) -> bool {
        self.position() == other.position()
    }

    /// Independent core at the same position
    fn clone_core(&self) -> Box<dyn IteratorCore<'a> + 'a>;
}

/// Owning, cloneable cursor over a relation
///
/// The default value holds no core. It is a placeholder only: it compares
/// equal to other empty handles and panics when moved or dereferenced.
#[derive(Default)]
pub struct RelationIter<'a> {
    core: Option<Box<dyn IteratorCore<'a> + 'a>>,
}

impl<'a> RelationIter<'a> {
    pub fn new(core: Box<dyn IteratorCore<'a> + 'a>) -> Self {
        RelationIter { core: Some(core) }
    }

    /// Whether this is an empty placeholder
    pub fn is_placeholder(&self) -> bool {
        self.core.is_none()
    }

    /// Move to the next tuple
    pub fn advance(&mut self) -> &mut Self {
        match self.core.as_mut() {
            Some(core) => core.advance(),
            None => panic!("advanced a placeholder relation iterator"),
        }
        self
    }

    /// The tuple under the cursor
    pub fn get(&self) -> Tuple<'a> {
        match self.core.as_ref() {
            Some(core) => core.get(),
            None => panic!("dereferenced a placeholder relation iterator"),
        }
    }
}

impl Clone for RelationIter<'_> {
    fn clone(&self) -> Self {
        RelationIter {
            core: self.core.as_ref().map(|core| core.clone_core()),
        }
    }
}

impl PartialEq for RelationIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.core, &other.core) {
            (Some(a), Some(b)) => {
                std::ptr::addr_eq(&**a, &**b) || (a.kind_id() == b.kind_id() && a.equal(&**b))
            }
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for RelationIter<'_> {}

impl fmt::Debug for RelationIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.core {
            Some(core) => f.debug_tuple("RelationIter").field(core).finish(),
            None => f.write_str("RelationIter(<placeholder>)"),
        }
    }
}

/// `std` iterator over a half-open `[begin, end)` range
#[derive(Debug, Clone)]
pub struct Tuples<'a> {
    current: RelationIter<'a>,
    end: RelationIter<'a>,
}

impl<'a> Tuples<'a> {
    pub fn new(begin: RelationIter<'a>, end: RelationIter<'a>) -> Self {
        Tuples {
            current: begin,
            end,
        }
    }
}

impl<'a> Iterator for Tuples<'a> {
    type Item = Tuple<'a>;

    fn next(&mut self) -> Option<Tuple<'a>> {
        if self.current == self.end {
            return None;
        }
        let tuple = self.current.get();
        self.current.advance();
        Some(tuple)
    }
}

impl FusedIterator for Tuples<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRelation;
    use crate::relation::Relation;
    use crate::schema::{AttrType, Attribute, RelationSchema};
    use crate::symbol_table::SymbolTable;
    use std::sync::Arc;

    fn numbers(values: &[i32]) -> MemoryRelation {
        let rel = MemoryRelation::new(
            RelationSchema::new("n", vec![Attribute::new("x", AttrType::Signed)]),
            Arc::new(SymbolTable::new()),
        );
        for v in values {
            rel.insert_values(vec![*v]);
        }
        rel
    }

    /// A core of another kind that sits at the same position as a memory cursor
    #[derive(Debug, Clone)]
    struct Foreign {
        position: CorePosition,
    }

    impl<'a> IteratorCore<'a> for Foreign {
        fn kind_id(&self) -> u32 {
            u32::MAX
        }

        fn advance(&mut self) {
            self.position.offset += 1;
        }

        fn get(&self) -> Tuple<'a> {
            unreachable!()
        }

        fn position(&self) -> CorePosition {
            self.position
        }

        fn clone_core(&self) -> Box<dyn IteratorCore<'a> + 'a> {
            Box::new(self.clone())
        }
    }

    #[test]
    fn test_placeholders_compare_equal() {
        assert_eq!(RelationIter::default(), RelationIter::default());
        assert!(RelationIter::default().is_placeholder());
    }

    #[test]
    fn test_placeholder_differs_from_live_cursor() {
        let rel = numbers(&[1]);
        assert_ne!(rel.begin(), RelationIter::default());
    }

    #[test]
    #[should_panic(expected = "placeholder")]
    fn test_placeholder_get_panics() {
        RelationIter::default().get();
    }

    #[test]
    fn test_clone_does_not_alias_cursor() {
        let rel = numbers(&[1, 2, 3]);
        let mut a = rel.begin();
        let b = a.clone();
        a.advance();
        assert_ne!(a, b);
        assert_eq!(b.get().at(0), 1);
        assert_eq!(a.get().at(0), 2);
    }

    #[test]
    fn test_kind_mismatch_is_unequal() {
        let rel = numbers(&[1]);
        let begin = rel.begin();
        let foreign = RelationIter::new(Box::new(Foreign {
            position: CorePosition::new(&rel, 0),
        }));
        assert_ne!(begin, foreign);
    }

    #[test]
    fn test_tuples_walks_half_open_range() {
        let rel = numbers(&[3, 1, 2]);
        let seen: Vec<i32> = rel.iter().map(|t| t.at(0)).collect();
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn test_tuples_is_fused() {
        let rel = numbers(&[]);
        let mut it = rel.iter();
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }
}
