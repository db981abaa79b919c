//! # Tuple Codec
//!
//! A [`Tuple`] is one record of a relation: a flat array of `arity` domain
//! values plus a cursor. Typed writes (`append_*`) and reads (`read_*`) walk
//! the cursor left to right and check each column's declared [`AttrType`]
//! before touching it, the same way a binary record codec walks its fields.
//!
//! The cursor and type checks are `debug_assert!`s: a mismatch is a caller
//! bug, fatal in debug builds and unchecked in release builds. Indexed access
//! (`at`, `at_mut`, `Index`) skips both and is meant for storage code that
//! already knows the layout is right.
//!
//! ```rust,ignore
//! let mut t = Tuple::new(&edge);
//! t.append_symbol("a").append_number(3);
//! edge.insert(&t);
//!
//! t.rewind();
//! assert_eq!(t.read_symbol(), "a");
//! assert_eq!(t.read_number(), 3);
//! ```

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::{InterfaceError, InterfaceResult};
use crate::relation::Relation;
use crate::schema::{
    domain_to_float, domain_to_unsigned, float_to_domain, unsigned_to_domain, AttrType, RamDomain,
    RamFloat, RamUnsigned,
};

/// One record bound to a relation's schema
#[derive(Clone)]
pub struct Tuple<'a> {
    relation: &'a dyn Relation,
    values: Vec<RamDomain>,
    pos: usize,
}

impl<'a> Tuple<'a> {
    /// Create a zeroed tuple for `relation` with the cursor at column 0
    pub fn new(relation: &'a dyn Relation) -> Self {
        Tuple {
            relation,
            values: vec![0; relation.arity()],
            pos: 0,
        }
    }

    /// Create a fully populated tuple from literal domain values.
    ///
    /// The cursor starts at the end. Fails if the value count differs from
    /// the relation's arity.
    pub fn from_values(
        relation: &'a dyn Relation,
        values: impl Into<Vec<RamDomain>>,
    ) -> InterfaceResult<Self> {
        let values = values.into();
        if values.len() != relation.arity() {
            return Err(InterfaceError::ArityMismatch {
                relation: relation.name().to_string(),
                expected: relation.arity(),
                actual: values.len(),
            });
        }
        let pos = values.len();
        Ok(Tuple {
            relation,
            values,
            pos,
        })
    }

    /// Wrap a stored row for reading, cursor at column 0.
    ///
    /// For storage and iterator implementations that hand out their rows;
    /// the row length must already equal the arity.
    pub fn from_storage(relation: &'a dyn Relation, values: Vec<RamDomain>) -> Self {
        debug_assert_eq!(values.len(), relation.arity(), "stored row has wrong arity");
        Tuple {
            relation,
            values,
            pos: 0,
        }
    }

    /// The relation this tuple is bound to
    pub fn relation(&self) -> &'a dyn Relation {
        self.relation
    }

    /// Number of columns (the relation's arity)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Current cursor column
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Raw domain values in column order
    pub fn values(&self) -> &[RamDomain] {
        &self.values
    }

    pub fn into_values(self) -> Vec<RamDomain> {
        self.values
    }

    /// Unchecked read of column `idx`
    pub fn at(&self, idx: usize) -> RamDomain {
        self.values[idx]
    }

    /// Unchecked mutable access to column `idx`
    pub fn at_mut(&mut self, idx: usize) -> &mut RamDomain {
        &mut self.values[idx]
    }

    /// Move the cursor back to column 0
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    fn expect_column(&self, accepts: impl Fn(AttrType) -> bool) {
        debug_assert!(
            self.pos < self.values.len(),
            "exceeded tuple's arity of {} in relation '{}'",
            self.values.len(),
            self.relation.name()
        );
        debug_assert!(
            accepts(self.relation.attr_type(self.pos)),
            "wrong element type at column {} of relation '{}': declared '{}'",
            self.pos,
            self.relation.name(),
            self.relation.attr_type(self.pos)
        );
    }

    fn put(&mut self, value: RamDomain) -> &mut Self {
        self.values[self.pos] = value;
        self.pos += 1;
        self
    }

    fn take(&mut self) -> RamDomain {
        let value = self.values[self.pos];
        self.pos += 1;
        value
    }

    /// Intern `symbol` and write its id at the cursor (column must be `s`)
    pub fn append_symbol(&mut self, symbol: &str) -> &mut Self {
        self.expect_column(AttrType::is_symbol);
        let id = self.relation.symbol_table().lookup(symbol);
        self.put(id)
    }

    /// Write a raw number at the cursor (column must be numeric)
    pub fn append_number(&mut self, number: RamDomain) -> &mut Self {
        self.expect_column(AttrType::is_numeric);
        self.put(number)
    }

    /// Write an unsigned number at the cursor (column must be `u`)
    pub fn append_unsigned(&mut self, number: RamUnsigned) -> &mut Self {
        self.expect_column(|ty| ty == AttrType::Unsigned);
        self.put(unsigned_to_domain(number))
    }

    /// Write a float at the cursor (column must be `r`/`f`)
    pub fn append_float(&mut self, number: RamFloat) -> &mut Self {
        self.expect_column(|ty| ty == AttrType::Float);
        self.put(float_to_domain(number))
    }

    /// Write any supported Rust value at the cursor
    pub fn push<E: IntoElement>(&mut self, element: E) -> &mut Self {
        element.append_to(self);
        self
    }

    /// Resolve the symbol at the cursor (column must be `s`)
    pub fn read_symbol(&mut self) -> String {
        self.expect_column(AttrType::is_symbol);
        let id = self.take();
        self.relation.symbol_table().resolve(id)
    }

    /// Read the raw number at the cursor (column must be numeric)
    pub fn read_number(&mut self) -> RamDomain {
        self.expect_column(AttrType::is_numeric);
        self.take()
    }

    /// Read an unsigned number at the cursor (column must be `u`)
    pub fn read_unsigned(&mut self) -> RamUnsigned {
        self.expect_column(|ty| ty == AttrType::Unsigned);
        domain_to_unsigned(self.take())
    }

    /// Read a float at the cursor (column must be `r`/`f`)
    pub fn read_float(&mut self) -> RamFloat {
        self.expect_column(|ty| ty == AttrType::Float);
        domain_to_float(self.take())
    }

    /// Read any supported Rust value at the cursor
    pub fn read<E: FromElement>(&mut self) -> E {
        E::read_from(self)
    }
}

impl Index<usize> for Tuple<'_> {
    type Output = RamDomain;

    fn index(&self, idx: usize) -> &RamDomain {
        &self.values[idx]
    }
}

impl IndexMut<usize> for Tuple<'_> {
    fn index_mut(&mut self, idx: usize) -> &mut RamDomain {
        &mut self.values[idx]
    }
}

impl PartialEq for Tuple<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.relation.name() == other.relation.name()
    }
}

impl Eq for Tuple<'_> {}

impl fmt::Debug for Tuple<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tuple")
            .field("relation", &self.relation.name())
            .field("values", &self.values)
            .field("pos", &self.pos)
            .finish()
    }
}

/// A Rust value that can be written into the next tuple column
pub trait IntoElement {
    fn append_to(self, tuple: &mut Tuple<'_>);
}

impl IntoElement for &str {
    fn append_to(self, tuple: &mut Tuple<'_>) {
        tuple.append_symbol(self);
    }
}

impl IntoElement for String {
    fn append_to(self, tuple: &mut Tuple<'_>) {
        tuple.append_symbol(&self);
    }
}

impl IntoElement for &String {
    fn append_to(self, tuple: &mut Tuple<'_>) {
        tuple.append_symbol(self);
    }
}

impl IntoElement for RamDomain {
    fn append_to(self, tuple: &mut Tuple<'_>) {
        tuple.append_number(self);
    }
}

impl IntoElement for RamUnsigned {
    fn append_to(self, tuple: &mut Tuple<'_>) {
        tuple.append_unsigned(self);
    }
}

impl IntoElement for RamFloat {
    fn append_to(self, tuple: &mut Tuple<'_>) {
        tuple.append_float(self);
    }
}

/// A Rust value that can be read from the next tuple column
pub trait FromElement: Sized {
    fn read_from(tuple: &mut Tuple<'_>) -> Self;
}

impl FromElement for String {
    fn read_from(tuple: &mut Tuple<'_>) -> Self {
        tuple.read_symbol()
    }
}

impl FromElement for RamDomain {
    fn read_from(tuple: &mut Tuple<'_>) -> Self {
        tuple.read_number()
    }
}

impl FromElement for RamUnsigned {
    fn read_from(tuple: &mut Tuple<'_>) -> Self {
        tuple.read_unsigned()
    }
}

impl FromElement for RamFloat {
    fn read_from(tuple: &mut Tuple<'_>) -> Self {
        tuple.read_float()
    }
}

/// A Rust tuple `(A, B, ...)` that encodes into a whole relation row
pub trait IntoRow {
    /// Number of fields in the row
    fn width(&self) -> usize;

    /// Append every field, left to right
    fn append_row(self, tuple: &mut Tuple<'_>);
}

macro_rules! impl_into_row {
    ($width:expr; $($field:ident),+) => {
        impl<$($field: IntoElement),+> IntoRow for ($($field,)+) {
            fn width(&self) -> usize {
                $width
            }

            #[allow(non_snake_case)]
            fn append_row(self, tuple: &mut Tuple<'_>) {
                let ($($field,)+) = self;
                $(tuple.push($field);)+
            }
        }
    };
}

impl_into_row!(1; A);
impl_into_row!(2; A, B);
impl_into_row!(3; A, B, C);
impl_into_row!(4; A, B, C, D);
impl_into_row!(5; A, B, C, D, E);
impl_into_row!(6; A, B, C, D, E, F);
