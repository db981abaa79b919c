//! # factlayer
//!
//! Uniform access layer over the relations of a compiled Datalog program.
//! A host obtains a program by name, fills and reads its relations through
//! schema-checked tuples, and drives whole-program operations, all without
//! compile-time knowledge of any relation's arity or column types.
//!
//! ## Architecture
//!
//! ```text
//! factory::new_instance("name")
//!     ↓
//! Box<dyn Program>              ← ProgramRelations: all / input / output / internal
//!     ↓ relation("edge")
//! &dyn Relation                 ← insert, contains, size, schema, begin/end, purge
//!     ↓ begin() .. end()
//! RelationIter ─ IteratorCore   ← one boxed cursor per storage kind
//!     ↓ get()
//! Tuple                         ← cursor codec over RamDomain cells
//!     ↓ symbol columns
//! SymbolTable                   ← string <-> id interning
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use factlayer::{factory, Relation, Tuple};
//!
//! let mut program = factory::new_instance("transitive_closure").unwrap();
//! let edge = program.relation("edge").unwrap();
//!
//! let mut t = Tuple::new(edge);
//! t.append_symbol("a").append_symbol("b");
//! edge.insert(&t);
//!
//! program.run(None)?;
//!
//! for mut tuple in program.relation("path").unwrap().iter() {
//!     println!("{} -> {}", tuple.read_symbol(), tuple.read_symbol());
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `symbol_table` | String interning |
//! | `schema` | Domain value, attribute type tags, relation schemas |
//! | `tuple` | Cursor-based typed encoding/decoding |
//! | `iterator` | Polymorphic cloneable cursors |
//! | `relation` | The relation contract |
//! | `memory` | Sorted in-memory relation storage |
//! | `program` | Relation registry and program lifecycle |
//! | `factory` | Process-wide program factory registry |
//! | `facts` | Delimited fact file load/store |
//! | `programs` | Built-in programs |

pub mod config;
pub mod error;
pub mod factory;
pub mod facts;
pub mod iterator;
pub mod memory;
pub mod program;
pub mod programs;
pub mod relation;
pub mod schema;
pub mod symbol_table;
pub mod tuple;

// Re-export public types
pub use config::Config;
pub use error::{InterfaceError, InterfaceResult};
pub use factory::{FactoryFn, ProgramFactory};
pub use facts::FactOptions;
pub use iterator::{CorePosition, IteratorCore, RelationIter, Tuples};
pub use memory::MemoryRelation;
pub use program::{Program, ProgramRelations, RelationHandle};
pub use relation::Relation;
pub use schema::{AttrType, Attribute, RamDomain, RamFloat, RamUnsigned, RelationSchema};
pub use symbol_table::SymbolTable;
pub use tuple::{FromElement, IntoElement, IntoRow, Tuple};
