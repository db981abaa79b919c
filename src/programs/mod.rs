//! Built-in programs
//!
//! Each program here registers itself with the factory registry the first
//! time the registry is touched.

mod transitive_closure;

pub use transitive_closure::TransitiveClosure;

use std::sync::Arc;

use crate::factory::{FactoryFn, ProgramFactory};

/// Factories for every built-in program
pub(crate) fn builtin_factories() -> Vec<Arc<dyn ProgramFactory>> {
    let transitive_closure: Arc<dyn ProgramFactory> =
        Arc::new(FactoryFn::new(TransitiveClosure::NAME, || {
            Box::new(TransitiveClosure::new())
        }));
    vec![transitive_closure]
}
