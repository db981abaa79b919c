//! # Program Factory Registry
//!
//! Process-wide directory from program name to a [`ProgramFactory`], so a
//! host can instantiate a program without naming its concrete type.
//!
//! The directory is built on first access (`OnceLock`), and the built-in
//! programs register themselves inside that initializer. There is no
//! dependence on the order in which statics elsewhere are initialized: the
//! first lookup or registration, whoever makes it, brings the directory up
//! fully populated.
//!
//! Registering a name twice panics. It means two program definitions
//! collided, which no caller can recover from.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::program::Program;

/// Constructs instances of one compiled program
pub trait ProgramFactory: Send + Sync {
    /// Name the program is registered under
    fn name(&self) -> &str;

    /// Build a fresh program instance
    fn new_instance(&self) -> Box<dyn Program>;
}

/// [`ProgramFactory`] backed by a plain constructor function
#[derive(Clone)]
pub struct FactoryFn {
    name: String,
    build: fn() -> Box<dyn Program>,
}

impl FactoryFn {
    pub fn new(name: impl Into<String>, build: fn() -> Box<dyn Program>) -> Self {
        FactoryFn {
            name: name.into(),
            build,
        }
    }
}

impl fmt::Debug for FactoryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryFn").field("name", &self.name).finish()
    }
}

impl ProgramFactory for FactoryFn {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_instance(&self) -> Box<dyn Program> {
        (self.build)()
    }
}

type Factories = HashMap<String, Arc<dyn ProgramFactory>>;
type Registry = RwLock<Factories>;

fn insert_unique(map: &mut Factories, factory: Arc<dyn ProgramFactory>) {
    let name = factory.name().to_string();
    assert!(
        !map.contains_key(&name),
        "program '{name}' registered twice: two program definitions share a name"
    );
    debug!(program = %name, "program_factory_registered");
    map.insert(name, factory);
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        for factory in crate::programs::builtin_factories() {
            insert_unique(&mut map, factory);
        }
        RwLock::new(map)
    })
}

/// Add `factory` to the process-wide registry.
///
/// Panics if its name is already registered.
pub fn register_factory(factory: Arc<dyn ProgramFactory>) {
    insert_unique(&mut registry().write(), factory);
}

/// Find the factory registered under `name`
pub fn find(name: &str) -> Option<Arc<dyn ProgramFactory>> {
    registry().read().get(name).cloned()
}

/// Whether a factory is registered under `name`
pub fn is_registered(name: &str) -> bool {
    registry().read().contains_key(name)
}

/// Sorted names of all registered programs
pub fn registered_names() -> Vec<String> {
    let mut names: Vec<String> = registry().read().keys().cloned().collect();
    names.sort();
    names
}

/// Instantiate the program registered under `name`, or `None` if no such
/// program exists
pub fn new_instance(name: &str) -> Option<Box<dyn Program>> {
    // Release the lock before running the constructor; it may itself register
    let factory = find(name)?;
    Some(factory.new_instance())
}
