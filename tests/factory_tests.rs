//! Factory registry tests: lookup by name, self-registered built-ins, custom
//! registration, and the double-registration failure.
//!
//! The registry is process-wide, so every test uses its own program names.

use factlayer::factory::{self, FactoryFn, ProgramFactory};
use factlayer::programs::TransitiveClosure;
use factlayer::{InterfaceResult, Program, ProgramRelations, SymbolTable};
use std::path::Path;
use std::sync::Arc;

/// Program with no relations and no I/O
#[derive(Debug, Default)]
struct EmptyProgram {
    relations: ProgramRelations,
    symbols: SymbolTable,
}

impl Program for EmptyProgram {
    fn relations(&self) -> &ProgramRelations {
        &self.relations
    }

    fn relations_mut(&mut self) -> &mut ProgramRelations {
        &mut self.relations
    }

    fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    fn run_all(&mut self, _: &Path, _: &Path, _: Option<usize>) -> InterfaceResult<()> {
        Ok(())
    }

    fn load_all(&mut self, _: &Path) -> InterfaceResult<()> {
        Ok(())
    }

    fn print_all(&mut self, _: &Path) -> InterfaceResult<()> {
        Ok(())
    }
}

/// Factory that carries state, unlike `FactoryFn`
struct ThreadedFactory {
    name: String,
    threads: usize,
}

impl ProgramFactory for ThreadedFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn new_instance(&self) -> Box<dyn Program> {
        let mut program = EmptyProgram::default();
        program.set_num_threads(self.threads);
        Box::new(program)
    }
}

#[test]
fn test_unregistered_name_is_absent() {
    assert!(factory::new_instance("unregistered_name").is_none());
    assert!(!factory::is_registered("unregistered_name"));
}

#[test]
fn test_builtin_available_without_setup() {
    assert!(factory::registered_names().contains(&TransitiveClosure::NAME.to_string()));
    let program = factory::new_instance(TransitiveClosure::NAME).unwrap();
    assert_eq!(program.all_relations().len(), 3);
}

#[test]
fn test_each_instance_is_independent() {
    let a = factory::new_instance(TransitiveClosure::NAME).unwrap();
    let b = factory::new_instance(TransitiveClosure::NAME).unwrap();
    a.insert_row(("x", "y"), "edge").unwrap();
    assert_eq!(a.relation_size("edge"), Some(1));
    assert_eq!(b.relation_size("edge"), Some(0));
}

#[test]
fn test_register_custom_factory() {
    factory::register_factory(Arc::new(ThreadedFactory {
        name: "factory_tests_threaded".to_string(),
        threads: 6,
    }));
    let program = factory::new_instance("factory_tests_threaded").unwrap();
    assert_eq!(program.num_threads(), 6);
    assert!(program.all_relations().is_empty());
}

#[test]
fn test_register_fn_factory() {
    factory::register_factory(Arc::new(FactoryFn::new("factory_tests_empty", || {
        Box::new(EmptyProgram::default())
    })));
    assert!(factory::is_registered("factory_tests_empty"));
    assert!(factory::find("factory_tests_empty").is_some());
}

#[test]
#[should_panic(expected = "registered twice")]
fn test_duplicate_builtin_name_panics() {
    factory::register_factory(Arc::new(FactoryFn::new(TransitiveClosure::NAME, || {
        Box::new(EmptyProgram::default())
    })));
}
