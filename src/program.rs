//! # Program Registry & Lifecycle
//!
//! A compiled Datalog program owns every relation it declares. Each relation
//! is registered once, while the program is being built, and lands in up to
//! three classification views besides `all`:
//!
//! | `is_input` | `is_output` | Views |
//! |---|---|---|
//! | true | false | all, input |
//! | false | true | all, output |
//! | true | true | all, input, output |
//! | false | false | all, internal |
//!
//! [`ProgramRelations`] holds that bookkeeping; the [`Program`] trait layers
//! the whole-program operations (run, load, print, dump, purge) on top.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::error::{InterfaceError, InterfaceResult};
use crate::relation::Relation;
use crate::schema::RamDomain;
use crate::symbol_table::SymbolTable;
use crate::tuple::IntoRow;

/// Shared handle to a registered relation
pub type RelationHandle = Arc<dyn Relation>;

/// Relations of one program, by name and by classification
#[derive(Debug)]
pub struct ProgramRelations {
    by_name: HashMap<String, RelationHandle>,
    all: Vec<RelationHandle>,
    input: Vec<RelationHandle>,
    output: Vec<RelationHandle>,
    internal: Vec<RelationHandle>,
    num_threads: usize,
}

impl Default for ProgramRelations {
    fn default() -> Self {
        ProgramRelations {
            by_name: HashMap::new(),
            all: Vec::new(),
            input: Vec::new(),
            output: Vec::new(),
            internal: Vec::new(),
            num_threads: 1,
        }
    }
}

impl ProgramRelations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `relation` under `name` and classify it.
    ///
    /// Panics if `name` is already registered: two relations of one program
    /// sharing a name is a defect in the program definition.
    pub fn add_relation(
        &mut self,
        name: impl Into<String>,
        relation: RelationHandle,
        is_input: bool,
        is_output: bool,
    ) {
        let name = name.into();
        assert!(
            !self.by_name.contains_key(&name),
            "relation '{name}' registered twice"
        );
        debug!(
            relation = %name,
            arity = relation.arity(),
            is_input,
            is_output,
            "relation_registered"
        );

        self.by_name.insert(name, Arc::clone(&relation));
        self.all.push(Arc::clone(&relation));
        if is_input {
            self.input.push(Arc::clone(&relation));
        }
        if is_output {
            self.output.push(Arc::clone(&relation));
        }
        if !is_input && !is_output {
            self.internal.push(relation);
        }
    }

    /// Look up a relation by name
    pub fn get(&self, name: &str) -> Option<&dyn Relation> {
        self.by_name.get(name).map(|r| &**r)
    }

    /// Look up a relation by name, returning a shared handle
    pub fn handle(&self, name: &str) -> Option<RelationHandle> {
        self.by_name.get(name).cloned()
    }

    pub fn all(&self) -> &[RelationHandle] {
        &self.all
    }

    pub fn input(&self) -> &[RelationHandle] {
        &self.input
    }

    pub fn output(&self) -> &[RelationHandle] {
        &self.output
    }

    pub fn internal(&self) -> &[RelationHandle] {
        &self.internal
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn set_num_threads(&mut self, num_threads: usize) {
        self.num_threads = num_threads;
    }
}

fn purge_view(view: &str, relations: &[RelationHandle]) {
    debug!(view, relations = relations.len(), "purging_view");
    for relation in relations {
        relation.purge();
    }
}

/// Write `relations` in the diagnostic dump layout: a banner with the name,
/// then one tab-separated line per tuple.
pub fn dump_relations(relations: &[RelationHandle], out: &mut dyn Write) -> InterfaceResult<()> {
    for relation in relations {
        writeln!(out, "---------------")?;
        writeln!(out, "{}", relation.name())?;
        writeln!(out, "===============")?;
        for tuple in relation.iter() {
            writeln!(out, "{}", crate::facts::format_tuple(tuple, '\t'))?;
        }
        writeln!(out, "===============")?;
    }
    Ok(())
}

/// A compiled Datalog program: its relations plus whole-program operations
///
/// Implementors supply the registry and the evaluation/I-O operations; all
/// lookup, classification and purge operations are provided.
pub trait Program: Send {
    /// The program's registered relations
    fn relations(&self) -> &ProgramRelations;

    fn relations_mut(&mut self) -> &mut ProgramRelations;

    /// Symbol table shared by all of the program's relations
    fn symbol_table(&self) -> &SymbolTable;

    /// Evaluate without any I/O. `None` runs every stratum.
    fn run(&mut self, stratum: Option<usize>) -> InterfaceResult<()> {
        let _ = stratum;
        Ok(())
    }

    /// Load inputs from `input_dir`, evaluate, store outputs to `output_dir`
    fn run_all(
        &mut self,
        input_dir: &Path,
        output_dir: &Path,
        stratum: Option<usize>,
    ) -> InterfaceResult<()>;

    /// Load every input relation from `input_dir`
    fn load_all(&mut self, input_dir: &Path) -> InterfaceResult<()>;

    /// Store every output relation to `output_dir`
    fn print_all(&mut self, output_dir: &Path) -> InterfaceResult<()>;

    /// Dump input relations to `out`
    fn dump_inputs(&self, out: &mut dyn Write) -> InterfaceResult<()> {
        dump_relations(self.input_relations(), out)
    }

    /// Dump output relations to `out`
    fn dump_outputs(&self, out: &mut dyn Write) -> InterfaceResult<()> {
        dump_relations(self.output_relations(), out)
    }

    /// Call a named subroutine. Programs without subroutines ignore the call.
    fn execute_subroutine(
        &mut self,
        name: &str,
        args: &[RamDomain],
        ret: &mut Vec<RamDomain>,
        ret_err: &mut Vec<bool>,
    ) {
        let _ = (name, args, ret, ret_err);
    }

    fn relation(&self, name: &str) -> Option<&dyn Relation> {
        self.relations().get(name)
    }

    fn relation_size(&self, name: &str) -> Option<usize> {
        self.relation(name).map(|r| r.size())
    }

    fn relation_name(&self, name: &str) -> Option<String> {
        self.relation(name).map(|r| r.name().to_string())
    }

    fn all_relations(&self) -> &[RelationHandle] {
        self.relations().all()
    }

    fn input_relations(&self) -> &[RelationHandle] {
        self.relations().input()
    }

    fn output_relations(&self) -> &[RelationHandle] {
        self.relations().output()
    }

    fn internal_relations(&self) -> &[RelationHandle] {
        self.relations().internal()
    }

    fn set_num_threads(&mut self, num_threads: usize) {
        self.relations_mut().set_num_threads(num_threads);
    }

    fn num_threads(&self) -> usize {
        self.relations().num_threads()
    }

    fn purge_output_relations(&mut self) {
        purge_view("output", self.output_relations());
    }

    fn purge_input_relations(&mut self) {
        purge_view("input", self.input_relations());
    }

    fn purge_internal_relations(&mut self) {
        purge_view("internal", self.internal_relations());
    }
}

impl dyn Program + '_ {
    /// Encode `row` and insert it into the relation called `relation`.
    ///
    /// Fails with `RelationNotFound` for an unknown name and `ArityMismatch`
    /// when the row width differs from the relation's arity.
    pub fn insert_row<R: IntoRow>(&self, row: R, relation: &str) -> InterfaceResult<()> {
        let target = self
            .relation(relation)
            .ok_or_else(|| InterfaceError::RelationNotFound(relation.to_string()))?;
        target.insert_row(row)
    }

    /// Encode `row` and test membership in the relation called `relation`
    pub fn contains_row<R: IntoRow>(&self, row: R, relation: &str) -> InterfaceResult<bool> {
        let target = self
            .relation(relation)
            .ok_or_else(|| InterfaceError::RelationNotFound(relation.to_string()))?;
        target.contains_row(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryRelation;
    use crate::schema::{AttrType, Attribute, RelationSchema};

    fn unary(name: &str, symbols: &Arc<SymbolTable>) -> RelationHandle {
        Arc::new(MemoryRelation::new(
            RelationSchema::new(name, vec![Attribute::new("x", AttrType::Signed)]),
            Arc::clone(symbols),
        ))
    }

    #[test]
    fn test_classification() {
        let symbols = Arc::new(SymbolTable::new());
        let mut rels = ProgramRelations::new();
        rels.add_relation("in", unary("in", &symbols), true, false);
        rels.add_relation("out", unary("out", &symbols), false, true);
        rels.add_relation("both", unary("both", &symbols), true, true);
        rels.add_relation("tmp", unary("tmp", &symbols), false, false);

        let names = |view: &[RelationHandle]| -> Vec<String> {
            view.iter().map(|r| r.name().to_string()).collect()
        };
        assert_eq!(names(rels.all()), vec!["in", "out", "both", "tmp"]);
        assert_eq!(names(rels.input()), vec!["in", "both"]);
        assert_eq!(names(rels.output()), vec!["out", "both"]);
        assert_eq!(names(rels.internal()), vec!["tmp"]);
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let rels = ProgramRelations::new();
        assert!(rels.get("nope").is_none());
        assert!(rels.handle("nope").is_none());
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_name_panics() {
        let symbols = Arc::new(SymbolTable::new());
        let mut rels = ProgramRelations::new();
        rels.add_relation("r", unary("r", &symbols), true, false);
        rels.add_relation("r", unary("r", &symbols), false, true);
    }

    #[test]
    fn test_default_thread_count() {
        let mut rels = ProgramRelations::new();
        assert_eq!(rels.num_threads(), 1);
        rels.set_num_threads(8);
        assert_eq!(rels.num_threads(), 8);
    }

    #[test]
    fn test_dump_layout() {
        let symbols = Arc::new(SymbolTable::new());
        let rel = unary("r", &symbols);
        rel.insert_row((4,)).unwrap();
        let mut out = Vec::new();
        dump_relations(&[rel], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "---------------\nr\n===============\n4\n===============\n"
        );
    }
}
