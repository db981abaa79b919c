//! Transitive closure of a symbol graph
//!
//! ```datalog
//! .decl edge(src: symbol, dst: symbol)   .input edge
//! .decl path(src: symbol, dst: symbol)   .output path
//! path(x, y) :- edge(x, y).
//! path(x, z) :- path(x, y), edge(y, z).
//! ```
//!
//! Evaluated semi-naively: `delta_path` holds the tuples derived in the last
//! round, and only those are joined with `edge` in the next one.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::InterfaceResult;
use crate::facts::{load_relation, store_relation, FactOptions};
use crate::memory::MemoryRelation;
use crate::program::{Program, ProgramRelations, RelationHandle};
use crate::relation::Relation;
use crate::schema::{AttrType, Attribute, RamDomain, RelationSchema};
use crate::symbol_table::SymbolTable;

fn symbol_pair(name: &str) -> RelationSchema {
    RelationSchema::new(
        name,
        vec![
            Attribute::new("src", AttrType::Symbol),
            Attribute::new("dst", AttrType::Symbol),
        ],
    )
}

#[derive(Debug)]
pub struct TransitiveClosure {
    relations: ProgramRelations,
    symbols: Arc<SymbolTable>,
    edge: Arc<MemoryRelation>,
    path: Arc<MemoryRelation>,
    delta_path: Arc<MemoryRelation>,
    options: FactOptions,
}

impl Default for TransitiveClosure {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitiveClosure {
    /// Name the program registers under
    pub const NAME: &'static str = "transitive_closure";

    pub fn new() -> Self {
        Self::with_options(FactOptions::default())
    }

    /// Build with custom fact file options for `load_all`/`print_all`
    pub fn with_options(options: FactOptions) -> Self {
        let symbols = Arc::new(SymbolTable::new());
        let edge = Arc::new(MemoryRelation::new(symbol_pair("edge"), Arc::clone(&symbols)));
        let path = Arc::new(MemoryRelation::new(symbol_pair("path"), Arc::clone(&symbols)));
        let delta_path = Arc::new(MemoryRelation::new(
            symbol_pair("delta_path"),
            Arc::clone(&symbols),
        ));

        let mut relations = ProgramRelations::new();
        relations.add_relation("edge", Arc::clone(&edge) as RelationHandle, true, false);
        relations.add_relation("path", Arc::clone(&path) as RelationHandle, false, true);
        relations.add_relation(
            "delta_path",
            Arc::clone(&delta_path) as RelationHandle,
            false,
            false,
        );

        TransitiveClosure {
            relations,
            symbols,
            edge,
            path,
            delta_path,
            options,
        }
    }

    /// Run the fixpoint and return the number of rounds it took
    fn evaluate(&self) -> usize {
        let edges = self.edge.rows();
        let mut successors: HashMap<RamDomain, Vec<RamDomain>> = HashMap::new();
        for row in &edges {
            successors.entry(row[0]).or_default().push(row[1]);
        }

        let successors = &successors;
        let path = &self.path;
        let delta = &self.delta_path;
        path.extend_values(edges.iter().cloned());
        delta.purge();
        delta.extend_values(edges);

        let fixpoint = || {
            let mut rounds = 0;
            loop {
                let frontier = delta.rows();
                if frontier.is_empty() {
                    break rounds;
                }
                let derived: Vec<Vec<RamDomain>> = frontier
                    .par_iter()
                    .flat_map_iter(move |row| {
                        successors
                            .get(&row[1])
                            .into_iter()
                            .flatten()
                            .map(move |&dst| vec![row[0], dst])
                    })
                    .filter(|row| !path.contains_values(row))
                    .collect();
                delta.purge();
                delta.extend_values(derived.iter().cloned());
                path.extend_values(derived);
                rounds += 1;
            }
        };

        let rounds = match ThreadPoolBuilder::new()
            .num_threads(self.num_threads())
            .build()
        {
            Ok(pool) => pool.install(fixpoint),
            Err(e) => {
                warn!(error = %e, "thread_pool_unavailable_running_inline");
                fixpoint()
            }
        };
        delta.purge();
        rounds
    }
}

impl Program for TransitiveClosure {
    fn relations(&self) -> &ProgramRelations {
        &self.relations
    }

    fn relations_mut(&mut self) -> &mut ProgramRelations {
        &mut self.relations
    }

    fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    fn run(&mut self, stratum: Option<usize>) -> InterfaceResult<()> {
        // Single stratum: anything but 0 has nothing to do
        if matches!(stratum, Some(s) if s != 0) {
            return Ok(());
        }
        info!(
            program = Self::NAME,
            edges = self.edge.size(),
            threads = self.num_threads(),
            "program_run_start"
        );
        let rounds = self.evaluate();
        info!(program = Self::NAME, paths = self.path.size(), rounds, "program_run_finished");
        Ok(())
    }

    fn run_all(
        &mut self,
        input_dir: &Path,
        output_dir: &Path,
        stratum: Option<usize>,
    ) -> InterfaceResult<()> {
        self.load_all(input_dir)?;
        self.run(stratum)?;
        self.print_all(output_dir)
    }

    fn load_all(&mut self, input_dir: &Path) -> InterfaceResult<()> {
        for relation in self.input_relations() {
            let file = input_dir.join(format!("{}.facts", relation.name()));
            load_relation(relation.as_ref(), file, &self.options)?;
        }
        Ok(())
    }

    fn print_all(&mut self, output_dir: &Path) -> InterfaceResult<()> {
        for relation in self.output_relations() {
            let file = output_dir.join(format!("{}.csv", relation.name()));
            store_relation(relation.as_ref(), file, &self.options)?;
        }
        Ok(())
    }

    /// `reachable(src, dst)`: returns 1 if `path(src, dst)` holds, else 0
    fn execute_subroutine(
        &mut self,
        name: &str,
        args: &[RamDomain],
        ret: &mut Vec<RamDomain>,
        ret_err: &mut Vec<bool>,
    ) {
        if name != "reachable" {
            return;
        }
        if args.len() == 2 {
            ret.push(RamDomain::from(self.path.contains_values(args)));
            ret_err.push(false);
        } else {
            ret.push(0);
            ret_err.push(true);
        }
    }
}
