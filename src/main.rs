//! # factlayer CLI
//!
//! Instantiate registered programs by name and drive them from the shell.
//!
//! ## Usage
//!
//! ```bash
//! # List registered programs
//! factlayer list
//!
//! # Show a program's relations and signatures
//! factlayer describe transitive_closure
//!
//! # Load <input>/edge.facts, evaluate, write <output>/path.csv
//! factlayer run transitive_closure -F ./facts -D ./out -j 4
//! ```
//!
//! Logging follows `RUST_LOG` when set, otherwise the `[logging]` config.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

use factlayer::config::LoggingConfig;
use factlayer::{factory, Config, Program};

#[derive(Parser, Debug)]
#[command(name = "factlayer", version, about = "Run and inspect compiled Datalog programs")]
struct Cli {
    /// Configuration file (defaults to factlayer.toml + factlayer.local.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered programs
    List,

    /// Print each relation of a program with its classification and signature
    Describe {
        /// Registered program name
        program: String,
    },

    /// Load inputs, evaluate, and store outputs
    Run {
        /// Registered program name
        program: String,

        /// Input fact directory
        #[arg(short = 'F', long)]
        input_dir: Option<PathBuf>,

        /// Output directory
        #[arg(short = 'D', long)]
        output_dir: Option<PathBuf>,

        /// Thread count hint for the program
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Evaluate only this stratum
        #[arg(long)]
        stratum: Option<usize>,

        /// Dump input and output relations to stdout after the run
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };
    init_tracing(&config.logging);

    match cli.command {
        Command::List => {
            for name in factory::registered_names() {
                println!("{name}");
            }
        }
        Command::Describe { program } => {
            let program = instantiate(&program)?;
            describe(program.as_ref());
        }
        Command::Run {
            program,
            input_dir,
            output_dir,
            threads,
            stratum,
            dump,
        } => {
            let settings = config.program;
            let input_dir = input_dir.unwrap_or(settings.input_dir);
            let output_dir = output_dir.unwrap_or(settings.output_dir);

            let mut instance = instantiate(&program)?;
            instance.set_num_threads(threads.unwrap_or(settings.num_threads));
            instance
                .run_all(&input_dir, &output_dir, stratum.or(settings.stratum))
                .with_context(|| format!("running program '{program}'"))?;

            if dump {
                let mut out = io::stdout().lock();
                instance.dump_inputs(&mut out)?;
                instance.dump_outputs(&mut out)?;
            }
        }
    }

    Ok(())
}

fn instantiate(name: &str) -> anyhow::Result<Box<dyn Program>> {
    factory::new_instance(name).ok_or_else(|| {
        anyhow!(
            "no program registered under '{name}' (available: {})",
            factory::registered_names().join(", ")
        )
    })
}

fn describe(program: &dyn Program) {
    for relation in program.all_relations() {
        let name = relation.name();
        let is = |view: &[factlayer::RelationHandle]| view.iter().any(|r| r.name() == name);
        let class = match (is(program.input_relations()), is(program.output_relations())) {
            (true, true) => "input+output",
            (true, false) => "input",
            (false, true) => "output",
            (false, false) => "internal",
        };
        let columns: Vec<String> = (0..relation.arity())
            .map(|idx| format!("{}:{}", relation.attr_name(idx), relation.attr_type(idx).label()))
            .collect();
        println!(
            "{name}{} {class} ({})",
            relation.signature(),
            columns.join(", ")
        );
    }
}

fn init_tracing(logging_config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&logging_config.level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let base = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    let _ = if logging_config.format == "json" {
        base.json().try_init()
    } else {
        base.compact().try_init()
    };
}
