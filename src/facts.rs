//! # Fact Files
//!
//! Load and store a single relation as delimited text, one tuple per line.
//! Every field goes through the tuple codec, so symbol columns are interned
//! in the relation's symbol table and numeric columns are parsed per their
//! declared type.
//!
//! ## Format
//!
//! - Tab-delimited by default, no header
//! - Empty lines are skipped
//! - A nullary tuple is written as `()`
//! - In symbols, backslash, newline, carriage return, tab and the delimiter
//!   are backslash-escaped (`\\`, `\n`, `\r`, `\t`, `\,`)
//!
//! ```text
//! a	b
//! b	c
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{InterfaceError, InterfaceResult};
use crate::relation::Relation;
use crate::schema::{float_to_domain, unsigned_to_domain, AttrType, RamDomain};
use crate::tuple::Tuple;

/// Marker line for the single tuple of a nullary relation
const NULLARY: &str = "()";

/// Options for reading and writing fact files
#[derive(Debug, Clone)]
pub struct FactOptions {
    /// Field delimiter (default: tab)
    pub delimiter: char,
    /// Fail on malformed lines instead of skipping them (default: true)
    pub strict: bool,
}

impl Default for FactOptions {
    fn default() -> Self {
        FactOptions {
            delimiter: '\t',
            strict: true,
        }
    }
}

/// Render a tuple's fields, decoded per column type, joined by `delimiter`
pub fn format_tuple(mut tuple: Tuple<'_>, delimiter: char) -> String {
    let relation = tuple.relation();
    if relation.arity() == 0 {
        return NULLARY.to_string();
    }
    tuple.rewind();
    let fields: Vec<String> = (0..relation.arity())
        .map(|idx| match relation.attr_type(idx) {
            AttrType::Symbol => escape_symbol(&tuple.read_symbol(), delimiter),
            AttrType::Signed => tuple.read_number().to_string(),
            AttrType::Unsigned => tuple.read_unsigned().to_string(),
            AttrType::Float => tuple.read_float().to_string(),
        })
        .collect();
    fields.join(&delimiter.to_string())
}

/// Backslash-escape characters that would break the line layout
fn escape_symbol(symbol: &str, delimiter: char) -> String {
    let mut escaped = String::with_capacity(symbol.len());
    for c in symbol.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if c == delimiter => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Split a line on unescaped delimiters and undo [`escape_symbol`].
/// Unknown escapes are kept verbatim, backslash included.
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        if c == delimiter {
            fields.push(std::mem::take(&mut field));
            continue;
        }
        if c != '\\' {
            field.push(c);
            continue;
        }
        match chars.next() {
            Some(next) if next == delimiter || next == '\\' => field.push(next),
            Some('n') => field.push('\n'),
            Some('r') => field.push('\r'),
            Some('t') => field.push('\t'),
            Some(other) => {
                field.push('\\');
                field.push(other);
            }
            None => field.push('\\'),
        }
    }
    fields.push(field);
    fields
}

/// A field that passed validation, not yet encoded
enum Field {
    Symbol(String),
    Number(RamDomain),
}

/// Encode one line's fields into a tuple of `relation`.
///
/// Every numeric field is parsed before any symbol is interned, so a
/// rejected line leaves the symbol table untouched.
pub fn parse_tuple<'a>(
    relation: &'a dyn Relation,
    line: &str,
    delimiter: char,
) -> Result<Tuple<'a>, String> {
    let mut tuple = Tuple::new(relation);
    if relation.arity() == 0 {
        return if line.trim() == NULLARY {
            Ok(tuple)
        } else {
            Err(format!("expected '{NULLARY}' for nullary relation"))
        };
    }

    let fields = split_fields(line, delimiter);
    if fields.len() != relation.arity() {
        return Err(format!(
            "{} fields, expected {}",
            fields.len(),
            relation.arity()
        ));
    }

    let mut validated = Vec::with_capacity(fields.len());
    for (idx, field) in fields.into_iter().enumerate() {
        validated.push(match relation.attr_type(idx) {
            AttrType::Symbol => Field::Symbol(field),
            AttrType::Signed => Field::Number(parse_field::<RamDomain>(&field, idx)?),
            AttrType::Unsigned => Field::Number(unsigned_to_domain(parse_field(&field, idx)?)),
            AttrType::Float => Field::Number(float_to_domain(parse_field(&field, idx)?)),
        });
    }

    for field in validated {
        match field {
            Field::Symbol(symbol) => tuple.append_symbol(&symbol),
            Field::Number(value) => tuple.append_number(value),
        };
    }
    Ok(tuple)
}

fn parse_field<T: std::str::FromStr>(field: &str, idx: usize) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    field
        .trim()
        .parse()
        .map_err(|e| format!("column {idx}: cannot parse '{field}': {e}"))
}

/// Load tuples from `path` into `relation`
///
/// # Returns
/// * `Ok(count)` - Number of lines encoded and inserted
/// * `Err(InterfaceError)` - If the file cannot be read, or a line is
///   malformed and `options.strict` is set
pub fn load_relation<P: AsRef<Path>>(
    relation: &dyn Relation,
    path: P,
    options: &FactOptions,
) -> InterfaceResult<usize> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let mut loaded = 0;
    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.trim().is_empty() {
            continue;
        }

        match parse_tuple(relation, line, options.delimiter) {
            Ok(tuple) => {
                relation.insert(&tuple);
                loaded += 1;
            }
            Err(message) if options.strict => {
                return Err(InterfaceError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    message,
                });
            }
            Err(message) => {
                warn!(relation = relation.name(), line = idx + 1, %message, "fact_line_skipped");
            }
        }
    }

    info!(relation = relation.name(), path = %path.display(), tuples = loaded, "facts_loaded");
    Ok(loaded)
}

/// Store every tuple of `relation` to `path`, replacing the file
pub fn store_relation<P: AsRef<Path>>(
    relation: &dyn Relation,
    path: P,
    options: &FactOptions,
) -> InterfaceResult<usize> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);

    let mut stored = 0;
    for tuple in relation.iter() {
        writeln!(writer, "{}", format_tuple(tuple, options.delimiter))?;
        stored += 1;
    }
    writer.flush()?;

    info!(relation = relation.name(), path = %path.display(), tuples = stored, "facts_stored");
    Ok(stored)
}
