//! # Relation Schemas
//!
//! Every tuple is physically a flat array of [`RamDomain`] values. The schema
//! attached to a relation says how each column must be read: as a signed
//! number, an unsigned number, a float (bit-cast), or a symbol id.
//!
//! | Tag | Type | Stored as |
//! |-----|------|-----------|
//! | `i` | signed integer | the value itself |
//! | `u` | unsigned integer | bit-cast `u32` |
//! | `r` / `f` | float | bit-cast `f32` |
//! | `s` | symbol | id from the relation's symbol table |

use std::fmt;

use crate::error::{InterfaceError, InterfaceResult};

/// Domain value: the uniform fixed-width cell of every tuple
pub type RamDomain = i32;
/// Unsigned view of a domain value
pub type RamUnsigned = u32;
/// Float view of a domain value
pub type RamFloat = f32;

/// Reinterpret an unsigned value as a domain value
pub fn unsigned_to_domain(value: RamUnsigned) -> RamDomain {
    RamDomain::from_ne_bytes(value.to_ne_bytes())
}

/// Reinterpret a domain value as unsigned
pub fn domain_to_unsigned(value: RamDomain) -> RamUnsigned {
    RamUnsigned::from_ne_bytes(value.to_ne_bytes())
}

/// Reinterpret a float as a domain value
pub fn float_to_domain(value: RamFloat) -> RamDomain {
    RamDomain::from_ne_bytes(value.to_bits().to_ne_bytes())
}

/// Reinterpret a domain value as a float
pub fn domain_to_float(value: RamDomain) -> RamFloat {
    RamFloat::from_bits(domain_to_unsigned(value))
}

/// Per-column type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrType {
    /// `i`: signed integer
    Signed,
    /// `u`: unsigned integer
    Unsigned,
    /// `r` (or `f`): floating point
    Float,
    /// `s`: interned symbol
    Symbol,
}

impl AttrType {
    /// Parse a one-character tag
    pub fn from_tag(tag: char) -> InterfaceResult<Self> {
        match tag {
            'i' => Ok(AttrType::Signed),
            'u' => Ok(AttrType::Unsigned),
            'r' | 'f' => Ok(AttrType::Float),
            's' => Ok(AttrType::Symbol),
            other => Err(InterfaceError::UnknownAttrType(other)),
        }
    }

    /// Parse a declared type such as `s`, `i:number` or `s:Name`.
    /// Only the leading tag character is significant.
    pub fn parse(declared: &str) -> InterfaceResult<Self> {
        match declared.chars().next() {
            Some(tag) => Self::from_tag(tag),
            None => Err(InterfaceError::UnknownAttrType(' ')),
        }
    }

    /// The canonical one-character tag
    pub fn tag(self) -> char {
        match self {
            AttrType::Signed => 'i',
            AttrType::Unsigned => 'u',
            AttrType::Float => 'r',
            AttrType::Symbol => 's',
        }
    }

    /// Human-readable name of the type
    pub fn label(self) -> &'static str {
        match self {
            AttrType::Signed => "number",
            AttrType::Unsigned => "unsigned",
            AttrType::Float => "float",
            AttrType::Symbol => "symbol",
        }
    }

    pub fn is_symbol(self) -> bool {
        self == AttrType::Symbol
    }

    pub fn is_numeric(self) -> bool {
        !self.is_symbol()
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One named, typed column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: String,
    pub ty: AttrType,
    /// Declared type name, e.g. `Node` for a column declared `s:Node`
    pub type_name: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: AttrType) -> Self {
        Attribute {
            name: name.into(),
            ty,
            type_name: None,
        }
    }

    /// Column declared with a named type (`s:Node`, `i:number`)
    pub fn with_type_name(
        name: impl Into<String>,
        ty: AttrType,
        type_name: impl Into<String>,
    ) -> Self {
        Attribute {
            type_name: Some(type_name.into()),
            ..Attribute::new(name, ty)
        }
    }

    /// Parse a column from its declared type: `s`, `s:Node`, `i:number`
    pub fn declared(name: impl Into<String>, declared: &str) -> InterfaceResult<Self> {
        let ty = AttrType::parse(declared)?;
        Ok(match declared.split_once(':') {
            Some((_, type_name)) if !type_name.is_empty() => {
                Attribute::with_type_name(name, ty, type_name)
            }
            _ => Attribute::new(name, ty),
        })
    }

    /// The declared type as written in a signature: `s:Node`, or the bare tag
    pub fn declared_type(&self) -> String {
        match &self.type_name {
            Some(type_name) => format!("{}:{type_name}", self.ty.tag()),
            None => self.ty.tag().to_string(),
        }
    }
}

/// Name plus ordered columns of a relation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationSchema {
    pub name: String,
    pub attributes: Vec<Attribute>,
}

impl RelationSchema {
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        RelationSchema {
            name: name.into(),
            attributes,
        }
    }

    /// Build a schema from `(column name, declared type)` pairs,
    /// e.g. `[("src", "s"), ("weight", "i:number")]`
    pub fn from_declarations<'d>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = (&'d str, &'d str)>,
    ) -> InterfaceResult<Self> {
        let attributes = columns
            .into_iter()
            .map(|(column, declared)| Attribute::declared(column, declared))
            .collect::<InterfaceResult<Vec<_>>>()?;
        Ok(RelationSchema::new(name, attributes))
    }

    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    /// Type of column `idx`. Panics when `idx >= arity`.
    pub fn attr_type(&self, idx: usize) -> AttrType {
        self.attributes[idx].ty
    }

    /// Name of column `idx`. Panics when `idx >= arity`.
    pub fn attr_name(&self, idx: usize) -> &str {
        &self.attributes[idx].name
    }

    /// Declared type name of column `idx`, if one was given
    pub fn attr_type_name(&self, idx: usize) -> Option<&str> {
        self.attributes[idx].type_name.as_deref()
    }
}
