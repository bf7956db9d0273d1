//! Language-agnostic type expressions.

use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

use itertools::Itertools;
use serde_json::Number;

/// A type expression produced by resolving a schema.
///
/// `Display` renders a compact TypeScript-like form, like
/// `{ id: number, kind?: 'cat' | 'dog' }`; the emitter renders the
/// same expression through a real TypeScript AST.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TypeExpr {
    String,
    Number,
    Boolean,
    Null,
    /// A shape that couldn't be classified.
    Unknown,
    /// The input of an operation that takes no arguments.
    Void,
    Literal(Literal),
    /// A structural record. An empty record is `{}`.
    Record(Vec<Property>),
    /// A union of two or more members.
    Union(Vec<TypeExpr>),
    /// A reference to a named declaration.
    Ref(String),
}

impl TypeExpr {
    /// Builds a union from `members`, flattening nested unions.
    /// A single member is returned as-is; no members is `unknown`.
    pub fn union(members: impl IntoIterator<Item = TypeExpr>) -> Self {
        let mut members = members
            .into_iter()
            .flat_map(|member| match member {
                Self::Union(inner) => inner,
                other => vec![other],
            })
            .collect_vec();
        match members.len() {
            0 => Self::Unknown,
            1 => members.remove(0),
            _ => Self::Union(members),
        }
    }
}

impl Display for TypeExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Number => f.write_str("number"),
            Self::Boolean => f.write_str("boolean"),
            Self::Null => f.write_str("null"),
            Self::Unknown => f.write_str("unknown"),
            Self::Void => f.write_str("void"),
            Self::Literal(literal) => literal.fmt(f),
            Self::Record(properties) if properties.is_empty() => f.write_str("{}"),
            Self::Record(properties) => write!(f, "{{ {} }}", properties.iter().format(", ")),
            Self::Union(members) => write!(f, "{}", members.iter().format(" | ")),
            Self::Ref(name) => f.write_str(name),
        }
    }
}

impl From<Literal> for TypeExpr {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

/// A literal type, from an `enum` value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Literal {
    String(String),
    Number(Number),
    Boolean(bool),
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "'{}'", escape_single_quoted(s)),
            Self::Number(n) => n.fmt(f),
            Self::Boolean(b) => b.fmt(f),
        }
    }
}

/// A named member of a [`TypeExpr::Record`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    pub name: String,
    pub optional: bool,
    pub ty: TypeExpr,
}

impl Property {
    pub fn required(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            optional: false,
            ty,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            optional: true,
            ty,
        }
    }
}

impl Display for Property {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if is_identifier(&self.name) {
            f.write_str(&self.name)?;
        } else {
            write!(f, "'{}'", escape_single_quoted(&self.name))?;
        }
        if self.optional {
            f.write_str("?")?;
        }
        write!(f, ": {}", self.ty)
    }
}

/// Returns `true` if `name` can be written as a bare property key.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '$' || c == '_' || unicode_ident::is_xid_start(c))
        && chars.all(|c| c == '$' || unicode_ident::is_xid_continue(c))
}

/// Returns `name` as an identifier, with every character that can't
/// appear in one replaced by `_`. A leading `_` is added if `name`
/// starts with a digit, or is empty.
pub fn to_identifier(name: &str) -> Cow<'_, str> {
    if is_identifier(name) {
        return Cow::Borrowed(name);
    }
    let mut ident: String = name
        .chars()
        .map(|c| match c == '$' || unicode_ident::is_xid_continue(c) {
            true => c,
            false => '_',
        })
        .collect();
    if !ident
        .chars()
        .next()
        .is_some_and(|c| c == '$' || c == '_' || unicode_ident::is_xid_start(c))
    {
        ident.insert(0, '_');
    }
    Cow::Owned(ident)
}

fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}
