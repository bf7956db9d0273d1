use std::borrow::Cow;

use indexmap::IndexMap;
use serde_json::Value;

use crate::parse::{Document, MediaType, Schema, Ty};

use super::types::{Literal, Property, TypeExpr};

/// A classified view of a [`Schema`].
///
/// Classification applies the resolution rules in priority order:
/// an `enum` wins over the base `type` it usually carries, and an
/// `object` without `properties` falls through instead of becoming
/// an empty record.
#[derive(Clone, Debug)]
pub enum SchemaNode<'a> {
    Enum(&'a [Value]),
    Primitive(PrimitiveType),
    Object {
        properties: &'a IndexMap<String, Schema>,
        required: &'a [String],
    },
    Union(&'a [Schema]),
    Ref(Cow<'a, str>),
    Unknown,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
    Null,
}

impl<'a> SchemaNode<'a> {
    pub fn classify(schema: &'a Schema) -> Self {
        if let Some(variants) = &schema.variants {
            return Self::Enum(variants);
        }
        match (schema.single_type(), &schema.properties) {
            (Some(Ty::String), _) => return Self::Primitive(PrimitiveType::String),
            (Some(Ty::Integer | Ty::Number), _) => return Self::Primitive(PrimitiveType::Number),
            (Some(Ty::Boolean), _) => return Self::Primitive(PrimitiveType::Boolean),
            (Some(Ty::Null), _) => return Self::Primitive(PrimitiveType::Null),
            (Some(Ty::Object), Some(properties)) => {
                return Self::Object {
                    properties,
                    required: &schema.required,
                };
            }
            _ => {}
        }
        if let Some(members) = &schema.one_of {
            return Self::Union(members);
        }
        match schema.ref_name() {
            Some(name) => Self::Ref(name),
            None => Self::Unknown,
        }
    }
}

impl<'a> From<&'a Schema> for SchemaNode<'a> {
    fn from(schema: &'a Schema) -> Self {
        Self::classify(schema)
    }
}

/// Unwraps a media type to the schema it carries.
impl<'a> From<&'a MediaType> for SchemaNode<'a> {
    fn from(media: &'a MediaType) -> Self {
        match &media.schema {
            Some(schema) => Self::classify(schema),
            None => Self::Unknown,
        }
    }
}

/// A name-keyed lookup table of a document's component schemas.
///
/// References resolve to the declared name through this table without
/// re-walking the referenced schema, so resolution terminates even for
/// self-referential components.
#[derive(Clone, Debug, Default)]
pub struct ReferenceIndex<'a> {
    schemas: IndexMap<&'a str, &'a Schema>,
}

impl<'a> ReferenceIndex<'a> {
    pub fn new(doc: &'a Document) -> Self {
        Self {
            schemas: doc.schemas().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&'a Schema> {
        self.schemas.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Resolves every component schema to its type expression, in
    /// declaration order.
    pub fn declarations(&self) -> impl Iterator<Item = (&'a str, TypeExpr)> + '_ {
        self.schemas
            .iter()
            .map(|(&name, &schema)| (name, resolve_type(schema.into(), self)))
    }
}

/// Resolves a schema node to a type expression.
///
/// This never fails: shapes without a rule resolve to
/// [`TypeExpr::Unknown`].
pub fn resolve_type(node: SchemaNode<'_>, index: &ReferenceIndex<'_>) -> TypeExpr {
    match node {
        SchemaNode::Enum(variants) => TypeExpr::union(variants.iter().map(enum_member)),
        SchemaNode::Primitive(PrimitiveType::String) => TypeExpr::String,
        SchemaNode::Primitive(PrimitiveType::Number) => TypeExpr::Number,
        SchemaNode::Primitive(PrimitiveType::Boolean) => TypeExpr::Boolean,
        SchemaNode::Primitive(PrimitiveType::Null) => TypeExpr::Null,
        SchemaNode::Object {
            properties,
            required,
        } => TypeExpr::Record(
            properties
                .iter()
                .map(|(name, schema)| Property {
                    name: name.clone(),
                    optional: !required.contains(name),
                    ty: resolve_type(schema.into(), index),
                })
                .collect(),
        ),
        SchemaNode::Union(members) => TypeExpr::union(
            members
                .iter()
                .map(|member| resolve_type(member.into(), index)),
        ),
        SchemaNode::Ref(name) => {
            // Prefer the declared spelling; a dangling name is kept as-is.
            let name = index
                .schemas
                .get_key_value(&*name)
                .map_or(name, |(&declared, _)| Cow::Borrowed(declared));
            TypeExpr::Ref(name.into_owned())
        }
        SchemaNode::Unknown => TypeExpr::Unknown,
    }
}

fn enum_member(value: &Value) -> TypeExpr {
    match value {
        Value::String(s) => Literal::String(s.clone()).into(),
        Value::Number(n) => Literal::Number(n.clone()).into(),
        Value::Bool(b) => Literal::Boolean(*b).into(),
        Value::Null => TypeExpr::Null,
        Value::Array(_) | Value::Object(_) => TypeExpr::Unknown,
    }
}

/// Collects the component names referenced anywhere inside `schema`.
pub(crate) fn collect_refs<'a>(schema: &'a Schema, refs: &mut Vec<Cow<'a, str>>) {
    if let Some(name) = schema.ref_name() {
        refs.push(name);
    }
    for property in schema.properties.iter().flat_map(|p| p.values()) {
        collect_refs(property, refs);
    }
    for member in schema.one_of.iter().flatten() {
        collect_refs(member, refs);
    }
}
