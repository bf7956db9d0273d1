use indexmap::IndexMap;
use itertools::Itertools;

use crate::parse::{
    Method, Operation, PathItem,
    path::{self, PathSegment},
};

use super::{
    resolve::{ReferenceIndex, resolve_type},
    types::{Property, TypeExpr},
};

/// Whether an operation reads or changes state.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

impl From<Method> for OperationKind {
    fn from(method: Method) -> Self {
        if method.is_safe() {
            Self::Query
        } else {
            Self::Mutation
        }
    }
}

/// The generated signature of one operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Procedure {
    pub method: Method,
    pub kind: OperationKind,
    pub input: TypeExpr,
    pub output: TypeExpr,
}

impl Procedure {
    pub fn new(method: Method, op: &Operation, index: &ReferenceIndex<'_>) -> Self {
        Self {
            method,
            kind: method.into(),
            input: input_type(op, index),
            output: output_type(op, index),
        }
    }
}

/// Builds the input record: `data` from the JSON request body, and
/// `query` from the query parameters. Neither is `void`.
fn input_type(op: &Operation, index: &ReferenceIndex<'_>) -> TypeExpr {
    let data = op
        .json_request()
        .map(|media| Property::required("data", resolve_type(media.into(), index)));

    let params = op
        .query_parameters()
        .map(|param| Property {
            name: param.name.clone(),
            optional: !param.required,
            ty: param
                .schema
                .as_ref()
                .map_or(TypeExpr::Unknown, |schema| resolve_type(schema.into(), index)),
        })
        .collect_vec();
    let query = if params.is_empty() {
        None
    } else {
        Some(Property::required("query", TypeExpr::Record(params)))
    };

    let fields = data.into_iter().chain(query).collect_vec();
    if fields.is_empty() {
        TypeExpr::Void
    } else {
        TypeExpr::Record(fields)
    }
}

/// Unions the JSON bodies of all 2xx responses.
fn output_type(op: &Operation, index: &ReferenceIndex<'_>) -> TypeExpr {
    TypeExpr::union(
        op.json_success_responses()
            .map(|media| resolve_type(media.into(), index)),
    )
}

/// The key of a child router.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SegmentKey {
    /// A literal path segment.
    Literal(String),
    /// A path parameter, rendered as an indexable string key.
    Param(String),
}

impl From<PathSegment<'_>> for SegmentKey {
    fn from(segment: PathSegment<'_>) -> Self {
        match segment {
            PathSegment::Literal(text) => Self::Literal(text.to_owned()),
            PathSegment::Param(name) => Self::Param(name.to_owned()),
        }
    }
}

/// A grouping of child routers and procedures.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RouterRecord {
    pub entries: Vec<RouterEntry>,
}

impl RouterRecord {
    /// Nests `procedures` under one single-entry record per segment.
    fn chain(segments: &[PathSegment<'_>], procedures: Vec<Procedure>) -> Self {
        let leaf = Self {
            entries: procedures.into_iter().map(RouterEntry::Procedure).collect(),
        };
        segments.iter().rev().fold(leaf, |inner, &segment| Self {
            entries: vec![RouterEntry::Branch(RouterBranch {
                key: segment.into(),
                records: vec![inner],
            })],
        })
    }

    /// Returns the most recently added branch, if its key is `key`.
    fn last_branch_mut(&mut self, key: &SegmentKey) -> Option<&mut RouterBranch> {
        self.entries.iter_mut().rev().find_map(|entry| match entry {
            RouterEntry::Branch(branch) if branch.key == *key => Some(branch),
            _ => None,
        })
    }

    pub fn branches(&self) -> impl Iterator<Item = &RouterBranch> {
        self.entries.iter().filter_map(|entry| match entry {
            RouterEntry::Branch(branch) => Some(branch),
            RouterEntry::Procedure(_) => None,
        })
    }

    pub fn procedures(&self) -> impl Iterator<Item = &Procedure> {
        self.entries.iter().filter_map(|entry| match entry {
            RouterEntry::Procedure(procedure) => Some(procedure),
            RouterEntry::Branch(_) => None,
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RouterEntry {
    Branch(RouterBranch),
    Procedure(Procedure),
}

/// A keyed child router. Several records under the same key are
/// intersected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouterBranch {
    pub key: SegmentKey,
    pub records: Vec<RouterRecord>,
}

/// The router tree for all paths in a document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RouterTree {
    pub root: RouterRecord,
}

impl RouterTree {
    /// Groups operations into a tree keyed by path segment.
    ///
    /// Paths are visited from fewest to most segments, keeping their
    /// relative order on ties. A path whose first segment matches the
    /// first segment of the path visited just before it is intersected
    /// into that path's top-level branch; any other path starts a new
    /// top-level branch. Only the immediately preceding path is
    /// compared, so deeper shared prefixes aren't merged.
    pub fn build(paths: &IndexMap<String, PathItem>, index: &ReferenceIndex<'_>) -> Self {
        let mut root = RouterRecord::default();
        let mut previous: Option<PathSegment<'_>> = None;

        let sorted = paths
            .iter()
            .map(|(pattern, item)| (path::segments(pattern), item))
            .sorted_by_key(|(segments, _)| segments.len());

        for (segments, item) in sorted {
            let first = segments.first().copied();
            let merge = first.is_some() && first == previous;
            previous = first;

            let procedures = item
                .operations()
                .map(|(method, op)| Procedure::new(method, op, index))
                .collect_vec();
            if procedures.is_empty() {
                continue;
            }

            let Some((&head, rest)) = segments.split_first() else {
                root.entries
                    .extend(procedures.into_iter().map(RouterEntry::Procedure));
                continue;
            };
            let record = RouterRecord::chain(rest, procedures);
            let key = SegmentKey::from(head);
            match merge.then(|| root.last_branch_mut(&key)).flatten() {
                Some(branch) => branch.records.push(record),
                None => root.entries.push(RouterEntry::Branch(RouterBranch {
                    key,
                    records: vec![record],
                })),
            }
        }

        Self { root }
    }
}
