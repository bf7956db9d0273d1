use std::borrow::Cow;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::parse::{Document, Info};

use super::{
    resolve::{ReferenceIndex, collect_refs},
    router::RouterTree,
    types::TypeExpr,
};

/// The resolved form of a document: named declarations and the
/// router tree that refers to them.
#[derive(Debug)]
pub struct IrSpec<'a> {
    pub info: Option<&'a Info>,
    pub declarations: IndexMap<&'a str, IrDeclaration<'a>>,
    pub router: RouterTree,
    /// Referenced component names that the document doesn't declare.
    pub dangling: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IrDeclaration<'a> {
    pub ty: TypeExpr,
    pub description: Option<&'a str>,
}

impl<'a> IrSpec<'a> {
    pub fn from_doc(doc: &'a Document) -> Self {
        let index = ReferenceIndex::new(doc);

        let declarations = index
            .declarations()
            .map(|(name, ty)| {
                let description = index.get(name).and_then(|s| s.description.as_deref());
                (name, IrDeclaration { ty, description })
            })
            .collect();

        let router = RouterTree::build(&doc.paths, &index);

        let dangling = referenced_schemas(doc)
            .into_iter()
            .filter(|name| !index.contains(name))
            .map(Cow::into_owned)
            .unique()
            .collect_vec();
        for name in &dangling {
            tracing::warn!(%name, "reference to undeclared schema; emitting it as a bare name");
        }

        Self {
            info: doc.info.as_ref(),
            declarations,
            router,
            dangling,
        }
    }
}

/// Collects every component name referenced from the document's
/// schemas and operations.
fn referenced_schemas(doc: &Document) -> Vec<Cow<'_, str>> {
    let operations = doc.paths.values().flat_map(|item| item.operations());
    let roots = doc
        .schemas()
        .map(|(_, schema)| schema)
        .chain(operations.flat_map(|(_, op)| {
            let params = op.query_parameters().filter_map(|p| p.schema.as_ref());
            let request = op.json_request().and_then(|m| m.schema.as_ref());
            let responses = op
                .json_success_responses()
                .filter_map(|m| m.schema.as_ref());
            params.chain(request).chain(responses)
        }));

    let mut refs = Vec::new();
    for schema in roots {
        collect_refs(schema, &mut refs);
    }
    refs
}
