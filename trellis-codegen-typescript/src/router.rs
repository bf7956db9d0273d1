use std::collections::HashMap;

use swc_ecma_ast::{ModuleItem, TsType, TsTypeElement};
use trellis_core::{
    codegen::{Code, FormattingError},
    ir::{IrSpec, OperationKind, Procedure, RouterEntry, RouterRecord, SegmentKey, to_identifier},
};

use super::{
    emit::{JsDocs, all_of, export_alias, indexed, member, named, object, print},
    header::FILE_HEADER,
    types::ts_type,
};

/// The name of the exported router type.
pub const ROUTER_TYPE_NAME: &str = "ApiRouter";

/// Generates the router declaration module: the fixed header, one
/// exported alias per component schema, and the `ApiRouter` type.
#[derive(Debug)]
pub struct CodegenRouterModule<'a> {
    spec: &'a IrSpec<'a>,
}

impl<'a> CodegenRouterModule<'a> {
    pub fn new(spec: &'a IrSpec<'a>) -> Self {
        Self { spec }
    }
}

impl Code for CodegenRouterModule<'_> {
    fn into_string(self) -> Result<String, FormattingError> {
        check_unique_names(self.spec)?;

        let docs = JsDocs::new();
        let mut items: Vec<ModuleItem> = self
            .spec
            .declarations
            .iter()
            .map(|(name, decl)| {
                export_alias(name, ts_type(&decl.ty), docs.span(decl.description))
            })
            .collect();

        let summary = self.spec.info.and_then(|info| {
            Some(info.title.as_str())
                .filter(|title| !title.is_empty())
                .or(info.description.as_deref())
        });
        items.push(export_alias(
            ROUTER_TYPE_NAME,
            ts_router(&self.spec.router.root),
            docs.span(summary),
        ));

        let body = print(items, &docs)?;
        Ok(format!("{FILE_HEADER}\n{body}"))
    }
}

/// Fails if two declarations, or a declaration and the router,
/// would be exported under the same identifier.
fn check_unique_names(spec: &IrSpec<'_>) -> Result<(), FormattingError> {
    let mut seen = HashMap::from([(to_identifier(ROUTER_TYPE_NAME), ROUTER_TYPE_NAME)]);
    for &name in spec.declarations.keys() {
        let ident = to_identifier(name);
        if let Some(other) = seen.get(&ident) {
            return Err(FormattingError::new(
                "router declarations",
                format!("`{other}` and `{name}` are both exported as `{ident}`"),
            ));
        }
        seen.insert(ident, name);
    }
    Ok(())
}

/// Renders a record as `CreateRouterInner<FakeConfig, { ... }>`.
fn ts_router(record: &RouterRecord) -> Box<TsType> {
    let members = record.entries.iter().map(ts_entry).collect();
    named(
        "CreateRouterInner",
        vec![named("FakeConfig", vec![]), object(members)],
    )
}

fn ts_entry(entry: &RouterEntry) -> TsTypeElement {
    match entry {
        RouterEntry::Procedure(procedure) => {
            member(procedure.method.as_str(), false, ts_procedure(procedure))
        }
        RouterEntry::Branch(branch) => {
            // Records that share a key are intersected.
            let ty = match &*branch.records {
                [record] => ts_router(record),
                records => all_of(records.iter().map(ts_router).collect()),
            };
            match &branch.key {
                SegmentKey::Literal(text) => member(text, false, ty),
                SegmentKey::Param(name) => indexed(name, ty),
            }
        }
    }
}

fn ts_procedure(procedure: &Procedure) -> Box<TsType> {
    let name = match procedure.kind {
        OperationKind::Query => "QueryProcedure",
        OperationKind::Mutation => "MutationProcedure",
    };
    named(
        name,
        vec![ts_type(&procedure.input), ts_type(&procedure.output)],
    )
}
