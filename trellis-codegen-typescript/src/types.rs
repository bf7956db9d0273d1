use swc_ecma_ast::{TsKeywordTypeKind, TsType};
use trellis_core::ir::TypeExpr;

use super::emit::{any_of, keyword, literal, member, named, object};

/// Converts a resolved type expression into a TypeScript type.
pub fn ts_type(ty: &TypeExpr) -> Box<TsType> {
    match ty {
        TypeExpr::String => keyword(TsKeywordTypeKind::TsStringKeyword),
        TypeExpr::Number => keyword(TsKeywordTypeKind::TsNumberKeyword),
        TypeExpr::Boolean => keyword(TsKeywordTypeKind::TsBooleanKeyword),
        TypeExpr::Null => keyword(TsKeywordTypeKind::TsNullKeyword),
        TypeExpr::Unknown => keyword(TsKeywordTypeKind::TsUnknownKeyword),
        TypeExpr::Void => keyword(TsKeywordTypeKind::TsVoidKeyword),
        TypeExpr::Literal(lit) => literal(lit),
        TypeExpr::Record(properties) => object(
            properties
                .iter()
                .map(|p| member(&p.name, p.optional, ts_type(&p.ty)))
                .collect(),
        ),
        TypeExpr::Union(members) => any_of(members.iter().map(ts_type).collect()),
        TypeExpr::Ref(name) => named(name, vec![]),
    }
}
