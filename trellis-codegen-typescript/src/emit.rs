//! Builders for the small slice of the TypeScript AST that router
//! declarations use, and a printer for the finished module.

use std::cell::Cell;

use swc_atoms::Atom;
use swc_common::{
    BytePos, DUMMY_SP, SourceMap, Span,
    comments::{Comment, CommentKind, Comments, SingleThreadedComments},
    sync::Lrc,
};
use swc_ecma_ast::{
    BindingIdent, Bool, Decl, ExportDecl, Expr, Ident, Lit, Module, ModuleDecl, ModuleItem,
    Number, Str, TsEntityName, TsFnParam, TsIndexSignature, TsIntersectionType, TsKeywordType,
    TsKeywordTypeKind, TsLit, TsLitType, TsPropertySignature, TsType, TsTypeAliasDecl, TsTypeAnn,
    TsTypeElement, TsTypeLit, TsTypeParamInstantiation, TsTypeRef, TsUnionOrIntersectionType,
    TsUnionType,
};
use swc_ecma_codegen::{Emitter, text_writer::JsWriter};
use trellis_core::{
    codegen::FormattingError,
    ir::{Literal, is_identifier, to_identifier},
};

/// JSDoc comments for a module, keyed by the spans they lead.
///
/// swc looks comments up by position, so every documented item
/// needs its own span.
pub struct JsDocs {
    store: SingleThreadedComments,
    pos: Cell<u32>,
}

impl JsDocs {
    pub fn new() -> Self {
        Self {
            store: SingleThreadedComments::default(),
            // `BytePos(0)` is the dummy span's position.
            pos: Cell::new(1),
        }
    }

    /// Returns a fresh span, with `doc` attached as a `/** ... */`
    /// comment if it isn't blank.
    pub fn span(&self, doc: Option<&str>) -> Span {
        let lo = BytePos(self.pos.replace(self.pos.get() + 1));
        if let Some(doc) = doc.map(str::trim).filter(|doc| !doc.is_empty()) {
            let text = format!("* {} ", doc.replace("*/", "*\\/"));
            self.store.add_leading(
                lo,
                Comment {
                    kind: CommentKind::Block,
                    span: DUMMY_SP,
                    text: text.into(),
                },
            );
        }
        Span::new(lo, lo)
    }
}

/// Names that aren't identifiers, like `pet-id` or `Api.Pet`, are
/// rewritten the same way everywhere, so references still match
/// their declarations.
fn ident(name: &str) -> Ident {
    Ident::new_no_ctxt(Atom::from(&*to_identifier(name)), DUMMY_SP)
}

fn ann(ty: Box<TsType>) -> Option<Box<TsTypeAnn>> {
    Some(Box::new(TsTypeAnn {
        span: DUMMY_SP,
        type_ann: ty,
    }))
}

/// Single-quoted, like the rest of the generated file.
fn quoted(text: &str) -> Str {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    Str {
        span: DUMMY_SP,
        value: text.into(),
        raw: Some(Atom::from(format!("'{escaped}'"))),
    }
}

pub fn keyword(kind: TsKeywordTypeKind) -> Box<TsType> {
    Box::new(TsType::TsKeywordType(TsKeywordType {
        span: DUMMY_SP,
        kind,
    }))
}

/// A literal type. Numbers keep their JSON spelling.
pub fn literal(lit: &Literal) -> Box<TsType> {
    let lit = match lit {
        Literal::String(text) => TsLit::Str(quoted(text)),
        Literal::Number(n) => TsLit::Number(Number {
            span: DUMMY_SP,
            value: n.as_f64().unwrap_or(f64::NAN),
            raw: Some(n.to_string().into()),
        }),
        Literal::Boolean(value) => TsLit::Bool(Bool {
            span: DUMMY_SP,
            value: *value,
        }),
    };
    Box::new(TsType::TsLitType(TsLitType {
        span: DUMMY_SP,
        lit,
    }))
}

/// `A | B`.
#[allow(clippy::vec_box)]
pub fn any_of(types: Vec<Box<TsType>>) -> Box<TsType> {
    Box::new(TsType::TsUnionOrIntersectionType(
        TsUnionOrIntersectionType::TsUnionType(TsUnionType {
            span: DUMMY_SP,
            types,
        }),
    ))
}

/// `A & B`.
#[allow(clippy::vec_box)]
pub fn all_of(types: Vec<Box<TsType>>) -> Box<TsType> {
    Box::new(TsType::TsUnionOrIntersectionType(
        TsUnionOrIntersectionType::TsIntersectionType(TsIntersectionType {
            span: DUMMY_SP,
            types,
        }),
    ))
}

/// A named type, like `User`, or `QueryProcedure<A, B>` when
/// `args` isn't empty.
#[allow(clippy::vec_box)]
pub fn named(name: &str, args: Vec<Box<TsType>>) -> Box<TsType> {
    let type_params = (!args.is_empty()).then(|| {
        Box::new(TsTypeParamInstantiation {
            span: DUMMY_SP,
            params: args,
        })
    });
    Box::new(TsType::TsTypeRef(TsTypeRef {
        span: DUMMY_SP,
        type_name: TsEntityName::Ident(ident(name)),
        type_params,
    }))
}

/// An object type, `{ ... }`.
pub fn object(members: Vec<TsTypeElement>) -> Box<TsType> {
    Box::new(TsType::TsTypeLit(TsTypeLit {
        span: DUMMY_SP,
        members,
    }))
}

/// `name: Type`, or `name?: Type`. Keys that aren't valid identifiers
/// are quoted.
pub fn member(name: &str, optional: bool, ty: Box<TsType>) -> TsTypeElement {
    let key = match is_identifier(name) {
        true => Expr::Ident(ident(name)),
        false => Expr::Lit(Lit::Str(quoted(name))),
    };
    TsTypeElement::TsPropertySignature(TsPropertySignature {
        span: DUMMY_SP,
        readonly: false,
        key: Box::new(key),
        computed: false,
        optional,
        type_ann: ann(ty),
    })
}

/// `[name: string]: Type`. The name is only a label.
pub fn indexed(name: &str, ty: Box<TsType>) -> TsTypeElement {
    let param = BindingIdent {
        id: ident(name),
        type_ann: ann(keyword(TsKeywordTypeKind::TsStringKeyword)),
    };
    TsTypeElement::TsIndexSignature(TsIndexSignature {
        span: DUMMY_SP,
        params: vec![TsFnParam::Ident(param)],
        type_ann: ann(ty),
        readonly: false,
        is_static: false,
    })
}

/// `export type Name = Type;`, led by the comment attached to `span`.
pub fn export_alias(name: &str, ty: Box<TsType>, span: Span) -> ModuleItem {
    let decl = Decl::TsTypeAlias(Box::new(TsTypeAliasDecl {
        span: DUMMY_SP,
        declare: false,
        id: ident(name),
        type_params: None,
        type_ann: ty,
    }));
    ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(ExportDecl { span, decl }))
}

/// Prints `items` with two-space indentation.
pub fn print(items: Vec<ModuleItem>, docs: &JsDocs) -> Result<String, FormattingError> {
    let module = Module {
        span: DUMMY_SP,
        body: items,
        shebang: None,
    };

    let cm = Lrc::new(SourceMap::default());
    let mut out = Vec::new();
    let mut writer = JsWriter::new(cm.clone(), "\n", &mut out, None);
    writer.set_indent_str("  ");
    Emitter {
        cfg: Default::default(),
        cm,
        comments: Some(&docs.store),
        wr: writer,
    }
    .emit_module(&module)
    .map_err(|err| FormattingError::new("router declarations", err))?;

    let mut text =
        String::from_utf8(out).map_err(|err| FormattingError::new("router declarations", err))?;
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}
