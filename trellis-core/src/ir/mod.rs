mod resolve;
mod router;
mod spec;
mod types;

#[cfg(test)]
mod tests;

pub use resolve::{PrimitiveType, ReferenceIndex, SchemaNode, resolve_type};
pub use router::{
    OperationKind, Procedure, RouterBranch, RouterEntry, RouterRecord, RouterTree, SegmentKey,
};
pub use spec::{IrDeclaration, IrSpec};
pub use types::*;
