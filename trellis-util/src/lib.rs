//! Runtime support for calling services described by Trellis router
//! declarations.

pub mod client;
pub mod error;
pub mod procedure;
pub mod query;

pub use client::{Client, ProcedureInput, ProcedureOutput, ResponseMeta};
pub use error::{Error, JsonError};
pub use procedure::{OperationKind, Procedure};
pub use query::QueryParamError;

pub use http;
pub use reqwest;
pub use url;
