use crate::procedure::OperationKind;

/// Transport-level error types.
///
/// A non-2xx response isn't an error: it resolves to a
/// [`ProcedureOutput`](crate::ProcedureOutput) with an `error` body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or connection error.
    #[error("Network error")]
    Network(#[from] reqwest::Error),

    /// Invalid JSON in the request, or in a successful response.
    #[error("Malformed JSON")]
    Json(#[from] JsonError),

    /// Invalid URL.
    #[error("Malformed URL")]
    Url(#[from] url::ParseError),

    /// URL can't be used as a base.
    #[error("Can't use URL as base URL")]
    UrlCannotBeABase,

    /// Invalid query parameters.
    #[error("Invalid query parameters")]
    QueryParam(#[from] crate::QueryParamError),

    /// Invalid HTTP header name.
    #[error("Invalid header name")]
    BadHeaderName(#[source] http::Error),

    /// Invalid HTTP header value.
    #[error("Invalid value for header `{0}`")]
    BadHeaderValue(http::HeaderName, #[source] http::Error),

    /// A call path that doesn't end in an HTTP method and an operation kind.
    #[error("Invalid call path `{0}`")]
    BadCallPath(String),

    /// A query was called as a mutation, or the other way around.
    #[error("Can't call a {actual} procedure as a {expected}")]
    KindMismatch {
        expected: OperationKind,
        actual: OperationKind,
    },
}

/// Invalid or unexpected JSON, with or without a path
/// to the unexpected section.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    JsonWithPath(#[from] serde_path_to_error::Error<serde_json::Error>),
}
