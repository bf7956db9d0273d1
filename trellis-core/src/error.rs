use std::path::PathBuf;

use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SerdeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    JsonWithPath(#[from] serde_path_to_error::Error<serde_json::Error>),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    YamlWithPath(#[from] serde_path_to_error::Error<serde_yaml::Error>),
}

/// The OpenAPI document couldn't be read from its source.
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum SchemaFetchError {
    #[error("failed to fetch `{url}`")]
    #[diagnostic(code(trellis::fetch))]
    Request {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
    #[error("`{url}` responded with {status}")]
    #[diagnostic(code(trellis::fetch))]
    Status { url: Url, status: reqwest::StatusCode },
    #[error("failed to read `{}`", path.display())]
    #[diagnostic(code(trellis::read))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The document was read, but isn't a usable OpenAPI 3.1 document.
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum InvalidSchemaError {
    #[error("document isn't valid JSON or YAML")]
    #[diagnostic(code(trellis::invalid_schema))]
    Syntax(#[source] SerdeError),
    #[error("invalid OpenAPI document: missing `openapi` version field")]
    #[diagnostic(code(trellis::invalid_schema))]
    MissingVersion,
    #[error("only OpenAPI 3.1 is supported, received {0}")]
    #[diagnostic(
        code(trellis::unsupported_version),
        help("convert the document to OpenAPI 3.1 before generating types")
    )]
    UnsupportedVersion(String),
    #[error("document doesn't match the OpenAPI structure")]
    #[diagnostic(code(trellis::invalid_schema))]
    Structure(#[source] SerdeError),
}

/// Any failure to produce a [`LoadedDocument`](crate::load::LoadedDocument).
#[derive(Debug, miette::Diagnostic, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] SchemaFetchError),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Invalid(#[from] InvalidSchemaError),
}
