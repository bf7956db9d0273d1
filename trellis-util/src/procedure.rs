use std::fmt::{self, Display, Formatter};

use http::Method;

use crate::error::Error;

/// Whether a procedure reads or changes state.
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

    /// Returns the kind of operation for an HTTP method: `GET`, `HEAD`,
    /// and `OPTIONS` are queries, and everything else is a mutation.
    pub fn for_method(method: &Method) -> Self {
        if *method == Method::GET || *method == Method::HEAD || *method == Method::OPTIONS {
            Self::Query
        } else {
            Self::Mutation
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A callable operation: the path below the base URL, the HTTP method,
/// and the operation kind.
///
/// Procedures correspond one-to-one with the leaves of a generated
/// `ApiRouter` type. Path segments are literal; callers substitute
/// parameter values before constructing a procedure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Procedure {
    segments: Vec<String>,
    method: Method,
    kind: OperationKind,
}

impl Procedure {
    /// Creates a procedure, deriving its kind from `method`.
    pub fn new<S: Into<String>>(method: Method, segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            kind: OperationKind::for_method(&method),
            method,
        }
    }

    /// Creates a `GET` query.
    pub fn query<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self::new(Method::GET, segments)
    }

    /// Maps a call path, like `["users", "42", "get", "query"]`, to a
    /// procedure.
    ///
    /// The last element is the operation kind, and the one before it
    /// is the lowercase HTTP method. Everything before those is the path.
    /// The kind must agree with the method.
    pub fn from_call_path<S: AsRef<str>>(path: &[S]) -> Result<Self, Error> {
        let bad_path = || {
            let path: Vec<_> = path.iter().map(AsRef::as_ref).collect();
            Error::BadCallPath(path.join("."))
        };
        let [segments @ .., method, kind] = path else {
            return Err(bad_path());
        };
        let method = match method.as_ref() {
            "get" => Method::GET,
            "post" => Method::POST,
            "put" => Method::PUT,
            "patch" => Method::PATCH,
            "delete" => Method::DELETE,
            "head" => Method::HEAD,
            "options" => Method::OPTIONS,
            _ => return Err(bad_path()),
        };
        let procedure = Self::new(method, segments.iter().map(|s| s.as_ref().to_owned()));
        match kind.as_ref() {
            "query" | "mutation" if kind.as_ref() == procedure.kind.as_str() => Ok(procedure),
            _ => Err(bad_path()),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}
