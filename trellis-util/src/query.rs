//! Query string serialization for procedure inputs.
//!
//! A procedure's `query` part is any [`Serialize`] type that serializes
//! as a map. Each field becomes one or more `application/x-www-form-urlencoded`
//! pairs:
//!
//! * Strings are written as-is.
//! * Numbers and booleans are written in their display form.
//! * Arrays repeat the key once per element.
//! * Nested objects are written as JSON text.
//! * `null` fields are omitted.
//!
//! # Examples
//!
//! ```
//! use serde::Serialize;
//! use url::Url;
//! use trellis_util::query::append_query;
//! # use trellis_util::query::QueryParamError;
//!
//! # fn main() -> Result<(), QueryParamError> {
//! #[derive(Serialize)]
//! struct Search<'a> {
//!     kind: &'a [&'a str],
//!     limit: u32,
//!     cursor: Option<&'a str>,
//! }
//!
//! let mut url = Url::parse("https://api.example.com/pets").unwrap();
//! append_query(
//!     &mut url,
//!     &Search {
//!         kind: &["dog", "cat"],
//!         limit: 10,
//!         cursor: None,
//!     },
//! )?;
//! assert_eq!(url.as_str(), "https://api.example.com/pets?kind=dog&kind=cat&limit=10");
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Serializes `query` and appends its pairs to the URL.
///
/// Leaves the URL untouched when there are no pairs to append,
/// so an empty query never adds a trailing `?`.
pub fn append_query<Q: Serialize + ?Sized>(
    url: &mut Url,
    query: &Q,
) -> Result<(), QueryParamError> {
    let pairs = query_pairs(query)?;
    if !pairs.is_empty() {
        url.query_pairs_mut().extend_pairs(&pairs);
    }
    Ok(())
}

/// Serializes `query` into an ordered list of key-value pairs.
pub fn query_pairs<Q: Serialize + ?Sized>(
    query: &Q,
) -> Result<Vec<(String, String)>, QueryParamError> {
    let fields = match serde_json::to_value(query)? {
        Value::Object(fields) => fields,
        Value::Null => return Ok(vec![]),
        other => return Err(QueryParamError::NotAMap(kind_of(&other))),
    };
    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            value => {
                if let Some(text) = scalar_text(value) {
                    pairs.push((key, text));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_text(value: Value) -> Option<String> {
    Some(match value {
        Value::Null => return None,
        Value::String(s) => s,
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Nested arrays and objects don't have a form encoding.
        value @ (Value::Array(_) | Value::Object(_)) => value.to_string(),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// An error that occurs during query parameter serialization.
#[derive(Debug, thiserror::Error)]
pub enum QueryParamError {
    #[error("query parameters must serialize as a map, not a {0}")]
    NotAMap(&'static str),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}
