use std::{
    borrow::Cow,
    fmt::{self, Formatter},
};

use indexmap::IndexMap;
use itertools::Itertools;
use serde::{
    Deserialize, Deserializer,
    de::{self, MapAccess, Visitor, value::MapAccessDeserializer},
};

use crate::error::SerdeError;

/// The only media type whose schemas contribute to generated types.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// An OpenAPI document.
#[derive(Debug, Deserialize)]
pub struct Document {
    pub openapi: String,
    #[serde(default)]
    pub info: Option<Info>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Option<Components>,
}

impl Document {
    /// Parses an OpenAPI document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SerdeError> {
        let deserializer = &mut serde_json::Deserializer::from_str(json);
        let result = serde_path_to_error::deserialize(deserializer)?;
        Ok(result)
    }

    /// Parses an OpenAPI document from a YAML or JSON string.
    pub fn from_yaml(yaml: &str) -> Result<Self, SerdeError> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml);
        let result = serde_path_to_error::deserialize(deserializer)?;
        Ok(result)
    }

    /// Converts an already-parsed JSON value into a document.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, SerdeError> {
        let result = serde_path_to_error::deserialize(value)?;
        Ok(result)
    }

    /// Returns the named component schemas, in declaration order.
    pub fn schemas(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.components
            .iter()
            .flat_map(|components| &components.schemas)
            .map(|(name, schema)| (name.as_str(), schema))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: String,
}

/// Operation definitions for a single path.
#[derive(Debug, Default, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,
    #[serde(default)]
    pub post: Option<Operation>,
    #[serde(default)]
    pub put: Option<Operation>,
    #[serde(default)]
    pub patch: Option<Operation>,
    #[serde(default)]
    pub delete: Option<Operation>,
    #[serde(default)]
    pub head: Option<Operation>,
    #[serde(default)]
    pub options: Option<Operation>,
}

impl PathItem {
    /// Yields all operations and their HTTP methods, in a fixed order:
    /// `get`, `post`, `put`, `patch`, `delete`, `head`, `options`.
    pub fn operations(&self) -> impl Iterator<Item = (Method, &Operation)> {
        [
            (Method::Get, self.get.as_ref()),
            (Method::Post, self.post.as_ref()),
            (Method::Put, self.put.as_ref()),
            (Method::Patch, self.patch.as_ref()),
            (Method::Delete, self.delete.as_ref()),
            (Method::Head, self.head.as_ref()),
            (Method::Options, self.options.as_ref()),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.map(|o| (method, o)))
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
        }
    }

    /// Returns `true` for methods that only read state.
    pub fn is_safe(self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Options)
    }
}

/// An HTTP operation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
    #[serde(default)]
    pub request_body: Option<RefOr<RequestBody>>,
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,
}

impl Operation {
    /// Yields the inline `in: query` parameters, skipping references.
    pub fn query_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter_map(RefOr::item)
            .filter(|param| param.location == ParameterLocation::Query)
    }

    /// Returns the `application/json` request body, if the operation
    /// declares one inline.
    pub fn json_request(&self) -> Option<&MediaType> {
        self.request_body
            .as_ref()
            .and_then(RefOr::item)?
            .content
            .get(JSON_MEDIA_TYPE)
    }

    /// Yields the `application/json` contents of all 2xx responses,
    /// in declaration order.
    pub fn json_success_responses(&self) -> impl Iterator<Item = &MediaType> {
        self.responses
            .iter()
            .filter(|(status, _)| status.starts_with('2'))
            .filter_map(|(_, response)| response.item()?.content.get(JSON_MEDIA_TYPE))
    }
}

/// Either a `$ref` to a reusable component, or an inline definition.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    Ref(Reference),
    Item(T),
}

impl<T> RefOr<T> {
    /// Returns the inline definition. Only component schemas are
    /// resolved by name, so other references yield `None`.
    pub fn item(&self) -> Option<&T> {
        match self {
            Self::Ref(_) => None,
            Self::Item(item) => Some(item),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub path: String,
}

/// A path, query, header, or cookie parameter.
#[derive(Clone, Debug, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub schema: Option<Schema>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    #[serde(other)]
    Other,
}

/// Request body definition.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Response definition.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content. Wraps the schema of a body.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<Schema>,
}

/// Components section containing reusable schemas.
#[derive(Debug, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Ty {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Null,
    #[serde(other)]
    Other,
}

/// An OpenAPI schema definition, or a `$ref` to one.
///
/// Every keyword is optional, so any object deserializes; classification
/// into a [`SchemaNode`](crate::ir::SchemaNode) happens later.
/// A boolean schema, like `true`, has no keywords at all.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "deserialize_type")]
    pub ty: Vec<Ty>,
    #[serde(default)]
    pub description: Option<String>,

    // Object properties.
    #[serde(default)]
    pub properties: Option<IndexMap<String, Schema>>,
    #[serde(default)]
    pub required: Vec<String>,

    // Enum variants.
    #[serde(rename = "enum", default)]
    pub variants: Option<Vec<serde_json::Value>>,

    // Composition.
    #[serde(default)]
    pub one_of: Option<Vec<Schema>>,
}

impl Schema {
    /// Returns the sole `type`, or `None` if the schema declares
    /// no type, or an OpenAPI 3.1-style list of several.
    pub fn single_type(&self) -> Option<Ty> {
        match &*self.ty {
            &[ty] => Some(ty),
            _ => None,
        }
    }

    /// Returns the component name if this schema is a reference of the
    /// form `#/components/schemas/{name}`.
    pub fn ref_name(&self) -> Option<Cow<'_, str>> {
        parse_schema_ref(self.reference.as_deref()?)
    }
}

/// Extracts the component name from a `#/components/schemas/{name}`
/// reference, unescaping JSON Pointer tokens.
pub fn parse_schema_ref(reference: &str) -> Option<Cow<'_, str>> {
    // A makeshift JSON Schema reference parser (<URI> # <JSON-Pointer>)
    // that only understands keys under `/components/schemas` in the
    // current document.
    let pointer = reference.trim().strip_prefix('#')?;
    if !pointer.starts_with('/') {
        return None;
    }
    let mut parts = pointer.split('/').skip(1);
    let Some(["components", "schemas", name]) = parts.next_array() else {
        return None;
    };
    if parts.next().is_some() || name.is_empty() {
        return None;
    }
    Some(if name.contains('~') {
        Cow::Owned(name.replace("~1", "/").replace("~0", "~"))
    } else {
        Cow::Borrowed(name)
    })
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = Schema;

            fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
                f.write_str("a schema object or a boolean")
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
                Ok(Schema::default())
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                Schema::deserialize(MapAccessDeserializer::new(map))
            }
        }

        deserializer.deserialize_any(SchemaVisitor)
    }
}

fn deserialize_type<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Ty>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TypesOr {
        /// An OpenAPI 3.1-style `type` array.
        Types(Vec<Ty>),
        /// A single `type`.
        Type(Ty),
    }
    Ok(match TypesOr::deserialize(deserializer)? {
        TypesOr::Types(types) => types,
        TypesOr::Type(ty) => vec![ty],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_schema_ref_name() {
        assert_eq!(
            parse_schema_ref("#/components/schemas/User").as_deref(),
            Some("User")
        );
        assert_eq!(
            parse_schema_ref("#/components/schemas/a~1b~0c").as_deref(),
            Some("a/b~c")
        );
    }

    #[test]
    fn test_rejects_refs_outside_component_schemas() {
        assert_eq!(parse_schema_ref("#/components/parameters/Limit"), None);
        assert_eq!(parse_schema_ref("#/components/schemas/User/properties/id"), None);
        assert_eq!(parse_schema_ref("other.json#/components/schemas/User"), None);
        assert_eq!(parse_schema_ref("#/components/schemas/"), None);
    }

    #[test]
    fn test_operations_follow_method_order() {
        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: 3.1.0
            paths:
              /pets:
                options: {}
                delete: {}
                get: {}
                head: {}
                post: {}
        "})
        .unwrap();

        let methods = doc.paths["/pets"]
            .operations()
            .map(|(method, _)| method)
            .collect_vec();
        assert_eq!(
            methods,
            [
                Method::Get,
                Method::Post,
                Method::Delete,
                Method::Head,
                Method::Options
            ]
        );
    }

    #[test]
    fn test_type_list_and_unknown_types() {
        let doc = Document::from_json(
            r#"{
                "openapi": "3.1.0",
                "components": {
                    "schemas": {
                        "Maybe": { "type": ["string", "null"] },
                        "Upload": { "type": "file" }
                    }
                }
            }"#,
        )
        .unwrap();

        let schemas = doc.schemas().collect_vec();
        assert_eq!(schemas[0].1.ty, [Ty::String, Ty::Null]);
        assert_eq!(schemas[0].1.single_type(), None);
        assert_eq!(schemas[1].1.single_type(), Some(Ty::Other));
    }

    #[test]
    fn test_referenced_parameters_are_skipped() {
        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: 3.1.0
            paths:
              /pets:
                get:
                  parameters:
                    - $ref: '#/components/parameters/Limit'
                    - name: kind
                      in: query
                      schema:
                        type: string
                    - name: X-Trace
                      in: header
                      schema:
                        type: string
        "})
        .unwrap();

        let op = doc.paths["/pets"].get.as_ref().unwrap();
        let names = op.query_parameters().map(|p| p.name.as_str()).collect_vec();
        assert_eq!(names, ["kind"]);
    }

    #[test]
    fn test_success_responses_only_json() {
        let doc = Document::from_yaml(indoc::indoc! {"
            openapi: 3.1.0
            paths:
              /pets:
                get:
                  responses:
                    '200':
                      content:
                        application/json:
                          schema:
                            type: string
                    '204':
                      description: No content
                    2XX:
                      content:
                        text/plain:
                          schema:
                            type: string
                    '404':
                      content:
                        application/json:
                          schema:
                            type: object
        "})
        .unwrap();

        let op = doc.paths["/pets"].get.as_ref().unwrap();
        assert_eq!(op.json_success_responses().count(), 1);
    }
}
