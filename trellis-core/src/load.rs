//! Reads OpenAPI documents from files and URLs.

use std::{
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::{
    error::{InvalidSchemaError, LoadError, SchemaFetchError},
    parse::Document,
};

/// Where to read a document from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchemaLocator {
    Url(Url),
    File(PathBuf),
}

impl SchemaLocator {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl FromStr for SchemaLocator {
    type Err = url::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http://") || s.starts_with("https://") {
            Ok(Self::Url(s.parse()?))
        } else {
            Ok(Self::File(s.into()))
        }
    }
}

impl Display for SchemaLocator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => url.fmt(f),
            Self::File(path) => path.display().fmt(f),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// A parsed document, and the raw value it was parsed from.
///
/// The raw value is what's compared to detect an unchanged schema.
#[derive(Debug)]
pub struct LoadedDocument {
    pub raw: Value,
    pub doc: Document,
}

impl LoadedDocument {
    pub fn parse(source: &str, format: SourceFormat) -> Result<Self, InvalidSchemaError> {
        let raw = match format {
            SourceFormat::Json => serde_json::from_str(source)
                .map_err(|err| InvalidSchemaError::Syntax(err.into()))?,
            SourceFormat::Yaml => serde_yaml::from_str(source)
                .map_err(|err| InvalidSchemaError::Syntax(err.into()))?,
        };
        Self::from_value(raw)
    }

    /// Checks the declared version, then deserializes the document.
    pub fn from_value(mut raw: Value) -> Result<Self, InvalidSchemaError> {
        // YAML reads an unquoted `openapi: 3.1` as a number.
        if let Some(version) = raw.get_mut("openapi").filter(|version| version.is_number()) {
            *version = Value::String(version.to_string());
        }
        check_version(&raw)?;
        if raw.get("paths").is_none() {
            tracing::warn!("document has no `paths`; the router will be empty");
        }
        let doc = Document::from_value(&raw).map_err(InvalidSchemaError::Structure)?;
        Ok(Self { raw, doc })
    }
}

/// Accepts any `3.1.x` version. Each component is read up to its first
/// non-digit, so `3.1.0-rc1` is accepted.
fn check_version(raw: &Value) -> Result<(), InvalidSchemaError> {
    let version = raw
        .get("openapi")
        .and_then(Value::as_str)
        .filter(|version| !version.is_empty())
        .ok_or(InvalidSchemaError::MissingVersion)?;

    let mut parts = version.split('.').map(|part| {
        let digits = part
            .find(|c: char| !c.is_ascii_digit())
            .map_or(part, |end| &part[..end]);
        digits.parse::<u64>().ok()
    });
    match (parts.next().flatten(), parts.next().flatten()) {
        (Some(3), Some(1)) => Ok(()),
        _ => Err(InvalidSchemaError::UnsupportedVersion(version.to_owned())),
    }
}

/// Loads documents, and remembers the last one that was generated.
///
/// The remembered snapshot is a single slot. The caller decides when to
/// replace it, after a cycle succeeds, and must not run cycles
/// concurrently.
#[derive(Debug, Default)]
pub struct DocumentLoader {
    client: reqwest::Client,
    last: Option<Value>,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an existing HTTP client for fetching remote documents.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client, last: None }
    }

    pub async fn load(&self, locator: &SchemaLocator) -> Result<LoadedDocument, LoadError> {
        let (source, format) = match locator {
            SchemaLocator::Url(url) => self.fetch(url).await?,
            SchemaLocator::File(path) => read(path).await?,
        };
        tracing::debug!(%locator, bytes = source.len(), ?format, "read schema");
        Ok(LoadedDocument::parse(&source, format)?)
    }

    async fn fetch(&self, url: &Url) -> Result<(String, SourceFormat), SchemaFetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SchemaFetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SchemaFetchError::Status {
                url: url.clone(),
                status,
            });
        }

        let yaml_content = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("yaml"));
        let format = if yaml_content {
            SourceFormat::Yaml
        } else {
            SourceFormat::from_path(Path::new(url.path()))
        };

        let source = response
            .text()
            .await
            .map_err(|source| SchemaFetchError::Request {
                url: url.clone(),
                source,
            })?;
        Ok((source, format))
    }

    /// Returns `true` if `loaded` is deeply equal to the remembered
    /// snapshot.
    pub fn is_unchanged(&self, loaded: &LoadedDocument) -> bool {
        self.last.as_ref() == Some(&loaded.raw)
    }

    /// Replaces the remembered snapshot.
    pub fn remember(&mut self, raw: Value) {
        self.last = Some(raw);
    }

    /// Clears the remembered snapshot, so the next load is always
    /// treated as changed.
    pub fn forget(&mut self) {
        self.last = None;
    }
}

async fn read(path: &Path) -> Result<(String, SourceFormat), SchemaFetchError> {
    let source = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SchemaFetchError::Read {
            path: path.to_owned(),
            source,
        })?;
    Ok((source, SourceFormat::from_path(path)))
}
