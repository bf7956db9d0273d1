use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::{
    error::{Error, JsonError},
    procedure::{OperationKind, Procedure},
    query::append_query,
};

/// A client for calling the procedures of one service.
#[derive(Clone, Debug)]
pub struct Client {
    client: reqwest::Client,
    headers: HeaderMap,
    base_url: Url,
}

impl Client {
    /// Create a new client.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, Error> {
        Ok(Self::with_reqwest_client(
            reqwest::Client::new(),
            base_url.as_ref().parse()?,
        ))
    }

    pub fn with_reqwest_client(client: reqwest::Client, base_url: Url) -> Self {
        Self {
            client,
            headers: HeaderMap::new(),
            base_url,
        }
    }

    /// Adds a header to each request.
    pub fn with_header<K, V>(mut self, name: K, value: V) -> Result<Self, Error>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: Into<http::Error>,
        V::Error: Into<http::Error>,
    {
        let name = name
            .try_into()
            .map_err(|err| Error::BadHeaderName(err.into()))?;
        let value = value
            .try_into()
            .map_err(|err| Error::BadHeaderValue(name.clone(), err.into()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a sensitive header to each request, like a password or a bearer token.
    /// Sensitive headers won't appear in `Debug` output, and may be treated specially
    /// by the underlying HTTP stack.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # fn main() -> Result<(), trellis_util::Error> {
    /// use trellis_util::{Client, http::header::AUTHORIZATION};
    ///
    /// let client = Client::new("https://api.example.com")?
    ///     .with_sensitive_header(AUTHORIZATION, "Bearer decafbadcafed00d")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_sensitive_header<K, V>(self, name: K, value: V) -> Result<Self, Error>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
        K::Error: Into<http::Error>,
        V::Error: Into<http::Error>,
    {
        let name = name
            .try_into()
            .map_err(|err| Error::BadHeaderName(err.into()))?;
        let mut value: HeaderValue = value
            .try_into()
            .map_err(|err| Error::BadHeaderValue(name.clone(), err.into()))?;
        value.set_sensitive(true);
        self.with_header(name, value)
    }

    pub fn with_user_agent<V>(self, value: V) -> Result<Self, Error>
    where
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        self.with_header(header::USER_AGENT, value)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the URL for a procedure: the base URL, followed by the
    /// procedure's path segments, and the serialized `query`, if any.
    pub fn url_for<Q: Serialize>(
        &self,
        procedure: &Procedure,
        query: Option<&Q>,
    ) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::UrlCannotBeABase)?
            .pop_if_empty()
            .extend(procedure.segments());
        if let Some(query) = query {
            append_query(&mut url, query)?;
        }
        Ok(url)
    }

    /// Calls a query procedure.
    pub async fn query<T, D, Q>(
        &self,
        procedure: &Procedure,
        input: &ProcedureInput<D, Q>,
    ) -> Result<ProcedureOutput<T>, Error>
    where
        T: DeserializeOwned,
        D: Serialize,
        Q: Serialize,
    {
        expect_kind(procedure, OperationKind::Query)?;
        self.call(procedure, input).await
    }

    /// Calls a mutation procedure.
    pub async fn mutate<T, D, Q>(
        &self,
        procedure: &Procedure,
        input: &ProcedureInput<D, Q>,
    ) -> Result<ProcedureOutput<T>, Error>
    where
        T: DeserializeOwned,
        D: Serialize,
        Q: Serialize,
    {
        expect_kind(procedure, OperationKind::Mutation)?;
        self.call(procedure, input).await
    }

    /// Calls a procedure of either kind.
    ///
    /// Only transport failures, and malformed JSON in a successful
    /// response, are errors. A non-2xx response resolves to an output
    /// with the parsed error body.
    pub async fn call<T, D, Q>(
        &self,
        procedure: &Procedure,
        input: &ProcedureInput<D, Q>,
    ) -> Result<ProcedureOutput<T>, Error>
    where
        T: DeserializeOwned,
        D: Serialize,
        Q: Serialize,
    {
        let url = self.url_for(procedure, input.query.as_ref())?;
        let mut request = self
            .client
            .request(procedure.method().clone(), url)
            .headers(self.headers.clone())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(data) = &input.data
            && *procedure.method() != Method::GET
        {
            let body = serde_json::to_vec(data).map_err(JsonError::from)?;
            request = request.body(body);
        }

        let response = request.send().await?;
        let meta = ResponseMeta {
            status: response.status(),
            headers: response.headers().clone(),
            url: response.url().clone(),
        };
        let body = response.bytes().await?;

        if meta.status.is_success() {
            // An empty body is a `null` result.
            let body: &[u8] = match body.trim_ascii() {
                [] => b"null",
                _ => &body,
            };
            let data = deserialize(body)?;
            Ok(ProcedureOutput {
                response: meta,
                data: Some(data),
                error: None,
            })
        } else {
            // The error body is informational; a body that isn't JSON
            // is kept as a string, and an empty one is dropped.
            let error = match serde_json::from_slice::<Value>(&body) {
                Ok(error) => Some(error),
                Err(_) if body.trim_ascii().is_empty() => None,
                Err(_) => Some(Value::String(String::from_utf8_lossy(&body).into_owned())),
            };
            Ok(ProcedureOutput {
                response: meta,
                data: None,
                error,
            })
        }
    }
}

fn deserialize<T: DeserializeOwned>(body: &[u8]) -> Result<T, JsonError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    let value = serde_path_to_error::deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

fn expect_kind(procedure: &Procedure, expected: OperationKind) -> Result<(), Error> {
    match procedure.kind() {
        actual if actual == expected => Ok(()),
        actual => Err(Error::KindMismatch { expected, actual }),
    }
}

/// The single argument to a procedure call.
///
/// `data` is sent as the JSON request body, except for `GET` requests;
/// `query` is sent as URL query parameters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcedureInput<D = Value, Q = Value> {
    pub data: Option<D>,
    pub query: Option<Q>,
}

impl ProcedureInput {
    /// An input with neither a body nor query parameters.
    pub fn empty() -> Self {
        Self {
            data: None,
            query: None,
        }
    }
}

impl<D> ProcedureInput<D> {
    pub fn with_data(data: D) -> Self {
        Self {
            data: Some(data),
            query: None,
        }
    }
}

impl<Q> ProcedureInput<Value, Q> {
    pub fn with_query(query: Q) -> Self {
        Self {
            data: None,
            query: Some(query),
        }
    }
}

impl<D, Q> ProcedureInput<D, Q> {
    pub fn and_data<E>(self, data: E) -> ProcedureInput<E, Q> {
        ProcedureInput {
            data: Some(data),
            query: self.query,
        }
    }

    pub fn and_query<R>(self, query: R) -> ProcedureInput<D, R> {
        ProcedureInput {
            data: self.data,
            query: Some(query),
        }
    }
}

/// The result of a procedure call.
///
/// Exactly one of `data` and `error` is set for a response with a body:
/// `data` for a 2xx response, and `error` otherwise.
#[derive(Clone, Debug)]
pub struct ProcedureOutput<T, E = Value> {
    pub response: ResponseMeta,
    pub data: Option<T>,
    pub error: Option<E>,
}

impl<T, E> ProcedureOutput<T, E> {
    pub fn is_success(&self) -> bool {
        self.response.status.is_success()
    }
}

/// The parts of the raw response that outlive its body.
#[derive(Clone, Debug)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
}
