use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{ApiClientError, Authentication, CallBody, CallHeaders, CallPath, CallQuery};
use crate::client::{ParamValue, ParameterValue};
use crate::schema::Operation;
use crate::transport::{ReqwestTransport, Transport};

mod execution;

/// A call of one operation, configured then awaited.
///
/// Awaiting an `ApiCall` always yields an [`Outcome`](crate::Outcome):
/// invalid parameters, headers or bodies are reported as a transport error
/// of kind `InvalidRequest`, and the request is not sent.
///
/// # Method Groups
///
/// ## Parameters
/// - [`with_param(name, value)`](Self::with_param) - Set a path parameter
/// - [`with_query(query)`](Self::with_query) - Add query parameters
/// - [`with_query_param(name, value)`](Self::with_query_param) - Add a single query parameter
/// - [`with_headers(headers)`](Self::with_headers) - Add request headers
/// - [`with_header(name, value)`](Self::with_header) - Add a single header
///
/// ## Request Body
/// - [`json(data)`](Self::json), [`form(data)`](Self::form), [`text(content)`](Self::text),
///   [`raw(bytes, content_type)`](Self::raw), [`with_body(body)`](Self::with_body)
///
/// ## Execution
/// - [`with_timeout(duration)`](Self::with_timeout) - Override the client timeout
/// - [`with_cancellation(token)`](Self::with_cancellation) - Abort the call when the token is cancelled
/// - `.await` - Send the request and classify the response
#[derive(Debug)]
pub struct ApiCall<T: Transport = ReqwestTransport> {
    transport: Arc<T>,
    base_url: Url,
    operation: Arc<Operation>,
    path: CallPath,
    query: CallQuery,
    default_headers: HeaderMap,
    headers: CallHeaders,
    body: Option<CallBody>,
    authentication: Option<Authentication>,
    timeout: Option<Duration>,
    cancellation: Option<CancellationToken>,
    error: Option<ApiClientError>,
}

impl<T> ApiCall<T>
where
    T: Transport,
{
    pub(in crate::client) fn build(
        transport: Arc<T>,
        base_url: Url,
        operation: Arc<Operation>,
        default_headers: HeaderMap,
        authentication: Option<Authentication>,
        timeout: Option<Duration>,
    ) -> Self {
        let path = CallPath::from(operation.path());
        Self {
            transport,
            base_url,
            operation,
            path,
            query: CallQuery::default(),
            default_headers,
            headers: CallHeaders::default(),
            body: None,
            authentication,
            timeout,
            cancellation: None,
            error: None,
        }
    }

    /// The called operation.
    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    fn keep_error(&mut self, error: ApiClientError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

// Parameters
impl<T> ApiCall<T>
where
    T: Transport,
{
    /// Sets a path parameter of the operation template.
    ///
    /// Values are percent-encoded, only RFC 3986 unreserved characters are kept.
    pub fn with_param<P: ParameterValue>(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue<P>>,
    ) -> Self {
        self.path = self.path.add_param(name, value);
        self
    }

    /// Adds query parameters, replacing those with the same name.
    pub fn with_query(mut self, query: CallQuery) -> Self {
        self.query = self.query.merge(query);
        self
    }

    /// Adds a query parameter.
    pub fn with_query_param<P: ParameterValue>(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue<P>>,
    ) -> Self {
        self.query = self.query.add_param(name, value);
        self
    }

    /// Adds request headers, replacing those with the same name.
    pub fn with_headers(mut self, headers: CallHeaders) -> Self {
        self.headers = self.headers.merge(headers);
        self
    }

    /// Adds a request header.
    ///
    /// ```rust
    /// # use verdict_core::ApiClient;
    /// # fn example(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
    /// let call = client
    ///     .call("listUsers")?
    ///     .with_header("X-Request-ID", "abc-123")
    ///     .with_header("X-Page-Size", 50);
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_header<P: ParameterValue>(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue<P>>,
    ) -> Self {
        self.headers = self.headers.add_header(name, value);
        self
    }
}

// Body
impl<T> ApiCall<T>
where
    T: Transport,
{
    /// Sets the request body.
    pub fn with_body(mut self, body: CallBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a JSON body.
    ///
    /// A serialization failure is reported when the call is awaited.
    pub fn json<B>(mut self, data: &B) -> Self
    where
        B: serde::Serialize + ?Sized,
    {
        match CallBody::json(data) {
            Ok(body) => self.body = Some(body),
            Err(err) => self.keep_error(err),
        }
        self
    }

    /// Sets a form-encoded body.
    ///
    /// A serialization failure is reported when the call is awaited.
    pub fn form<B>(mut self, data: &B) -> Self
    where
        B: serde::Serialize + ?Sized,
    {
        match CallBody::form(data) {
            Ok(body) => self.body = Some(body),
            Err(err) => self.keep_error(err),
        }
        self
    }

    /// Sets a `text/plain` body.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.with_body(CallBody::text(text))
    }

    /// Sets a body with an arbitrary content type.
    pub fn raw(self, data: impl Into<Bytes>, content_type: headers::ContentType) -> Self {
        self.with_body(CallBody::raw(data, content_type))
    }
}

// Execution
impl<T> ApiCall<T>
where
    T: Transport,
{
    /// Sets a timeout for this call, replacing the client one.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Aborts the call when the token is cancelled.
    ///
    /// A token already cancelled prevents the request from being sent.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
