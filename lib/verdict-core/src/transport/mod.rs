//! Sending requests: the [`Transport`] seam and the call executor.
//!
//! The executor adds the per-call concerns on top of any transport:
//! a timeout, and cancellation through a [`CancellationToken`].
//! Every failure comes back as a [`TransportError`].

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, Method};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

use crate::outcome::TransportError;
use crate::schema::MediaType;

mod reqwest_transport;

pub use self::reqwest_transport::ReqwestTransport;

/// A fully built request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// The HTTP method.
    pub method: Method,
    /// The final URL, path and query resolved.
    pub url: Url,
    /// The request headers.
    pub headers: HeaderMap,
    /// The request body.
    pub body: Option<Bytes>,
}

/// A complete response, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl RawResponse {
    /// A raw response.
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The `Content-Type` media type, if present and valid.
    pub fn content_type(&self) -> Option<MediaType> {
        MediaType::from_headers(&self.headers)
    }
}

/// Sends requests and reads responses.
///
/// I/O failures must be returned as [`TransportError`], never as panics.
/// Implemented by [`ReqwestTransport`]; tests can plug their own.
pub trait Transport: std::fmt::Debug + Send + Sync + 'static {
    /// Sends the request and reads the whole response.
    fn execute(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// Sends a request through a transport, with optional timeout and cancellation.
///
/// An already cancelled token never sends the request, and cancelling while
/// in flight drops the pending request. Once the response is read,
/// cancellation has no effect.
///
/// # Errors
///
/// - [`TransportErrorKind::Cancelled`](crate::TransportErrorKind::Cancelled) when the token is cancelled
/// - [`TransportErrorKind::Timeout`](crate::TransportErrorKind::Timeout) when the timeout elapses
/// - any error of the transport itself
pub async fn execute<T>(
    transport: &T,
    request: TransportRequest,
    timeout: Option<Duration>,
    cancellation: Option<&CancellationToken>,
) -> Result<RawResponse, TransportError>
where
    T: Transport,
{
    debug!(?request, "sending...");
    let call = async {
        match timeout {
            Some(duration) => tokio::time::timeout(duration, transport.execute(request))
                .await
                .map_err(TransportError::timeout)?,
            None => transport.execute(request).await,
        }
    };

    let result = match cancellation {
        Some(token) if token.is_cancelled() => Err(TransportError::cancelled()),
        Some(token) => {
            // a response already received wins over a late cancellation
            tokio::select! {
                biased;
                result = call => result,
                () = token.cancelled() => Err(TransportError::cancelled()),
            }
        }
        None => call.await,
    };

    match &result {
        Ok(response) => debug!(status = response.status(), "...receiving"),
        Err(error) => debug!(%error, "...failed"),
    }
    result
}
