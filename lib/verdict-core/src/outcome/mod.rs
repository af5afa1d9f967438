//! The result of a call: exactly one [`Outcome`] per response (or per failure
//! to get one).

use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

mod error;
mod handlers;

pub use self::error::{
    BODY_MAX_LENGTH, BoundaryError, ErrorCause, TransportError, TransportErrorKind,
};
pub use self::handlers::{OutcomeHandlers, OutcomeTag, TagMismatch, UnhandledTag};

/// A response body, as accepted by its decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// The status declares no body.
    Empty,
    /// The parsed body.
    Value(Value),
}

/// A response matching the schema.
///
/// Besides the structured body, a response may carry the typed value produced
/// by its decoder, see [`typed`](Self::typed).
/// Equality ignores the typed value.
#[derive(Clone)]
pub struct Response {
    status: u16,
    content_type: String,
    body: Body,
    typed: Option<Arc<dyn Any + Send + Sync>>,
}

impl Response {
    /// A response without typed value.
    pub fn new(status: u16, content_type: impl Into<String>, body: Body) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body,
            typed: None,
        }
    }

    pub(crate) fn with_typed(mut self, typed: Option<Arc<dyn Any + Send + Sync>>) -> Self {
        self.typed = typed;
        self
    }

    /// The status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// The matched media type essence, or `"none"` for a response without body.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// The body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// The structured body, if any.
    pub fn value(&self) -> Option<&Value> {
        match &self.body {
            Body::Empty => None,
            Body::Value(value) => Some(value),
        }
    }

    /// The typed value attached by the decoder, if it has type `T`.
    ///
    /// ```rust
    /// # use http::{HeaderMap, Method, header::CONTENT_TYPE};
    /// # use verdict_core::{Decoder, Operation, RawResponse};
    /// let operation = Operation::builder("count", Method::GET, "/count")
    ///     .response(200, "application/json", Decoder::json::<u64>())
    ///     .build()?;
    /// # let mut headers = HeaderMap::new();
    /// # headers.insert(CONTENT_TYPE, "application/json".parse()?);
    /// # let raw = RawResponse::new(200, headers, "42");
    /// let outcome = operation.classify(&raw);
    ///
    /// let response = outcome.response().expect("a response");
    /// assert_eq!(response.typed::<u64>(), Some(&42));
    /// assert_eq!(response.typed::<String>(), None);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn typed<T>(&self) -> Option<&T>
    where
        T: Any,
    {
        self.typed.as_deref()?.downcast_ref::<T>()
    }

    /// Deserializes the structured body into `T`.
    ///
    /// A response without body deserializes from `null`.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the body does not fit `T`.
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned,
    {
        match &self.body {
            Body::Empty => T::deserialize(&Value::Null),
            Body::Value(value) => T::deserialize(value),
        }
    }
}

impl Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("content_type", &self.content_type)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.content_type == other.content_type
            && self.body == other.body
    }
}

impl Eq for Response {}

/// The classification of a call.
///
/// Every call produces exactly one outcome:
/// - [`Success`](Self::Success) for a declared `2xx` response,
/// - [`HttpError`](Self::HttpError) for any other declared response,
/// - [`Boundary`](Self::Boundary) when the response, or its absence, does not
///   match the schema.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From)]
pub enum Outcome {
    /// A declared `2xx` response.
    #[from(skip)]
    Success(Response),
    /// A declared response outside `2xx`.
    #[from(skip)]
    HttpError(Response),
    /// A protocol-boundary failure.
    Boundary(BoundaryError),
}

impl Outcome {
    /// Tags a matching response by its status range.
    pub(crate) fn from_response(response: Response) -> Self {
        if (200..300).contains(&response.status) {
            Self::Success(response)
        } else {
            Self::HttpError(response)
        }
    }

    /// The outcome tag.
    pub fn tag(&self) -> OutcomeTag {
        match self {
            Self::Success(response) => OutcomeTag::Success(response.status),
            Self::HttpError(response) => OutcomeTag::HttpError(response.status),
            Self::Boundary(error) => OutcomeTag::from(error),
        }
    }

    /// The received status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success(response) | Self::HttpError(response) => Some(response.status),
            Self::Boundary(error) => error.status(),
        }
    }

    /// Whether this is a [`Success`](Self::Success).
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The response of a success or HTTP error.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Success(response) | Self::HttpError(response) => Some(response),
            Self::Boundary(_) => None,
        }
    }

    /// The boundary error, if any.
    pub fn boundary(&self) -> Option<&BoundaryError> {
        match self {
            Self::Boundary(error) => Some(error),
            Self::Success(_) | Self::HttpError(_) => None,
        }
    }

    /// Keeps the success response, anything else is an error.
    ///
    /// # Errors
    ///
    /// Returns an [`OutcomeFailure`] for an HTTP error or a boundary error.
    pub fn into_result(self) -> Result<Response, OutcomeFailure> {
        match self {
            Self::Success(response) => Ok(response),
            Self::HttpError(response) => Err(OutcomeFailure::HttpError(response)),
            Self::Boundary(error) => Err(OutcomeFailure::Boundary(error)),
        }
    }
}

impl From<TransportError> for Outcome {
    fn from(error: TransportError) -> Self {
        Self::Boundary(BoundaryError::Transport(error))
    }
}

/// A non-success outcome, as an error.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum OutcomeFailure {
    /// A declared response outside `2xx`.
    #[display("HTTP error {}: {:?}", _0.status(), _0.body())]
    #[from(skip)]
    HttpError(#[error(not(source))] Response),

    /// A protocol-boundary failure.
    #[display("{_0}")]
    Boundary(BoundaryError),
}
