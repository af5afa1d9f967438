use std::error::Error;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

/// Maximum number of body bytes shown when displaying a boundary error.
pub const BODY_MAX_LENGTH: usize = 1024;

/// The cause of a failure: a message, and the original error when there is one.
///
/// Two causes are equal when their messages are.
#[derive(Clone)]
pub struct ErrorCause {
    message: String,
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl ErrorCause {
    /// A cause without underlying error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// A cause keeping the original error attached.
    pub fn from_error<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            message: error.to_string(),
            source: Some(Arc::new(error)),
        }
    }

    /// The cause message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The original error, if any.
    pub fn original(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

impl Debug for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ErrorCause").field(&self.message).finish()
    }
}

impl Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for ErrorCause {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn Error + 'static))
    }
}

impl PartialEq for ErrorCause {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
    }
}

impl Eq for ErrorCause {}

impl From<crate::decode::DecodeFailure> for ErrorCause {
    fn from(failure: crate::decode::DecodeFailure) -> Self {
        Self::from_error(failure)
    }
}

/// What kind of transport failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum TransportErrorKind {
    /// The connection could not be established.
    #[display("connect")]
    Connect,
    /// The call took longer than its timeout.
    #[display("timeout")]
    Timeout,
    /// The call was cancelled by the caller.
    #[display("cancelled")]
    Cancelled,
    /// The request could not be built, so it was never sent.
    #[display("invalid request")]
    InvalidRequest,
    /// The response body could not be read.
    #[display("body")]
    Body,
    /// Any other I/O failure.
    #[display("other")]
    Other,
}

/// A failure before a complete response was received.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("Transport error ({kind}): {cause}")]
pub struct TransportError {
    kind: TransportErrorKind,
    #[error(source)]
    cause: ErrorCause,
}

impl TransportError {
    /// A transport error of some kind.
    pub fn new(kind: TransportErrorKind, cause: ErrorCause) -> Self {
        Self { kind, cause }
    }

    /// The call was cancelled.
    pub fn cancelled() -> Self {
        Self::new(
            TransportErrorKind::Cancelled,
            ErrorCause::new("call cancelled"),
        )
    }

    /// The call timed out.
    pub fn timeout(error: tokio::time::error::Elapsed) -> Self {
        Self::new(TransportErrorKind::Timeout, ErrorCause::from_error(error))
    }

    /// The request could not be built.
    pub fn invalid_request<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::new(
            TransportErrorKind::InvalidRequest,
            ErrorCause::from_error(error),
        )
    }

    /// The failure kind.
    pub fn kind(&self) -> TransportErrorKind {
        self.kind
    }

    /// The failure cause.
    pub fn cause(&self) -> &ErrorCause {
        &self.cause
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() {
            TransportErrorKind::Timeout
        } else if error.is_connect() {
            TransportErrorKind::Connect
        } else if error.is_body() || error.is_decode() {
            TransportErrorKind::Body
        } else if error.is_builder() {
            TransportErrorKind::InvalidRequest
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, ErrorCause::from_error(error))
    }
}

/// A protocol-boundary failure: the response (or its absence) does not match
/// what the schema declares.
///
/// Variants are listed in classification order. When several conditions hold,
/// the first one wins.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum BoundaryError {
    /// No response was received.
    #[display("{_0}")]
    Transport(TransportError),

    /// The status code is not declared for the operation.
    #[display("Unexpected status {status}{}", BodyExcerpt(raw_body.as_str()))]
    #[from(skip)]
    UnexpectedStatus {
        /// The received status code.
        status: u16,
        /// The raw body text.
        raw_body: String,
    },

    /// The content type is not declared for the status.
    #[display(
        "Unexpected content type '{actual}' for status {status}, expected one of {expected:?}{}",
        BodyExcerpt(raw_body.as_str())
    )]
    #[from(skip)]
    UnexpectedContentType {
        /// The received status code.
        status: u16,
        /// The declared content types, `"none"` when no body is allowed.
        expected: Vec<String>,
        /// The received content type, `"none"` when missing.
        actual: String,
        /// The raw body text.
        raw_body: String,
    },

    /// The body cannot be parsed according to its content type.
    #[display("Cannot parse {content_type} body for status {status}: {cause}{}", BodyExcerpt(raw_body.as_str()))]
    #[from(skip)]
    Parse {
        /// The received status code.
        status: u16,
        /// The matched content type.
        content_type: String,
        /// The parse failure.
        #[error(source)]
        cause: ErrorCause,
        /// The raw body text.
        raw_body: String,
    },

    /// The decoder rejected the parsed body.
    #[display("Cannot decode {content_type} body for status {status}: {cause}{}", BodyExcerpt(raw_body.as_str()))]
    #[from(skip)]
    Decode {
        /// The received status code.
        status: u16,
        /// The matched content type.
        content_type: String,
        /// The decoder failure.
        #[error(source)]
        cause: ErrorCause,
        /// The raw body text.
        raw_body: String,
    },
}

impl BoundaryError {
    /// The received status code, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(_) => None,
            Self::UnexpectedStatus { status, .. }
            | Self::UnexpectedContentType { status, .. }
            | Self::Parse { status, .. }
            | Self::Decode { status, .. } => Some(*status),
        }
    }

    /// The raw body text, if a response was received.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Transport(_) => None,
            Self::UnexpectedStatus { raw_body, .. }
            | Self::UnexpectedContentType { raw_body, .. }
            | Self::Parse { raw_body, .. }
            | Self::Decode { raw_body, .. } => Some(raw_body),
        }
    }
}

struct BodyExcerpt<'a>(&'a str);

impl Display for BodyExcerpt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.0;
        if body.is_empty() {
            return Ok(());
        }
        if body.len() <= BODY_MAX_LENGTH {
            return write!(f, "\n{body}");
        }
        let mut end = BODY_MAX_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        let excerpt = body.get(..end).unwrap_or_default();
        write!(f, "\n{excerpt}... ({} bytes)", body.len())
    }
}
