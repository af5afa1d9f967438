use crate::outcome::TransportError;
use crate::schema::SchemaError;

use super::AuthenticationError;

/// Errors raised while configuring a client or preparing a call.
///
/// Once a call is awaited these never escape: they become a
/// [`TransportError`] of kind `InvalidRequest` inside the outcome.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum ApiClientError {
    /// URL parsing error when building the request URL.
    UrlError(url::ParseError),

    /// HTTP protocol error from the http crate.
    HttpError(http::Error),

    /// Invalid HTTP header name.
    InvalidHeaderName(http::header::InvalidHeaderName),

    /// Invalid HTTP header value.
    InvalidHeaderValue(http::header::InvalidHeaderValue),

    /// JSON serialization error of a request body.
    JsonValueError(serde_json::Error),

    /// Query string serialization error.
    QuerySerializationError(serde_urlencoded::ser::Error),

    /// Credentials cannot be sent as a header.
    Authentication(AuthenticationError),

    /// The schema table is invalid.
    Schema(SchemaError),

    /// Invalid base path configuration.
    #[display("Invalid base path: {error}")]
    #[from(skip)]
    InvalidBasePath {
        /// Description of why the base path is invalid.
        error: String,
    },

    /// The schema has no operation with this id.
    #[display("Unknown operation: {operation}")]
    #[from(skip)]
    UnknownOperation {
        /// The requested operation id.
        operation: String,
    },

    /// Path template contains unresolved parameters.
    #[display("Path '{path}' is missing required arguments: {missings:?}")]
    #[from(skip)]
    PathUnresolved {
        /// The path, with the parameters that could be substituted.
        path: String,
        /// Names of the missing parameters.
        missings: Vec<String>,
    },

    /// Parameter value cannot be serialized with its style.
    #[display("Unsupported parameter value: {message}. Got: {value}")]
    #[from(skip)]
    UnsupportedParameterValue {
        /// What went wrong.
        message: String,
        /// The rejected value.
        value: serde_json::Value,
    },

    /// Data serialization failed.
    #[display("Serialization error: {message}")]
    #[from(skip)]
    SerializationError {
        /// Description of the serialization failure.
        message: String,
    },
}

impl From<ApiClientError> for TransportError {
    fn from(error: ApiClientError) -> Self {
        Self::invalid_request(error)
    }
}
