//! # Verdict Core
//!
//! A schema-driven HTTP client where every call ends in exactly one typed
//! [`Outcome`]: a success, an HTTP error declared by the schema, or a
//! boundary error telling which step of the response handling failed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use http::Method;
//! use serde::Deserialize;
//! use verdict_core::{ApiClient, Decoder, Operation, Outcome, SchemaTable};
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: u32,
//!     name: String,
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = SchemaTable::builder()
//!     .operation(
//!         Operation::builder("getUser", Method::GET, "/users/{id}")
//!             .response(200, "application/json", Decoder::json::<User>())
//!             .response(404, "application/problem+json", Decoder::any()),
//!     )
//!     .build()?;
//!
//! let client = ApiClient::builder()
//!     .with_base_url("http://localhost:3000")?
//!     .with_schema(schema)
//!     .build()?;
//!
//! match client.call("getUser")?.with_param("id", 42).await {
//!     Outcome::Success(response) => {
//!         let user = response.typed::<User>();
//!         println!("{user:?}");
//!     }
//!     Outcome::HttpError(response) => println!("HTTP {}", response.status()),
//!     Outcome::Boundary(error) => eprintln!("{error}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Classification
//!
//! A received response is checked step by step, the first failing step
//! decides the outcome:
//!
//! | Step | Failure |
//! |------|---------|
//! | status declared by the operation | [`BoundaryError::UnexpectedStatus`] |
//! | `Content-Type` declared for that status | [`BoundaryError::UnexpectedContentType`] |
//! | body parsed according to its media type | [`BoundaryError::Parse`] |
//! | body accepted by the registered [`Decoder`] | [`BoundaryError::Decode`] |
//!
//! A response that passes every step is a [`Outcome::Success`] for `2xx`
//! statuses and an [`Outcome::HttpError`] otherwise. Failures before a
//! complete response exists (connection, timeout, cancellation, invalid
//! request) are [`BoundaryError::Transport`].
//!
//! Classification is available on its own with [`classify`] or
//! [`Operation::classify`].
//!
//! ## Handling outcomes
//!
//! [`OutcomeHandlers`] maps each [`OutcomeTag`] to a handler, and checks the
//! handled tags against those a schema can produce.
//!
//! ## Working with Parameters
//!
//! ```rust
//! use verdict_core::{ApiClient, CallHeaders, CallQuery, ParamStyle, ParamValue};
//!
//! # async fn example(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
//! let query = CallQuery::new()
//!     .add_param("page", 1)
//!     .add_param("tags", ParamValue::with_style(vec!["rust", "web"], ParamStyle::PipeDelimited));
//!
//! let headers = CallHeaders::new().add_header("X-Request-ID", "abc-123");
//!
//! let outcome = client
//!     .call("listPosts")?
//!     .with_param("user_id", ParamValue::with_style(42, ParamStyle::Label))
//!     .with_query(query)
//!     .with_headers(headers)
//!     .await;
//! # let _ = outcome;
//! # Ok(())
//! # }
//! ```

mod classify;
mod client;
mod decode;
mod outcome;
mod schema;
mod transport;

pub use self::classify::classify;

pub use self::client::{
    ApiCall, ApiClient, ApiClientBuilder, ApiClientError, Authentication, AuthenticationError,
    CallBody, CallHeaders, CallPath, CallQuery, ParamStyle, ParamValue, ParameterValue,
    SecureString,
};

pub use self::decode::{DecodeFailure, DecodeInput, Decoded, Decoder};

pub use self::outcome::{
    BODY_MAX_LENGTH, Body, BoundaryError, ErrorCause, Outcome, OutcomeFailure, OutcomeHandlers,
    OutcomeTag, Response, TagMismatch, TransportError, TransportErrorKind, UnhandledTag,
};

pub use self::schema::{
    MediaType, NO_CONTENT_TYPE, Operation, OperationBuilder, ResponseSchema, Responses,
    SchemaError, SchemaTable, SchemaTableBuilder,
};

pub use self::transport::{RawResponse, ReqwestTransport, Transport, TransportRequest, execute};
