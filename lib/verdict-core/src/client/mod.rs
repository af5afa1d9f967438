use std::sync::Arc;
use std::time::Duration;

use http::HeaderMap;
use url::Url;

use crate::schema::SchemaTable;
use crate::transport::{ReqwestTransport, Transport};

mod builder;
pub use self::builder::ApiClientBuilder;

mod call;
pub use self::call::ApiCall;

mod parameters;
pub use self::parameters::{
    CallBody, CallHeaders, CallPath, CallQuery, ParamStyle, ParamValue, ParameterValue,
};

mod auth;
pub use self::auth::{Authentication, AuthenticationError, SecureString};

mod error;
pub use self::error::ApiClientError;

/// HTTP client calling the operations of a [`SchemaTable`].
///
/// Every awaited call ends in exactly one [`Outcome`](crate::Outcome).
/// Use [`ApiClientBuilder`] to create instances.
///
/// # Example
///
/// ```rust,no_run
/// use http::Method;
/// use verdict_core::{ApiClient, Decoder, Operation, Outcome, SchemaTable};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = SchemaTable::builder()
///     .operation(
///         Operation::builder("getUser", Method::GET, "/users/{id}")
///             .response(200, "application/json", Decoder::any())
///             .response(404, "application/problem+json", Decoder::any()),
///     )
///     .build()?;
///
/// let client = ApiClient::builder()
///     .with_host("api.example.com")
///     .with_schema(schema)
///     .build()?;
///
/// match client.call("getUser")?.with_param("id", 42).await {
///     Outcome::Success(response) => println!("user: {:?}", response.value()),
///     Outcome::HttpError(response) => println!("not found: {}", response.status()),
///     Outcome::Boundary(error) => eprintln!("{error}"),
/// }
/// # Ok(())
/// # }
/// ```
///
/// # Thread Safety
///
/// The client is cheap to clone; clones share the transport and the schema.
#[derive(Debug)]
pub struct ApiClient<T: Transport = ReqwestTransport> {
    transport: Arc<T>,
    base_url: Url,
    schema: Arc<SchemaTable>,
    default_headers: HeaderMap,
    authentication: Option<Authentication>,
    timeout: Option<Duration>,
}

// Create
impl ApiClient {
    /// Starts building a client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }
}

impl<T> ApiClient<T>
where
    T: Transport,
{
    /// Prepares a call of an operation of the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::UnknownOperation`] if the schema has no such operation.
    pub fn call(&self, operation_id: &str) -> Result<ApiCall<T>, ApiClientError> {
        let operation = self.schema.operation(operation_id).cloned().ok_or_else(|| {
            ApiClientError::UnknownOperation {
                operation: operation_id.to_string(),
            }
        })?;

        Ok(ApiCall::build(
            Arc::clone(&self.transport),
            self.base_url.clone(),
            operation,
            self.default_headers.clone(),
            self.authentication.clone(),
            self.timeout,
        ))
    }

    /// The schema of the called API.
    pub fn schema(&self) -> &SchemaTable {
        &self.schema
    }

    /// The URL operation paths are appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> Clone for ApiClient<T>
where
    T: Transport,
{
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_url: self.base_url.clone(),
            schema: Arc::clone(&self.schema),
            default_headers: self.default_headers.clone(),
            authentication: self.authentication.clone(),
            timeout: self.timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;
    use crate::decode::Decoder;
    use crate::schema::Operation;

    fn client() -> ApiClient {
        let schema = SchemaTable::builder()
            .operation(
                Operation::builder("listUsers", Method::GET, "/users")
                    .response(200, "application/json", Decoder::any()),
            )
            .build()
            .expect("valid schema");

        ApiClient::builder()
            .with_schema(schema)
            .build()
            .expect("should build client")
    }

    #[test]
    fn test_client_is_send_sync_and_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}

        assert_traits::<ApiClient>();
    }

    #[test]
    fn test_call_known_operation() {
        let client = client();

        let call = client.call("listUsers");

        assert!(call.is_ok());
    }

    #[test]
    fn test_call_unknown_operation() {
        let client = client();

        let result = client.call("deleteEverything");

        let Err(error) = result else {
            panic!("should be unknown");
        };
        insta::assert_snapshot!(error, @"Unknown operation: deleteEverything");
    }

    #[test]
    fn test_clones_share_schema() {
        let client = client();
        let other = client.clone();

        assert!(std::ptr::eq(client.schema(), other.schema()));
    }
}
