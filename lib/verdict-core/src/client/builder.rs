use std::fmt::Debug;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use http::uri::{PathAndQuery, Scheme};
use http::{HeaderMap, Uri};
use url::Url;

use super::{ApiClient, ApiClientError, Authentication};
use crate::schema::SchemaTable;
use crate::transport::{ReqwestTransport, Transport};

/// Builder for [`ApiClient`].
///
/// # Default Configuration
///
/// - **Scheme**: HTTP (use `with_scheme()` to change to HTTPS)
/// - **Host**: 127.0.0.1 (localhost)
/// - **Port**: 80 (standard HTTP port)
/// - **Base path**: None (requests go to root path)
/// - **Schema**: empty, every call is an unknown operation
/// - **Timeout**: None
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use http::uri::Scheme;
/// use verdict_core::{ApiClient, Authentication, SchemaTable};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .with_scheme(Scheme::HTTPS)
///     .with_host("api.example.com")
///     .with_port(443)
///     .with_base_path("/v1")?
///     .with_schema(SchemaTable::builder().build()?)
///     .with_timeout(Duration::from_secs(30))
///     .with_authentication(Authentication::Bearer("token".into()))
///     .with_default_header("User-Agent", "verdict")?
///     .build()?;
/// assert_eq!(client.base_url().as_str(), "https://api.example.com/v1");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClientBuilder {
    client: reqwest::Client,
    scheme: Scheme,
    host: String,
    port: u16,
    base_path: Option<PathAndQuery>,
    base_url: Option<Url>,
    schema: Arc<SchemaTable>,
    default_headers: HeaderMap,
    authentication: Option<Authentication>,
    timeout: Option<Duration>,
}

impl ApiClientBuilder {
    /// Builds a client sending requests with `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be built from the scheme, host, port and base path.
    pub fn build(self) -> Result<ApiClient, ApiClientError> {
        let transport = ReqwestTransport::new(self.client.clone());
        self.build_with_transport(transport)
    }

    /// Builds a client sending requests through a custom transport.
    ///
    /// The `reqwest` client of the builder is then unused.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be built from the scheme, host, port and base path.
    pub fn build_with_transport<T>(self, transport: T) -> Result<ApiClient<T>, ApiClientError>
    where
        T: Transport,
    {
        let Self {
            client: _,
            scheme,
            host,
            port,
            base_path,
            base_url,
            schema,
            default_headers,
            authentication,
            timeout,
        } = self;

        let base_url = match base_url {
            Some(url) => url,
            None => {
                let builder = Uri::builder()
                    .scheme(scheme)
                    .authority(format!("{host}:{port}"));
                let builder = if let Some(path) = &base_path {
                    builder.path_and_query(path.path())
                } else {
                    builder.path_and_query("/")
                };
                let base_uri = builder.build()?;
                base_uri.to_string().parse::<Url>()?
            }
        };

        Ok(ApiClient {
            transport: Arc::new(transport),
            base_url,
            schema,
            default_headers,
            authentication,
            timeout,
        })
    }

    /// Sets the HTTP scheme, `http` by default.
    pub fn with_scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Sets the hostname, `127.0.0.1` by default.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the port, `80` by default.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the base path prepended to every operation path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::InvalidBasePath`] if the path is not a valid URI path.
    pub fn with_base_path<P>(mut self, base_path: P) -> Result<Self, ApiClientError>
    where
        P: TryInto<PathAndQuery>,
        P::Error: Debug + 'static,
    {
        let base_path = base_path
            .try_into()
            .map_err(|err| ApiClientError::InvalidBasePath {
                error: format!("{err:?}"),
            })?;
        self.base_path = Some(base_path);
        Ok(self)
    }

    /// Sets the whole base URL, overriding scheme, host, port and base path.
    ///
    /// ```rust
    /// use verdict_core::ApiClient;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = ApiClient::builder()
    ///     .with_base_url("http://localhost:3000/api")?
    ///     .build()?;
    /// assert_eq!(client.base_url().as_str(), "http://localhost:3000/api");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::UrlError`] if the URL cannot be parsed,
    /// and [`ApiClientError::InvalidBasePath`] if it cannot be a base.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ApiClientError> {
        let url = Url::parse(base_url)?;
        if url.cannot_be_a_base() {
            return Err(ApiClientError::InvalidBasePath {
                error: format!("'{base_url}' cannot be a base URL"),
            });
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Sets the schema of the called API.
    pub fn with_schema(mut self, schema: impl Into<Arc<SchemaTable>>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Sets a timeout for every call, overridable per call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets credentials sent with every call.
    pub fn with_authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = Some(authentication);
        self
    }

    /// Adds a header sent with every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_default_header(
        mut self,
        name: &str,
        value: &str,
    ) -> Result<Self, ApiClientError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Uses a configured `reqwest` client (proxy, TLS, pool settings...).
    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            scheme: Scheme::HTTP,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST).to_string(),
            port: 80,
            base_path: None,
            base_url: None,
            schema: Arc::default(),
            default_headers: HeaderMap::new(),
            authentication: None,
            timeout: None,
        }
    }
}
