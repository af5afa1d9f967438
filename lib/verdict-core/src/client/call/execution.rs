use std::future::{Future, IntoFuture};
use std::pin::Pin;

use headers::HeaderMapExt;
use http::{HeaderMap, Method};
use tracing::debug;
use url::Url;

use super::ApiCall;
use crate::client::parameters::PathResolved;
use crate::client::{ApiClientError, Authentication, CallBody, CallHeaders, CallPath, CallQuery};
use crate::outcome::{Outcome, TransportError};
use crate::transport::{self, Transport, TransportRequest};

impl<T> ApiCall<T>
where
    T: Transport,
{
    /// Sends the request and classifies the response.
    ///
    /// Never fails: every failure is one of the outcome variants.
    async fn exchange(self) -> Outcome {
        let Self {
            transport,
            base_url,
            operation,
            path,
            query,
            default_headers,
            headers,
            body,
            authentication,
            timeout,
            cancellation,
            error,
        } = self;

        let request = match error {
            Some(err) => Err(err),
            None => Self::build_request(
                operation.method().clone(),
                &base_url,
                path,
                &query,
                default_headers,
                &headers,
                body,
                authentication.as_ref(),
            ),
        };
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                debug!(operation = operation.id(), %err, "invalid request");
                return Outcome::from(TransportError::from(err));
            }
        };

        debug!(operation = operation.id(), url = %request.url, "calling...");
        match transport::execute(
            transport.as_ref(),
            request,
            timeout,
            cancellation.as_ref(),
        )
        .await
        {
            Ok(raw) => operation.classify(&raw),
            Err(err) => Outcome::from(err),
        }
    }

    pub(super) fn build_url(
        base_url: &Url,
        path: CallPath,
        query: &CallQuery,
    ) -> Result<Url, ApiClientError> {
        let path_resolved = PathResolved::try_from(path)?;
        let url = format!(
            "{}/{}",
            base_url.as_str().trim_end_matches('/'),
            path_resolved.path.trim_start_matches('/')
        );
        let mut url = url.parse::<Url>()?;

        let query_string = query.to_query_string()?;
        if !query_string.is_empty() {
            url.set_query(Some(&query_string));
        }

        Ok(url)
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) fn build_request(
        method: Method,
        base_url: &Url,
        path: CallPath,
        query: &CallQuery,
        mut req_headers: HeaderMap,
        headers: &CallHeaders,
        body: Option<CallBody>,
        authentication: Option<&Authentication>,
    ) -> Result<TransportRequest, ApiClientError> {
        let url = Self::build_url(base_url, path, query)?;

        if let Some(auth) = authentication {
            let (header_name, header_value) = auth.to_header()?;
            req_headers.insert(header_name, header_value);
        }

        headers.apply(&mut req_headers)?;

        let body = body.map(|body| {
            req_headers.typed_insert(body.content_type);
            body.data
        });

        Ok(TransportRequest {
            method,
            url,
            headers: req_headers,
            body,
        })
    }
}

/// Awaiting an [`ApiCall`] sends it and classifies the response.
///
/// ```rust,no_run
/// # use verdict_core::{ApiClient, Outcome};
/// # async fn example(client: &ApiClient) -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = client.call("listUsers")?.await;
/// if let Outcome::Success(response) = outcome {
///     println!("{:?}", response.value());
/// }
/// # Ok(())
/// # }
/// ```
impl<T> IntoFuture for ApiCall<T>
where
    T: Transport,
{
    type Output = Outcome;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.exchange())
    }
}
