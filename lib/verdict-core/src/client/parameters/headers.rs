use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use indexmap::IndexMap;

use super::param::{ParamValue, ParameterValue, ResolvedParamValue};
use crate::client::ApiClientError;

/// Extra request headers of a call.
///
/// Values are serialized like path parameters: arrays are comma separated.
///
/// ```rust
/// use verdict_core::CallHeaders;
///
/// let headers = CallHeaders::new()
///     .add_header("X-Request-ID", "abc-123-def")
///     .add_header("X-Rate-Limit", 1000);
/// assert_eq!(headers.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallHeaders {
    headers: IndexMap<String, ResolvedParamValue>,
    error: Option<String>,
}

impl CallHeaders {
    /// No headers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header, replacing any previous value with the same name.
    #[must_use]
    pub fn add_header<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue<T>>,
    ) -> Self {
        let name = name.into();
        match value.into().resolve() {
            Ok(resolved) => {
                self.headers.insert(name, resolved);
            }
            Err(err) => {
                self.error
                    .get_or_insert_with(|| format!("Failed to serialize header '{name}': {err}"));
            }
        }
        self
    }

    /// Merges other headers, their values win on conflicts.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.headers.extend(other.headers);
        self.error = self.error.or(other.error);
        self
    }

    /// Whether no header was added.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// The number of headers.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Inserts the headers into `target`, replacing existing values.
    ///
    /// `null` values are skipped.
    pub(in crate::client) fn apply(&self, target: &mut HeaderMap) -> Result<(), ApiClientError> {
        if let Some(message) = &self.error {
            return Err(ApiClientError::SerializationError {
                message: message.clone(),
            });
        }

        for (name, resolved) in &self.headers {
            if resolved.value.is_null() {
                continue;
            }
            let name = HeaderName::from_bytes(name.as_bytes())?;
            let value = HeaderValue::from_str(&resolved.to_string_value()?)?;
            target.insert(name, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_header_map(headers: &CallHeaders) -> Result<HeaderMap, ApiClientError> {
        let mut map = HeaderMap::new();
        headers.apply(&mut map)?;
        Ok(map)
    }

    #[test]
    fn test_new_empty_headers() {
        let headers = CallHeaders::new();

        assert!(headers.is_empty());
        assert_eq!(headers.len(), 0);
    }

    #[test]
    fn test_add_headers() {
        let headers = CallHeaders::new()
            .add_header("X-Request-ID", "abc-123-def")
            .add_header("X-Rate-Limit", 1000u32)
            .add_header("X-Tags", vec!["a", "b"]);

        let map = to_header_map(&headers).expect("valid headers");

        assert_eq!(map.len(), 3);
        assert_eq!(map["x-request-id"], "abc-123-def");
        assert_eq!(map["x-rate-limit"], "1000");
        assert_eq!(map["x-tags"], "a,b");
    }

    #[test]
    fn test_merge_headers() {
        let headers = CallHeaders::new()
            .add_header("X-Version", 1)
            .add_header("X-Client", "cli")
            .merge(CallHeaders::new().add_header("X-Version", 2));

        let map = to_header_map(&headers).expect("valid headers");

        assert_eq!(map["x-version"], "2");
        assert_eq!(map["x-client"], "cli");
    }

    #[test]
    fn test_skip_null_headers() {
        let headers = CallHeaders::new().add_header("X-Optional", None::<String>);

        let map = to_header_map(&headers).expect("valid headers");

        assert!(map.is_empty());
    }

    #[test]
    fn test_invalid_header_name() {
        let headers = CallHeaders::new().add_header("Invalid Header", "value");

        assert!(matches!(
            to_header_map(&headers),
            Err(ApiClientError::InvalidHeaderName(_))
        ));
    }

    #[test]
    fn test_invalid_header_value() {
        let headers = CallHeaders::new().add_header("X-Bad", "line\nbreak");

        assert!(matches!(
            to_header_map(&headers),
            Err(ApiClientError::InvalidHeaderValue(_))
        ));
    }
}
