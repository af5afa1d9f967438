use indexmap::IndexMap;

use super::param::{ParamValue, ParameterValue, ResolvedParamValue};
use crate::client::ApiClientError;

/// Query parameters of a call, in insertion order.
///
/// ```rust
/// use verdict_core::{CallQuery, ParamStyle, ParamValue};
///
/// let query = CallQuery::new()
///     .add_param("search", "rust")
///     .add_param("limit", 10)
///     .add_param("tags", ParamValue::with_style(vec!["web", "api"], ParamStyle::PipeDelimited));
/// assert_eq!(query.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallQuery {
    params: IndexMap<String, ResolvedParamValue>,
    error: Option<String>,
}

impl CallQuery {
    /// An empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query parameter, replacing any previous value with the same name.
    ///
    /// `None` and `null` values are left out of the query string.
    #[must_use]
    pub fn add_param<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        param: impl Into<ParamValue<T>>,
    ) -> Self {
        let name = name.into();
        match param.into().resolve() {
            Ok(resolved) => {
                self.params.insert(name, resolved);
            }
            Err(err) => {
                self.error.get_or_insert_with(|| {
                    format!("Failed to serialize query parameter '{name}': {err}")
                });
            }
        }
        self
    }

    /// Merges another query, its values win on conflicts.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.params.extend(other.params);
        self.error = self.error.or(other.error);
        self
    }

    /// Whether no parameter was added.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// The number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// The encoded query string, without the leading `?`.
    pub(in crate::client) fn to_query_string(&self) -> Result<String, ApiClientError> {
        if let Some(message) = &self.error {
            return Err(ApiClientError::SerializationError {
                message: message.clone(),
            });
        }

        let mut pairs = Vec::with_capacity(self.params.len());
        for (name, resolved) in &self.params {
            pairs.extend(resolved.to_query_pairs(name)?);
        }
        let query = serde_urlencoded::to_string(pairs)?;
        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;
    use crate::client::ParamStyle;

    #[test]
    fn test_empty_query() {
        let query = CallQuery::new();

        assert!(query.is_empty());
        assert_eq!(query.to_query_string().ok().as_deref(), Some(""));
    }

    #[test]
    fn test_query_string_encoding() {
        let query = CallQuery::new()
            .add_param("q", "hello world & more")
            .add_param("limit", 10)
            .add_param("active", true);

        insta::assert_snapshot!(
            query.to_query_string().expect("encoded"),
            @"q=hello+world+%26+more&limit=10&active=true"
        );
    }

    #[test]
    fn test_query_array_styles() {
        let query = CallQuery::new()
            .add_param("form", vec!["a", "b"])
            .add_param(
                "pipe",
                ParamValue::with_style(vec!["a", "b"], ParamStyle::PipeDelimited),
            )
            .add_param(
                "space",
                ParamValue::with_style(vec!["a", "b"], ParamStyle::SpaceDelimited),
            );

        insta::assert_snapshot!(
            query.to_query_string().expect("encoded"),
            @"form=a&form=b&pipe=a%7Cb&space=a+b"
        );
    }

    #[test]
    fn test_query_deep_object() {
        #[derive(Debug, Clone, Serialize)]
        struct Range {
            min: u32,
            max: Option<u32>,
        }

        let query = CallQuery::new().add_param(
            "range",
            ParamValue::with_style(Range { min: 1, max: None }, ParamStyle::DeepObject),
        );

        assert_eq!(
            query.to_query_string().ok().as_deref(),
            Some("range%5Bmin%5D=1")
        );
    }

    #[test]
    fn test_query_skips_none() {
        let query = CallQuery::new()
            .add_param("page", Some(2))
            .add_param("filter", None::<String>);

        assert_eq!(query.to_query_string().ok().as_deref(), Some("page=2"));
    }

    #[test]
    fn test_query_merge_overrides() {
        let query = CallQuery::new()
            .add_param("page", 1)
            .add_param("size", 20)
            .merge(CallQuery::new().add_param("page", 3));

        assert_eq!(
            query.to_query_string().ok().as_deref(),
            Some("page=3&size=20")
        );
    }

    #[test]
    fn test_query_rejects_objects_without_deep_object() {
        #[derive(Debug, Clone, Serialize)]
        struct Filter {
            name: String,
        }

        let query = CallQuery::new().add_param(
            "filter",
            Filter {
                name: "x".to_string(),
            },
        );

        assert!(matches!(
            query.to_query_string(),
            Err(ApiClientError::UnsupportedParameterValue { .. })
        ));
    }
}
