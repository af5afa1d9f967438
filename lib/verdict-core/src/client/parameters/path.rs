use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use tracing::warn;

use super::param::{ParamValue, ParameterValue, ResolvedParamValue};
use crate::client::{ApiClientError, ParamStyle};

/// Matches `{name}` placeholders.
#[allow(clippy::expect_used)]
static RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(?<name>[^{}/]+)}").expect("a valid regex"));

/// Everything but RFC 3986 unreserved characters.
const PATH_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_path_value(value: &str) -> String {
    utf8_percent_encode(value, PATH_VALUE).to_string()
}

fn replace_path_param(path: &str, name: &str, value: &str) -> String {
    let pattern = ["{", name, "}"].concat();
    path.replace(&pattern, value)
}

/// A path template with its parameter values.
///
/// ```rust
/// use verdict_core::{CallPath, ParamStyle, ParamValue};
///
/// let path = CallPath::from("/users/{user_id}/posts/{post_id}")
///     .add_param("user_id", 123)
///     .add_param("post_id", ParamValue::with_style("my post", ParamStyle::Label));
/// // resolves to /users/123/posts/.my%20post
/// # let _ = path;
/// ```
///
/// The same placeholder may appear several times, every occurrence is replaced.
#[derive(Debug, Clone, Default, derive_more::Display)]
#[display("{path}")]
pub struct CallPath {
    pub(in crate::client) path: String,
    args: IndexMap<String, ResolvedParamValue>,
    error: Option<String>,
}

impl CallPath {
    /// Adds a path parameter.
    ///
    /// A value that cannot be serialized is reported when the path is resolved.
    #[must_use]
    pub fn add_param<T: ParameterValue>(
        mut self,
        name: impl Into<String>,
        param: impl Into<ParamValue<T>>,
    ) -> Self {
        let name = name.into();
        match param.into().resolve() {
            Ok(resolved) => {
                self.args.insert(name, resolved);
            }
            Err(err) => {
                self.error
                    .get_or_insert_with(|| format!("Failed to serialize path parameter '{name}': {err}"));
            }
        }
        self
    }

    /// Placeholder names, in template order.
    pub fn names(&self) -> Vec<&str> {
        RE.captures_iter(&self.path)
            .filter_map(|caps| caps.name("name"))
            .map(|found| found.as_str())
            .collect()
    }
}

impl From<&str> for CallPath {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<String> for CallPath {
    fn from(path: String) -> Self {
        Self {
            path,
            args: IndexMap::new(),
            error: None,
        }
    }
}

/// A path with every placeholder substituted.
#[derive(Debug)]
pub(in crate::client) struct PathResolved {
    pub(in crate::client) path: String,
}

impl TryFrom<CallPath> for PathResolved {
    type Error = ApiClientError;

    fn try_from(value: CallPath) -> Result<Self, Self::Error> {
        let CallPath {
            mut path,
            args,
            error,
        } = value;
        if let Some(message) = error {
            return Err(ApiClientError::SerializationError { message });
        }

        let mut names = RE
            .captures_iter(&path)
            .filter_map(|caps| caps.name("name"))
            .map(|found| found.as_str().to_string())
            .collect::<HashSet<_>>();

        for (name, resolved) in args {
            if !names.remove(&name) {
                warn!(?name, "argument name not found");
                continue;
            }

            let formatted = match resolved.style {
                ParamStyle::DeepObject => {
                    return Err(ApiClientError::UnsupportedParameterValue {
                        message: "DeepObject style not supported for path parameters"
                            .to_string(),
                        value: resolved.value,
                    });
                }
                ParamStyle::Label => format!(".{}", encode_path_value(&resolved.to_string_value()?)),
                ParamStyle::Matrix => format!(
                    ";{name}={}",
                    encode_path_value(&resolved.to_string_value()?)
                ),
                _ => encode_path_value(&resolved.to_string_value()?),
            };

            path = replace_path_param(&path, &name, &formatted);
        }

        if names.is_empty() {
            Ok(Self { path })
        } else {
            let mut missings = names.into_iter().collect::<Vec<_>>();
            missings.sort();
            Err(ApiClientError::PathUnresolved { path, missings })
        }
    }
}
