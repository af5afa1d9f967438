use std::fmt::Debug;

use serde::Serialize;
use serde_json::Value;

use crate::client::ApiClientError;

/// Types usable as path, query or header parameter values.
pub trait ParameterValue: Serialize + Debug + Send + Sync + Clone + 'static {}

impl<T> ParameterValue for T where T: Serialize + Debug + Send + Sync + Clone + 'static {}

/// Parameter serialization styles, as defined by OpenAPI 3.1.
///
/// ```rust
/// use verdict_core::{ParamStyle, ParamValue};
///
/// // ?tags=rust&tags=web
/// let form = ParamValue::new(vec!["rust", "web"]);
/// assert_eq!(form.query_style(), ParamStyle::Form);
///
/// // ?tags=rust|web
/// let pipe = ParamValue::with_style(vec!["rust", "web"], ParamStyle::PipeDelimited);
/// assert_eq!(pipe.query_style(), ParamStyle::PipeDelimited);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamStyle {
    /// `Form` for query parameters, `Simple` for path parameters and headers.
    Default,
    /// `param=value1&param=value2` (query default)
    Form,
    /// `value1,value2` (path default)
    Simple,
    /// `param=value1 value2`
    SpaceDelimited,
    /// `param=value1|value2`
    PipeDelimited,
    /// `/users/.value`
    Label,
    /// `/users/;name=value`
    Matrix,
    /// `?obj[key]=value`
    DeepObject,
}

/// A parameter value with its serialization style.
#[derive(Debug, Clone)]
pub struct ParamValue<T>
where
    T: ParameterValue,
{
    /// The parameter value.
    pub value: T,
    /// The serialization style.
    pub style: ParamStyle,
}

impl<T> ParamValue<T>
where
    T: ParameterValue,
{
    /// A value with the default style.
    pub fn new(value: T) -> Self {
        Self {
            value,
            style: ParamStyle::Default,
        }
    }

    /// A value with an explicit style.
    pub fn with_style(value: T, style: ParamStyle) -> Self {
        Self { value, style }
    }

    /// The style used in a query string.
    pub fn query_style(&self) -> ParamStyle {
        match self.style {
            ParamStyle::Default => ParamStyle::Form,
            style => style,
        }
    }

    /// The style used in a path.
    pub fn path_style(&self) -> ParamStyle {
        match self.style {
            ParamStyle::Default => ParamStyle::Simple,
            style => style,
        }
    }

    /// Serializes the value, keeping its style.
    pub(in crate::client) fn resolve(&self) -> Result<ResolvedParamValue, serde_json::Error> {
        let value = serde_json::to_value(&self.value)?;
        Ok(ResolvedParamValue {
            value,
            style: self.style,
        })
    }
}

impl<T> From<T> for ParamValue<T>
where
    T: ParameterValue,
{
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

/// A serialized parameter value.
#[derive(Debug, Clone, PartialEq)]
pub(in crate::client) struct ResolvedParamValue {
    pub(in crate::client) value: Value,
    pub(in crate::client) style: ParamStyle,
}

impl ResolvedParamValue {
    fn scalar_to_string(value: &Value) -> Result<String, ApiClientError> {
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Null => Ok(String::new()),
            Value::Array(_) | Value::Object(_) => Err(ApiClientError::UnsupportedParameterValue {
                message: "nested complex values not supported in parameters".to_string(),
                value: value.clone(),
            }),
        }
    }

    fn array_to_strings(values: &[Value]) -> Result<Vec<String>, ApiClientError> {
        values.iter().map(Self::scalar_to_string).collect()
    }

    fn delimiter(&self) -> Result<&'static str, ApiClientError> {
        match self.style {
            ParamStyle::Default
            | ParamStyle::Simple
            | ParamStyle::Form
            | ParamStyle::Label
            | ParamStyle::Matrix => Ok(","),
            ParamStyle::SpaceDelimited => Ok(" "),
            ParamStyle::PipeDelimited => Ok("|"),
            ParamStyle::DeepObject => Err(ApiClientError::UnsupportedParameterValue {
                message: "DeepObject style not supported for arrays, use objects instead"
                    .to_string(),
                value: self.value.clone(),
            }),
        }
    }

    /// The value as a single string, arrays joined by the style delimiter.
    pub(in crate::client) fn to_string_value(&self) -> Result<String, ApiClientError> {
        match &self.value {
            Value::Array(values) => {
                let delimiter = self.delimiter()?;
                Ok(Self::array_to_strings(values)?.join(delimiter))
            }
            Value::Object(_) => Err(ApiClientError::UnsupportedParameterValue {
                message: "object values not supported in parameters".to_string(),
                value: self.value.clone(),
            }),
            scalar => Self::scalar_to_string(scalar),
        }
    }

    /// The query pairs of this parameter.
    ///
    /// Form arrays repeat the name, deep objects expand to `name[key]`,
    /// `null` produces nothing.
    pub(in crate::client) fn to_query_pairs(
        &self,
        name: &str,
    ) -> Result<Vec<(String, String)>, ApiClientError> {
        match (&self.value, self.style) {
            (Value::Null, _) => Ok(Vec::new()),
            (Value::Array(values), ParamStyle::Default | ParamStyle::Form) => {
                Ok(Self::array_to_strings(values)?
                    .into_iter()
                    .map(|value| (name.to_string(), value))
                    .collect())
            }
            (Value::Object(entries), ParamStyle::DeepObject) => {
                let mut result = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    if value.is_null() {
                        continue;
                    }
                    result.push((format!("{name}[{key}]"), Self::scalar_to_string(value)?));
                }
                Ok(result)
            }
            _ => Ok(vec![(name.to_string(), self.to_string_value()?)]),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resolved(value: Value, style: ParamStyle) -> ResolvedParamValue {
        ResolvedParamValue { value, style }
    }

    #[test]
    fn test_param_value_defaults() {
        let param: ParamValue<i32> = 42.into();

        assert_eq!(param.value, 42);
        assert_eq!(param.style, ParamStyle::Default);
        assert_eq!(param.query_style(), ParamStyle::Form);
        assert_eq!(param.path_style(), ParamStyle::Simple);
    }

    #[test]
    fn test_param_value_explicit_style() {
        let param = ParamValue::with_style("test", ParamStyle::Label);

        assert_eq!(param.query_style(), ParamStyle::Label);
        assert_eq!(param.path_style(), ParamStyle::Label);
    }

    #[test]
    fn test_resolve_param_value() {
        let param = ParamValue::new(vec![1, 2, 3]);

        let resolved = param.resolve().expect("serializable");

        assert_eq!(resolved.value, json!([1, 2, 3]));
        assert_eq!(resolved.style, ParamStyle::Default);
    }

    #[test]
    fn test_to_string_value_by_style() {
        let values = json!(["a", "b", "c"]);

        let cases = [
            (ParamStyle::Simple, "a,b,c"),
            (ParamStyle::SpaceDelimited, "a b c"),
            (ParamStyle::PipeDelimited, "a|b|c"),
        ];
        for (style, expected) in cases {
            let result = resolved(values.clone(), style).to_string_value();
            assert_eq!(result.ok().as_deref(), Some(expected), "{style:?}");
        }
    }

    #[test]
    fn test_to_string_value_scalars() {
        assert_eq!(
            resolved(json!(true), ParamStyle::Simple)
                .to_string_value()
                .ok(),
            Some("true".to_string())
        );
        assert_eq!(
            resolved(json!(1.5), ParamStyle::Simple)
                .to_string_value()
                .ok(),
            Some("1.5".to_string())
        );
    }

    #[test]
    fn test_reject_nested_values() {
        let nested = resolved(json!([[1, 2], [3]]), ParamStyle::Simple);
        let object = resolved(json!({ "a": 1 }), ParamStyle::Simple);

        assert!(matches!(
            nested.to_string_value(),
            Err(ApiClientError::UnsupportedParameterValue { .. })
        ));
        assert!(matches!(
            object.to_string_value(),
            Err(ApiClientError::UnsupportedParameterValue { .. })
        ));
    }

    #[test]
    fn test_query_pairs() {
        let form = resolved(json!(["x", "y"]), ParamStyle::Form);
        let pipe = resolved(json!(["x", "y"]), ParamStyle::PipeDelimited);
        let deep = resolved(json!({ "min": 1, "max": null }), ParamStyle::DeepObject);
        let null = resolved(Value::Null, ParamStyle::Form);

        insta::assert_debug_snapshot!(form.to_query_pairs("tag").ok(), @r#"
        Some(
            [
                (
                    "tag",
                    "x",
                ),
                (
                    "tag",
                    "y",
                ),
            ],
        )
        "#);
        assert_eq!(
            pipe.to_query_pairs("tag").ok(),
            Some(vec![("tag".to_string(), "x|y".to_string())])
        );
        assert_eq!(
            deep.to_query_pairs("range").ok(),
            Some(vec![("range[min]".to_string(), "1".to_string())])
        );
        assert_eq!(null.to_query_pairs("missing").ok(), Some(vec![]));
    }
}
