//! Decoders: the per (status, media type) validation functions.
//!
//! A [`Decoder`] receives the parsed body and either accepts it, possibly
//! attaching a typed value, or rejects it with a [`DecodeFailure`].
//! Decoders are total: a panicking decoder is reported as a failure.

use std::any::{Any, type_name};
use std::borrow::Cow;
use std::fmt::{self, Debug, Display};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

mod parse;

pub(crate) use self::parse::parse_body;

/// What a decoder sees of a response.
#[derive(Debug, Clone, Copy)]
pub struct DecodeInput<'a> {
    /// The response status code.
    pub status: u16,
    /// The matched media type essence, e.g. `application/json`.
    pub content_type: &'a str,
    /// The raw body text.
    pub raw_body: &'a str,
    /// The body parsed by media type.
    pub value: &'a Value,
}

/// A rejected body.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error)]
pub struct DecodeFailure {
    message: String,
    path: Option<String>,
}

impl DecodeFailure {
    /// A failure with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// Adds the location of the failure in the body, e.g. `items[2].id`.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The location of the failure in the body, if known.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn panicked(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = payload.downcast_ref::<&str>() {
            (*message).to_string()
        } else {
            "unknown panic payload".to_string()
        };
        Self::new(format!("decoder panicked: {message}"))
    }
}

impl Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "at '{path}': {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// An accepted body: the structured value, plus an optional typed value.
#[derive(Clone)]
pub struct Decoded {
    value: Value,
    typed: Option<Arc<dyn Any + Send + Sync>>,
}

impl Decoded {
    /// Accepts the value as is.
    pub fn new(value: Value) -> Self {
        Self { value, typed: None }
    }

    /// Accepts the value and attaches its typed rendition.
    pub fn with_typed<T>(value: Value, typed: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            value,
            typed: Some(Arc::new(typed)),
        }
    }

    /// The structured value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn into_parts(self) -> (Value, Option<Arc<dyn Any + Send + Sync>>) {
        (self.value, self.typed)
    }
}

impl Debug for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoded")
            .field("value", &self.value)
            .field("typed", &self.typed.is_some())
            .finish()
    }
}

type DecodeFn = dyn Fn(&DecodeInput<'_>) -> Result<Decoded, DecodeFailure> + Send + Sync;

/// A named validation function.
///
/// ```rust
/// use serde::Deserialize;
/// use verdict_core::Decoder;
///
/// #[derive(Debug, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// let users = Decoder::json::<Vec<User>>();
/// let raw = Decoder::any();
/// let name = Decoder::from_fn("non-empty", |input| {
///     match input.value.as_str() {
///         Some(text) if !text.is_empty() => Ok(verdict_core::Decoded::new(input.value.clone())),
///         _ => Err(verdict_core::DecodeFailure::new("expected a non-empty string")),
///     }
/// });
/// # let _ = (users, raw, name);
/// ```
#[derive(Clone)]
pub struct Decoder {
    name: Cow<'static, str>,
    decode: Arc<DecodeFn>,
}

impl Decoder {
    /// A decoder from a function.
    pub fn from_fn<F>(name: impl Into<Cow<'static, str>>, decode: F) -> Self
    where
        F: Fn(&DecodeInput<'_>) -> Result<Decoded, DecodeFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            decode: Arc::new(decode),
        }
    }

    /// Deserializes the body into `T` with serde.
    ///
    /// The typed value is attached to the response,
    /// see [`Response::typed`](crate::Response::typed).
    /// Failures carry the path of the offending field.
    pub fn json<T>() -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self::from_fn(type_name::<T>(), |input| {
            let typed: T = serde_path_to_error::deserialize(input.value).map_err(|err| {
                let path = err.path().to_string();
                let failure = DecodeFailure::new(err.into_inner().to_string());
                if path == "." {
                    failure
                } else {
                    failure.at(path)
                }
            })?;
            Ok(Decoded::with_typed(input.value.clone(), typed))
        })
    }

    /// Accepts any body.
    pub fn any() -> Self {
        Self::from_fn("any", |input| Ok(Decoded::new(input.value.clone())))
    }

    /// Requires a text body, attached as a `String`.
    pub fn text() -> Self {
        Self::from_fn("text", |input| match input.value {
            Value::String(text) => Ok(Decoded::with_typed(input.value.clone(), text.clone())),
            other => Err(DecodeFailure::new(format!(
                "expected a string, got {}",
                kind(other)
            ))),
        })
    }

    /// The decoder name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the decoder.
    ///
    /// A panic inside the decoder is caught and returned as a failure.
    /// The panic hook still runs, so the default hook prints the panic message
    /// to stderr. Install a hook with [`std::panic::set_hook`] to silence it.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeFailure`] produced by the decoder.
    pub fn decode(&self, input: &DecodeInput<'_>) -> Result<Decoded, DecodeFailure> {
        panic::catch_unwind(AssertUnwindSafe(|| (self.decode)(input)))
            .unwrap_or_else(|payload| Err(DecodeFailure::panicked(payload.as_ref())))
    }
}

impl Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder").field("name", &self.name).finish_non_exhaustive()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Item {
        id: u32,
        label: String,
    }

    fn input(value: &Value) -> DecodeInput<'_> {
        DecodeInput {
            status: 200,
            content_type: "application/json",
            raw_body: "",
            value,
        }
    }

    #[test]
    fn should_decode_typed_json() {
        let value = json!([{ "id": 1, "label": "one" }]);

        let decoded = Decoder::json::<Vec<Item>>()
            .decode(&input(&value))
            .expect("valid items");

        assert_eq!(decoded.value(), &value);
        let (_, typed) = decoded.into_parts();
        let typed = typed.expect("typed value attached");
        let items = typed.downcast_ref::<Vec<Item>>().expect("Vec<Item>");
        assert_eq!(
            items,
            &vec![Item {
                id: 1,
                label: "one".to_string()
            }]
        );
    }

    #[test]
    fn should_report_failure_path() {
        let value = json!([{ "id": 1, "label": "one" }, { "id": "two", "label": "two" }]);

        let failure = Decoder::json::<Vec<Item>>()
            .decode(&input(&value))
            .expect_err("second id is not a number");

        assert_eq!(failure.path(), Some("[1].id"));
        insta::assert_snapshot!(failure, @r#"at '[1].id': invalid type: string "two", expected u32"#);
    }

    #[test]
    fn should_report_root_failure_without_path() {
        let value = json!("not an object");

        let failure = Decoder::json::<Item>()
            .decode(&input(&value))
            .expect_err("not an object");

        assert_eq!(failure.path(), None);
    }

    #[test]
    fn should_require_text() {
        let text = json!("hello");
        let number = json!(42);

        let decoded = Decoder::text().decode(&input(&text)).expect("a string");
        let (_, typed) = decoded.into_parts();
        assert_eq!(
            typed.and_then(|it| it.downcast_ref::<String>().cloned()),
            Some("hello".to_string())
        );

        let failure = Decoder::text()
            .decode(&input(&number))
            .expect_err("not a string");
        assert_eq!(failure.message(), "expected a string, got a number");
    }

    #[test]
    fn should_accept_anything() {
        let value = json!({ "anything": [null, true] });

        let decoded = Decoder::any().decode(&input(&value)).expect("accepted");

        assert_eq!(decoded.value(), &value);
    }

    #[test]
    fn should_catch_panicking_decoder() {
        let decoder = Decoder::from_fn("boom", |_| panic!("kaboom"));
        let value = Value::Null;

        let failure = decoder.decode(&input(&value)).expect_err("panic is caught");

        assert_eq!(failure.message(), "decoder panicked: kaboom");
    }

    #[test]
    fn should_debug_decoder_by_name() {
        let decoder = Decoder::json::<Item>();

        assert!(format!("{decoder:?}").contains("Item"));
        assert!(decoder.name().ends_with("Item"));
    }
}
