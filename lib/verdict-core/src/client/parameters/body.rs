use bytes::Bytes;
use headers::ContentType;
use serde::Serialize;

use crate::client::ApiClientError;

/// The body of a request, with its content type.
#[derive(Clone, derive_more::Debug)]
pub struct CallBody {
    pub(in crate::client) content_type: ContentType,
    #[debug(ignore)]
    pub(in crate::client) data: Bytes,
}

impl CallBody {
    /// An `application/json` body.
    ///
    /// ```rust
    /// # use verdict_core::CallBody;
    /// # use serde::Serialize;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// #[derive(Serialize)]
    /// struct User {
    ///     name: String,
    /// }
    ///
    /// let body = CallBody::json(&User { name: "Alice".to_string() })?;
    /// assert_eq!(body.content_type().to_string(), "application/json");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::JsonValueError`] if the value cannot be serialized.
    pub fn json<T>(t: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(t)?;
        Ok(Self {
            content_type: ContentType::json(),
            data: Bytes::from(data),
        })
    }

    /// An `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiClientError::SerializationError`] if the value is not a flat structure.
    pub fn form<T>(t: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_urlencoded::to_string(t).map_err(|err| {
            ApiClientError::SerializationError {
                message: format!("Failed to serialize form data: {err}"),
            }
        })?;
        Ok(Self {
            content_type: ContentType::form_url_encoded(),
            data: Bytes::from(data),
        })
    }

    /// A body with an arbitrary content type.
    pub fn raw(data: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            content_type,
            data: data.into(),
        }
    }

    /// A `text/plain` body.
    pub fn text(text: impl Into<String>) -> Self {
        Self::raw(text.into(), ContentType::text())
    }

    /// The content type.
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// The encoded bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}
