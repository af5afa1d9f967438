use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{AUTHORIZATION, HeaderName};
use http::{HeaderMap, HeaderValue};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors raised while turning credentials into request headers.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum AuthenticationError {
    /// Bearer token contains invalid characters for HTTP headers.
    #[display("Bearer token contains invalid characters: {message}")]
    InvalidBearerToken {
        /// Description of the invalid characters.
        message: String,
    },

    /// Basic authentication username cannot be encoded.
    #[display("Basic auth username contains invalid characters: {message}")]
    InvalidUsername {
        /// Description of the problem.
        message: String,
    },

    /// Basic authentication credentials cannot be sent as a header.
    #[display("Basic auth password contains invalid characters: {message}")]
    InvalidPassword {
        /// Description of the problem.
        message: String,
    },

    /// API key header name is invalid.
    #[display("Invalid API key header name '{header_name}': {message}")]
    InvalidHeaderName {
        /// The rejected header name.
        header_name: String,
        /// Why it was rejected.
        message: String,
    },

    /// API key value contains invalid characters for HTTP headers.
    #[display("API key contains invalid characters: {message}")]
    InvalidApiKey {
        /// Description of the invalid characters.
        message: String,
    },
}

/// A secret string, cleared from memory on drop and never printed in full.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecureString(String);

impl SecureString {
    /// Wraps a secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shows the first and last four characters of long secrets, `***` otherwise.
    fn masked(&self) -> String {
        let chars = self.0.chars().collect::<Vec<_>>();
        if chars.len() <= 8 {
            return "***".to_string();
        }
        let head = chars.iter().take(4).collect::<String>();
        let tail = chars.iter().skip(chars.len() - 4).collect::<String>();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecureString").field(&"[REDACTED]").finish()
    }
}

impl fmt::Display for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl From<String> for SecureString {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Credentials sent with every call of a client.
///
/// ```rust
/// use verdict_core::Authentication;
///
/// let bearer = Authentication::Bearer("my-api-token".into());
/// let basic = Authentication::Basic {
///     username: "user".to_string(),
///     password: "pass".into(),
/// };
/// let api_key = Authentication::ApiKey {
///     header_name: "X-API-Key".to_string(),
///     key: "secret-key".into(),
/// };
///
/// // secrets are masked
/// assert_eq!(bearer.to_string(), "Bearer my-a...oken");
/// assert_eq!(format!("{basic:?}"), r#"Basic { username: "user", password: "[REDACTED]" }"#);
/// # let _ = api_key;
/// ```
#[derive(Clone)]
pub enum Authentication {
    /// `Authorization: Bearer <token>` (RFC 6750).
    Bearer(SecureString),

    /// `Authorization: Basic <base64(username:password)>` (RFC 7617).
    Basic {
        /// The username, without `:`.
        username: String,
        /// The password.
        password: SecureString,
    },

    /// `<header_name>: <key>`.
    ApiKey {
        /// The header carrying the key.
        header_name: String,
        /// The key.
        key: SecureString,
    },
}

impl Authentication {
    /// The header carrying these credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthenticationError`] if the credentials cannot be sent as a header.
    pub fn to_header(&self) -> Result<(HeaderName, HeaderValue), AuthenticationError> {
        match self {
            Self::Bearer(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                    .map_err(|err| AuthenticationError::InvalidBearerToken {
                        message: err.to_string(),
                    })?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }

            Self::Basic { username, password } => {
                if username.contains(':') {
                    return Err(AuthenticationError::InvalidUsername {
                        message: "username cannot contain ':'".to_string(),
                    });
                }
                let credentials = STANDARD.encode(format!("{username}:{}", password.as_str()));
                let mut value = HeaderValue::from_str(&format!("Basic {credentials}")).map_err(
                    |err| AuthenticationError::InvalidPassword {
                        message: err.to_string(),
                    },
                )?;
                value.set_sensitive(true);
                Ok((AUTHORIZATION, value))
            }

            Self::ApiKey { header_name, key } => {
                let name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|err| {
                    AuthenticationError::InvalidHeaderName {
                        header_name: header_name.clone(),
                        message: err.to_string(),
                    }
                })?;
                let mut value = HeaderValue::from_str(key.as_str()).map_err(|err| {
                    AuthenticationError::InvalidApiKey {
                        message: err.to_string(),
                    }
                })?;
                value.set_sensitive(true);
                Ok((name, value))
            }
        }
    }

    pub(super) fn apply(&self, headers: &mut HeaderMap) -> Result<(), AuthenticationError> {
        let (name, value) = self.to_header()?;
        headers.insert(name, value);
        Ok(())
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::ApiKey { header_name, .. } => f
                .debug_struct("ApiKey")
                .field("header_name", header_name)
                .field("key", &"[REDACTED]")
                .finish(),
        }
    }
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer(token) => write!(f, "Bearer {token}"),
            Self::Basic { username, .. } => write!(f, "Basic (username: {username})"),
            Self::ApiKey { header_name, key } => write!(f, "ApiKey ({header_name}: {key})"),
        }
    }
}
