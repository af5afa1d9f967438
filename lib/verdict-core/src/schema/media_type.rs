use std::hash::{Hash, Hasher};
use std::str::FromStr;

use http::HeaderMap;
use http::header::CONTENT_TYPE;
use mime::Mime;

use super::SchemaError;

/// Content type reported when a response carries no body, or no `Content-Type` header.
pub const NO_CONTENT_TYPE: &str = "none";

/// A normalized media type, without parameters.
///
/// Parameters such as `charset` are stripped and the `type/subtype` essence is
/// lower-cased, so `Application/JSON; charset=utf-8` and `application/json`
/// are the same `MediaType`.
///
/// ```rust
/// use verdict_core::MediaType;
///
/// let declared: MediaType = "application/json".parse()?;
/// let actual = MediaType::parse("Application/JSON; charset=utf-8")?;
/// assert_eq!(declared, actual);
/// assert!(actual.is_json());
/// # Ok::<(), verdict_core::SchemaError>(())
/// ```
#[derive(Debug, Clone, derive_more::Display)]
#[display("{essence}")]
pub struct MediaType {
    essence: String,
    mime: Mime,
}

/// How well a declared media type matches an actual one.
///
/// Ordered from the most to the least specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum MatchTier {
    Exact,
    SubtypeWildcard,
    Wildcard,
}

impl MediaType {
    /// Parses a media type, ignoring any parameter.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidMediaType`] if the value is not a `type/subtype` pair.
    pub fn parse(value: &str) -> Result<Self, SchemaError> {
        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        let mime = essence
            .parse::<Mime>()
            .map_err(|err| SchemaError::InvalidMediaType {
                value: value.to_string(),
                message: err.to_string(),
            })?;

        Ok(Self { essence, mime })
    }

    /// Reads the `Content-Type` header of a response.
    ///
    /// Returns `None` if the header is missing, not valid ASCII, or not a media type.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
        Self::parse(value).ok()
    }

    /// The `type/subtype` essence, e.g. `application/json`.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// `true` for `application/json` and any `+json` structured syntax suffix.
    pub fn is_json(&self) -> bool {
        self.mime.subtype() == mime::JSON
            || self
                .mime
                .suffix()
                .is_some_and(|suffix| suffix == mime::JSON)
    }

    /// `true` for `application/x-www-form-urlencoded`.
    pub fn is_form(&self) -> bool {
        self.mime.type_() == mime::APPLICATION && self.mime.subtype() == mime::WWW_FORM_URLENCODED
    }

    /// `true` for media ranges such as `text/*` or `*/*`.
    pub fn is_range(&self) -> bool {
        self.mime.type_() == mime::STAR || self.mime.subtype() == mime::STAR
    }

    /// Matches this declared media type (possibly a range) against an actual one.
    pub(crate) fn match_tier(&self, actual: &Self) -> Option<MatchTier> {
        if self == actual {
            return Some(MatchTier::Exact);
        }
        if self.mime.type_() == mime::STAR && self.mime.subtype() == mime::STAR {
            return Some(MatchTier::Wildcard);
        }
        if self.mime.subtype() == mime::STAR && self.mime.type_() == actual.mime.type_() {
            return Some(MatchTier::SubtypeWildcard);
        }
        None
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.essence == other.essence
    }
}

impl Eq for MediaType {}

impl Hash for MediaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.essence.hash(state);
    }
}

impl FromStr for MediaType {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for MediaType {
    type Error = SchemaError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
