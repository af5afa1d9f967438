use std::collections::BTreeSet;
use std::fmt::{self, Debug};
use std::sync::Arc;

use indexmap::IndexMap;

use super::{BoundaryError, Outcome};
use crate::schema::Responses;

/// Identifies one kind of outcome.
///
/// Success and HTTP error tags carry their status code, boundary tags do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum OutcomeTag {
    /// A declared `2xx` status.
    #[display("success:{_0}")]
    Success(u16),
    /// A declared status outside `2xx`.
    #[display("http_error:{_0}")]
    HttpError(u16),
    /// See [`BoundaryError::Transport`].
    #[display("transport")]
    Transport,
    /// See [`BoundaryError::UnexpectedStatus`].
    #[display("unexpected_status")]
    UnexpectedStatus,
    /// See [`BoundaryError::UnexpectedContentType`].
    #[display("unexpected_content_type")]
    UnexpectedContentType,
    /// See [`BoundaryError::Parse`].
    #[display("parse")]
    Parse,
    /// See [`BoundaryError::Decode`].
    #[display("decode")]
    Decode,
}

impl OutcomeTag {
    /// The five boundary tags, in classification order.
    pub const BOUNDARY: [Self; 5] = [
        Self::Transport,
        Self::UnexpectedStatus,
        Self::UnexpectedContentType,
        Self::Parse,
        Self::Decode,
    ];

    /// The tag of a declared status.
    pub fn for_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            Self::Success(status)
        } else {
            Self::HttpError(status)
        }
    }

    /// Whether this is a boundary tag.
    pub fn is_boundary(self) -> bool {
        !matches!(self, Self::Success(_) | Self::HttpError(_))
    }
}

impl From<&BoundaryError> for OutcomeTag {
    fn from(error: &BoundaryError) -> Self {
        match error {
            BoundaryError::Transport(_) => Self::Transport,
            BoundaryError::UnexpectedStatus { .. } => Self::UnexpectedStatus,
            BoundaryError::UnexpectedContentType { .. } => Self::UnexpectedContentType,
            BoundaryError::Parse { .. } => Self::Parse,
            BoundaryError::Decode { .. } => Self::Decode,
        }
    }
}

/// No handler registered for an outcome.
///
/// The outcome is handed back untouched.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("No handler for outcome '{tag}'")]
pub struct UnhandledTag {
    /// The outcome tag.
    pub tag: OutcomeTag,
    /// The unhandled outcome.
    #[error(not(source))]
    pub outcome: Outcome,
}

/// Handled tags differ from the tags an operation can produce.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("Outcome handlers do not match the schema: missing [{}], unexpected [{}]", join(missing), join(unexpected))]
pub struct TagMismatch {
    /// Tags the operation can produce, without handler.
    pub missing: Vec<OutcomeTag>,
    /// Handled tags the operation never produces.
    pub unexpected: Vec<OutcomeTag>,
}

fn join(tags: &[OutcomeTag]) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

type Handler<R> = Arc<dyn Fn(Outcome) -> R + Send + Sync>;

/// Dispatches outcomes to one handler per tag.
///
/// A tag without handler is reported instead of silently ignored, and
/// [`check_exhaustive`](Self::check_exhaustive) compares the handled tags
/// with what an operation can produce.
///
/// ```rust
/// use verdict_core::{Outcome, OutcomeHandlers, OutcomeTag, TransportError};
///
/// let handlers = OutcomeHandlers::new()
///     .on(OutcomeTag::Success(200), |_| "ok")
///     .on_boundary(|_| "boundary");
///
/// let outcome = Outcome::from(TransportError::cancelled());
/// assert_eq!(handlers.handle(outcome), Ok("boundary"));
/// ```
pub struct OutcomeHandlers<R> {
    handlers: IndexMap<OutcomeTag, Handler<R>>,
}

impl<R> OutcomeHandlers<R> {
    /// No handler yet.
    pub fn new() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }

    /// Registers the handler of a tag, replacing any previous one.
    #[must_use]
    pub fn on<F>(mut self, tag: OutcomeTag, handler: F) -> Self
    where
        F: Fn(Outcome) -> R + Send + Sync + 'static,
    {
        self.handlers.insert(tag, Arc::new(handler));
        self
    }

    /// Registers the same handler for the five boundary tags.
    #[must_use]
    pub fn on_boundary<F>(mut self, handler: F) -> Self
    where
        F: Fn(Outcome) -> R + Send + Sync + 'static,
    {
        let handler: Handler<R> = Arc::new(handler);
        for tag in OutcomeTag::BOUNDARY {
            self.handlers.insert(tag, Arc::clone(&handler));
        }
        self
    }

    /// Handled tags, in registration order.
    pub fn tags(&self) -> impl Iterator<Item = OutcomeTag> + '_ {
        self.handlers.keys().copied()
    }

    /// Runs the handler of the outcome tag.
    ///
    /// # Errors
    ///
    /// Returns [`UnhandledTag`], with the outcome, if the tag has no handler.
    pub fn handle(&self, outcome: Outcome) -> Result<R, UnhandledTag> {
        let tag = outcome.tag();
        match self.handlers.get(&tag) {
            Some(handler) => Ok(handler(outcome)),
            None => Err(UnhandledTag { tag, outcome }),
        }
    }

    /// Checks that handled tags are exactly those the responses can produce.
    ///
    /// # Errors
    ///
    /// Returns [`TagMismatch`] listing missing and unexpected tags, both sorted.
    pub fn check_exhaustive(&self, responses: &Responses) -> Result<(), TagMismatch> {
        let expected = responses.tags().into_iter().collect::<BTreeSet<_>>();
        let handled = self.tags().collect::<BTreeSet<_>>();

        let missing = expected.difference(&handled).copied().collect::<Vec<_>>();
        let unexpected = handled.difference(&expected).copied().collect::<Vec<_>>();
        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(TagMismatch {
                missing,
                unexpected,
            })
        }
    }
}

impl<R> Default for OutcomeHandlers<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for OutcomeHandlers<R> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
        }
    }
}

impl<R> Debug for OutcomeHandlers<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeHandlers")
            .field("tags", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}
