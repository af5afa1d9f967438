/// Errors raised while building a [`SchemaTable`](super::SchemaTable).
///
/// These are configuration errors: they surface once, when the table is built,
/// never while classifying a response.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum SchemaError {
    /// A declared or registered media type cannot be parsed.
    #[display("Invalid media type '{value}': {message}")]
    InvalidMediaType {
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        message: String,
    },

    /// A status code outside the `100..=599` range.
    #[display("Invalid status code {status} in operation '{operation}'")]
    InvalidStatus {
        /// The operation declaring the status.
        operation: String,
        /// The rejected status code.
        status: u16,
    },

    /// Two decoders registered for the same (status, media type) pair.
    #[display("Duplicate decoder for {status} {media_type} in operation '{operation}'")]
    DuplicateDecoder {
        /// The operation declaring the pair.
        operation: String,
        /// The status code.
        status: u16,
        /// The media type.
        media_type: String,
    },

    /// Declared pairs and registered decoders disagree.
    ///
    /// Every declared (status, media type) pair needs a decoder, and every
    /// decoder must match a declared pair.
    #[display(
        "Operation '{operation}' does not conform to its schema: missing decoders {missing:?}, undeclared decoders {undeclared:?}"
    )]
    Conformance {
        /// The operation.
        operation: String,
        /// Declared pairs without decoder, as `status media/type`.
        missing: Vec<String>,
        /// Decoders without declared pair, as `status media/type`.
        undeclared: Vec<String>,
    },

    /// Two operations share the same identifier.
    #[display("Duplicate operation '{operation}'")]
    DuplicateOperation {
        /// The duplicated operation id.
        operation: String,
    },
}
