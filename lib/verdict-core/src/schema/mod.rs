//! Expected responses of every operation, with their decoders.
//!
//! A [`SchemaTable`] is built once, checked for conformance, then shared
//! read-only by the client and the classifier.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

mod error;
mod media_type;
mod operation;
mod responses;

pub use self::error::SchemaError;
pub use self::media_type::{MediaType, NO_CONTENT_TYPE};
pub use self::operation::{Operation, OperationBuilder};
pub(crate) use self::responses::BodySpec;
pub use self::responses::{ResponseSchema, Responses};

/// Every operation known to a client, by operation id.
#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    operations: IndexMap<String, Arc<Operation>>,
}

impl SchemaTable {
    /// Starts building a table.
    pub fn builder() -> SchemaTableBuilder {
        SchemaTableBuilder::default()
    }

    /// The operation with this id.
    pub fn operation(&self, id: &str) -> Option<&Arc<Operation>> {
        self.operations.get(id)
    }

    /// Operations, in registration order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values().map(AsRef::as_ref)
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the table has no operation.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Builder for [`SchemaTable`].
///
/// Operation errors are kept until [`build`](Self::build), so operations can
/// be chained without intermediate `?`.
///
/// ```rust
/// use http::Method;
/// use verdict_core::{Decoder, Operation, SchemaTable};
///
/// let table = SchemaTable::builder()
///     .operation(
///         Operation::builder("listUsers", Method::GET, "/users")
///             .response(200, "application/json", Decoder::any()),
///     )
///     .operation(
///         Operation::builder("deleteUser", Method::DELETE, "/users/{id}").no_content(204),
///     )
///     .build()?;
///
/// assert_eq!(table.len(), 2);
/// assert!(table.operation("listUsers").is_some());
/// # Ok::<(), verdict_core::SchemaError>(())
/// ```
#[derive(Debug, Default)]
pub struct SchemaTableBuilder {
    operations: Vec<Result<Operation, SchemaError>>,
}

impl SchemaTableBuilder {
    /// Adds an operation, built when the table is built.
    pub fn operation(mut self, operation: OperationBuilder) -> Self {
        self.operations.push(operation.build());
        self
    }

    /// Adds an already built operation.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(Ok(operation));
        self
    }

    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Returns the first operation error, or [`SchemaError::DuplicateOperation`]
    /// if two operations share an id.
    pub fn build(self) -> Result<SchemaTable, SchemaError> {
        let mut operations = IndexMap::with_capacity(self.operations.len());
        for operation in self.operations {
            let operation = operation?;
            let id = operation.id().to_string();
            if operations.contains_key(&id) {
                return Err(SchemaError::DuplicateOperation { operation: id });
            }
            debug!(
                operation = %id,
                statuses = ?operation.responses().statuses().collect::<Vec<_>>(),
                "registering operation"
            );
            operations.insert(id, Arc::new(operation));
        }

        Ok(SchemaTable { operations })
    }
}
