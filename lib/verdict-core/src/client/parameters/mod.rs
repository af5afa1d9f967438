//! Request parameters of a call.
//!
//! - [`CallPath`] path template and its parameters (e.g. `/users/{id}`)
//! - [`CallQuery`] query string parameters
//! - [`CallHeaders`] extra headers
//! - [`CallBody`] request body with its content type

mod param;
pub use self::param::{ParamStyle, ParamValue, ParameterValue};

mod path;
pub use self::path::CallPath;
pub(in crate::client) use self::path::PathResolved;

mod query;
pub use self::query::CallQuery;

mod headers;
pub use self::headers::CallHeaders;

mod body;
pub use self::body::CallBody;
