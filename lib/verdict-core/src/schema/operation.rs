use std::collections::BTreeMap;

use http::Method;
use indexmap::{IndexMap, IndexSet};

use super::media_type::MediaType;
use super::responses::{ResponseSchema, Responses};
use super::SchemaError;
use crate::classify::classify;
use crate::decode::Decoder;
use crate::outcome::Outcome;
use crate::transport::RawResponse;

/// One callable operation: method, path template, and expected responses.
///
/// Build it with [`Operation::builder`].
#[derive(Debug, Clone)]
pub struct Operation {
    id: String,
    method: Method,
    path: String,
    responses: Responses,
}

impl Operation {
    /// Starts building an operation.
    ///
    /// The path is a template where parameters use the `{name}` syntax,
    /// e.g. `/users/{id}/posts`.
    pub fn builder(
        id: impl Into<String>,
        method: Method,
        path: impl Into<String>,
    ) -> OperationBuilder {
        OperationBuilder {
            id: id.into(),
            method,
            path: path.into(),
            declared: Vec::new(),
            decoders: Vec::new(),
        }
    }

    /// The operation identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path template.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The expected responses.
    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    /// Classifies a raw response against this operation's responses.
    pub fn classify(&self, raw: &RawResponse) -> Outcome {
        classify(raw, &self.responses)
    }
}

#[derive(Debug, Clone)]
enum Declared {
    Body(String),
    NoBody,
}

/// Builder for [`Operation`].
///
/// The builder keeps apart what the schema document *declares*
/// ([`declare`](Self::declare), [`declare_no_body`](Self::declare_no_body))
/// from the decoders *registered* for it ([`decoder`](Self::decoder)).
/// [`build`](Self::build) checks that both sides agree.
/// [`response`](Self::response) does both at once.
///
/// ```rust
/// use http::Method;
/// use verdict_core::{Decoder, Operation};
///
/// let operation = Operation::builder("deleteUser", Method::DELETE, "/users/{id}")
///     .no_content(204)
///     .response(404, "application/problem+json", Decoder::any())
///     .build()?;
/// assert_eq!(operation.responses().statuses().collect::<Vec<_>>(), vec![204, 404]);
/// # Ok::<(), verdict_core::SchemaError>(())
/// ```
#[derive(Debug)]
pub struct OperationBuilder {
    id: String,
    method: Method,
    path: String,
    declared: Vec<(u16, Declared)>,
    decoders: Vec<(u16, String, Decoder)>,
}

impl OperationBuilder {
    /// Declares that `status` may come with a `media_type` body.
    ///
    /// A decoder must be registered for it with [`decoder`](Self::decoder).
    pub fn declare(mut self, status: u16, media_type: impl Into<String>) -> Self {
        self.declared
            .push((status, Declared::Body(media_type.into())));
        self
    }

    /// Declares that `status` may come without body.
    pub fn declare_no_body(mut self, status: u16) -> Self {
        self.declared.push((status, Declared::NoBody));
        self
    }

    /// Registers the decoder for a declared (status, media type) pair.
    pub fn decoder(mut self, status: u16, media_type: impl Into<String>, decoder: Decoder) -> Self {
        self.decoders.push((status, media_type.into(), decoder));
        self
    }

    /// Declares a (status, media type) pair and registers its decoder.
    pub fn response(self, status: u16, media_type: impl Into<String>, decoder: Decoder) -> Self {
        let media_type = media_type.into();
        self.declare(status, media_type.clone())
            .decoder(status, media_type, decoder)
    }

    /// Declares a status without body, e.g. `204`.
    pub fn no_content(self, status: u16) -> Self {
        self.declare_no_body(status)
    }

    /// Builds the operation.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::InvalidStatus`] for a status outside `100..=599`
    /// - [`SchemaError::InvalidMediaType`] for an unparseable media type
    /// - [`SchemaError::DuplicateDecoder`] if a pair has two decoders
    /// - [`SchemaError::Conformance`] if a declared pair has no decoder,
    ///   or a decoder has no declared pair
    pub fn build(self) -> Result<Operation, SchemaError> {
        let Self {
            id,
            method,
            path,
            declared,
            decoders,
        } = self;

        let mut by_status = BTreeMap::<u16, ResponseSchema>::new();
        let mut declared_pairs = IndexSet::<(u16, MediaType)>::new();
        for (status, declared) in declared {
            check_status(&id, status)?;
            let schema = by_status.entry(status).or_default();
            match declared {
                Declared::NoBody => schema.no_body = true,
                Declared::Body(media_type) => {
                    declared_pairs.insert((status, MediaType::parse(&media_type)?));
                }
            }
        }

        let mut registered = IndexMap::<(u16, MediaType), Decoder>::new();
        for (status, media_type, decoder) in decoders {
            check_status(&id, status)?;
            let key = (status, MediaType::parse(&media_type)?);
            if registered.contains_key(&key) {
                return Err(SchemaError::DuplicateDecoder {
                    operation: id,
                    status,
                    media_type: key.1.to_string(),
                });
            }
            registered.insert(key, decoder);
        }

        let missing = declared_pairs
            .iter()
            .filter(|key| !registered.contains_key(*key))
            .map(describe)
            .collect::<Vec<_>>();
        let undeclared = registered
            .keys()
            .filter(|key| !declared_pairs.contains(*key))
            .map(describe)
            .collect::<Vec<_>>();
        if !missing.is_empty() || !undeclared.is_empty() {
            return Err(SchemaError::Conformance {
                operation: id,
                missing,
                undeclared,
            });
        }

        for key in declared_pairs {
            if let Some(decoder) = registered.shift_remove(&key) {
                let (status, media_type) = key;
                by_status
                    .entry(status)
                    .or_default()
                    .content
                    .insert(media_type, decoder);
            }
        }

        Ok(Operation {
            id,
            method,
            path,
            responses: Responses { by_status },
        })
    }
}

fn check_status(operation: &str, status: u16) -> Result<(), SchemaError> {
    if (100..=599).contains(&status) {
        Ok(())
    } else {
        Err(SchemaError::InvalidStatus {
            operation: operation.to_string(),
            status,
        })
    }
}

fn describe((status, media_type): &(u16, MediaType)) -> String {
    format!("{status} {media_type}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_operation() {
        let operation = Operation::builder("getUser", Method::GET, "/users/{id}")
            .response(200, "application/json", Decoder::any())
            .response(200, "text/plain", Decoder::text())
            .response(404, "application/problem+json", Decoder::any())
            .no_content(304)
            .build()
            .expect("valid operation");

        assert_eq!(operation.id(), "getUser");
        assert_eq!(operation.method(), Method::GET);
        assert_eq!(operation.path(), "/users/{id}");

        let responses = operation.responses();
        assert_eq!(responses.statuses().collect::<Vec<_>>(), vec![200, 304, 404]);

        let ok = responses.get(200).expect("200 declared");
        assert_eq!(ok.expected(), vec!["application/json", "text/plain"]);
        assert!(!ok.declares_no_body());

        let not_modified = responses.get(304).expect("304 declared");
        assert!(not_modified.declares_no_body());
        assert_eq!(not_modified.media_types().count(), 0);
    }

    #[test]
    fn should_normalize_declared_media_types() {
        let operation = Operation::builder("list", Method::GET, "/items")
            .declare(200, "Application/JSON; charset=utf-8")
            .decoder(200, "application/json", Decoder::any())
            .build()
            .expect("declared and registered pairs are the same");

        let ok = operation.responses().get(200).expect("200 declared");
        assert_eq!(ok.expected(), vec!["application/json"]);
    }

    #[test]
    fn should_reject_declared_pair_without_decoder() {
        let result = Operation::builder("list", Method::GET, "/items")
            .declare(200, "application/json")
            .response(400, "application/json", Decoder::any())
            .build();

        let Err(error) = result else {
            panic!("should fail");
        };
        assert_eq!(
            error,
            SchemaError::Conformance {
                operation: "list".to_string(),
                missing: vec!["200 application/json".to_string()],
                undeclared: vec![],
            }
        );
    }

    #[test]
    fn should_reject_decoder_without_declared_pair() {
        let result = Operation::builder("list", Method::GET, "/items")
            .response(200, "application/json", Decoder::any())
            .decoder(200, "text/html", Decoder::text())
            .build();

        let Err(error) = result else {
            panic!("should fail");
        };
        assert_eq!(
            error,
            SchemaError::Conformance {
                operation: "list".to_string(),
                missing: vec![],
                undeclared: vec!["200 text/html".to_string()],
            }
        );
    }

    #[test]
    fn should_reject_duplicate_decoder() {
        let result = Operation::builder("list", Method::GET, "/items")
            .response(200, "application/json", Decoder::any())
            .decoder(200, "application/json", Decoder::any())
            .build();

        assert!(matches!(
            result,
            Err(SchemaError::DuplicateDecoder { status: 200, .. })
        ));
    }

    #[test]
    fn should_reject_invalid_status() {
        let result = Operation::builder("list", Method::GET, "/items")
            .response(42, "application/json", Decoder::any())
            .build();

        assert!(matches!(
            result,
            Err(SchemaError::InvalidStatus { status: 42, .. })
        ));
    }

    #[test]
    fn should_reject_invalid_media_type() {
        let result = Operation::builder("list", Method::GET, "/items")
            .response(200, "json", Decoder::any())
            .build();

        assert!(matches!(result, Err(SchemaError::InvalidMediaType { .. })));
    }
}
