//! Maps a raw response onto exactly one [`Outcome`].
//!
//! The steps run in a fixed order, and the first failing step decides the
//! outcome:
//!
//! 1. status lookup, else [`BoundaryError::UnexpectedStatus`]
//! 2. content type match, else [`BoundaryError::UnexpectedContentType`]
//! 3. a response without body succeeds right away
//! 4. body parsing, else [`BoundaryError::Parse`]
//! 5. decoding, else [`BoundaryError::Decode`]
//! 6. tagging: `2xx` is a success, anything else an HTTP error
//!
//! Classification performs no I/O and never panics, even for a panicking
//! decoder.

use tracing::debug;

use crate::decode::{DecodeInput, Decoder, parse_body};
use crate::outcome::{Body, BoundaryError, ErrorCause, Outcome, Response};
use crate::schema::{BodySpec, MediaType, NO_CONTENT_TYPE, ResponseSchema, Responses};
use crate::transport::RawResponse;

/// Classifies a raw response against the expected responses of an operation.
///
/// The same input always gives the same outcome.
pub fn classify(raw: &RawResponse, responses: &Responses) -> Outcome {
    let outcome = match classify_response(raw, responses) {
        Ok(response) => Outcome::from_response(response),
        Err(error) => Outcome::Boundary(error),
    };
    debug!(status = raw.status(), tag = %outcome.tag(), "classified");
    outcome
}

fn classify_response(raw: &RawResponse, responses: &Responses) -> Result<Response, BoundaryError> {
    let schema = lookup_status(raw, responses)?;
    let actual = raw.content_type();
    match match_content_type(raw, schema, actual.as_ref())? {
        BodySpec::NoBody => Ok(Response::new(raw.status(), NO_CONTENT_TYPE, Body::Empty)),
        BodySpec::Decode(decoder) => {
            // a match on a declared media type implies an actual content type
            let media_type = actual.ok_or_else(|| unexpected_content_type(raw, schema, None))?;
            decode_body(raw, &media_type, decoder)
        }
    }
}

fn lookup_status<'a>(
    raw: &RawResponse,
    responses: &'a Responses,
) -> Result<&'a ResponseSchema, BoundaryError> {
    responses
        .get(raw.status())
        .ok_or_else(|| BoundaryError::UnexpectedStatus {
            status: raw.status(),
            raw_body: raw.body().to_string(),
        })
}

fn match_content_type<'a>(
    raw: &RawResponse,
    schema: &'a ResponseSchema,
    actual: Option<&MediaType>,
) -> Result<BodySpec<'a>, BoundaryError> {
    schema
        .resolve(actual)
        .ok_or_else(|| unexpected_content_type(raw, schema, actual))
}

fn unexpected_content_type(
    raw: &RawResponse,
    schema: &ResponseSchema,
    actual: Option<&MediaType>,
) -> BoundaryError {
    BoundaryError::UnexpectedContentType {
        status: raw.status(),
        expected: schema.expected(),
        actual: actual.map_or_else(|| NO_CONTENT_TYPE.to_string(), ToString::to_string),
        raw_body: raw.body().to_string(),
    }
}

fn decode_body(
    raw: &RawResponse,
    media_type: &MediaType,
    decoder: &Decoder,
) -> Result<Response, BoundaryError> {
    let value = parse_body(media_type, raw.body()).map_err(|cause| BoundaryError::Parse {
        status: raw.status(),
        content_type: media_type.to_string(),
        cause,
        raw_body: raw.body().to_string(),
    })?;

    let input = DecodeInput {
        status: raw.status(),
        content_type: media_type.essence(),
        raw_body: raw.body(),
        value: &value,
    };
    let decoded = decoder.decode(&input).map_err(|failure| {
        debug!(decoder = decoder.name(), %failure, "decoder rejected the body");
        BoundaryError::Decode {
            status: raw.status(),
            content_type: media_type.to_string(),
            cause: ErrorCause::from(failure),
            raw_body: raw.body().to_string(),
        }
    })?;

    let (value, typed) = decoded.into_parts();
    Ok(Response::new(raw.status(), media_type.essence(), Body::Value(value)).with_typed(typed))
}
