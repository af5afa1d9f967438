use serde_json::{Map, Value};

use crate::outcome::ErrorCause;
use crate::schema::MediaType;

/// Parses a body text into a structured value, by media type.
///
/// JSON media types (including `+json` suffixes) are parsed as JSON, form
/// bodies become an object of strings, anything else is kept as a string.
pub(crate) fn parse_body(media_type: &MediaType, text: &str) -> Result<Value, ErrorCause> {
    if media_type.is_json() {
        serde_json::from_str(text).map_err(ErrorCause::from_error)
    } else if media_type.is_form() {
        parse_form(text)
    } else {
        Ok(Value::String(text.to_string()))
    }
}

fn parse_form(text: &str) -> Result<Value, ErrorCause> {
    let pairs =
        serde_urlencoded::from_str::<Vec<(String, String)>>(text).map_err(ErrorCause::from_error)?;

    let mut result = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match result.get_mut(&key) {
            None => {
                result.insert(key, value);
            }
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }

    Ok(Value::Object(result))
}
