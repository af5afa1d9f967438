use std::collections::BTreeMap;

use indexmap::IndexMap;

use super::media_type::{MediaType, NO_CONTENT_TYPE};
use crate::decode::Decoder;
use crate::outcome::OutcomeTag;

/// What one status code of an operation may carry.
///
/// A status can declare any number of media types, each with its decoder,
/// and/or declare that it has no body (e.g. `204 No Content`).
#[derive(Debug, Clone, Default)]
pub struct ResponseSchema {
    pub(super) content: IndexMap<MediaType, Decoder>,
    pub(super) no_body: bool,
}

/// The body handling selected for a response by its content type.
#[derive(Debug, Clone, Copy)]
pub(crate) enum BodySpec<'a> {
    NoBody,
    Decode(&'a Decoder),
}

impl ResponseSchema {
    /// Declared media types, in declaration order.
    pub fn media_types(&self) -> impl Iterator<Item = &MediaType> {
        self.content.keys()
    }

    /// The decoder registered for a declared media type.
    pub fn decoder(&self, media_type: &MediaType) -> Option<&Decoder> {
        self.content.get(media_type)
    }

    /// Whether this status declares a response without body.
    pub fn declares_no_body(&self) -> bool {
        self.no_body
    }

    /// The declared set, as reported by an unexpected content type.
    ///
    /// Media types come in declaration order, followed by `"none"` if the
    /// status also declares a response without body.
    pub fn expected(&self) -> Vec<String> {
        let mut result = self
            .content
            .keys()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        if self.no_body {
            result.push(NO_CONTENT_TYPE.to_string());
        }
        result
    }

    /// Selects how to handle the body given the actual content type.
    ///
    /// Exact matches win over `type/*` ranges, which win over `*/*`.
    /// Within a tier the first declared media type wins.
    pub(crate) fn resolve(&self, actual: Option<&MediaType>) -> Option<BodySpec<'_>> {
        if let Some(actual) = actual {
            let best = self
                .content
                .iter()
                .filter_map(|(declared, decoder)| {
                    declared.match_tier(actual).map(|tier| (tier, decoder))
                })
                .min_by_key(|(tier, _)| *tier);
            if let Some((_, decoder)) = best {
                return Some(BodySpec::Decode(decoder));
            }
        }

        if self.no_body && (actual.is_none() || self.content.is_empty()) {
            return Some(BodySpec::NoBody);
        }

        None
    }
}

/// Expected responses of an operation, by status code.
#[derive(Debug, Clone, Default)]
pub struct Responses {
    pub(super) by_status: BTreeMap<u16, ResponseSchema>,
}

impl Responses {
    /// The schema declared for a status code.
    pub fn get(&self, status: u16) -> Option<&ResponseSchema> {
        self.by_status.get(&status)
    }

    /// Declared status codes, in ascending order.
    pub fn statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.by_status.keys().copied()
    }

    /// Declared statuses with their schema, in ascending status order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ResponseSchema)> {
        self.by_status.iter().map(|(status, schema)| (*status, schema))
    }

    /// Whether no status is declared.
    pub fn is_empty(&self) -> bool {
        self.by_status.is_empty()
    }

    /// Every outcome tag a call of this operation can produce.
    ///
    /// One success or HTTP error tag per declared status, then the five
    /// boundary tags.
    pub fn tags(&self) -> Vec<OutcomeTag> {
        self.statuses()
            .map(OutcomeTag::for_status)
            .chain(OutcomeTag::BOUNDARY)
            .collect()
    }
}
