//! Problem descriptors carried in the JSON error envelope.
//!
//! # Wire Shape
//! ```text
//! {"errors": [{"fields": ["body"], "id": 7, "name": "bad-id", "message": "..."}]}
//! ```
//! Every problem field is omitted when empty or zero, and the `errors` key is
//! omitted when there are no problems.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// One problem, most likely with the calling HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct Error {
    /// Locations of the problem within the request. Conventional prefixes are
    /// "path", "query", "header", "form" and "body".
    #[serde(default, skip_serializing_if = "no_fields")]
    pub fields: Cow<'static, [Cow<'static, str>]>,

    /// Numeric contract code (0 = unset).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub id: i64,

    /// String contract code (empty = unset).
    #[serde(default, skip_serializing_if = "is_blank")]
    pub name: Cow<'static, str>,

    /// Human-readable explanation.
    #[serde(default, skip_serializing_if = "is_blank")]
    pub message: Cow<'static, str>,
}

fn no_fields(fields: &Cow<'static, [Cow<'static, str>]>) -> bool {
    fields.is_empty()
}

fn is_zero(id: &i64) -> bool {
    *id == 0
}

fn is_blank(value: &Cow<'static, str>) -> bool {
    value.is_empty()
}

impl Error {
    /// A problem with a name and message and no fields.
    pub const fn new(name: &'static str, message: &'static str) -> Self {
        Self {
            fields: Cow::Borrowed(&[]),
            id: 0,
            name: Cow::Borrowed(name),
            message: Cow::Borrowed(message),
        }
    }

    /// Replace the numeric contract code.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Replace the offending field locations.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.fields = fields.into_iter().map(Into::into).collect::<Vec<_>>().into();
        self
    }

    /// Replace the message.
    pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
        self.message = message.into();
        self
    }
}

/// Ordered set of problems. Order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Errors {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    errors: Vec<Error>,
}

impl Errors {
    pub fn new(errors: impl IntoIterator<Item = Error>) -> Self {
        Self {
            errors: errors.into_iter().collect(),
        }
    }

    /// Add problems to the tail.
    pub fn append(&mut self, errors: impl IntoIterator<Item = Error>) {
        self.errors.extend(errors);
    }

    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.errors.iter()
    }

    /// Remove all problems, keeping the allocation.
    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

impl FromIterator<Error> for Errors {
    fn from_iter<I: IntoIterator<Item = Error>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;
    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

const BODY_FIELD: &[Cow<'static, str>] = &[Cow::Borrowed("body")];
const CONTENT_TYPE_FIELD: &[Cow<'static, str>] = &[Cow::Borrowed("header.Content-Type")];

pub const INTERNAL_SERVER_ERROR: Error = Error::new("internal-server-error", "Internal Server Error");

pub const UNSUPPORTED_REQUEST_CONTENT_TYPE: Error = Error {
    fields: Cow::Borrowed(CONTENT_TYPE_FIELD),
    id: 0,
    name: Cow::Borrowed("unsupported-request-content-type"),
    message: Cow::Borrowed("The request body must be JSON with a matching Content-Type header."),
};

pub const INVALID_REQUEST_JSON_BODY: Error = Error {
    fields: Cow::Borrowed(BODY_FIELD),
    id: 0,
    name: Cow::Borrowed("malformed-request-payload"),
    message: Cow::Borrowed("The body did not contain well-formed data and could not be properly deserialized."),
};

pub const REQUEST_BODY_TOO_LARGE: Error = Error {
    fields: Cow::Borrowed(BODY_FIELD),
    id: 0,
    name: Cow::Borrowed("request-body-too-large"),
    message: Cow::Borrowed("The request body exceeded the allowed size."),
};
