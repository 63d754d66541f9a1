//! Problems reported by the task endpoints.

use std::borrow::Cow;

use crate::errors::Error;

const ID_FIELD: &[Cow<'static, str>] = &[Cow::Borrowed("id")];
const DUE_DATE_FIELD: &[Cow<'static, str>] = &[Cow::Borrowed("due_date")];
const DETAILS_FIELD: &[Cow<'static, str>] = &[Cow::Borrowed("details")];

pub const INVALID_ID: Error = Error {
    fields: Cow::Borrowed(ID_FIELD),
    id: 0,
    name: Cow::Borrowed("invalid-id"),
    message: Cow::Borrowed("The id was invalid or not supplied."),
};

pub const MISSING_DUE_DATE: Error = Error {
    fields: Cow::Borrowed(DUE_DATE_FIELD),
    id: 0,
    name: Cow::Borrowed("missing-due-date"),
    message: Cow::Borrowed("The due date is required."),
};

pub const MISSING_DETAILS: Error = Error {
    fields: Cow::Borrowed(DETAILS_FIELD),
    id: 0,
    name: Cow::Borrowed("missing-details"),
    message: Cow::Borrowed("The details of the task are required."),
};

pub const TASK_TOO_HARD: Error = Error {
    fields: Cow::Borrowed(DETAILS_FIELD),
    id: 12345,
    name: Cow::Borrowed("task-too-hard"),
    message: Cow::Borrowed("the specified task was deemed overly difficult"),
};

pub const INTERNAL_SERVER_ERROR: Error = Error {
    fields: Cow::Borrowed(&[]),
    id: 54321,
    name: Cow::Borrowed("internal-server-error"),
    message: Cow::Borrowed("Internal Server Error"),
};
