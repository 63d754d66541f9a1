//! Request-side helpers.
//!
//! # Responsibilities
//! - Build synthetic requests for tests with the same option pattern used for responses
//! - Decode JSON bodies under a configurable Content-Type policy
//! - Read headers, path elements and query values leniently

pub mod builder;
pub mod json;
pub mod read;

pub use builder::{new_test_request, RequestConfig, RequestOption};
pub use json::{deserialize_json, is_json_content_type, ContentTypePolicy, DecodeError, JsonRequest};
pub use read::{
    query_value, query_values, read_numeric_path_element, read_path_element, read_time_header,
    read_u64_header,
};
