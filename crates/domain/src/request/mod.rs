//! Outbound HTTP request types

mod body;
mod header;
mod method;
mod spec;

pub use body::{FORM_CONTENT_TYPE, JSON_CONTENT_TYPE, RequestBody};
pub use header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, Header, Headers};
pub use method::HttpMethod;
pub use spec::ApiRequest;
