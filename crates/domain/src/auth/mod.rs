//! Session authentication types

mod types;

pub use types::{LoginRequest, LoginResponse, SessionState, bearer_value};
