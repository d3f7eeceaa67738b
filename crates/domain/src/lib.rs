//! Portal Domain - Core session types
//!
//! This crate defines the domain model for the Portal API session.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod event;
pub mod navigation;
pub mod notification;
pub mod request;
pub mod resource;
pub mod response;
pub mod settings;

pub use auth::{LoginRequest, LoginResponse, SessionState, bearer_value};
pub use error::{DomainError, DomainResult};
pub use event::{ErrorEvent, ErrorKind};
pub use navigation::{GuardDecision, NavigationEvent, NavigationRules};
pub use notification::{Toast, ToastLevel};
pub use request::{ApiRequest, HttpMethod, RequestBody};
pub use resource::ResourceKind;
pub use response::ApiResponse;
pub use settings::{ClientSettings, backend_origin_for_host};
