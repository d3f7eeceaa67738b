//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the session core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod http_transport;
mod navigator;
mod token_storage;

pub use clock::Clock;
pub use http_transport::{HttpTransport, TransportError};
pub use navigator::{NavigationError, Navigator};
pub use token_storage::{StorageError, TokenStorage};
