//! Portal Application - Session and use cases
//!
//! This crate holds the authenticated HTTP session and the services built on
//! it. It depends only on the domain crate and defines ports that the
//! infrastructure layer implements.

pub mod auth;
pub mod error;
pub mod events;
pub mod notifications;
pub mod ports;
pub mod session;
pub mod use_cases;

pub use auth::MemoryTokenStore;
pub use error::{SessionError, SessionResult};
pub use events::{ErrorBus, ErrorListener};
pub use notifications::ToastQueue;
pub use ports::{
    Clock, HttpTransport, NavigationError, Navigator, StorageError, TokenStorage, TransportError,
};
pub use session::AuthSession;
pub use use_cases::{AuthService, ContactService, ContentService};
