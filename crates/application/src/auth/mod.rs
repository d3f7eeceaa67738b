//! Authentication support for the Portal session.
//!
//! This module provides:
//! - In-memory token storage for tests and short-lived processes

mod token_store;

pub use token_store::MemoryTokenStore;
