//! Stable JSON for files the client writes.
//!
//! - Keys sorted (via `BTreeMap` in persisted types)
//! - 2-space indentation
//! - Trailing newline

mod json;

pub use json::*;
