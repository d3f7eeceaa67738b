//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use portal_domain::{HttpMethod, ResourceKind};
use serde_json::Value;

/// Portal API client
///
/// Talks to the portal backend with the stored admin credentials. Results
/// are printed as JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "portal", author, version, about)]
pub struct Cli {
    /// Settings file (defaults to the portal config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Token file (defaults to the portal config directory)
    #[arg(long, global = true)]
    pub token_file: Option<PathBuf>,

    /// Page the client acts from; an expired session on an admin page
    /// redirects to the login page
    #[arg(long, global = true, default_value = "/admin")]
    pub page: String,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do once the session is set up.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Sign in and store the issued token
    Login {
        /// Account name
        username: String,
        /// Account password
        password: String,
        /// Send credentials as JSON instead of a form
        #[arg(long)]
        json: bool,
    },

    /// Forget the stored token
    Logout,

    /// Show the signed-in user
    Me,

    /// List a resource
    List {
        /// Resource name (projects, articles, services, team, ...)
        resource: ResourceKind,
        /// Filter as key=value; repeatable
        #[arg(short, long = "query", value_parser = parse_pair)]
        query: Vec<(String, String)>,
    },

    /// Fetch one item by id or slug
    Get {
        /// Resource name
        resource: ResourceKind,
        /// Item id or slug
        id: String,
    },

    /// Delete one item
    Delete {
        /// Resource name
        resource: ResourceKind,
        /// Item id
        id: String,
    },

    /// Send an arbitrary request through the session
    Request {
        /// HTTP method
        method: HttpMethod,
        /// Path relative to the API base URL
        path: String,
        /// JSON request body
        #[arg(long)]
        json: Option<Value>,
    },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}
