/// Forum Service Library
///
/// A forum backend: users, posts, and comments behind a GraphQL API, with
/// pluggable storage and bearer-token authentication.
///
/// ## Modules
///
/// - `config`: Service configuration
/// - `domain`: Authenticated actions (login, register, posts, comments)
/// - `error`: Error types
/// - `middleware`: Advisory identity resolution for inbound requests
/// - `models`: Data models
/// - `schema`: GraphQL schema and resolvers
/// - `storage`: Storage contract plus the postgres and in-memory engines
pub mod config;
pub mod domain;
pub mod error;
pub mod middleware;
pub mod models;
pub mod schema;
pub mod storage;

// Re-export commonly used types
pub use error::{ForumError, Result};
