//! HTTP access to the hosted backend: a PostgREST-style table API under
//! `/rest/v1` and a GoTrue-style auth API under `/auth/v1`.

pub mod auth;
pub mod client;
pub mod query;
pub mod tasks;

pub use auth::{AuthClient, AuthError};
pub use client::BackendClient;
pub use query::TableQuery;
pub use tasks::RestTaskStore;
