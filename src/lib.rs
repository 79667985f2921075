//! `wpgraphql-http` is an async client for the GraphQL API of a headless
//! WordPress site.
//!
//! Each call posts `{ query, variables }` to one endpoint, bounds every attempt
//! with a deadline and retries failures with exponential backoff:
//! - [`GraphQlClient::query`] / [`GraphQlClient::query_as`]
//! - [`GraphQlClient::query_with`] for per-call overrides
//! - [`GraphQlClient::query_cancellable`] with a [`CancellationToken`]
//!
//! [`WordPress`] layers the site's page and post queries on top.

mod client;
mod error;
pub mod events;
mod options;
mod retry;
mod variables;
mod wire;
pub mod wordpress;

pub use client::{GraphQlClient, ENDPOINT_ENV, TOKEN_ENV};
pub use error::{AttemptError, GraphQlError};
pub use events::{RetryEvent, RetryObserver};
pub use options::{ClientOptions, QueryOptions};
pub use tokio_util::sync::CancellationToken;
pub use variables::Variables;
pub use wire::{Location, RemoteError};
pub use wordpress::WordPress;

use retry::RetryPolicy;

pub type Result<T> = std::result::Result<T, GraphQlError>;
