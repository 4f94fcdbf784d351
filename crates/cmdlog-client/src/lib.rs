//! cmdlog-client: HTTP transport for the Elasticsearch search API
//!
//! Sends a [`QueryRequest`](cmdlog_core::QueryRequest) to
//! `<base-url>/<index-pattern>/_search` and decodes the reply.

pub mod client;
pub mod config;
pub mod error;

pub use client::{SearchClient, Transport};
pub use config::ClientConfig;
pub use error::ClientError;
