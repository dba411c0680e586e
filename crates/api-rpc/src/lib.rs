//! JSON-RPC API Layer
//!
//! Implements the JSON-RPC 2.0 server for the Mediaforge queue: job
//! submission and queue inspection, nothing else. Processing outcomes are
//! learned by polling status or reading persisted results.

pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
