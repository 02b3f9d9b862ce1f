//! # litekv-client
//!
//! The storage client boundary the cache crosses to reach the durable
//! store: one trait ([`StorageClient`]), one production implementation
//! over HTTP ([`HttpStorageClient`]), and one in-process implementation for
//! tests and same-process deployments ([`InProcessStorageClient`]).

mod client;
mod http;
mod in_process;

pub use client::StorageClient;
pub use http::HttpStorageClient;
pub use in_process::InProcessStorageClient;
