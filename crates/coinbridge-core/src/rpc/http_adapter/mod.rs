//! JSON-RPC transport over HTTP.
//!
//! Implements [`RpcTransport`](super::RpcTransport) with `reqwest`, basic or
//! cookie authentication, and optional request rate limiting.

mod client;
mod connection;
mod protocol;

pub use client::HttpRpcClient;
