//! Daemon RPC layer.
//!
//! [`RpcTransport`] is the seam to the network: it moves one JSON-RPC call
//! and hands back the raw response body. Everything above it (envelope
//! inspection, error classification, dialect selection, normalization)
//! lives in [`CoinRpc`], which is driven by the coin's capability profile.

mod chain_info;
mod coin;
mod envelope;
mod http_adapter;
#[cfg(test)]
pub mod mock;
pub mod parsing;

pub use coin::CoinRpc;
pub use http_adapter::HttpRpcClient;

use async_trait::async_trait;

use crate::error::CoreError;

/// Moves a single JSON-RPC request to a daemon.
///
/// Implementations own authentication, connection management and any
/// retry or rate-limit policy. Backend-level errors are *not* detected here:
/// the body is returned as-is so the caller can inspect the `error` member
/// (and, for some daemons, sanitize duplicate keys before decoding).
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// `params` is a JSON array (positional) or object (named).
    async fn call(&self, method: &str, params: serde_json::Value) -> Result<String, CoreError>;
}
