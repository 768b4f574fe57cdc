use crate::coins::RPC_INVALID_ADDRESS_OR_KEY;

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("RPC communication failure: {0}")]
    Rpc(#[from] RpcError),

    /// A backend-reported error, annotated with the request that produced it.
    #[error("{method} ({context}): backend error {code}: {message}")]
    Backend {
        method: &'static str,
        context: String,
        code: i64,
        message: String,
    },

    #[error("block not found ({context})")]
    BlockNotFound { context: String },

    #[error("transaction not found: {txid}: {message}")]
    TxNotFound { txid: String, message: String },

    #[error("cannot encode {field}: {reason}")]
    Encoding { field: String, reason: String },

    #[error("cannot decode packed transaction: {0}")]
    Decoding(String),

    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid backend data: {0}")]
    InvalidData(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    /// Backend error code carried by this error, if it came from the daemon.
    ///
    /// `TxNotFound` is only ever produced from `RPC_INVALID_ADDRESS_OR_KEY`.
    pub fn backend_code(&self) -> Option<i64> {
        match self {
            Self::Backend { code, .. } => Some(*code),
            Self::TxNotFound { .. } => Some(RPC_INVALID_ADDRESS_OR_KEY),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BlockNotFound { .. } | Self::TxNotFound { .. })
    }
}
