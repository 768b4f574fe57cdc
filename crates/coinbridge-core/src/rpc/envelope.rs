use serde_json::Value;

use crate::error::{CoreError, RpcError};
use crate::json::decode_first_key_wins;

/// An error reported by the daemon inside the response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct BackendError {
    pub(super) code: i64,
    pub(super) message: String,
}

impl BackendError {
    pub(super) fn into_core(self, method: &'static str, context: String) -> CoreError {
        CoreError::Backend {
            method,
            context,
            code: self.code,
            message: self.message,
        }
    }
}

/// Either the `result` member or the daemon's error.
pub(super) type Reply = Result<Value, BackendError>;

/// Decode a JSON-RPC response body and split it into result or error.
///
/// With `dedup` set the body goes through the first-key-wins decoder, and
/// malformed JSON surfaces as [`CoreError::Parse`] with its position.
pub(super) fn parse_reply(body: &str, dedup: bool) -> Result<Reply, CoreError> {
    let decoded = if dedup {
        decode_first_key_wins(body)?
    } else {
        serde_json::from_str(body).map_err(|e| {
            RpcError::InvalidResponse(format!("decode JSON-RPC response: {e}; body={body}"))
        })?
    };

    let Value::Object(mut envelope) = decoded else {
        return Err(RpcError::InvalidResponse(format!(
            "JSON-RPC response is not an object: {body}"
        ))
        .into());
    };

    match envelope.remove("error") {
        None | Some(Value::Null) => Ok(Ok(envelope.remove("result").unwrap_or(Value::Null))),
        Some(err) => parse_backend_error(err).map(Err),
    }
}

/// JSON-RPC errors are `{"code": <int>, "message": <string>}`; anything
/// else is a protocol violation rather than a backend answer.
fn parse_backend_error(err: Value) -> Result<BackendError, CoreError> {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => Ok(BackendError {
            code: parsed.code,
            message: parsed.message,
        }),
        Err(_) => Err(RpcError::InvalidResponse(format!("non-standard JSON-RPC error: {err}")).into()),
    }
}
