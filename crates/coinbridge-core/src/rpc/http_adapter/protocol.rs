/// Request envelope. Legacy daemons predate JSON-RPC 2.0, so requests
/// declare 1.0 and may carry either positional or named params.
#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: &'a serde_json::Value,
}

impl<'a> JsonRpcRequest<'a> {
    pub(super) fn new(id: u64, method: &'a str, params: &'a serde_json::Value) -> Self {
        Self {
            jsonrpc: "1.0",
            id,
            method,
            params,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_params_serialize_as_array() {
        let params = serde_json::json!(["00ab", true]);
        let req = JsonRpcRequest::new(7, "getblock", &params);
        assert_eq!(
            serde_json::to_value(&req).expect("serializable"),
            serde_json::json!({"jsonrpc": "1.0", "id": 7, "method": "getblock", "params": ["00ab", true]})
        );
    }

    #[test]
    fn integer_verbosity_stays_numeric() {
        let params = serde_json::json!(["00ab", 2]);
        let req = JsonRpcRequest::new(1, "getblock", &params);
        let value = serde_json::to_value(&req).expect("serializable");
        assert_eq!(value["params"][1], serde_json::json!(2));
    }
}
