use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::{CoreError, RpcError};

use super::RpcTransport;

/// A mock daemon transport for testing. Returns canned response bodies
/// keyed by method, optionally narrowed to exact params, and records every
/// call it receives.
pub struct MockTransport {
    exact: HashMap<(String, String), String>,
    any_params: HashMap<String, String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder {
            exact: HashMap::new(),
            any_params: HashMap::new(),
        }
    }

    /// Every `(method, params)` pair received so far, in order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().iter().filter(|(m, _)| m == method).count()
    }
}

pub struct MockTransportBuilder {
    exact: HashMap<(String, String), String>,
    any_params: HashMap<String, String>,
}

impl MockTransportBuilder {
    /// Answer `method` called with exactly `params`.
    pub fn with_response(mut self, method: &str, params: Value, body: impl Into<String>) -> Self {
        self.exact
            .insert((method.to_owned(), params.to_string()), body.into());
        self
    }

    /// Answer `method` regardless of params, unless an exact match exists.
    pub fn with_any_params(mut self, method: &str, body: impl Into<String>) -> Self {
        self.any_params.insert(method.to_owned(), body.into());
        self
    }

    pub fn build(self) -> MockTransport {
        MockTransport {
            exact: self.exact,
            any_params: self.any_params,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn call(&self, method: &str, params: Value) -> Result<String, CoreError> {
        let key = (method.to_owned(), params.to_string());
        self.calls.lock().push((method.to_owned(), params));

        self.exact
            .get(&key)
            .or_else(|| self.any_params.get(method))
            .cloned()
            .ok_or_else(|| {
                RpcError::InvalidResponse(format!("no canned response for {method} {}", key.1))
                    .into()
            })
    }
}
