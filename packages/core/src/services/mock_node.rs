//! Scripted node used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RpcError;
use crate::services::RpcTransport;

#[derive(Default)]
pub struct MockNode {
    responses: HashMap<String, Result<Value, RpcError>>,
    calls: Mutex<Vec<String>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call to `method` with `payload`.
    pub fn with_response(mut self, method: &str, payload: Value) -> Self {
        self.responses.insert(method.to_string(), Ok(payload));
        self
    }

    /// Answer `method(params)` with `payload`; takes precedence over `with_response`.
    pub fn with_call_response(mut self, method: &str, params: &[Value], payload: Value) -> Self {
        self.responses.insert(Self::call_key(method, params), Ok(payload));
        self
    }

    pub fn with_error(mut self, method: &str, error: RpcError) -> Self {
        self.responses.insert(method.to_string(), Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().expect("mock node lock poisoned").len()
    }

    pub fn calls_for(&self, method: &str) -> usize {
        self.calls
            .lock()
            .expect("mock node lock poisoned")
            .iter()
            .filter(|m| m.as_str() == method)
            .count()
    }

    fn call_key(method: &str, params: &[Value]) -> String {
        format!("{}:{}", method, Value::Array(params.to_vec()))
    }
}

#[async_trait]
impl RpcTransport for MockNode {
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .expect("mock node lock poisoned")
            .push(method.to_string());

        self.responses
            .get(&Self::call_key(method, params))
            .or_else(|| self.responses.get(method))
            .cloned()
            .unwrap_or_else(|| Err(RpcError::protocol(method, r#"{"code":-32601,"message":"Method not found"}"#)))
    }

    fn transport_name(&self) -> &str {
        "mock-node"
    }
}
