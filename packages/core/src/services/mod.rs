//! Node RPC access.
//!
//! `protocol` shapes requests per dialect, `rpc_client` executes them over
//! HTTP. The [`RpcTransport`] trait is the seam the gateway depends on, so
//! tests can swap in a scripted node.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RpcError;

pub mod protocol;
pub mod rpc_client;

#[cfg(test)]
pub mod mock_node;

pub use rpc_client::NodeRpcClient;

/// Anything that can answer a logical RPC call.
#[async_trait]
pub trait RpcTransport {
    /// Execute `method` with positional `params` and return the payload.
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError>;

    /// Names the node in failure logs.
    fn transport_name(&self) -> &str;
}
