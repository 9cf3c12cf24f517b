//! Request shaping per RPC dialect.
//!
//! Bitcoin-style nodes take a JSON-RPC 2.0 envelope on one endpoint.
//! The Monero daemon splits its surface: a fixed set of methods lives
//! behind `/json_rpc`, everything else is a bare JSON POST to
//! `/<method>` on the daemon root.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::chain::{ChainProfile, RpcDialect};

/// Request id sent in every JSON-RPC envelope.
pub const JSON_RPC_ID: &str = "node-dashboard";

const MONERO_JSON_RPC_SUFFIX: &str = "/json_rpc";

/// Methods the Monero daemon serves through its `/json_rpc` endpoint.
pub const MONERO_JSON_RPC_METHODS: &[&str] = &[
    "get_block_count",
    "get_block",
    "get_block_header_by_height",
    "get_block_header_by_hash",
    "get_connections",
    "get_info",
    "get_last_block_header",
    "get_peer_list",
    "get_transaction_pool",
    "get_transaction_pool_stats",
    "get_transactions",
    "get_height",
];

/// Always sent bare, even though they also appear in the allow-list above.
pub const MONERO_BARE_OVERRIDES: &[&str] = &["get_transaction_pool_stats", "get_info"];

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: &'a [Value],
}

/// A fully shaped HTTP request for one logical call.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub url: String,
    pub body: Value,
    pub use_auth: bool,
}

/// Build the URL and body for `method` on the given node.
pub fn build_request(profile: &ChainProfile, method: &str, params: &[Value]) -> RpcRequest {
    let use_auth = profile.credentials.is_some();

    let bare = match profile.dialect() {
        RpcDialect::JsonRpc => false,
        RpcDialect::MoneroDaemon => {
            // Override list is checked before the allow-list.
            MONERO_BARE_OVERRIDES.contains(&method) || !MONERO_JSON_RPC_METHODS.contains(&method)
        }
    };

    if bare {
        let root = profile
            .endpoint
            .strip_suffix(MONERO_JSON_RPC_SUFFIX)
            .unwrap_or(&profile.endpoint);
        return RpcRequest {
            url: format!("{}/{}", root, method),
            body: bare_params(params),
            use_auth,
        };
    }

    let envelope = JsonRpcRequest {
        jsonrpc: "2.0",
        id: JSON_RPC_ID,
        method,
        params,
    };

    RpcRequest {
        url: profile.endpoint.clone(),
        body: serde_json::to_value(&envelope).unwrap_or(Value::Null),
        use_auth,
    }
}

/// Bare endpoints take a JSON object. A single object parameter is sent as
/// is; positional parameters are keyed by their index.
fn bare_params(params: &[Value]) -> Value {
    match params {
        [Value::Object(map)] => Value::Object(map.clone()),
        _ => Value::Object(
            params
                .iter()
                .enumerate()
                .map(|(idx, value)| (idx.to_string(), value.clone()))
                .collect::<Map<String, Value>>(),
        ),
    }
}
