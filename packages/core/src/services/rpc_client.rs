use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::chain::ChainProfile;
use crate::error::{AppError, RpcError};
use crate::services::protocol::{build_request, RpcRequest};
use crate::services::RpcTransport;

/// Default bound on a single RPC round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for one node.
#[derive(Clone)]
pub struct NodeRpcClient {
    profile: ChainProfile,
    http: Client,
}

impl NodeRpcClient {
    pub fn new(profile: ChainProfile, timeout: Duration) -> Result<Self, AppError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { profile, http })
    }

    /// POST one shaped request and unwrap the node's answer.
    ///
    /// A body that decodes to JSON is inspected even on a non-2xx status,
    /// since bitcoind reports RPC errors with HTTP 500 and a JSON body.
    pub async fn execute(&self, method: &str, request: &RpcRequest) -> Result<Value, RpcError> {
        let mut builder = self.http.post(&request.url).json(&request.body);

        if request.use_auth {
            if let Some(creds) = &self.profile.credentials {
                builder = builder.basic_auth(&creds.username, Some(&creds.password));
            }
        }

        tracing::debug!(method, url = %request.url, "sending RPC request");

        let response = builder
            .send()
            .await
            .map_err(|err| RpcError::transport(method, err.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| RpcError::transport(method, err.to_string()))?;

        let decoded: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(RpcError::transport(
                    method,
                    format!("node returned HTTP {}", status),
                ));
            }
            Err(err) => return Err(RpcError::decode(method, err.to_string())),
        };

        extract_result(method, decoded)
    }
}

#[async_trait]
impl RpcTransport for NodeRpcClient {
    async fn call(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        let request = build_request(&self.profile, method, params);
        self.execute(method, &request).await
    }

    fn transport_name(&self) -> &str {
        &self.profile.endpoint
    }
}

/// Pull the payload out of a decoded response.
///
/// A non-null `error` member is a failure. Otherwise `result` wins when
/// present and non-null; bare Monero endpoints have no envelope, so the
/// whole object is the payload.
pub fn extract_result(method: &str, decoded: Value) -> Result<Value, RpcError> {
    if let Some(error) = decoded.get("error") {
        if !error.is_null() {
            return Err(RpcError::protocol(method, error.to_string()));
        }
    }

    match decoded {
        Value::Object(mut map) if map.get("result").map_or(false, |r| !r.is_null()) => {
            Ok(map.remove("result").unwrap_or_default())
        }
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{Chain, Credentials};
    use crate::services::protocol::JSON_RPC_ID;
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer, chain: Chain, creds: Option<Credentials>) -> NodeRpcClient {
        let profile = ChainProfile::with_base_url(chain, &server.uri(), creds);
        NodeRpcClient::new(profile, Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn extract_result_prefers_result_member() {
        let value = extract_result("getblockcount", json!({"result": 42, "error": null, "id": "x"}));
        assert_eq!(value, Ok(json!(42)));
    }

    #[test]
    fn extract_result_returns_whole_object_without_envelope() {
        let payload = json!({"status": "OK", "pool_stats": {"txs_total": 3}});
        assert_eq!(extract_result("get_transaction_pool_stats", payload.clone()), Ok(payload));
    }

    #[test]
    fn extract_result_surfaces_error_member() {
        let err = extract_result(
            "estimatesmartfee",
            json!({"result": null, "error": {"code": -32601, "message": "Method not found"}}),
        )
        .unwrap_err();

        assert!(matches!(err, RpcError::Protocol { .. }));
        assert_eq!(err.method(), "estimatesmartfee");
        assert!(err.to_string().contains("Method not found"));
    }

    #[tokio::test]
    async fn posts_envelope_and_returns_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({"jsonrpc": "2.0", "method": "getmininginfo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": {"networkhashps": 1.5e20},
                "error": null,
                "id": JSON_RPC_ID,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Chain::Bitcoin, None);
        let result = client.call("getmininginfo", &[]).await.unwrap();

        assert_eq!(result["networkhashps"], json!(1.5e20));
    }

    #[tokio::test]
    async fn sends_basic_auth_when_credentials_configured() {
        let server = MockServer::start().await;
        // base64("user:pass")
        Mock::given(method("POST"))
            .and(header("authorization", "Basic dXNlcjpwYXNz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 1, "error": null})))
            .expect(1)
            .mount(&server)
            .await;

        let creds = Credentials::from_parts(Some("user".into()), Some("pass".into()));
        let client = client_for(&server, Chain::Litecoin, creds);

        assert_eq!(client.call("getblockcount", &[]).await, Ok(json!(1)));
    }

    #[tokio::test]
    async fn monero_bare_method_hits_method_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/get_info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "height": 3_100_000,
                "status": "OK",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Chain::Monero, None);
        let result = client.call("get_info", &[]).await.unwrap();

        assert_eq!(result["height"], json!(3_100_000));
        // Failure logs name the configured endpoint, not the bare path.
        assert_eq!(client.transport_name(), format!("{}/json_rpc", server.uri()));
    }

    #[tokio::test]
    async fn rpc_error_with_http_500_is_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "result": null,
                "error": {"code": -1, "message": "boom"},
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Chain::Bitcoin, None);
        let err = client.call("getchaintxstats", &[]).await.unwrap_err();

        assert!(matches!(err, RpcError::Protocol { .. }));
    }

    #[tokio::test]
    async fn unauthorized_without_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server, Chain::Bitcoin, None);
        let err = client.call("getblockchaininfo", &[]).await.unwrap_err();

        assert!(matches!(err, RpcError::Transport { .. }));
        assert!(err.to_string().contains("401"));
    }

    #[tokio::test]
    async fn garbage_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, Chain::Bitcoin, None);
        let err = client.call("getnetworkinfo", &[]).await.unwrap_err();

        assert!(matches!(err, RpcError::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_node_is_transport_error() {
        // Nothing listens on port 9 (discard) in the test environment.
        let profile = ChainProfile::new(Chain::Bitcoin, "127.0.0.1", 9, None);
        let client = NodeRpcClient::new(profile, Duration::from_secs(1)).unwrap();

        let err = client.call("getblockchaininfo", &[]).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport { .. }));
        assert_eq!(err.method(), "getblockchaininfo");
    }

    #[tokio::test]
    async fn hanging_node_is_cut_off_at_the_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"result": {}, "error": null}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let profile = ChainProfile::with_base_url(Chain::Bitcoin, &server.uri(), None);
        let client = NodeRpcClient::new(profile, Duration::from_secs(1)).unwrap();

        let started = std::time::Instant::now();
        let err = client.call("getmempoolinfo", &[]).await.unwrap_err();
        let elapsed = started.elapsed();

        assert!(matches!(err, RpcError::Transport { .. }), "{:?}", err);
        assert!(elapsed >= Duration::from_millis(900), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(3), "{:?}", elapsed);
    }
}
