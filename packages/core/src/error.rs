use thiserror::Error;

/// Unified application error.
///
/// Covers the ambient layers (config, cache persistence, client setup).
/// Per-call node failures use [`RpcError`] instead and never abort a render.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Failure of a single RPC call against the node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Connection refused, timeout, or any other transport-level failure.
    #[error("transport error on method `{method}`: {message}")]
    Transport { method: String, message: String },

    /// The node answered, but not with JSON we could decode.
    #[error("undecodable response on method `{method}`: {message}")]
    Decode { method: String, message: String },

    /// The node returned a non-null `error` member.
    #[error("RPC error on `{method}`: {error}")]
    Protocol { method: String, error: String },
}

impl RpcError {
    pub fn transport(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport { method: method.into(), message: message.into() }
    }

    pub fn decode(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode { method: method.into(), message: message.into() }
    }

    pub fn protocol(method: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Protocol { method: method.into(), error: error.into() }
    }

    /// Method name of the failed call.
    pub fn method(&self) -> &str {
        match self {
            RpcError::Transport { method, .. }
            | RpcError::Decode { method, .. }
            | RpcError::Protocol { method, .. } => method,
        }
    }
}
