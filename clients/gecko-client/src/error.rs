use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("request to {method} failed: {source}")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} returned unexpected status {status}")]
    Status { method: String, status: StatusCode },
    #[error("{method} returned rpc error {code}: {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("{method} reply carried neither a result nor an error")]
    MissingResult { method: String },
    #[error("failed to decode {method} reply: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("nonce of account {address} is exhausted")]
    NonceExhausted { address: String },
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl Error {
    /// Name of the JSON-RPC method that produced the error, if any.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Transport { method, .. }
            | Self::Status { method, .. }
            | Self::Rpc { method, .. }
            | Self::MissingResult { method }
            | Self::Decode { method, .. } => Some(method),
            Self::NonceExhausted { .. } | Self::Url(_) | Self::Client(_) => None,
        }
    }

    /// Whether the node was never reached, as opposed to answering with
    /// something unexpected.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Client(_))
    }
}
