use std::fmt;

use serde::{Deserialize, Serialize};

/// Keystore credentials sent along with every call that spends funds or
/// touches keys.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserPass {
    pub username: String,
    pub password: String,
}

impl UserPass {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// CB58 encoded transaction identifier. Opaque to the client.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decision status of a transaction as reported by a chain.
///
/// The platform chain reports `Committed`, `Aborted` and `Dropped`, which
/// collapse onto the same accepted/rejected outcomes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TxStatus {
    Unknown,
    Processing,
    #[serde(alias = "Committed")]
    Accepted,
    #[serde(alias = "Aborted", alias = "Dropped")]
    Rejected,
}

impl TxStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Processing => "processing",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Serialize, Deserialize)]
pub(crate) struct JsonTxId {
    #[serde(rename = "txID")]
    pub tx_id: TxId,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct JsonAddress {
    pub address: String,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct JsonAddresses {
    pub addresses: Vec<String>,
}

#[derive(Deserialize)]
pub(crate) struct JsonTxStatus {
    pub status: TxStatus,
}

#[derive(Serialize, Deserialize)]
pub(crate) struct FormattedTx {
    pub tx: String,
}

#[derive(Deserialize)]
pub(crate) struct JsonSuccess {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_statuses_collapse_onto_terminal_outcomes() {
        let decode = |raw: &str| serde_json::from_str::<TxStatus>(raw).unwrap();

        assert_eq!(decode("\"Committed\""), TxStatus::Accepted);
        assert_eq!(decode("\"Aborted\""), TxStatus::Rejected);
        assert_eq!(decode("\"Dropped\""), TxStatus::Rejected);
        assert_eq!(decode("\"Processing\""), TxStatus::Processing);
        assert!(!decode("\"Unknown\"").is_terminal());
        assert!(serde_json::from_str::<TxStatus>("\"Pending\"").is_err());
    }
}
