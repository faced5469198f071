use alloy::primitives::U256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("config error: {0}")]
    Config(String),

    #[error("no network known for chain id {0}")]
    UnknownChain(u64),

    #[error("missing environment variable {0}")]
    MissingEnv(String),

    #[error("invalid private key: {0}")]
    InvalidKey(String),

    #[error("chain id mismatch: configured {expected}, rpc reports {actual}")]
    ChainIdMismatch { expected: u64, actual: u64 },

    #[error("no canonical header in slots {from}..={to}")]
    HeaderNotFound { from: u64, to: u64 },

    #[error("beacon node has no finalized header")]
    NoFinalizedHeader,

    #[error("beacon request failed: {0}")]
    Beacon(#[from] reqwest::Error),

    #[error("beacon node returned status {status} for block {block_id}")]
    BeaconStatus { status: u16, block_id: String },

    #[error("malformed beacon response: {0}")]
    BeaconDecode(String),

    #[error("ssz merkleization failed: {0}")]
    Ssz(String),

    #[error("contract call {call} failed: {source}")]
    Contract {
        call: &'static str,
        #[source]
        source: alloy::contract::Error,
    },

    #[error("{field} = {value} does not fit in u64")]
    Overflow { field: &'static str, value: U256 },

    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error("rpc error: {0}")]
    Rpc(String),
}

impl OperatorError {
    /// Short label used for the `kind` metric label and log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::MissingEnv(_) | Self::InvalidKey(_) => "config",
            Self::UnknownChain(_) | Self::ChainIdMismatch { .. } => "chain",
            Self::HeaderNotFound { .. } => "header_not_found",
            Self::NoFinalizedHeader
            | Self::Beacon(_)
            | Self::BeaconStatus { .. }
            | Self::BeaconDecode(_)
            | Self::Ssz(_) => "beacon",
            Self::Contract { .. } | Self::Overflow { .. } | Self::Rpc(_) => "contract",
            Self::Submission(_) => "submission",
        }
    }

    /// Errors that retrying will not fix.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::UnknownChain(_)
                | Self::MissingEnv(_)
                | Self::InvalidKey(_)
                | Self::ChainIdMismatch { .. }
        )
    }

    pub(crate) fn contract(call: &'static str) -> impl FnOnce(alloy::contract::Error) -> Self {
        move |source| Self::Contract { call, source }
    }
}

/// Narrows a contract `uint256` into a slot-sized integer.
pub(crate) fn to_u64(field: &'static str, value: U256) -> Result<u64> {
    u64::try_from(value).map_err(|_| OperatorError::Overflow { field, value })
}

pub type Result<T> = std::result::Result<T, OperatorError>;
