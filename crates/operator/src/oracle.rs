//! Target oracle state and update requests.

use alloy::primitives::B256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OperatorError, Result},
    header::BlockRoot,
};

/// `requested` / `received` flags the target oracle keeps per reference slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportStatus {
    pub requested: bool,
    pub received: bool,
}

/// Which `requestUpdate` signature the deployed oracle exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestInterface {
    /// `requestUpdate(uint64 slot, uint32 callbackGasLimit)`
    Slot,
    /// `requestUpdate(bytes32 blockRoot, uint64 slot, uint32 callbackGasLimit)`
    #[default]
    BlockRoot,
}

impl RequestInterface {
    pub fn requires_block_root(self) -> bool {
        matches!(self, Self::BlockRoot)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Slot => "slot",
            Self::BlockRoot => "block-root",
        }
    }
}

/// A single `requestUpdate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestSubmission {
    /// Always the frame's reference slot, even when the block came from a later slot.
    pub ref_slot: u64,
    /// Root of the resolved header, present only for [`RequestInterface::BlockRoot`].
    pub block_root: Option<BlockRoot>,
    pub callback_gas_limit: u32,
}

impl RequestSubmission {
    /// Checks that the payload carries exactly what `interface` expects.
    pub fn check(&self, interface: RequestInterface) -> Result<()> {
        match (interface, self.block_root) {
            (RequestInterface::BlockRoot, None) => Err(OperatorError::Submission(
                "block-root interface requires a block root".into(),
            )),
            (RequestInterface::Slot, Some(_)) => Err(OperatorError::Submission(
                "slot interface does not accept a block root".into(),
            )),
            _ => Ok(()),
        }
    }
}

/// The oracle contract requests are sent to.
#[async_trait]
pub trait ReportOracle: Send + Sync {
    fn interface(&self) -> RequestInterface;

    async fn report_status(&self, ref_slot: u64) -> Result<ReportStatus>;

    /// Sends the request and returns the hash of the confirmed transaction.
    async fn request_update(&self, request: &RequestSubmission) -> Result<B256>;
}
