//! Target-chain oracle client.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info, instrument};

use crate::{
    contracts::{ISuccinctLidoOracleV1, ISuccinctLidoOracleV2},
    error::{OperatorError, Result},
    oracle::{ReportOracle, ReportStatus, RequestInterface, RequestSubmission},
};

/// Client for the oracle contract that receives update requests.
#[derive(Clone)]
pub struct SuccinctOracle {
    provider: DynProvider,
    address: Address,
    interface: RequestInterface,
    sender: Option<Address>,
}

impl SuccinctOracle {
    /// Read-only client; `request_update` fails without a wallet.
    pub fn read_only(rpc_url: Url, address: Address, interface: RequestInterface) -> Self {
        Self {
            provider: ProviderBuilder::new().connect_http(rpc_url).erased(),
            address,
            interface,
            sender: None,
        }
    }

    /// Client that signs `requestUpdate` transactions with `signer`.
    pub fn with_signer(
        rpc_url: Url,
        address: Address,
        interface: RequestInterface,
        signer: PrivateKeySigner,
    ) -> Self {
        let sender = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();

        Self {
            provider,
            address,
            interface,
            sender: Some(sender),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    /// Fails unless the RPC serves `expected`; signed writes are bound to it.
    pub async fn ensure_chain_id(&self, expected: u64) -> Result<()> {
        let actual = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| OperatorError::Rpc(e.to_string()))?;
        if actual != expected {
            return Err(OperatorError::ChainIdMismatch { expected, actual });
        }
        Ok(())
    }
}

#[async_trait]
impl ReportOracle for SuccinctOracle {
    fn interface(&self) -> RequestInterface {
        self.interface
    }

    async fn report_status(&self, ref_slot: u64) -> Result<ReportStatus> {
        // `reports` has the same layout in both interface versions.
        let report = ISuccinctLidoOracleV2::new(self.address, self.provider.clone())
            .reports(U256::from(ref_slot))
            .call()
            .await
            .map_err(OperatorError::contract("reports"))?;

        Ok(ReportStatus {
            requested: report.requested,
            received: report.received,
        })
    }

    #[instrument(name = "oracle::request_update", skip_all, fields(ref_slot = request.ref_slot))]
    async fn request_update(&self, request: &RequestSubmission) -> Result<B256> {
        request.check(self.interface)?;
        let Some(from) = self.sender else {
            return Err(OperatorError::Submission("no signer configured".into()));
        };

        let pending = match request.block_root {
            Some(block_root) => {
                ISuccinctLidoOracleV2::new(self.address, self.provider.clone())
                    .requestUpdate(block_root, request.ref_slot, request.callback_gas_limit)
                    .from(from)
                    .send()
                    .await
            }
            None => {
                ISuccinctLidoOracleV1::new(self.address, self.provider.clone())
                    .requestUpdate(request.ref_slot, request.callback_gas_limit)
                    .from(from)
                    .send()
                    .await
            }
        }
        .map_err(OperatorError::contract("requestUpdate"))?;

        debug!(tx_hash = %pending.tx_hash(), "Request sent, waiting for receipt");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| OperatorError::Submission(e.to_string()))?;

        if !receipt.status() {
            return Err(OperatorError::Submission(format!(
                "requestUpdate reverted in {}",
                receipt.transaction_hash
            )));
        }

        info!(
            tx_hash = %receipt.transaction_hash,
            block_number = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Request confirmed"
        );

        Ok(receipt.transaction_hash)
    }
}
