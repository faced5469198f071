//! Operator that keeps the Succinct Lido oracle supplied with update requests.
//!
//! Each cycle reads the current HashConsensus frame, checks whether the oracle
//! already has (or has been asked for) a report for its reference slot, and if
//! not resolves the beacon header for that slot and calls `requestUpdate`.

pub mod beacon_client;
pub mod cadence;
pub mod config;
pub mod contracts;
pub mod error;
pub mod frame;
pub mod header;
pub mod lido;
pub mod metrics;
pub mod network;
pub mod operator;
pub mod oracle;
pub mod resolver;
pub mod succinct;

pub use beacon_client::{BeaconApi, BeaconClient, BlockId};
pub use cadence::Cadence;
pub use config::{DeploymentConfig, Environment, OperatorConfig};
pub use error::{OperatorError, Result};
pub use frame::{ConsensusChainConfig, Frame, FrameConfig, FrameSource};
pub use header::{BeaconBlockHeader, BlockRoot};
pub use lido::LidoConsensus;
pub use network::Network;
pub use operator::{Assessment, CycleOutcome, Decision, Operator};
pub use oracle::{ReportOracle, ReportStatus, RequestInterface, RequestSubmission};
pub use resolver::resolve_header;
pub use succinct::SuccinctOracle;

#[cfg(test)]
mod tests;
