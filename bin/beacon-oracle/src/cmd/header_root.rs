use crate::opts::DeploymentArgs;
use beacon_oracle_operator::{BeaconApi, BeaconClient, Environment, resolve_header};
use clap::Parser;
use eyre::Context;
use serde_json::json;

/// Resolves the first canonical header at or after `--slot` and prints its root.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct HeaderRootArgs {
    #[command(flatten)]
    deployment: DeploymentArgs,

    #[arg(long)]
    pub slot: u64,

    /// Last slot to scan; defaults to the beacon node's finalized slot.
    #[arg(long)]
    pub finalized: Option<u64>,
}

impl HeaderRootArgs {
    pub async fn run(self) -> eyre::Result<()> {
        let deployment = self.deployment.resolve()?;
        let beacon_url = Environment::from_process()
            .consensus_rpc(deployment.consensus_chain_id)
            .context("beacon node")?;
        let beacon = BeaconClient::new(beacon_url);

        let finalized_slot = match self.finalized {
            Some(slot) => slot,
            None => beacon
                .finalized_slot()
                .await
                .context("failed to read finalized slot")?,
        };

        let header = resolve_header(&beacon, self.slot, finalized_slot).await?;
        let block_root = header.hash_tree_root()?;
        let output = json!({
            "ref_slot": self.slot,
            "finalized_slot": finalized_slot,
            "slot": header.slot,
            "proposer_index": header.proposer_index,
            "block_root": block_root,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
