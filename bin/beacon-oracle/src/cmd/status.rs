use crate::opts::DeploymentArgs;
use beacon_oracle_operator::{
    Assessment, BeaconClient, Cadence, Decision, Environment, FrameSource, LidoConsensus,
    Operator, SuccinctOracle,
};
use clap::Parser;
use eyre::Context;
use serde_json::json;

/// Prints the current frame and the decision a cycle would take, without submitting.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct StatusArgs {
    #[command(flatten)]
    deployment: DeploymentArgs,
}

impl StatusArgs {
    pub async fn run(self) -> eyre::Result<()> {
        let deployment = self.deployment.resolve()?;

        let env = Environment::from_process();
        let source_rpc = env
            .execution_rpc(deployment.consensus_chain_id)
            .context("source chain RPC")?;
        let target_rpc = env
            .execution_rpc(deployment.chain_id)
            .context("target chain RPC")?;
        let beacon_url = env
            .consensus_rpc(deployment.consensus_chain_id)
            .context("beacon node")?;

        let lido = LidoConsensus::connect(source_rpc, deployment.lido_locator_address)
            .await
            .context("failed to discover Lido oracle contracts")?;
        let oracle = SuccinctOracle::read_only(
            target_rpc,
            deployment.succinct_oracle_address,
            deployment.request_interface,
        );
        let cadence = Cadence::new(
            &lido.frame_config(),
            &lido.chain_config(),
            deployment.max_poll_interval(),
        );
        let hash_consensus = lido.hash_consensus();
        let operator = Operator::new(
            BeaconClient::new(beacon_url),
            lido,
            oracle,
            deployment.callback_gas_limit,
            cadence,
        );

        let frame = operator.frames().current_frame().await?;
        let Assessment { status, decision } = operator.decide(&frame).await?;

        let (decision, finalized_slot) = match decision {
            Decision::AlreadyReceived => ("already_received", None),
            Decision::AlreadyRequested => ("already_requested", None),
            Decision::DeadlinePassed { finalized_slot } => ("deadline_passed", Some(finalized_slot)),
            Decision::Request { finalized_slot } => ("request", Some(finalized_slot)),
        };

        let output = json!({
            "hash_consensus": hash_consensus,
            "oracle": deployment.succinct_oracle_address,
            "ref_slot": frame.ref_slot,
            "deadline_slot": frame.deadline_slot,
            "next_frame_slot": cadence.next_frame_slot(frame.ref_slot),
            "finalized_slot": finalized_slot,
            "requested": status.requested,
            "received": status.received,
            "decision": decision,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
