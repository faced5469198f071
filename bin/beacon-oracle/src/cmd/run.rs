use crate::{metrics, opts::DeploymentArgs, shutdown};
use beacon_oracle_operator::{
    BeaconClient, Cadence, Environment, LidoConsensus, Operator, SuccinctOracle,
};
use clap::Parser;
use eyre::Context;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct RunArgs {
    #[command(flatten)]
    deployment: DeploymentArgs,

    /// Serve Prometheus metrics on this port.
    #[arg(long)]
    metrics_port: Option<u16>,
}

impl RunArgs {
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
        let signer = env.signer().context("signing key")?;

        let metrics_handle = self
            .metrics_port
            .map(|port| metrics::serve(port, &self.deployment.deployment))
            .transpose()?;

        let lido = LidoConsensus::connect(source_rpc, deployment.lido_locator_address)
            .await
            .context("failed to discover Lido oracle contracts")?;

        let oracle = SuccinctOracle::with_signer(
            target_rpc,
            deployment.succinct_oracle_address,
            deployment.request_interface,
            signer,
        );
        oracle
            .ensure_chain_id(deployment.chain_id)
            .await
            .context("target RPC check failed")?;
        tracing::info!(sender = ?oracle.sender(), oracle = %oracle.address(), "Connected to oracle");

        let cadence = Cadence::new(
            &lido.frame_config(),
            &lido.chain_config(),
            deployment.max_poll_interval(),
        );
        let operator = Operator::new(
            BeaconClient::new(beacon_url),
            lido,
            oracle,
            deployment.callback_gas_limit,
            cadence,
        );

        let token = CancellationToken::new();
        let signal_handle = shutdown::on_signal(token.clone())?;

        operator.run(token).await;

        signal_handle.abort();
        if let Some(handle) = metrics_handle {
            handle.abort();
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
