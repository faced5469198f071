use crate::opts::{BeaconOracle, BeaconOracleSubcommand};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cmd;
mod metrics;
mod opts;
mod shutdown;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = BeaconOracle::parse();

    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match args.cmd {
        BeaconOracleSubcommand::Run(cmd) => cmd.run().await,
        BeaconOracleSubcommand::Status(cmd) => cmd.run().await,
        BeaconOracleSubcommand::HeaderRoot(cmd) => cmd.run().await,
        BeaconOracleSubcommand::Deployments(cmd) => cmd.run(),
    }
}
