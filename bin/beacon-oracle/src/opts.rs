use crate::cmd::{
    deployments::DeploymentsArgs, header_root::HeaderRootArgs, run::RunArgs, status::StatusArgs,
};
use beacon_oracle_operator::{DeploymentConfig, OperatorConfig};
use clap::{Args, Parser, Subcommand};
use eyre::Context;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct BeaconOracle {
    #[command(subcommand)]
    pub cmd: BeaconOracleSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BeaconOracleSubcommand {
    /// Keep requesting oracle updates, one per frame.
    Run(RunArgs),
    /// Show the current frame and what the operator would do about it.
    Status(StatusArgs),
    /// Resolve the header for a slot and print its block root.
    HeaderRoot(HeaderRootArgs),
    /// List the known deployments.
    Deployments(DeploymentsArgs),
}

/// Selects a deployment from the built-in table or a config file.
#[derive(Args, Debug, Clone)]
pub struct DeploymentArgs {
    /// TOML file with additional `[deployments.<name>]` tables.
    #[arg(long, env = "BEACON_ORACLE_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "holesky", env = "BEACON_ORACLE_DEPLOYMENT")]
    pub deployment: String,
}

impl DeploymentArgs {
    pub fn load(&self) -> eyre::Result<OperatorConfig> {
        match &self.config {
            Some(path) => OperatorConfig::load(path)
                .wrap_err_with(|| format!("failed to load config from {}", path.display())),
            None => Ok(OperatorConfig::builtin()),
        }
    }

    /// Loads and validates the selected deployment.
    pub fn resolve(&self) -> eyre::Result<DeploymentConfig> {
        let config = self.load()?;
        let deployment = config.deployment(&self.deployment)?.clone();
        let (source, target) = deployment
            .validate()
            .wrap_err_with(|| format!("invalid deployment `{}`", self.deployment))?;

        tracing::info!(
            deployment = %self.deployment,
            source = %source,
            target = %target,
            oracle = %deployment.succinct_oracle_address,
            interface = deployment.request_interface.as_str(),
            "Selected deployment"
        );
        Ok(deployment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        BeaconOracle::command().debug_assert();
    }

    #[test]
    fn test_parse_header_root() {
        let args = BeaconOracle::try_parse_from([
            "beacon-oracle",
            "header-root",
            "--slot",
            "1000",
            "--finalized",
            "1050",
        ])
        .unwrap();

        let BeaconOracleSubcommand::HeaderRoot(cmd) = args.cmd else {
            panic!("expected header-root");
        };
        assert_eq!(cmd.slot, 1000);
        assert_eq!(cmd.finalized, Some(1050));
    }

    #[test]
    fn test_default_deployment_resolves() {
        let args = DeploymentArgs {
            config: None,
            deployment: "holesky".into(),
        };
        let deployment = args.resolve().unwrap();
        assert_eq!(deployment.chain_id, 17_000);

        let args = DeploymentArgs {
            config: None,
            deployment: "nowhere".into(),
        };
        assert!(args.resolve().is_err());
    }
}
