use crate::opts::DeploymentArgs;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct DeploymentsArgs {
    #[command(flatten)]
    deployment: DeploymentArgs,
}

impl DeploymentsArgs {
    pub fn run(self) -> eyre::Result<()> {
        let config = self.deployment.load()?;
        println!("{}", serde_json::to_string_pretty(&config.deployments)?);
        Ok(())
    }
}
