//! Deployment configuration from TOML and endpoint/key lookup from the environment.

use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    str::FromStr,
    time::Duration,
};

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{
    error::{OperatorError, Result},
    network::Network,
    oracle::RequestInterface,
};

/// Callback gas limit forwarded with every request.
pub const DEFAULT_CALLBACK_GAS_LIMIT: u32 = 500_000;

/// Upper bound on the time between two reconciliation cycles.
pub const DEFAULT_MAX_POLL_INTERVAL_SECS: u64 = 3600;

/// Environment variable holding the hex-encoded signing key.
pub const PRIVATE_KEY_VAR: &str = "PRIVATE_KEY";

/// One oracle deployment: where the Lido contracts live and which oracle to feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Target oracle receiving `requestUpdate` calls.
    pub succinct_oracle_address: Address,

    /// Lido locator on the source chain.
    pub lido_locator_address: Address,

    /// Chain the target oracle is deployed on.
    pub chain_id: u64,

    /// Chain the Lido contracts are deployed on.
    pub consensus_chain_id: u64,

    /// `requestUpdate` flavour of the deployed oracle.
    #[serde(default)]
    pub request_interface: RequestInterface,

    #[serde(default = "default_callback_gas_limit")]
    pub callback_gas_limit: u32,

    /// The loop re-evaluates at least this often, whatever the frame timing says.
    #[serde(default = "default_max_poll_interval_secs")]
    pub max_poll_interval_secs: u64,
}

fn default_callback_gas_limit() -> u32 {
    DEFAULT_CALLBACK_GAS_LIMIT
}

fn default_max_poll_interval_secs() -> u64 {
    DEFAULT_MAX_POLL_INTERVAL_SECS
}

impl DeploymentConfig {
    pub fn holesky() -> Self {
        Self {
            succinct_oracle_address: ADDRESS_HOLESKY_ORACLE,
            lido_locator_address: ADDRESS_HOLESKY_LOCATOR,
            chain_id: 17_000,
            consensus_chain_id: 17_000,
            request_interface: RequestInterface::BlockRoot,
            callback_gas_limit: DEFAULT_CALLBACK_GAS_LIMIT,
            max_poll_interval_secs: DEFAULT_MAX_POLL_INTERVAL_SECS,
        }
    }

    /// Resolves both chain ids and rejects unusable values.
    pub fn validate(&self) -> Result<(&'static Network, &'static Network)> {
        let source = Network::from_chain_id(self.consensus_chain_id)?;
        let target = Network::from_chain_id(self.chain_id)?;

        if self.callback_gas_limit == 0 {
            return Err(OperatorError::Config("callback_gas_limit must be non-zero".into()));
        }
        if self.max_poll_interval_secs == 0 {
            return Err(OperatorError::Config(
                "max_poll_interval_secs must be non-zero".into(),
            ));
        }
        if self.succinct_oracle_address.is_zero() || self.lido_locator_address.is_zero() {
            return Err(OperatorError::Config("contract addresses must be non-zero".into()));
        }

        Ok((source, target))
    }

    pub fn max_poll_interval(&self) -> Duration {
        Duration::from_secs(self.max_poll_interval_secs)
    }
}

const ADDRESS_HOLESKY_ORACLE: Address =
    alloy::primitives::address!("0xe90A3F2B97EeC62157ad48Dc26EBED28e60649c9");
const ADDRESS_HOLESKY_LOCATOR: Address =
    alloy::primitives::address!("0x28FAB2059C713A7F9D8c86Db49f9bb0e96Af1ef8");

/// Named deployments, built-in ones plus whatever a config file adds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorConfig {
    #[serde(default)]
    pub deployments: BTreeMap<String, DeploymentConfig>,
}

impl OperatorConfig {
    pub fn builtin() -> Self {
        let mut deployments = BTreeMap::new();
        deployments.insert("holesky".to_string(), DeploymentConfig::holesky());
        Self { deployments }
    }

    /// Load deployments from a TOML file on top of the built-in ones.
    ///
    /// A file entry with a built-in name replaces the built-in entry.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            OperatorError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: Self =
            toml::from_str(contents).map_err(|e| OperatorError::Config(e.to_string()))?;
        let mut config = Self::builtin();
        config.deployments.extend(file.deployments);
        Ok(config)
    }

    pub fn deployment(&self, name: &str) -> Result<&DeploymentConfig> {
        self.deployments.get(name).ok_or_else(|| {
            let known = self.deployments.keys().cloned().collect::<Vec<_>>().join(", ");
            OperatorError::Config(format!("unknown deployment `{name}` (known: {known})"))
        })
    }
}

/// Snapshot of the process environment.
///
/// Endpoints are keyed by chain id: `RPC_<id>` for execution RPCs and
/// `CONSENSUS_RPC_<id>` for the matching beacon node.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.vars
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| OperatorError::MissingEnv(key.to_string()))
    }

    fn url(&self, key: &str) -> Result<Url> {
        let raw = self.require(key)?;
        Url::parse(raw).map_err(|e| OperatorError::Config(format!("{key} is not a valid url: {e}")))
    }

    /// Execution RPC of `chain_id`.
    pub fn execution_rpc(&self, chain_id: u64) -> Result<Url> {
        self.url(&format!("RPC_{chain_id}"))
    }

    /// Beacon REST endpoint paired with `chain_id`.
    pub fn consensus_rpc(&self, chain_id: u64) -> Result<Url> {
        self.url(&format!("CONSENSUS_RPC_{chain_id}"))
    }

    /// Signing key for target-chain transactions; the `0x` prefix is optional.
    pub fn signer(&self) -> Result<PrivateKeySigner> {
        let raw = self.require(PRIVATE_KEY_VAR)?;
        let hex = raw.strip_prefix("0x").unwrap_or(raw);
        PrivateKeySigner::from_str(hex).map_err(|e| OperatorError::InvalidKey(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known first anvil account.
    const ANVIL_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_builtin_holesky() {
        let config = OperatorConfig::builtin();
        let holesky = config.deployment("holesky").unwrap();
        assert_eq!(holesky.chain_id, 17_000);
        assert_eq!(holesky.request_interface, RequestInterface::BlockRoot);

        let (source, target) = holesky.validate().unwrap();
        assert_eq!(source.name, "holesky");
        assert_eq!(target.name, "holesky");
    }

    #[test]
    fn test_parse_config_file() {
        let toml = r#"
[deployments.sepolia]
succinct_oracle_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
lido_locator_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
chain_id = 11155111
consensus_chain_id = 17000
request_interface = "slot"
"#;

        let config = OperatorConfig::from_toml_str(toml).unwrap();
        assert!(config.deployments.contains_key("holesky"));

        let sepolia = config.deployment("sepolia").unwrap();
        assert_eq!(sepolia.request_interface, RequestInterface::Slot);
        assert_eq!(sepolia.callback_gas_limit, DEFAULT_CALLBACK_GAS_LIMIT);
        assert_eq!(sepolia.max_poll_interval(), Duration::from_secs(3600));
        assert!(sepolia.validate().is_ok());
    }

    #[test]
    fn test_file_overrides_builtin() {
        let toml = r#"
[deployments.holesky]
succinct_oracle_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
lido_locator_address = "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
chain_id = 17000
consensus_chain_id = 17000
callback_gas_limit = 750000
"#;

        let config = OperatorConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.deployment("holesky").unwrap().callback_gas_limit, 750_000);
    }

    #[test]
    fn test_unknown_deployment() {
        let err = OperatorConfig::builtin().deployment("mainnet").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("mainnet"));
        assert!(msg.contains("holesky"));
    }

    #[test]
    fn test_validate_rejects_unknown_chain() {
        let mut deployment = DeploymentConfig::holesky();
        deployment.chain_id = 31_337;
        assert!(matches!(
            deployment.validate().unwrap_err(),
            OperatorError::UnknownChain(31_337)
        ));

        let mut deployment = DeploymentConfig::holesky();
        deployment.callback_gas_limit = 0;
        assert!(matches!(deployment.validate().unwrap_err(), OperatorError::Config(_)));
    }

    #[test]
    fn test_environment_lookups() {
        let env = Environment::from_vars([
            ("RPC_17000", "http://localhost:8545"),
            ("CONSENSUS_RPC_17000", "http://localhost:5052"),
            ("RPC_1", "not a url"),
            ("PRIVATE_KEY", ANVIL_KEY),
        ]);

        assert_eq!(env.execution_rpc(17_000).unwrap().as_str(), "http://localhost:8545/");
        assert_eq!(env.consensus_rpc(17_000).unwrap().as_str(), "http://localhost:5052/");
        assert!(matches!(
            env.execution_rpc(11_155_111).unwrap_err(),
            OperatorError::MissingEnv(var) if var == "RPC_11155111"
        ));
        assert!(matches!(env.execution_rpc(1).unwrap_err(), OperatorError::Config(_)));

        let signer = env.signer().unwrap();
        assert_eq!(
            signer.address(),
            alloy::primitives::address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
        );
    }

    #[test]
    fn test_signer_accepts_prefix_and_rejects_garbage() {
        let prefixed = format!("0x{ANVIL_KEY}");
        let env = Environment::from_vars([("PRIVATE_KEY", prefixed.as_str())]);
        assert!(env.signer().is_ok());

        let env = Environment::from_vars([("PRIVATE_KEY", "0x1234")]);
        assert!(matches!(env.signer().unwrap_err(), OperatorError::InvalidKey(_)));

        let env = Environment::from_vars([("PRIVATE_KEY", "")]);
        assert!(matches!(env.signer().unwrap_err(), OperatorError::MissingEnv(_)));
    }
}
