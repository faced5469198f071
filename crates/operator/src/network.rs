//! Chain id to network lookup.

use std::fmt;

use crate::error::{OperatorError, Result};

/// An execution network the operator knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    pub chain_id: u64,
    pub name: &'static str,
}

/// Every network a deployment may reference, either as source or as target.
pub const NETWORKS: &[Network] = &[
    Network { chain_id: 1, name: "mainnet" },
    Network { chain_id: 5, name: "goerli" },
    Network { chain_id: 11_155_111, name: "sepolia" },
    Network { chain_id: 17_000, name: "holesky" },
];

impl Network {
    pub fn from_chain_id(chain_id: u64) -> Result<&'static Self> {
        NETWORKS
            .iter()
            .find(|network| network.chain_id == chain_id)
            .ok_or(OperatorError::UnknownChain(chain_id))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}
