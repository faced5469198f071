//! Beacon block headers and their SSZ hash-tree-root.
//!
//! The oracle contract is handed the root of the header rather than the header
//! itself, so whoever fulfils the request can prove beacon state against it.

use alloy::primitives::B256;
use serde::{Deserialize, Serialize};
use ssz_rs::prelude::{Merkleized, Node};

use crate::error::{OperatorError, Result};

/// 32-byte hash-tree-root of a [`BeaconBlockHeader`].
pub type BlockRoot = B256;

/// The `BeaconBlockHeader` container as served by `/eth/v1/beacon/headers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    #[serde(with = "quoted_u64")]
    pub slot: u64,
    #[serde(with = "quoted_u64")]
    pub proposer_index: u64,
    pub parent_root: B256,
    pub state_root: B256,
    pub body_root: B256,
}

mod ssz {
    use ssz_rs::prelude::*;

    /// SSZ view of the header, field order as in the consensus specs.
    #[derive(Default, Debug, SimpleSerialize)]
    pub(super) struct BeaconBlockHeader {
        pub(super) slot: u64,
        pub(super) proposer_index: u64,
        pub(super) parent_root: Node,
        pub(super) state_root: Node,
        pub(super) body_root: Node,
    }
}

impl BeaconBlockHeader {
    /// Computes the SSZ hash-tree-root of the header.
    pub fn hash_tree_root(&self) -> Result<BlockRoot> {
        let mut container = ssz::BeaconBlockHeader {
            slot: self.slot,
            proposer_index: self.proposer_index,
            parent_root: node(&self.parent_root)?,
            state_root: node(&self.state_root)?,
            body_root: node(&self.body_root)?,
        };
        let root = container
            .hash_tree_root()
            .map_err(|e| OperatorError::Ssz(e.to_string()))?;
        Ok(B256::from_slice(root.as_ref()))
    }
}

fn node(root: &B256) -> Result<Node> {
    Node::try_from(root.as_slice()).map_err(|e| OperatorError::Ssz(e.to_string()))
}

/// The beacon API encodes 64-bit integers as decimal strings.
mod quoted_u64 {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(super) fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Quoted {
            Str(String),
            Num(u64),
        }

        match Quoted::deserialize(deserializer)? {
            Quoted::Str(s) => s.parse().map_err(D::Error::custom),
            Quoted::Num(n) => Ok(n),
        }
    }
}
