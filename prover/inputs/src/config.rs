use ledger_hasher::Poseidon;
use ledger_indexed_merkle_tree::{IndexedMerkleTree, LeafEncoding};
use ledger_merkle_tree::{PersistentMerkleTree, MAX_HEIGHT};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_BATCH_ADDRESS_TREE_HEIGHT, DEFAULT_BATCH_STATE_TREE_HEIGHT, DEFAULT_MIN_VALUE_GAP,
        DEFAULT_ZKP_BATCH_SIZE,
    },
    errors::{ConfigError, ProverInputsError},
};

/// Parameters handed over by the key/parameter loader.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ProverInputsConfig {
    pub state_tree_height: usize,
    pub address_tree_height: usize,
    pub zkp_batch_size: usize,
    pub leaf_encoding: LeafEncoding,
    pub min_value_gap: u64,
}

impl Default for ProverInputsConfig {
    fn default() -> Self {
        Self {
            state_tree_height: DEFAULT_BATCH_STATE_TREE_HEIGHT,
            address_tree_height: DEFAULT_BATCH_ADDRESS_TREE_HEIGHT,
            zkp_batch_size: DEFAULT_ZKP_BATCH_SIZE,
            leaf_encoding: LeafEncoding::default(),
            min_value_gap: DEFAULT_MIN_VALUE_GAP,
        }
    }
}

impl ProverInputsConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for height in [self.state_tree_height, self.address_tree_height] {
            if height == 0 || height > MAX_HEIGHT {
                return Err(ConfigError::InvalidHeight(height));
            }
        }
        if self.zkp_batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.min_value_gap == 0 {
            return Err(ConfigError::ZeroValueGap);
        }
        let height = self.state_tree_height.min(self.address_tree_height);
        // Address trees spend two leaves on the sentinels.
        if self.zkp_batch_size > (1usize << height) - 2 {
            return Err(ConfigError::BatchExceedsTree {
                batch_size: self.zkp_batch_size,
                height,
            });
        }
        Ok(())
    }

    pub fn min_value_gap(&self) -> BigUint {
        BigUint::from(self.min_value_gap)
    }

    /// Empty state tree of the configured height.
    pub fn state_tree(&self) -> Result<PersistentMerkleTree<Poseidon>, ProverInputsError> {
        Ok(PersistentMerkleTree::new(self.state_tree_height)?)
    }

    /// Address tree of the configured height and encoding, holding only the
    /// two sentinels.
    pub fn address_tree(&self) -> Result<IndexedMerkleTree<Poseidon>, ProverInputsError> {
        let mut tree = IndexedMerkleTree::new(self.address_tree_height, self.leaf_encoding)?;
        tree.init()?;
        Ok(tree)
    }
}

pub(crate) fn check_batch_size(
    batch_size: usize,
    zkp_batch_size: Option<usize>,
) -> Result<(), ProverInputsError> {
    match zkp_batch_size {
        Some(max) if batch_size > max => Err(ProverInputsError::BatchTooLarge { batch_size, max }),
        _ => Ok(()),
    }
}
