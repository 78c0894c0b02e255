//! Machine-readable record of a completed deployment run.
//!
//! The original workflow left no record of what was deployed where beyond
//! scrollback; redeploys had to be reconstructed from console logs. The
//! manifest captures the run as JSON so addresses can be fed into other
//! tooling (explorers, relayer configuration) or simply kept.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::network::ChainId;
use crate::orchestrator::{DeployedContractHandle, DeploymentOutcome, LinkReceipt};

/// JSON record of one deployment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentManifest {
    /// Network name the run targeted.
    pub network: String,
    /// EIP-155 chain ID of that network.
    pub chain_id: ChainId,
    /// The account that signed every transaction.
    pub deployer: Address,
    /// Deployed contracts, in execution order.
    pub contracts: Vec<DeployedContractHandle>,
    /// Linking calls, in execution order.
    pub links: Vec<LinkReceipt>,
    /// Unix timestamp (seconds) when the run completed.
    pub completed_at: u64,
}

impl DeploymentManifest {
    /// Builds a manifest from a finished run.
    #[must_use]
    pub fn new(
        network: impl Into<String>,
        chain_id: ChainId,
        deployer: Address,
        outcome: &DeploymentOutcome,
    ) -> Self {
        let completed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            network: network.into(),
            chain_id,
            deployer,
            contracts: outcome.handles.clone(),
            links: outcome.links.clone(),
            completed_at,
        }
    }

    /// Serializes the manifest as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error (not expected for this
    /// shape).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the manifest to `path` as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be written.
    pub fn write(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::TxHash;

    use super::*;

    #[test]
    fn manifest_round_trips_through_json() {
        let outcome = DeploymentOutcome {
            handles: vec![DeployedContractHandle {
                id: "data".to_owned(),
                contract: "MaticData".to_owned(),
                address: Address::repeat_byte(0x11),
                network: "MaticTest".to_owned(),
                chain_id: 80001,
                tx_hash: TxHash::repeat_byte(0x22),
            }],
            links: vec![LinkReceipt {
                target: "data".to_owned(),
                manager: Address::repeat_byte(0x33),
                tx_hash: TxHash::repeat_byte(0x44),
            }],
        };
        let manifest =
            DeploymentManifest::new("MaticTest", 80001, Address::repeat_byte(0xEE), &outcome);
        let json = manifest.to_json().unwrap();
        let parsed: DeploymentManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.network, "MaticTest");
        assert_eq!(parsed.chain_id, 80001);
        assert_eq!(parsed.contracts.len(), 1);
        assert_eq!(parsed.contracts[0].address, Address::repeat_byte(0x11));
        assert_eq!(parsed.links.len(), 1);
    }
}
