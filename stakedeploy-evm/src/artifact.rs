//! Hardhat compilation artifacts and creation-code assembly.
//!
//! The contracts themselves are compiled elsewhere; this crate only consumes
//! the artifact JSON Hardhat writes (`{ contractName, abi, bytecode }`).
//! An [`ArtifactStore`] preloads every artifact a plan needs before any RPC
//! happens, so a missing or empty artifact surfaces as a [`ConfigError`]
//! rather than a mid-run deployment failure.

use std::collections::HashMap;
use std::path::Path;

use alloy_primitives::{Address, Bytes, hex};
use serde::Deserialize;
use stakedeploy::ConfigError;

/// One compiled contract, as read from a Hardhat artifact file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractArtifact {
    /// Contract name as compiled.
    pub contract_name: String,
    /// Contract ABI (kept opaque; only the bytecode is consumed here).
    #[serde(default)]
    pub abi: serde_json::Value,
    /// Hex-encoded creation bytecode, `0x`-prefixed.
    pub bytecode: String,
    /// Decoded creation bytecode, filled in by [`parse`](Self::parse).
    #[serde(skip)]
    code: Bytes,
}

impl ContractArtifact {
    /// Parses an artifact from its JSON text and checks it is deployable.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Artifact`] when the JSON is malformed, the bytecode is
    /// not valid hex, or the bytecode is empty (`0x`), which Hardhat emits
    /// for interfaces and abstract contracts.
    pub fn parse(contract: &str, json: &str) -> Result<Self, ConfigError> {
        let mut artifact: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Artifact {
                contract: contract.to_owned(),
                reason: format!("malformed artifact JSON: {e}"),
            })?;
        let code = hex::decode(artifact.bytecode.trim_start_matches("0x")).map_err(|e| {
            ConfigError::Artifact {
                contract: contract.to_owned(),
                reason: format!("bytecode is not valid hex: {e}"),
            }
        })?;
        if code.is_empty() {
            return Err(ConfigError::Artifact {
                contract: contract.to_owned(),
                reason: "artifact has empty bytecode (interface or abstract contract?)".to_owned(),
            });
        }
        artifact.code = Bytes::from(code);
        Ok(artifact)
    }

    /// The decoded creation bytecode.
    #[must_use]
    pub fn creation_bytecode(&self) -> &Bytes {
        &self.code
    }

    /// Assembles the full creation input: bytecode followed by the
    /// ABI-encoded constructor arguments.
    ///
    /// The staking contracts only take address parameters, so the encoding
    /// is a sequence of left-padded 32-byte words appended to the bytecode.
    #[must_use]
    pub fn creation_code(&self, args: &[Address]) -> Bytes {
        let mut code = self.code.to_vec();
        code.extend(encode_address_args(args));
        Bytes::from(code)
    }
}

/// ABI-encodes a sequence of address constructor arguments.
///
/// Each address occupies one 32-byte word, left-padded with zeroes, exactly
/// as `abi.encode(address, ...)` produces for a static parameter list.
#[must_use]
pub fn encode_address_args(args: &[Address]) -> Vec<u8> {
    let mut out = Vec::with_capacity(args.len() * 32);
    for addr in args {
        out.extend_from_slice(addr.into_word().as_slice());
    }
    out
}

/// Preloaded artifacts for every contract a plan deploys.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    artifacts: HashMap<String, ContractArtifact>,
}

impl ArtifactStore {
    /// Loads the artifacts for `contracts` from `dir`.
    ///
    /// Both flat Hardhat layouts are tried for each name:
    /// `<dir>/<Name>.json` and `<dir>/<Name>.sol/<Name>.json`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Artifact`] for the first contract whose artifact is
    /// missing or unusable.
    pub fn load<S: AsRef<str>>(dir: &Path, contracts: &[S]) -> Result<Self, ConfigError> {
        let mut artifacts = HashMap::new();
        for contract in contracts {
            let contract = contract.as_ref();
            if artifacts.contains_key(contract) {
                continue;
            }
            let json = read_artifact_file(dir, contract)?;
            artifacts.insert(contract.to_owned(), ContractArtifact::parse(contract, &json)?);
        }
        Ok(Self { artifacts })
    }

    /// Returns the artifact for `contract`, if it was preloaded.
    #[must_use]
    pub fn get(&self, contract: &str) -> Option<&ContractArtifact> {
        self.artifacts.get(contract)
    }
}

fn read_artifact_file(dir: &Path, contract: &str) -> Result<String, ConfigError> {
    let candidates = [
        dir.join(format!("{contract}.json")),
        dir.join(format!("{contract}.sol")).join(format!("{contract}.json")),
    ];
    for path in &candidates {
        if path.is_file() {
            return std::fs::read_to_string(path).map_err(|e| ConfigError::Artifact {
                contract: contract.to_owned(),
                reason: format!("cannot read {}: {e}", path.display()),
            });
        }
    }
    Err(ConfigError::Artifact {
        contract: contract.to_owned(),
        reason: format!("no artifact found under {}", dir.display()),
    })
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    const SAMPLE: &str = r#"{
        "contractName": "MaticData",
        "abi": [],
        "bytecode": "0x6080604052348015600f57600080fd5b50"
    }"#;

    #[test]
    fn parses_hardhat_artifact() {
        let artifact = ContractArtifact::parse("MaticData", SAMPLE).unwrap();
        assert_eq!(artifact.contract_name, "MaticData");
        let code = artifact.creation_bytecode();
        assert_eq!(code[0], 0x60);
        assert_eq!(code.len(), 17);
    }

    #[test]
    fn empty_bytecode_is_rejected() {
        let json = r#"{ "contractName": "IData", "abi": [], "bytecode": "0x" }"#;
        let err = ContractArtifact::parse("IData", json).unwrap_err();
        assert!(err.to_string().contains("empty bytecode"));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        let json = r#"{ "contractName": "X", "abi": [], "bytecode": "0xzz" }"#;
        let err = ContractArtifact::parse("X", json).unwrap_err();
        assert!(err.to_string().contains("not valid hex"));
    }

    #[test]
    fn constructor_args_round_trip_through_encoding() {
        let data = address!("9c6190c02E30D0a8dB5F9F39C8B4d3AF513C5C16");
        let token = address!("9E976F211daea0D652912AB99b0Dc21a7fD728e4");
        let words = encode_address_args(&[data, token]);
        assert_eq!(words.len(), 64);
        // Each word decodes back to exactly the input address.
        assert_eq!(Address::from_slice(&words[12..32]), data);
        assert_eq!(Address::from_slice(&words[44..64]), token);
        // Left padding is all zeroes.
        assert!(words[0..12].iter().all(|b| *b == 0));
    }

    #[test]
    fn creation_code_appends_args_to_bytecode() {
        let artifact = ContractArtifact::parse("MaticData", SAMPLE).unwrap();
        let arg = address!("228F78fC398DB973B96eD666C92E78753b9466Eb");
        let code = artifact.creation_code(&[arg]);
        assert_eq!(code.len(), 17 + 32);
        assert_eq!(Address::from_slice(&code[17 + 12..]), arg);
    }

    #[test]
    fn store_reports_missing_artifact() {
        let dir = std::env::temp_dir().join("stakedeploy-missing-artifacts");
        let err = ArtifactStore::load(&dir, &["EthereumData"]).unwrap_err();
        assert!(matches!(err, ConfigError::Artifact { contract, .. } if contract == "EthereumData"));
    }

    #[test]
    fn store_loads_flat_layout() {
        let dir = std::env::temp_dir().join(format!(
            "stakedeploy-artifacts-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("MaticData.json"), SAMPLE).unwrap();
        let store = ArtifactStore::load(&dir, &["MaticData"]).unwrap();
        assert!(store.get("MaticData").is_some());
        assert!(store.get("MaticStaking").is_none());
        std::fs::remove_dir_all(&dir).ok();
    }
}
