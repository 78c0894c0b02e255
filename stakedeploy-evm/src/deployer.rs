//! Alloy-backed implementation of the [`ContractDeployer`] seam.
//!
//! One [`EvmDeployer`] is built per run from a resolved [`NetworkProfile`].
//! It owns its provider, wallet, and nonce state, so runs against different
//! networks never share anything. Deployment submits a raw creation
//! transaction assembled from the Hardhat artifact; linking goes through the
//! typed [`IManaged`](crate::contracts::IManaged) binding. Every step blocks
//! until the transaction is confirmed, with a per-receipt timeout.

use std::time::Duration;

use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, TxHash, U256};
use alloy_provider::{DynProvider, PendingTransactionError, Provider, ProviderBuilder, WatchTxError};
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use alloy_transport_http::reqwest::Url;
use async_trait::async_trait;
use stakedeploy::{
    CallError, ConfigError, ContractDeployer, ContractDeploymentSpec, DeployError,
    DeployedContractHandle, DeployerAccount, NetworkProfile,
};

use crate::artifact::ArtifactStore;
use crate::contracts::IManaged;

/// Tunables for receipt waiting.
#[derive(Debug, Clone, Copy)]
pub struct DeployerOptions {
    /// Seconds to wait for each transaction receipt.
    pub receipt_timeout_secs: u64,
    /// Block confirmations to require before a step counts as done.
    pub confirmations: u64,
}

impl Default for DeployerOptions {
    fn default() -> Self {
        Self {
            receipt_timeout_secs: 120,
            confirmations: 1,
        }
    }
}

/// EVM deployment backend for one network.
#[derive(Debug)]
pub struct EvmDeployer {
    network: String,
    chain_id: u64,
    eip1559: bool,
    provider: DynProvider,
    signer_address: Address,
    artifacts: ArtifactStore,
    options: DeployerOptions,
}

impl EvmDeployer {
    /// Builds a deployer from a resolved profile and preloaded artifacts.
    ///
    /// The signer is bound to the profile's chain ID so every transaction it
    /// produces is replay-protected for that chain.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidCredential`] when the private key does not
    /// parse and [`ConfigError::InvalidRpcUrl`] for an unusable endpoint.
    pub fn connect(
        profile: &NetworkProfile,
        artifacts: ArtifactStore,
        options: DeployerOptions,
    ) -> Result<Self, ConfigError> {
        let signer: PrivateKeySigner =
            profile
                .credential
                .expose()
                .parse()
                .map_err(|e| ConfigError::InvalidCredential {
                    network: profile.name.clone(),
                    reason: format!("{e}"),
                })?;
        let signer = signer.with_chain_id(Some(profile.chain_id));
        let signer_address = signer.address();
        let wallet = EthereumWallet::from(signer);

        let url: Url = profile
            .rpc_url
            .parse()
            .map_err(|e| ConfigError::InvalidRpcUrl {
                url: profile.rpc_url.clone(),
                reason: format!("{e}"),
            })?;

        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(url)
            .erased();

        tracing::info!(
            network = %profile.name,
            chain_id = profile.chain_id,
            signer = %signer_address,
            "Connected EVM deployer"
        );

        Ok(Self {
            network: profile.name.clone(),
            chain_id: profile.chain_id,
            eip1559: profile.eip1559,
            provider,
            signer_address,
            artifacts,
            options,
        })
    }

    /// The address every transaction will be signed with.
    #[must_use]
    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.options.receipt_timeout_secs)
    }

    /// Applies an explicit gas price on chains without EIP-1559.
    async fn legacy_gas_price(&self) -> Result<Option<u128>, String> {
        if self.eip1559 {
            return Ok(None);
        }
        self.provider
            .get_gas_price()
            .await
            .map(Some)
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl ContractDeployer for EvmDeployer {
    async fn deployer_account(&self) -> Result<DeployerAccount, DeployError> {
        let actual = self
            .provider
            .get_chain_id()
            .await
            .map_err(|e| DeployError::Preflight {
                reason: e.to_string(),
            })?;
        if actual != self.chain_id {
            return Err(DeployError::ChainIdMismatch {
                expected: self.chain_id,
                actual,
            });
        }
        let balance = self
            .provider
            .get_balance(self.signer_address)
            .await
            .map_err(|e| DeployError::Preflight {
                reason: e.to_string(),
            })?;
        if balance == U256::ZERO {
            tracing::warn!(
                account = %self.signer_address,
                "Deployer account has zero balance"
            );
        }
        Ok(DeployerAccount {
            address: self.signer_address,
            balance,
        })
    }

    async fn deploy(
        &self,
        spec: &ContractDeploymentSpec,
        args: &[Address],
    ) -> Result<DeployedContractHandle, DeployError> {
        let artifact =
            self.artifacts
                .get(&spec.contract)
                .ok_or_else(|| DeployError::MissingArtifact {
                    contract: spec.contract.clone(),
                })?;

        let mut txr = TransactionRequest::default()
            .with_from(self.signer_address)
            .with_deploy_code(artifact.creation_code(args));

        if let Some(gas) = self
            .legacy_gas_price()
            .await
            .map_err(|reason| DeployError::Rpc {
                contract: spec.contract.clone(),
                reason,
            })?
        {
            txr.set_gas_price(gas);
        }

        tracing::debug!(contract = %spec.contract, args = args.len(), "Submitting creation transaction");
        let pending = self
            .provider
            .send_transaction(txr)
            .await
            .map_err(|e| classify_send_error(&spec.contract, &e.to_string()))?;

        let receipt = pending
            .with_required_confirmations(self.options.confirmations)
            .with_timeout(Some(self.receipt_timeout()))
            .get_receipt()
            .await
            .map_err(|e| match e {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    DeployError::ReceiptTimeout {
                        contract: spec.contract.clone(),
                    }
                }
                other => DeployError::Rpc {
                    contract: spec.contract.clone(),
                    reason: other.to_string(),
                },
            })?;

        let tx_hash = receipt.transaction_hash;
        if !receipt.status() {
            return Err(DeployError::Reverted {
                contract: spec.contract.clone(),
                tx_hash,
            });
        }
        let address = receipt
            .contract_address
            .ok_or(DeployError::NoContractAddress {
                contract: spec.contract.clone(),
                tx_hash,
            })?;

        Ok(DeployedContractHandle {
            id: spec.id.clone(),
            contract: spec.contract.clone(),
            address,
            network: self.network.clone(),
            chain_id: self.chain_id,
            tx_hash,
        })
    }

    async fn link(&self, target: Address, manager: Address) -> Result<TxHash, CallError> {
        let contract = IManaged::new(target, self.provider.clone());
        let mut call = contract.addManager(manager).from(self.signer_address);

        if let Some(gas) = self
            .legacy_gas_price()
            .await
            .map_err(|reason| CallError::Rpc {
                target: target.to_string(),
                manager: manager.to_string(),
                reason,
            })?
        {
            call = call.gas_price(gas);
        }

        let pending = call.send().await.map_err(|e| CallError::Rpc {
            target: target.to_string(),
            manager: manager.to_string(),
            reason: e.to_string(),
        })?;

        let receipt: TransactionReceipt = pending
            .with_required_confirmations(self.options.confirmations)
            .with_timeout(Some(self.receipt_timeout()))
            .get_receipt()
            .await
            .map_err(|e| match e {
                PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                    CallError::ReceiptTimeout {
                        target: target.to_string(),
                        manager: manager.to_string(),
                    }
                }
                other => CallError::Rpc {
                    target: target.to_string(),
                    manager: manager.to_string(),
                    reason: other.to_string(),
                },
            })?;

        if !receipt.status() {
            return Err(CallError::Reverted {
                target: target.to_string(),
                manager: manager.to_string(),
                tx_hash: receipt.transaction_hash,
            });
        }
        Ok(receipt.transaction_hash)
    }
}

/// Maps a send-time failure onto the deployment error kinds.
///
/// Nodes report underfunded accounts as a plain RPC error string, so the
/// classification is textual.
fn classify_send_error(contract: &str, reason: &str) -> DeployError {
    if reason.to_ascii_lowercase().contains("insufficient funds") {
        DeployError::InsufficientFunds {
            contract: contract.to_owned(),
            reason: reason.to_owned(),
        }
    } else {
        DeployError::Rpc {
            contract: contract.to_owned(),
            reason: reason.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use stakedeploy::SignerCredential;

    use super::*;

    fn profile(credential: &str, rpc_url: &str) -> NetworkProfile {
        NetworkProfile {
            name: "HecoTest".to_owned(),
            rpc_url: rpc_url.to_owned(),
            chain_id: 256,
            credential: SignerCredential::new(credential),
            eip1559: false,
        }
    }

    fn empty_store() -> ArtifactStore {
        ArtifactStore::load::<&str>(std::path::Path::new("/nonexistent"), &[]).unwrap()
    }

    #[test]
    fn connect_rejects_malformed_private_key() {
        let profile = profile("not-a-key", "http://localhost:8545");
        let err =
            EvmDeployer::connect(&profile, empty_store(), DeployerOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCredential { network, .. } if network == "HecoTest"));
    }

    #[test]
    fn connect_rejects_malformed_rpc_url() {
        let profile = profile(&"11".repeat(32), "not a url");
        let err =
            EvmDeployer::connect(&profile, empty_store(), DeployerOptions::default()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRpcUrl { .. }));
    }

    #[test]
    fn connect_derives_signer_address_from_key() {
        let profile = profile(&"11".repeat(32), "http://localhost:8545");
        let deployer =
            EvmDeployer::connect(&profile, empty_store(), DeployerOptions::default()).unwrap();
        assert_ne!(deployer.signer_address(), Address::ZERO);
    }

    #[test]
    fn send_errors_classify_insufficient_funds() {
        let err = classify_send_error("MaticData", "insufficient funds for gas * price + value");
        assert!(matches!(err, DeployError::InsufficientFunds { .. }));
        let err = classify_send_error("MaticData", "connection refused");
        assert!(matches!(err, DeployError::Rpc { .. }));
    }
}
