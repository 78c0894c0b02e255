//! Error kinds shared across the workspace.
//!
//! Four concerns, mirroring the failure surfaces of a deployment run:
//! configuration ([`ConfigError`]), contract creation ([`DeployError`]),
//! post-deployment linking ([`CallError`]), and the top-level
//! [`OrchestratorError`] that the binary reports before exiting nonzero.
//! Nothing is retried or recovered; every error propagates to the caller.

use alloy_primitives::TxHash;

/// Bad or missing configuration, detected before any RPC is attempted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested network name is not in the registry.
    #[error("unknown network '{name}'")]
    UnknownNetwork {
        /// The name that failed to resolve.
        name: String,
    },

    /// A registry entry is missing a required field.
    #[error("network '{network}' is missing required field '{field}'")]
    MissingField {
        /// The network whose entry is incomplete.
        network: String,
        /// The missing field.
        field: &'static str,
    },

    /// No signing key is available for the network.
    #[error("no signing credential for network '{network}' (set the signer key environment variable)")]
    MissingCredential {
        /// The network without a credential.
        network: String,
    },

    /// The signing key could not be parsed.
    #[error("invalid signing credential for network '{network}': {reason}")]
    InvalidCredential {
        /// The network whose key is malformed.
        network: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The RPC URL could not be parsed.
    #[error("invalid RPC URL '{url}': {reason}")]
    InvalidRpcUrl {
        /// The offending URL.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A deployment plan failed validation.
    #[error("invalid deployment plan: {reason}")]
    InvalidPlan {
        /// What the validator rejected.
        reason: String,
    },

    /// A contract artifact is missing or unusable.
    #[error("artifact for contract '{contract}': {reason}")]
    Artifact {
        /// The contract whose artifact failed to load.
        contract: String,
        /// What went wrong.
        reason: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("configuration file '{path}': {reason}")]
    File {
        /// Path of the configuration file.
        path: String,
        /// What went wrong.
        reason: String,
    },
}

/// A contract-creation transaction failed.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The node answers for a different chain than the profile claims.
    ///
    /// Refusing to continue here is what prevents cross-chain replay of a
    /// run pointed at the wrong RPC endpoint.
    #[error("chain id mismatch: profile expects {expected}, node reports {actual}")]
    ChainIdMismatch {
        /// Chain ID from the resolved network profile.
        expected: u64,
        /// Chain ID the node returned.
        actual: u64,
    },

    /// RPC failure before the first deployment (chain id or balance query).
    #[error("RPC failure during preflight: {reason}")]
    Preflight {
        /// Transport diagnostic.
        reason: String,
    },

    /// The deployer was asked for a contract it has no artifact for.
    #[error("no artifact preloaded for contract '{contract}'")]
    MissingArtifact {
        /// The contract without an artifact.
        contract: String,
    },

    /// The creation transaction was mined but reverted.
    #[error("deployment of '{contract}' reverted in transaction {tx_hash}")]
    Reverted {
        /// The contract being deployed.
        contract: String,
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
    },

    /// The deployer account cannot cover the transaction.
    #[error("insufficient funds on deployer account for '{contract}': {reason}")]
    InsufficientFunds {
        /// The contract being deployed.
        contract: String,
        /// Node diagnostic.
        reason: String,
    },

    /// The receipt carries no contract address.
    #[error("receipt for '{contract}' ({tx_hash}) has no contract address")]
    NoContractAddress {
        /// The contract being deployed.
        contract: String,
        /// Hash of the creation transaction.
        tx_hash: TxHash,
    },

    /// Waiting for the creation receipt timed out.
    #[error("timed out waiting for deployment receipt of '{contract}'")]
    ReceiptTimeout {
        /// The contract being deployed.
        contract: String,
    },

    /// RPC transport failure (unreachable node, malformed response).
    #[error("RPC failure while deploying '{contract}': {reason}")]
    Rpc {
        /// The contract being deployed.
        contract: String,
        /// Transport diagnostic.
        reason: String,
    },
}

/// A post-deployment linking call (`addManager`) failed.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// The call was mined but reverted.
    #[error("addManager({manager}) on {target} reverted in transaction {tx_hash}")]
    Reverted {
        /// The contract the call was sent to.
        target: String,
        /// The manager address being granted.
        manager: String,
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
    },

    /// Waiting for the call receipt timed out.
    #[error("timed out waiting for addManager({manager}) receipt on {target}")]
    ReceiptTimeout {
        /// The contract the call was sent to.
        target: String,
        /// The manager address being granted.
        manager: String,
    },

    /// RPC transport failure.
    #[error("RPC failure during addManager({manager}) on {target}: {reason}")]
    Rpc {
        /// The contract the call was sent to.
        target: String,
        /// The manager address being granted.
        manager: String,
        /// Transport diagnostic.
        reason: String,
    },
}

/// Top-level failure of a deployment run.
///
/// Wraps the step-specific kinds so `main` can report which phase failed
/// before exiting with status 1.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Configuration or plan validation failed; no RPC was attempted.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// A contract deployment step failed; later steps were not attempted.
    #[error("deployment: {0}")]
    Deploy(#[from] DeployError),

    /// A linking step failed; the deployed contracts are left unlinked.
    #[error("linking: {0}")]
    Call(#[from] CallError),
}
