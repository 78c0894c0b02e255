//! Core types and orchestration for multi-network EVM contract deployment.
//!
//! This crate contains everything about a deployment run that is independent
//! of the chain backend:
//!
//! - [`network`] - Network profiles, the built-in network table, and the
//!   registry used to resolve a target network by name
//! - [`plan`] - Deployment plans: ordered contract specs, linking steps, and
//!   the built-in per-stack plans
//! - [`orchestrator`] - The [`ContractDeployer`](orchestrator::ContractDeployer)
//!   seam and the sequential [`run`](orchestrator::run) loop
//! - [`manifest`] - Machine-readable record of a completed run
//! - [`error`] - Error kinds shared across the workspace
//!
//! The actual RPC work (signer construction, creation transactions, the
//! `addManager` call) lives in the `stakedeploy-evm` crate behind the
//! [`ContractDeployer`](orchestrator::ContractDeployer) trait, which keeps
//! the orchestration loop testable without a chain.

pub mod error;
pub mod manifest;
pub mod network;
pub mod orchestrator;
pub mod plan;

pub use error::{CallError, ConfigError, DeployError, OrchestratorError};
pub use manifest::DeploymentManifest;
pub use network::{ChainId, NetworkEntry, NetworkProfile, NetworkRegistry, SignerCredential};
pub use orchestrator::{
    ContractDeployer, DeployedContractHandle, DeployerAccount, DeploymentOutcome, LinkReceipt, run,
};
pub use plan::{ConstructorArg, ContractDeploymentSpec, DeploymentPlan, LinkStep, StackKind};
