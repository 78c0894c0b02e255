//! Sequential execution of a deployment plan against a chain backend.
//!
//! The [`ContractDeployer`] trait is the seam between the orchestration loop
//! and the RPC layer: the loop decides *what* happens in *which* order, the
//! deployer decides *how* a creation transaction or an `addManager` call is
//! submitted. [`run`] walks the plan strictly in order and aborts on the
//! first failure; there is no retry and no rollback, so a failed link leaves
//! the already-deployed contracts in place exactly as the node reports them.

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{CallError, ConfigError, DeployError, OrchestratorError};
use crate::network::ChainId;
use crate::plan::{ConstructorArg, ContractDeploymentSpec, DeploymentPlan};

/// The account a deployer signs with, as reported before the first step.
#[derive(Debug, Clone, Copy)]
pub struct DeployerAccount {
    /// Signer address.
    pub address: Address,
    /// Balance in wei at the start of the run.
    pub balance: U256,
}

/// The result of one successful contract deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployedContractHandle {
    /// Plan-local id of the spec that produced this contract.
    pub id: String,
    /// Contract (artifact) name.
    pub contract: String,
    /// Address of the deployed contract.
    pub address: Address,
    /// Name of the network it was deployed to.
    pub network: String,
    /// EIP-155 chain ID of that network.
    pub chain_id: ChainId,
    /// Hash of the creation transaction.
    pub tx_hash: TxHash,
}

/// The result of one successful linking call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkReceipt {
    /// Plan-local id of the contract the call was sent to.
    pub target: String,
    /// The manager address that was granted.
    pub manager: Address,
    /// Hash of the linking transaction.
    pub tx_hash: TxHash,
}

/// Everything a completed run produced, in execution order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentOutcome {
    /// Deployed contracts, in plan order.
    pub handles: Vec<DeployedContractHandle>,
    /// Linking calls, in plan order.
    pub links: Vec<LinkReceipt>,
}

impl DeploymentOutcome {
    /// Looks up a handle by its plan-local id.
    #[must_use]
    pub fn handle(&self, id: &str) -> Option<&DeployedContractHandle> {
        self.handles.iter().find(|h| h.id == id)
    }
}

/// Chain backend capable of deploying and linking contracts.
///
/// Implementations own their provider, signer, and nonce state; nothing is
/// shared between deployers, so two runs against different networks are
/// fully isolated.
#[async_trait]
pub trait ContractDeployer: Send + Sync {
    /// Reports the signer address and its current balance.
    async fn deployer_account(&self) -> Result<DeployerAccount, DeployError>;

    /// Submits a creation transaction for `spec` with fully resolved
    /// constructor arguments and waits for its receipt.
    async fn deploy(
        &self,
        spec: &ContractDeploymentSpec,
        args: &[Address],
    ) -> Result<DeployedContractHandle, DeployError>;

    /// Calls `addManager(manager)` on the contract at `target` and waits for
    /// the receipt.
    async fn link(&self, target: Address, manager: Address) -> Result<TxHash, CallError>;
}

/// Executes `plan` against `deployer`, strictly in plan order.
///
/// The plan is validated first; an invalid plan aborts the run before any
/// RPC is attempted. Each deployment and each linking call blocks until its
/// transaction is confirmed. The first failing step aborts the run with the
/// step's error; steps after it are never attempted.
///
/// # Errors
///
/// [`OrchestratorError`] wrapping the failing phase's error kind.
pub async fn run<D: ContractDeployer + ?Sized>(
    deployer: &D,
    plan: &DeploymentPlan,
) -> Result<DeploymentOutcome, OrchestratorError> {
    plan.validate()?;

    let account = deployer.deployer_account().await?;
    tracing::info!(
        account = %account.address,
        balance = %account.balance,
        "Deploying contracts with the account"
    );

    let mut outcome = DeploymentOutcome::default();

    for spec in &plan.specs {
        let args = resolve_args(&spec.args, &outcome)?;
        let handle = deployer.deploy(spec, &args).await?;
        tracing::info!(
            contract = %spec.contract,
            address = %handle.address,
            tx = %handle.tx_hash,
            "Contract deployed"
        );
        outcome.handles.push(handle);
    }

    for link in &plan.links {
        let target = outcome
            .handle(&link.target)
            .ok_or_else(|| ConfigError::InvalidPlan {
                reason: format!("link targets undeclared contract '{}'", link.target),
            })?
            .address;
        let manager = resolve_arg(&link.manager, &outcome)?;
        let tx_hash = deployer.link(target, manager).await?;
        tracing::info!(
            target = %link.target,
            manager = %manager,
            tx = %tx_hash,
            "Manager added"
        );
        outcome.links.push(LinkReceipt {
            target: link.target.clone(),
            manager,
            tx_hash,
        });
    }

    Ok(outcome)
}

/// Resolves a list of constructor arguments against the deployments so far.
fn resolve_args(
    args: &[ConstructorArg],
    outcome: &DeploymentOutcome,
) -> Result<Vec<Address>, ConfigError> {
    args.iter().map(|arg| resolve_arg(arg, outcome)).collect()
}

fn resolve_arg(arg: &ConstructorArg, outcome: &DeploymentOutcome) -> Result<Address, ConfigError> {
    match arg {
        ConstructorArg::Address(addr) => Ok(*addr),
        ConstructorArg::Deployed { deployed } => outcome
            .handle(deployed)
            .map(|h| h.address)
            .ok_or_else(|| ConfigError::InvalidPlan {
                reason: format!("reference to undeployed contract '{deployed}'"),
            }),
    }
}
