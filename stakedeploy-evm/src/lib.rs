//! Alloy-backed EVM deployment backend for `stakedeploy`.
//!
//! Implements the core crate's
//! [`ContractDeployer`](stakedeploy::ContractDeployer) seam on top of the
//! alloy provider stack:
//!
//! - [`artifact`] - Hardhat artifact loading and creation-code assembly
//! - [`contracts`] - `sol!` bindings for the `addManager` linking surface
//! - [`deployer`] - [`EvmDeployer`]: signer/provider construction, creation
//!   transactions, linking calls, receipt waiting
//!
//! Everything here is one-network, one-run: construct an [`EvmDeployer`]
//! from a resolved profile, hand it to
//! [`stakedeploy::run`], and drop it.

pub mod artifact;
pub mod contracts;
pub mod deployer;

pub use artifact::{ArtifactStore, ContractArtifact};
pub use deployer::{DeployerOptions, EvmDeployer};
