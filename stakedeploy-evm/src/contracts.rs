//! Solidity interface definitions for on-chain interactions.
//!
//! Only the post-deployment surface is declared here; deployment itself goes
//! through raw creation transactions built from Hardhat artifacts (see
//! [`crate::artifact`]).

use alloy_sol_types::sol;

sol! {
    /// Manager-list surface shared by the data and staking contracts.
    ///
    /// `addManager` grants the given address permission to invoke the
    /// privileged methods of the contract; the staking contract must be a
    /// manager of its data contract, and the relayer a manager of the
    /// staking contract.
    #[allow(missing_docs)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IManaged {
        function addManager(address manager) external;
    }
}
