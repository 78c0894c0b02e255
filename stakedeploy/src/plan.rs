//! Deployment plans: what to deploy, in which order, and how to wire the
//! results together.
//!
//! A [`DeploymentPlan`] is an ordered list of [`ContractDeploymentSpec`]s
//! followed by [`LinkStep`]s. Constructor arguments may reference earlier
//! deployments by id; [`DeploymentPlan::validate`] enforces that every
//! reference points backwards, so the sequential executor never needs an
//! address it has not produced yet.
//!
//! The two stacks this project ships (`data` + `staking` pairs for Ethereum
//! and for Matic-family chains) are available as built-in plans via
//! [`StackKind`]; bespoke plans can be deserialized from TOML/JSON.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// ERC-20 token staked through `EthereumStaking` (mainnet).
pub const ETHEREUM_STAKING_TOKEN: Address = address!("9E976F211daea0D652912AB99b0Dc21a7fD728e4");

/// Relayer account granted manager rights on `EthereumStaking` (mainnet).
pub const ETHEREUM_RELAYER: Address = address!("200aee9ba7040d778922a763ce8a50948d61aff5");

/// Relayer account granted manager rights on `MaticStaking`.
pub const MATIC_RELAYER: Address = address!("228F78fC398DB973B96eD666C92E78753b9466Eb");

/// One constructor argument: either a literal address or a reference to a
/// contract deployed earlier in the same plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstructorArg {
    /// A literal address, written as a hex string in plan files.
    Address(Address),
    /// The address of an earlier deployment, by spec id.
    Deployed {
        /// Id of the spec whose address should be substituted.
        deployed: String,
    },
}

impl ConstructorArg {
    /// Shorthand for a deployed-contract reference.
    pub fn deployed(id: impl Into<String>) -> Self {
        Self::Deployed { deployed: id.into() }
    }
}

/// One contract to deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDeploymentSpec {
    /// Plan-local id used by later steps to reference this deployment.
    pub id: String,
    /// Contract (artifact) name, e.g. `MaticData`.
    pub contract: String,
    /// Ordered constructor arguments.
    #[serde(default)]
    pub args: Vec<ConstructorArg>,
}

/// One post-deployment `addManager` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStep {
    /// Id of the deployed contract receiving the call.
    pub target: String,
    /// The address being granted manager rights.
    pub manager: ConstructorArg,
}

/// An ordered deployment plan: contracts first, linking calls after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    /// Contracts to deploy, in dependency order.
    #[serde(rename = "contracts")]
    pub specs: Vec<ContractDeploymentSpec>,
    /// Linking calls to perform once everything is deployed.
    #[serde(default)]
    pub links: Vec<LinkStep>,
}

impl DeploymentPlan {
    /// Checks the plan's internal consistency before any RPC is attempted.
    ///
    /// Rules:
    /// - spec ids are unique and non-empty
    /// - a `deployed` reference in constructor args points to a spec declared
    ///   strictly earlier in the list
    /// - link targets and link manager references name declared specs
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidPlan`] describing the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for spec in &self.specs {
            if spec.id.is_empty() {
                return Err(invalid("spec with empty id"));
            }
            for arg in &spec.args {
                if let ConstructorArg::Deployed { deployed } = arg {
                    if !seen.contains(deployed.as_str()) {
                        return Err(invalid(format!(
                            "'{}' references '{deployed}' before it is deployed",
                            spec.id
                        )));
                    }
                }
            }
            if !seen.insert(spec.id.as_str()) {
                return Err(invalid(format!("duplicate spec id '{}'", spec.id)));
            }
        }
        for link in &self.links {
            if !seen.contains(link.target.as_str()) {
                return Err(invalid(format!(
                    "link targets undeclared contract '{}'",
                    link.target
                )));
            }
            if let ConstructorArg::Deployed { deployed } = &link.manager {
                if !seen.contains(deployed.as_str()) {
                    return Err(invalid(format!(
                        "link manager references undeclared contract '{deployed}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidPlan {
        reason: reason.into(),
    }
}

/// The contract stacks this project deploys, one tagged variant per chain
/// family instead of one copy-pasted script per network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    /// `EthereumData` + `EthereumStaking` (ERC-20 staking).
    Ethereum,
    /// `MaticData` + `MaticStaking` (native staking).
    Matic,
}

impl StackKind {
    /// Builds the built-in plan for this stack.
    ///
    /// Both stacks follow the same shape: deploy the data contract, deploy
    /// the staking contract pointing at it, let the data contract accept
    /// calls from the staking contract, and grant the relayer manager rights
    /// on the staking contract.
    #[must_use]
    pub fn plan(self) -> DeploymentPlan {
        match self {
            Self::Ethereum => DeploymentPlan {
                specs: vec![
                    ContractDeploymentSpec {
                        id: "data".to_owned(),
                        contract: "EthereumData".to_owned(),
                        args: vec![],
                    },
                    ContractDeploymentSpec {
                        id: "staking".to_owned(),
                        contract: "EthereumStaking".to_owned(),
                        args: vec![
                            ConstructorArg::deployed("data"),
                            ConstructorArg::Address(ETHEREUM_STAKING_TOKEN),
                        ],
                    },
                ],
                links: vec![
                    LinkStep {
                        target: "data".to_owned(),
                        manager: ConstructorArg::deployed("staking"),
                    },
                    LinkStep {
                        target: "staking".to_owned(),
                        manager: ConstructorArg::Address(ETHEREUM_RELAYER),
                    },
                ],
            },
            Self::Matic => DeploymentPlan {
                specs: vec![
                    ContractDeploymentSpec {
                        id: "data".to_owned(),
                        contract: "MaticData".to_owned(),
                        args: vec![],
                    },
                    ContractDeploymentSpec {
                        id: "staking".to_owned(),
                        contract: "MaticStaking".to_owned(),
                        args: vec![ConstructorArg::deployed("data")],
                    },
                ],
                links: vec![
                    LinkStep {
                        target: "data".to_owned(),
                        manager: ConstructorArg::deployed("staking"),
                    },
                    LinkStep {
                        target: "staking".to_owned(),
                        manager: ConstructorArg::Address(MATIC_RELAYER),
                    },
                ],
            },
        }
    }
}

impl fmt::Display for StackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ethereum => f.write_str("ethereum"),
            Self::Matic => f.write_str("matic"),
        }
    }
}

impl FromStr for StackKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ethereum" | "eth" => Ok(Self::Ethereum),
            "matic" | "polygon" => Ok(Self::Matic),
            other => Err(ConfigError::InvalidPlan {
                reason: format!("unknown stack '{other}' (expected 'ethereum' or 'matic')"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_plans_validate() {
        StackKind::Ethereum.plan().validate().unwrap();
        StackKind::Matic.plan().validate().unwrap();
    }

    #[test]
    fn matic_plan_matches_script_shape() {
        let plan = StackKind::Matic.plan();
        assert_eq!(plan.specs.len(), 2);
        assert_eq!(plan.specs[0].contract, "MaticData");
        assert_eq!(plan.specs[1].contract, "MaticStaking");
        assert_eq!(plan.specs[1].args, vec![ConstructorArg::deployed("data")]);
        assert_eq!(plan.links.len(), 2);
        assert_eq!(plan.links[1].manager, ConstructorArg::Address(MATIC_RELAYER));
    }

    #[test]
    fn forward_reference_is_rejected() {
        // The shape of the abandoned deploy_ethereum_next script: a staking
        // contract referencing a data contract that is never deployed.
        let plan = DeploymentPlan {
            specs: vec![ContractDeploymentSpec {
                id: "staking".to_owned(),
                contract: "EthereumStaking".to_owned(),
                args: vec![ConstructorArg::deployed("data")],
            }],
            links: vec![],
        };
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("before it is deployed"));
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut plan = StackKind::Matic.plan();
        plan.specs[1].id = "data".to_owned();
        plan.specs[1].args.clear();
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate spec id 'data'"));
    }

    #[test]
    fn link_to_undeclared_contract_is_rejected() {
        let mut plan = StackKind::Matic.plan();
        plan.links.push(LinkStep {
            target: "vault".to_owned(),
            manager: ConstructorArg::Address(MATIC_RELAYER),
        });
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("undeclared contract 'vault'"));
    }

    #[test]
    fn plan_deserializes_from_json() {
        let json = serde_json::json!({
            "contracts": [
                { "id": "data", "contract": "MaticData" },
                { "id": "staking", "contract": "MaticStaking",
                  "args": [{ "deployed": "data" }] }
            ],
            "links": [
                { "target": "data", "manager": { "deployed": "staking" } },
                { "target": "staking",
                  "manager": "0x228F78fC398DB973B96eD666C92E78753b9466Eb" }
            ]
        });
        let plan: DeploymentPlan = serde_json::from_value(json).unwrap();
        plan.validate().unwrap();
        assert_eq!(plan, StackKind::Matic.plan());
    }

    #[test]
    fn stack_kind_parses_aliases() {
        assert_eq!("polygon".parse::<StackKind>().unwrap(), StackKind::Matic);
        assert_eq!("eth".parse::<StackKind>().unwrap(), StackKind::Ethereum);
        assert!("near".parse::<StackKind>().is_err());
    }
}
