//! Network profiles and the registry used to resolve deployment targets.
//!
//! A [`NetworkRegistry`] maps human-readable network names (as they appear on
//! the command line) to connection parameters. It is seeded with the built-in
//! table of networks this project historically deploys to and can be extended
//! or overridden from the configuration file. Resolution produces an
//! immutable [`NetworkProfile`] that the EVM backend consumes; a profile is
//! only handed out when every required field, including the signing
//! credential, is present.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigError;

/// Numeric EVM chain identifier (EIP-155).
pub type ChainId = u64;

/// Heco mainnet chain ID.
pub const HECO_MAINNET: ChainId = 128;

/// Heco testnet chain ID.
pub const HECO_TESTNET: ChainId = 256;

/// Polygon (Matic) mainnet chain ID.
pub const MATIC_MAINNET: ChainId = 137;

/// Polygon Mumbai (Matic testnet) chain ID.
pub const MATIC_TESTNET: ChainId = 80001;

/// Ethereum mainnet chain ID.
pub const ETHEREUM_MAINNET: ChainId = 1;

/// Environment variable consulted for the signing key of built-in networks.
pub const DEFAULT_SIGNER_KEY_ENV: &str = "STAKEDEPLOY_SIGNER_KEY";

/// A hex-encoded private key used to sign deployment transactions.
///
/// The key material is deliberately excluded from `Debug` and `Display`
/// output so that profiles and errors can be logged without leaking it.
#[derive(Clone, PartialEq, Eq)]
pub struct SignerCredential(String);

impl SignerCredential {
    /// Wraps a raw hex private key (with or without `0x` prefix).
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Reads a credential from the given environment variable.
    ///
    /// Returns `None` when the variable is unset or empty.
    #[must_use]
    pub fn from_env(var: &str) -> Option<Self> {
        match std::env::var(var) {
            Ok(v) if !v.trim().is_empty() => Some(Self(v.trim().to_owned())),
            _ => None,
        }
    }

    /// Exposes the raw key for signer construction.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SignerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignerCredential(<redacted>)")
    }
}

impl fmt::Display for SignerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// Connection parameters for one target network, as stored in the registry.
///
/// The credential is optional at this stage; [`NetworkRegistry::resolve`]
/// refuses to produce a profile without one.
#[derive(Debug, Clone)]
pub struct NetworkEntry {
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: String,
    /// EIP-155 chain ID, checked against the node at connection time.
    pub chain_id: ChainId,
    /// Signing key, typically injected from the environment.
    pub credential: Option<SignerCredential>,
    /// Whether the chain supports EIP-1559 gas pricing.
    pub eip1559: bool,
}

/// A fully resolved, immutable deployment target.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    /// Registry name this profile was resolved from.
    pub name: String,
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: String,
    /// EIP-155 chain ID.
    pub chain_id: ChainId,
    /// Signing key for the deployer account.
    pub credential: SignerCredential,
    /// Whether the chain supports EIP-1559 gas pricing.
    pub eip1559: bool,
}

/// Name-keyed table of deployment targets.
///
/// Iteration order is the sorted entry name, which keeps `networks` listing
/// output stable.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    entries: BTreeMap<String, NetworkEntry>,
}

impl NetworkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with the built-in network table.
    ///
    /// The built-in entries take their signing key from the
    /// [`DEFAULT_SIGNER_KEY_ENV`] environment variable; entries added later
    /// via [`insert`](Self::insert) may carry their own.
    #[must_use]
    pub fn builtin() -> Self {
        let credential = SignerCredential::from_env(DEFAULT_SIGNER_KEY_ENV);
        let mut registry = Self::new();
        for (name, rpc_url, chain_id, eip1559) in BUILTIN_NETWORKS {
            registry.insert(
                (*name).to_owned(),
                NetworkEntry {
                    rpc_url: (*rpc_url).to_owned(),
                    chain_id: *chain_id,
                    credential: credential.clone(),
                    eip1559: *eip1559,
                },
            );
        }
        registry
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, name: String, entry: NetworkEntry) {
        self.entries.insert(name, entry);
    }

    /// Returns the names and chain IDs of all registered networks.
    #[must_use]
    pub fn names(&self) -> Vec<(&str, ChainId)> {
        self.entries
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.chain_id))
            .collect()
    }

    /// Resolves a network name to a complete profile.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownNetwork`] for names not in the registry and
    /// [`ConfigError::MissingCredential`] when the entry has no signing key.
    pub fn resolve(&self, name: &str) -> Result<NetworkProfile, ConfigError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| ConfigError::UnknownNetwork {
                name: name.to_owned(),
            })?;
        if entry.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                network: name.to_owned(),
                field: "rpc_url",
            });
        }
        let credential =
            entry
                .credential
                .clone()
                .ok_or_else(|| ConfigError::MissingCredential {
                    network: name.to_owned(),
                })?;
        Ok(NetworkProfile {
            name: name.to_owned(),
            rpc_url: entry.rpc_url.clone(),
            chain_id: entry.chain_id,
            credential,
            eip1559: entry.eip1559,
        })
    }
}

/// Built-in network table: (name, RPC URL, chain ID, EIP-1559 support).
///
/// Heco predates the London fork and only understands legacy gas pricing.
const BUILTIN_NETWORKS: &[(&str, &str, ChainId, bool)] = &[
    ("Ethereum", "https://ethereum-rpc.publicnode.com", ETHEREUM_MAINNET, true),
    ("Heco", "https://http-mainnet-node.huobichain.com", HECO_MAINNET, false),
    ("HecoTest", "https://http-testnet.hecochain.com", HECO_TESTNET, false),
    ("Matic", "https://rpc-mainnet.maticvigil.com", MATIC_MAINNET, true),
    ("MaticTest", "https://rpc-mumbai.maticvigil.com", MATIC_TESTNET, true),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(chain_id: ChainId, credential: Option<SignerCredential>) -> NetworkEntry {
        NetworkEntry {
            rpc_url: "http://localhost:8545".to_owned(),
            chain_id,
            credential,
            eip1559: true,
        }
    }

    #[test]
    fn resolve_returns_configured_chain_id() {
        let mut registry = NetworkRegistry::new();
        registry.insert(
            "HecoTest".to_owned(),
            entry(HECO_TESTNET, Some(SignerCredential::new("ab".repeat(32)))),
        );
        let profile = registry.resolve("HecoTest").unwrap();
        assert_eq!(profile.chain_id, 256);
        assert_eq!(profile.name, "HecoTest");
    }

    #[test]
    fn resolve_unknown_network_is_config_error() {
        let registry = NetworkRegistry::new();
        let err = registry.resolve("Unknown").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownNetwork { name } if name == "Unknown"));
    }

    #[test]
    fn resolve_without_credential_is_config_error() {
        let mut registry = NetworkRegistry::new();
        registry.insert("Matic".to_owned(), entry(MATIC_MAINNET, None));
        let err = registry.resolve("Matic").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { network } if network == "Matic"));
    }

    #[test]
    fn insert_overrides_existing_entry() {
        let mut registry = NetworkRegistry::new();
        registry.insert(
            "Matic".to_owned(),
            entry(MATIC_MAINNET, Some(SignerCredential::new("11".repeat(32)))),
        );
        registry.insert(
            "Matic".to_owned(),
            entry(MATIC_TESTNET, Some(SignerCredential::new("22".repeat(32)))),
        );
        assert_eq!(registry.resolve("Matic").unwrap().chain_id, MATIC_TESTNET);
    }

    #[test]
    fn resolved_profiles_are_independent_clones() {
        let mut registry = NetworkRegistry::new();
        registry.insert(
            "A".to_owned(),
            entry(1, Some(SignerCredential::new("aa".repeat(32)))),
        );
        registry.insert(
            "B".to_owned(),
            entry(2, Some(SignerCredential::new("bb".repeat(32)))),
        );
        let a = registry.resolve("A").unwrap();
        let b = registry.resolve("B").unwrap();
        assert_ne!(a.chain_id, b.chain_id);
        assert_ne!(a.credential.expose(), b.credential.expose());
    }

    #[test]
    fn credential_is_redacted_in_debug_and_display() {
        let credential = SignerCredential::new("deadbeef".repeat(8));
        assert_eq!(format!("{credential:?}"), "SignerCredential(<redacted>)");
        assert_eq!(credential.to_string(), "<redacted>");
        let profile = NetworkProfile {
            name: "X".to_owned(),
            rpc_url: "http://localhost:8545".to_owned(),
            chain_id: 1,
            credential,
            eip1559: true,
        };
        assert!(!format!("{profile:?}").contains("deadbeef"));
    }
}
