//! Deployer configuration file.
//!
//! Loads a TOML file describing additional (or overriding) networks, with
//! environment variable expansion in string values so that no signing key
//! ever lives in the file itself. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example
//!
//! ```toml
//! [networks.HecoTest]
//! rpc_url = "https://http-testnet.hecochain.com"
//! chain_id = 256
//! signer_key = "$STAKEDEPLOY_SIGNER_KEY"
//! eip1559 = false
//! ```
//!
//! Entries merge over the built-in network table; a file entry with the same
//! name as a built-in replaces it entirely.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use stakedeploy::{ChainId, ConfigError, NetworkEntry, NetworkRegistry, SignerCredential};

/// Default configuration file name, next to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stakedeploy.toml";

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeployConfig {
    /// Networks keyed by registry name.
    #[serde(default)]
    pub networks: HashMap<String, NetworkFileEntry>,
}

/// One network as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkFileEntry {
    /// HTTP JSON-RPC endpoint.
    pub rpc_url: String,
    /// EIP-155 chain ID.
    pub chain_id: ChainId,
    /// Signing key, normally a `$VAR` reference resolved at load time.
    #[serde(default)]
    pub signer_key: String,
    /// Whether the chain supports EIP-1559 gas pricing.
    #[serde(default = "default_eip1559")]
    pub eip1559: bool,
}

const fn default_eip1559() -> bool {
    true
}

impl DeployConfig {
    /// Loads the configuration from `path`, or from [`DEFAULT_CONFIG_FILE`]
    /// when no path is given.
    ///
    /// A missing default file yields an empty configuration (the built-in
    /// networks still work); an explicitly requested file must exist.
    ///
    /// # Errors
    ///
    /// [`ConfigError::File`] when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Path::new(DEFAULT_CONFIG_FILE).to_path_buf(), false),
        };
        if !path.is_file() {
            if required {
                return Err(ConfigError::File {
                    path: path.display().to_string(),
                    reason: "file not found".to_owned(),
                });
            }
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::File {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|reason| ConfigError::File {
            path: path.display().to_string(),
            reason,
        })
    }

    /// Parses configuration text, expanding environment variables.
    fn parse(content: &str) -> Result<Self, String> {
        let expanded = expand_vars(content, |var| std::env::var(var).ok());
        toml::from_str(&expanded).map_err(|e| e.to_string())
    }

    /// Builds the effective network registry: built-ins first, then the
    /// file's entries on top.
    ///
    /// A `signer_key` that is empty or still carries an unresolved `$VAR`
    /// reference leaves the entry without a credential; resolution of that
    /// network will fail with a pointed error instead of sending a literal
    /// `$VAR` string to a signer parser.
    #[must_use]
    pub fn registry(&self) -> NetworkRegistry {
        let mut registry = NetworkRegistry::builtin();
        for (name, entry) in &self.networks {
            let key = entry.signer_key.trim();
            let credential = if key.is_empty() || key.starts_with('$') {
                None
            } else {
                Some(SignerCredential::new(key))
            };
            registry.insert(
                name.clone(),
                NetworkEntry {
                    rpc_url: entry.rpc_url.clone(),
                    chain_id: entry.chain_id,
                    credential,
                    eip1559: entry.eip1559,
                },
            );
        }
        registry
    }
}

/// Expands `$VAR` and `${VAR}` references using `lookup`.
///
/// Unresolved references are left in place so the caller can tell a missing
/// variable apart from a deliberately empty value.
fn expand_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        let (name, consumed, braced) = if let Some(stripped) = rest.strip_prefix('{') {
            match stripped.find('}') {
                Some(end) => (&stripped[..end], end + 2, true),
                None => ("", 0, true),
            }
        } else {
            let end = rest
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
                .unwrap_or(rest.len());
            (&rest[..end], end, false)
        };

        if name.is_empty() {
            out.push('$');
            continue;
        }
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => {
                out.push('$');
                if braced {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                } else {
                    out.push_str(name);
                }
            }
        }
        rest = &rest[consumed..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(var: &str) -> Option<String> {
        match var {
            "KEY" => Some("6cd5c9".to_owned()),
            "HOST" => Some("example.org".to_owned()),
            _ => None,
        }
    }

    #[test]
    fn expands_plain_and_braced_vars() {
        assert_eq!(expand_vars("k=$KEY", lookup), "k=6cd5c9");
        assert_eq!(expand_vars("u=https://${HOST}/rpc", lookup), "u=https://example.org/rpc");
    }

    #[test]
    fn unresolved_vars_are_left_in_place() {
        assert_eq!(expand_vars("k=$MISSING", lookup), "k=$MISSING");
        assert_eq!(expand_vars("k=${MISSING}x", lookup), "k=${MISSING}x");
        assert_eq!(expand_vars("lone $ dollar", lookup), "lone $ dollar");
    }

    #[test]
    fn parses_network_table() {
        let toml = r#"
            [networks.HecoTest]
            rpc_url = "https://http-testnet.hecochain.com"
            chain_id = 256
            signer_key = "$KEY"
            eip1559 = false
        "#;
        // Parse without touching the process environment.
        let expanded = expand_vars(toml, lookup);
        let config: DeployConfig = toml::from_str(&expanded).unwrap();
        let entry = &config.networks["HecoTest"];
        assert_eq!(entry.chain_id, 256);
        assert_eq!(entry.signer_key, "6cd5c9");
        assert!(!entry.eip1559);
    }

    #[test]
    fn registry_merges_file_entries_over_builtins() {
        let mut config = DeployConfig::default();
        config.networks.insert(
            "Matic".to_owned(),
            NetworkFileEntry {
                rpc_url: "https://polygon-rpc.com".to_owned(),
                chain_id: 137,
                signer_key: "ab".repeat(32),
                eip1559: true,
            },
        );
        let registry = config.registry();
        let profile = registry.resolve("Matic").unwrap();
        assert_eq!(profile.rpc_url, "https://polygon-rpc.com");
    }

    #[test]
    fn unresolved_signer_key_leaves_credential_missing() {
        let mut config = DeployConfig::default();
        config.networks.insert(
            "Custom".to_owned(),
            NetworkFileEntry {
                rpc_url: "http://localhost:8545".to_owned(),
                chain_id: 31337,
                signer_key: "$NOT_SET_ANYWHERE".to_owned(),
                eip1559: true,
            },
        );
        let err = config.registry().resolve("Custom").unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }
}
