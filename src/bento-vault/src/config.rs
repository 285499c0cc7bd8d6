//! Vault configuration.

use alloy_primitives::Address;
use bento_vault_types::constants::DEFAULT_VAULT_NAME;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid vault config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("vault address must not be zero")]
    ZeroAddress,
}

/// Identity of one vault instance.
///
/// `name`, `version`, `chain_id` and `address` make up the EIP-712 domain. The BentoBox domain
/// has no version; set one only for deployments that sign with the versioned domain type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub chain_id: u64,
    pub address: Address,
    /// May whitelist master contracts.
    pub owner: Address,
}

fn default_name() -> String {
    DEFAULT_VAULT_NAME.to_string()
}

impl VaultConfig {
    pub fn new(chain_id: u64, address: Address, owner: Address) -> Self {
        Self {
            name: default_name(),
            version: None,
            chain_id,
            address,
            owner,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: VaultConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address == Address::ZERO {
            return Err(ConfigError::ZeroAddress);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_from_json_defaults_name() {
        let config = VaultConfig::from_json(
            r#"{
                "chainId": 31337,
                "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
                "owner": "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
            }"#,
        )
        .unwrap();
        assert_eq!(config.name, "BentoBox V1");
        assert_eq!(config.version, None);
        assert_eq!(config.chain_id, 31337);
        assert_eq!(config.address, address!("5fbdb2315678afecb367f032d93f642f64180aa3"));
    }

    #[test]
    fn test_from_json_versioned() {
        let config = VaultConfig::from_json(
            r#"{
                "name": "Vault",
                "version": "2",
                "chainId": 1,
                "address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
                "owner": "0x0000000000000000000000000000000000000001"
            }"#,
        )
        .unwrap();
        assert_eq!(config.name, "Vault");
        assert_eq!(config.version.as_deref(), Some("2"));
    }

    #[test]
    fn test_rejects_zero_address_and_garbage() {
        let zero = VaultConfig::from_json(
            r#"{"chainId": 1, "address": "0x0000000000000000000000000000000000000000", "owner": "0x0000000000000000000000000000000000000001"}"#,
        );
        assert!(matches!(zero, Err(ConfigError::ZeroAddress)));
        assert!(matches!(VaultConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
