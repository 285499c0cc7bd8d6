//! EIP-712 domain separation and approval digest computation.
//!
//! The digest an owner signs is `keccak256("\x19\x01" || domainSeparator || structHash)`, so a
//! signature is bound to one vault instance (name, optional version, chain id, address).

use alloy_primitives::{keccak256, Address, B256, U256};
use bento_vault_types::{
    constants::{
        APPROVAL_TYPE, DOMAIN_TYPE, DOMAIN_TYPE_WITH_VERSION,
        EIP191_PREFIX_FOR_EIP712_STRUCTURED_DATA,
    },
    ApprovalMessage,
};

/// Per-instance EIP-712 domain with a cached separator.
///
/// The separator is computed once for the chain id the vault was created on. Asking for any other
/// chain id (a fork) recomputes it instead of serving the cached value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainContext {
    name: String,
    version: Option<String>,
    verifying_contract: Address,
    cached_chain_id: u64,
    cached_separator: B256,
}

impl DomainContext {
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        verifying_contract: Address,
        chain_id: u64,
    ) -> Self {
        let name = name.into();
        let cached_separator =
            compute_domain_separator(&name, version.as_deref(), verifying_contract, chain_id);
        Self {
            name,
            version,
            verifying_contract,
            cached_chain_id: chain_id,
            cached_separator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    pub fn chain_id(&self) -> u64 {
        self.cached_chain_id
    }

    /// Separator for the chain id the instance was created on.
    pub fn separator(&self) -> B256 {
        self.cached_separator
    }

    /// Separator for `chain_id`, recomputed when it differs from the cached chain.
    pub fn separator_for_chain(&self, chain_id: u64) -> B256 {
        if chain_id == self.cached_chain_id {
            self.cached_separator
        } else {
            compute_domain_separator(
                &self.name,
                self.version.as_deref(),
                self.verifying_contract,
                chain_id,
            )
        }
    }

    /// Digest an owner must sign for `message` on this domain.
    pub fn approval_digest(&self, message: &ApprovalMessage) -> B256 {
        eip712_digest(
            self.cached_separator,
            hash_approval(approval_typehash(), message),
        )
    }
}

/// `keccak256(abi.encode(typeHash, keccak256(name), [keccak256(version),] chainId, verifyingContract))`
pub fn compute_domain_separator(
    name: &str,
    version: Option<&str>,
    verifying_contract: Address,
    chain_id: u64,
) -> B256 {
    let mut buf = Vec::with_capacity(32 * 5);
    match version {
        Some(version) => {
            buf.extend_from_slice(keccak256(DOMAIN_TYPE_WITH_VERSION).as_slice());
            buf.extend_from_slice(keccak256(name.as_bytes()).as_slice());
            buf.extend_from_slice(keccak256(version.as_bytes()).as_slice());
        }
        None => {
            buf.extend_from_slice(keccak256(DOMAIN_TYPE).as_slice());
            buf.extend_from_slice(keccak256(name.as_bytes()).as_slice());
        }
    }
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(address_word(verifying_contract).as_slice());
    keccak256(buf)
}

pub fn approval_typehash() -> B256 {
    keccak256(APPROVAL_TYPE)
}

/// `keccak256(abi.encode(typeHash, user, masterContract, approved, nonce))`
pub fn hash_approval(type_hash: B256, message: &ApprovalMessage) -> B256 {
    let mut buf = Vec::with_capacity(32 * 5);
    buf.extend_from_slice(type_hash.as_slice());
    buf.extend_from_slice(address_word(message.user).as_slice());
    buf.extend_from_slice(address_word(message.master_contract).as_slice());
    buf.extend_from_slice(&U256::from(message.approved as u8).to_be_bytes::<32>());
    buf.extend_from_slice(&message.nonce.to_be_bytes::<32>());
    keccak256(buf)
}

/// `keccak256("\x19\x01" || domainSeparator || structHash)`
pub fn eip712_digest(domain_separator: B256, struct_hash: B256) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.extend_from_slice(&EIP191_PREFIX_FOR_EIP712_STRUCTURED_DATA);
    buf.extend_from_slice(domain_separator.as_slice());
    buf.extend_from_slice(struct_hash.as_slice());
    keccak256(buf)
}

fn address_word(address: Address) -> B256 {
    address.into_word()
}
