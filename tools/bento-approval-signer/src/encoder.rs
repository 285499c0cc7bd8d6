use alloy_primitives::{Address, FixedBytes, I256, U256};
use alloy_sol_types::{sol_data, SolType, SolValue};
use anyhow::{Context, Result};
use bento_vault_types::{
    constants::{APPROVAL_TYPE, DOMAIN_TYPE, DOMAIN_TYPE_WITH_VERSION, EIP191_PREFIX_FOR_EIP712_STRUCTURED_DATA},
    ApprovalMessage, Signature, SignedApproval,
};
use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};

use crate::types::DomainParams;

fn keccak256_bytes(bytes: &[u8]) -> FixedBytes<32> {
    let mut h = Keccak256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut b = [0u8; 32];
    b.copy_from_slice(out.as_slice());
    FixedBytes(b)
}

fn address_word(address: Address) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[12..32].copy_from_slice(address.as_slice());
    padded
}

/// Domain separator (must match the vault's `domainSeparator()`).
pub fn domain_separator(domain: &DomainParams) -> FixedBytes<32> {
    let mut domain_buf = Vec::with_capacity(32 * 5);
    match &domain.version {
        Some(version) => {
            domain_buf.extend_from_slice(keccak256_bytes(DOMAIN_TYPE_WITH_VERSION).as_slice());
            domain_buf.extend_from_slice(keccak256_bytes(domain.name.as_bytes()).as_slice());
            domain_buf.extend_from_slice(keccak256_bytes(version.as_bytes()).as_slice());
        }
        None => {
            domain_buf.extend_from_slice(keccak256_bytes(DOMAIN_TYPE).as_slice());
            domain_buf.extend_from_slice(keccak256_bytes(domain.name.as_bytes()).as_slice());
        }
    }
    domain_buf.extend_from_slice(&U256::from(domain.chain_id).to_be_bytes::<32>());
    domain_buf.extend_from_slice(&address_word(domain.verifying_contract));
    keccak256_bytes(&domain_buf)
}

/// Approval digest (must match the vault's digest for the same message).
pub fn approval_digest(domain: &DomainParams, message: &ApprovalMessage) -> FixedBytes<32> {
    let mut struct_buf = Vec::with_capacity(32 * 5);
    struct_buf.extend_from_slice(keccak256_bytes(APPROVAL_TYPE).as_slice());
    struct_buf.extend_from_slice(&address_word(message.user));
    struct_buf.extend_from_slice(&address_word(message.master_contract));
    let mut approved = [0u8; 32];
    approved[31] = message.approved as u8;
    struct_buf.extend_from_slice(&approved);
    struct_buf.extend_from_slice(&message.nonce.to_be_bytes::<32>());
    let struct_hash = keccak256_bytes(&struct_buf);

    let mut final_buf = Vec::with_capacity(2 + 32 + 32);
    final_buf.extend_from_slice(&EIP191_PREFIX_FOR_EIP712_STRUCTURED_DATA);
    final_buf.extend_from_slice(domain_separator(domain).as_slice());
    final_buf.extend_from_slice(struct_hash.as_slice());
    keccak256_bytes(&final_buf)
}

/// Sign an approval message; `v` is returned as 27 or 28.
pub fn sign_approval(
    domain: &DomainParams,
    message: &ApprovalMessage,
    signing_key: &SigningKey,
) -> Result<Signature, k256::ecdsa::Error> {
    let digest = approval_digest(domain, message);
    let (signature, recovery_id) = signing_key.sign_prehash_recoverable(digest.as_slice())?;
    let (r, s) = signature.split_bytes();
    Ok(Signature {
        v: 27 + recovery_id.to_byte(),
        r: FixedBytes::from_slice(r.as_slice()),
        s: FixedBytes::from_slice(s.as_slice()),
    })
}

/// Sign `Approval(user, master_contract, approved, nonce)` with the user's key.
pub fn sign_master_contract_approval(
    domain: &DomainParams,
    master_contract: Address,
    approved: bool,
    nonce: U256,
    signing_key: &SigningKey,
) -> Result<SignedApproval, k256::ecdsa::Error> {
    let user = address_of(signing_key);
    let message = ApprovalMessage {
        user,
        master_contract,
        approved,
        nonce,
    };
    let signature = sign_approval(domain, &message, signing_key)?;
    Ok(SignedApproval {
        user,
        master_contract,
        approved,
        signature,
    })
}

/// Ethereum address of a signing key.
pub fn address_of(signing_key: &SigningKey) -> Address {
    let point = signing_key.verifying_key().to_encoded_point(false);
    let hash = keccak256_bytes(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Parse a hex private key (with or without `0x`).
pub fn signing_key_from_hex(key: &str) -> Result<SigningKey> {
    let raw = key.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw).context("private key is not valid hex")?;
    SigningKey::from_slice(&bytes).context("private key is not a valid secp256k1 scalar")
}

type ApprovalPayload = (
    sol_data::Address,
    sol_data::Address,
    sol_data::Bool,
    sol_data::Uint<8>,
    sol_data::FixedBytes<32>,
    sol_data::FixedBytes<32>,
);

/// Cook payload for the approval actions:
/// `abi.encode(user, masterContract, approved, v, r, s)`.
pub fn encode_approval_data(approval: &SignedApproval) -> Vec<u8> {
    <ApprovalPayload as SolType>::abi_encode_params(&(
        approval.user,
        approval.master_contract,
        approval.approved,
        approval.signature.v,
        approval.signature.r,
        approval.signature.s,
    ))
}

/// Cook payload for deposit / withdraw / transfer: `abi.encode(token, to, amount)`.
pub fn encode_token_amount(token: Address, to: Address, amount: I256) -> Vec<u8> {
    (token, to, amount).abi_encode_params()
}

/// Cook payload for transfer-multiple: `abi.encode(token, tos, amounts)`.
pub fn encode_transfer_multiple(token: Address, tos: &[Address], amounts: &[U256]) -> Vec<u8> {
    (token, tos.to_vec(), amounts.to_vec()).abi_encode_params()
}
