//! Off-chain helpers for the BentoBox vault: sign master contract approvals and build cook
//! batches.

pub mod encoder;
pub mod types;

#[cfg(test)]
mod tests;

pub use encoder::{
    address_of, approval_digest, domain_separator, encode_approval_data, encode_token_amount,
    encode_transfer_multiple, sign_approval, sign_master_contract_approval, signing_key_from_hex,
};
pub use types::{CookBatch, DomainParams};
