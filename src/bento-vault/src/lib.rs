//! BentoBox-style shared-custody vault.
//!
//! Two pieces carry the weight:
//! - signed master-contract approvals: an owner signs an EIP-712 `Approval` message bound to this
//!   vault's domain and their current nonce, and anyone can submit it
//!   ([`Vault::set_master_contract_approval`]);
//! - `cook`: an ordered batch of typed actions (deposit, withdraw, transfer, apply approval, ...)
//!   executed atomically ([`Vault::cook`]).

pub mod abi;
pub mod config;
pub mod cook;
pub mod crypto;
pub mod decoder;
pub mod eip712;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod registry;
pub mod shared;
pub mod transaction;
pub mod vault;


pub use bento_vault_types::{ActionCode, ApprovalMessage, Signature, SignedApproval};
pub use config::{ConfigError, VaultConfig};
pub use cook::{ActionResult, CookOutcome, FailurePolicy};
pub use eip712::DomainContext;
pub use errors::{DecodeError, LedgerError, SignatureError, VaultError};
pub use events::VaultEvent;
pub use shared::SharedVault;
pub use vault::{CallContext, Vault};
