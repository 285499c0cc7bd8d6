use alloy_primitives::{Address, Bytes, I256, U256};
use alloy_sol_types::SolError;
use bento_vault_types::ActionCode;
use thiserror::Error;

use crate::abi;

/// Errors during signature recovery.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// `v` must be one of 0, 1, 27, 28.
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),
    /// `r` or `s` is not a valid scalar (zero or out of range).
    #[error("invalid signature encoding")]
    InvalidFormat,
    #[error("public key recovery failed")]
    RecoveryFailed,
    #[error("signature recovers to the zero address")]
    ZeroAddress,
}

/// Errors while decoding a cook payload.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed {action:?} payload")]
    Malformed { action: ActionCode },
}

/// Ledger precondition failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("insufficient vault balance of {token} for {account}: have {available}, need {required}")]
    InsufficientBalance {
        token: Address,
        account: Address,
        available: U256,
        required: U256,
    },
    #[error("insufficient wallet balance of {token} for {account}: have {available}, need {required}")]
    InsufficientWallet {
        token: Address,
        account: Address,
        available: U256,
        required: U256,
    },
    #[error("recipient is the zero address")]
    ZeroRecipient,
    #[error("balance overflow for {token}")]
    Overflow { token: Address },
    #[error("transfer list mismatch: {tos} recipients, {amounts} amounts")]
    LengthMismatch { tos: usize, amounts: usize },
}

/// Vault errors. Every variant can be rendered as Solidity revert data.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VaultError {
    #[error("malformed batch: {actions} actions, {values} values, {datas} datas")]
    MalformedBatch {
        actions: usize,
        values: usize,
        datas: usize,
    },
    #[error("unknown action code {code} at index {index}")]
    UnknownAction { index: usize, code: u8 },
    #[error("signature for {user} recovered to {recovered}")]
    Unauthorized { user: Address, recovered: Address },
    #[error("stale nonce for {user}: current nonce is {nonce}")]
    StaleNonce { user: Address, nonce: U256 },
    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] SignatureError),
    #[error("master contract not set")]
    MasterContractNotSet,
    #[error("user cannot be the zero address")]
    ZeroUser,
    #[error("user {user} is not the sender {sender}")]
    UserNotSender { user: Address, sender: Address },
    #[error("user {0} is a clone")]
    UserIsClone(Address),
    #[error("master contract {0} is not whitelisted")]
    NotWhitelisted(Address),
    #[error("{caller} is not the vault owner")]
    NotOwner { caller: Address },
    #[error("{operator} is not allowed to move funds of {from}")]
    NotAllowed { from: Address, operator: Address },
    #[error("amount reference {0} is neither -1 nor -2")]
    InvalidAmountReference(I256),
    #[error("unexpected native value {value}")]
    UnexpectedValue { value: U256 },
    #[error("native value {value} does not cover amount {amount}")]
    InsufficientValue { value: U256, amount: U256 },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("action {action:?} at index {index} failed: {source}")]
    ActionFailed {
        index: usize,
        action: ActionCode,
        source: Box<VaultError>,
    },
}

impl VaultError {
    /// The innermost error, unwrapping `ActionFailed`.
    pub fn root_cause(&self) -> &VaultError {
        match self {
            VaultError::ActionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// ABI-encoded Solidity error (selector + arguments).
    pub fn revert_data(&self) -> Bytes {
        let encoded = match self {
            VaultError::MalformedBatch {
                actions,
                values,
                datas,
            } => abi::MalformedBatch {
                actions: U256::from(*actions),
                values: U256::from(*values),
                datas: U256::from(*datas),
            }
            .abi_encode(),
            VaultError::UnknownAction { index, code } => abi::UnknownAction {
                index: U256::from(*index),
                code: *code,
            }
            .abi_encode(),
            VaultError::Unauthorized { user, recovered } => abi::Unauthorized {
                user: *user,
                recovered: *recovered,
            }
            .abi_encode(),
            VaultError::StaleNonce { user, nonce } => abi::StaleNonce {
                user: *user,
                nonce: *nonce,
            }
            .abi_encode(),
            VaultError::InvalidSignature(_) => abi::InvalidSignature {}.abi_encode(),
            VaultError::MasterContractNotSet => abi::MasterContractNotSet {}.abi_encode(),
            VaultError::ZeroUser => abi::ZeroUser {}.abi_encode(),
            VaultError::UserNotSender { user, sender } => abi::UserNotSender {
                user: *user,
                sender: *sender,
            }
            .abi_encode(),
            VaultError::UserIsClone(user) => abi::UserIsClone { user: *user }.abi_encode(),
            VaultError::NotWhitelisted(master_contract) => abi::NotWhitelisted {
                masterContract: *master_contract,
            }
            .abi_encode(),
            VaultError::NotOwner { caller } => abi::NotOwner { caller: *caller }.abi_encode(),
            VaultError::NotAllowed { from, operator } => abi::NotAllowed {
                from: *from,
                operator: *operator,
            }
            .abi_encode(),
            VaultError::InvalidAmountReference(amount) => {
                abi::InvalidAmountReference { amount: *amount }.abi_encode()
            }
            VaultError::UnexpectedValue { value } => {
                abi::UnexpectedValue { value: *value }.abi_encode()
            }
            VaultError::InsufficientValue { value, amount } => abi::InsufficientValue {
                value: *value,
                amount: *amount,
            }
            .abi_encode(),
            VaultError::Decode(DecodeError::Malformed { action }) => abi::MalformedPayload {
                action: action.as_u8(),
            }
            .abi_encode(),
            VaultError::Ledger(err) => ledger_revert_data(err),
            VaultError::ActionFailed {
                index,
                action,
                source,
            } => abi::ActionFailed {
                index: U256::from(*index),
                action: action.as_u8(),
                reason: source.revert_data(),
            }
            .abi_encode(),
        };
        Bytes::from(encoded)
    }
}

fn ledger_revert_data(err: &LedgerError) -> Vec<u8> {
    match err {
        LedgerError::InsufficientBalance {
            token,
            account,
            available,
            required,
        }
        | LedgerError::InsufficientWallet {
            token,
            account,
            available,
            required,
        } => abi::InsufficientBalance {
            token: *token,
            account: *account,
            available: *available,
            required: *required,
        }
        .abi_encode(),
        LedgerError::ZeroRecipient => abi::ZeroRecipient {}.abi_encode(),
        LedgerError::Overflow { token } => abi::BalanceOverflow { token: *token }.abi_encode(),
        LedgerError::LengthMismatch { tos, amounts } => abi::TransferLengthMismatch {
            tos: U256::from(*tos),
            amounts: U256::from(*amounts),
        }
        .abi_encode(),
    }
}
