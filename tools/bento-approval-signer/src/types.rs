use alloy_primitives::{Address, I256, U256};
use bento_vault_types::{constants::DEFAULT_VAULT_NAME, ActionCode, SignedApproval};

use crate::encoder::{encode_approval_data, encode_token_amount, encode_transfer_multiple};

/// EIP-712 domain of the vault a message is signed for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainParams {
    pub name: String,
    /// `None` for the BentoBox domain type, which has no version field.
    pub version: Option<String>,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl DomainParams {
    /// `BentoBox V1` domain of the vault at `verifying_contract`.
    pub fn bento_box(chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            name: DEFAULT_VAULT_NAME.to_string(),
            version: None,
            chain_id,
            verifying_contract,
        }
    }
}

/// The three parallel sequences of a `cook` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CookBatch {
    pub actions: Vec<u8>,
    pub values: Vec<U256>,
    pub datas: Vec<Vec<u8>>,
}

impl CookBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn push(&mut self, action: ActionCode, value: U256, data: Vec<u8>) -> &mut Self {
        self.actions.push(action.into());
        self.values.push(value);
        self.datas.push(data);
        self
    }

    /// `value` is the native amount attached to the slot (native token deposits only).
    pub fn deposit(&mut self, token: Address, to: Address, amount: I256, value: U256) -> &mut Self {
        self.push(ActionCode::Deposit, value, encode_token_amount(token, to, amount))
    }

    pub fn withdraw(&mut self, token: Address, to: Address, amount: I256) -> &mut Self {
        self.push(ActionCode::Withdraw, U256::ZERO, encode_token_amount(token, to, amount))
    }

    pub fn transfer(&mut self, token: Address, to: Address, amount: I256) -> &mut Self {
        self.push(ActionCode::Transfer, U256::ZERO, encode_token_amount(token, to, amount))
    }

    pub fn transfer_multiple(&mut self, token: Address, tos: &[Address], amounts: &[U256]) -> &mut Self {
        self.push(
            ActionCode::TransferMultiple,
            U256::ZERO,
            encode_transfer_multiple(token, tos, amounts),
        )
    }

    pub fn set_approval(&mut self, approval: &SignedApproval) -> &mut Self {
        self.push(ActionCode::SetApproval, U256::ZERO, encode_approval_data(approval))
    }

    /// Approval slot whose failure does not abort the batch.
    pub fn try_set_approval(&mut self, approval: &SignedApproval) -> &mut Self {
        self.push(ActionCode::TrySetApproval, U256::ZERO, encode_approval_data(approval))
    }
}
