//! Cook payload decoding.
//!
//! Payloads are plain `abi.encode(...)` of the action's arguments; see [`ActionCode`] for the
//! layout of each code. Decoding validates padding, so dirty words are rejected.

use alloy_primitives::{Address, B256, I256, U256};
use alloy_sol_types::{sol_data, SolType, SolValue};
use bento_vault_types::{ActionCode, Signature, SignedApproval};

use crate::errors::DecodeError;

/// `(address token, address to, int256 amount)`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenAmount {
    pub token: Address,
    pub to: Address,
    /// Negative values reference earlier cook outputs.
    pub amount: I256,
}

/// `(address token, address[] tos, uint256[] amounts)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferMultiple {
    pub token: Address,
    pub tos: Vec<Address>,
    pub amounts: Vec<U256>,
}

type TokenAmountArgs = (Address, Address, I256);
type TransferMultipleArgs = (Address, Vec<Address>, Vec<U256>);
/// `uint8` has no `SolValue` impl; the approval payload is declared in `sol_data` types.
pub type ApprovalArgs = (
    sol_data::Address,
    sol_data::Address,
    sol_data::Bool,
    sol_data::Uint<8>,
    sol_data::FixedBytes<32>,
    sol_data::FixedBytes<32>,
);

pub fn decode_token_amount(action: ActionCode, data: &[u8]) -> Result<TokenAmount, DecodeError> {
    let (token, to, amount) = <TokenAmountArgs as SolValue>::abi_decode_params(data, true)
        .map_err(|_| DecodeError::Malformed { action })?;
    Ok(TokenAmount { token, to, amount })
}

pub fn decode_transfer_multiple(data: &[u8]) -> Result<TransferMultiple, DecodeError> {
    let (token, tos, amounts) = <TransferMultipleArgs as SolValue>::abi_decode_params(data, true).map_err(|_| {
        DecodeError::Malformed {
            action: ActionCode::TransferMultiple,
        }
    })?;
    Ok(TransferMultiple {
        token,
        tos,
        amounts,
    })
}

/// `(address user, address masterContract, bool approved, uint8 v, bytes32 r, bytes32 s)`
pub fn decode_approval(action: ActionCode, data: &[u8]) -> Result<SignedApproval, DecodeError> {
    let (user, master_contract, approved, v, r, s) = <ApprovalArgs as SolType>::abi_decode_params(data, true)
        .map_err(|_| DecodeError::Malformed { action })?;
    Ok(SignedApproval {
        user,
        master_contract,
        approved,
        signature: Signature::new(v, r, s),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approval_payload(user: Address, master: Address, approved: bool, v: u8, r: B256, s: B256) -> Vec<u8> {
        <ApprovalArgs as SolType>::abi_encode_params(&(user, master, approved, v, r, s))
    }

    #[test]
    fn test_decode_approval_payload() {
        let user = Address::repeat_byte(0x11);
        let master = Address::repeat_byte(0x22);
        let r = B256::repeat_byte(0x33);
        let s = B256::repeat_byte(0x44);
        let data = approval_payload(user, master, true, 27, r, s);
        assert_eq!(data.len(), 6 * 32);

        let approval = decode_approval(ActionCode::SetApproval, &data).unwrap();
        assert_eq!(
            approval,
            SignedApproval {
                user,
                master_contract: master,
                approved: true,
                signature: Signature::new(27, r, s),
            }
        );
    }

    #[test]
    fn test_decode_negative_amount() {
        let token = Address::repeat_byte(0xaa);
        let to = Address::repeat_byte(0xbb);
        let data = (token, to, I256::MINUS_ONE).abi_encode_params();
        assert_eq!(
            decode_token_amount(ActionCode::Transfer, &data).unwrap(),
            TokenAmount {
                token,
                to,
                amount: I256::MINUS_ONE
            }
        );
    }

    #[test]
    fn test_decode_transfer_multiple() {
        let token = Address::repeat_byte(0xaa);
        let tos = vec![Address::repeat_byte(1), Address::repeat_byte(2)];
        let amounts = vec![U256::from(5), U256::from(6)];
        let data = (token, tos.clone(), amounts.clone()).abi_encode_params();
        assert_eq!(
            decode_transfer_multiple(&data).unwrap(),
            TransferMultiple {
                token,
                tos,
                amounts
            }
        );
    }

    #[test]
    fn test_truncated_payload_is_malformed() {
        let data = approval_payload(Address::ZERO, Address::ZERO, true, 27, B256::ZERO, B256::ZERO);
        assert_eq!(
            decode_approval(ActionCode::TrySetApproval, &data[..100]),
            Err(DecodeError::Malformed {
                action: ActionCode::TrySetApproval
            })
        );
        assert_eq!(
            decode_token_amount(ActionCode::Deposit, &[]),
            Err(DecodeError::Malformed {
                action: ActionCode::Deposit
            })
        );
    }

    #[test]
    fn test_dirty_bool_is_malformed() {
        let mut data = approval_payload(Address::ZERO, Address::ZERO, true, 27, B256::ZERO, B256::ZERO);
        data[95] = 2;
        assert!(decode_approval(ActionCode::SetApproval, &data).is_err());
    }
}
