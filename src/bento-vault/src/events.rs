use alloy_primitives::{Address, U256};

/// Log entries appended by committed vault operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VaultEvent {
    LogSetMasterContractApproval {
        master_contract: Address,
        user: Address,
        approved: bool,
    },
    LogWhiteListMasterContract {
        master_contract: Address,
        approved: bool,
    },
    LogRegisterClone {
        master_contract: Address,
        clone: Address,
    },
    LogDeposit {
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    LogWithdraw {
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
    LogTransfer {
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    },
}
