/// Action codes understood by `cook`.
///
/// The numbering follows the Kashi pair cook table so that payloads produced by existing tooling
/// route to the same handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ActionCode {
    /// `(address token, address to, int256 amount)`
    Deposit = 20,
    /// `(address token, address to, int256 amount)`
    Withdraw = 21,
    /// `(address token, address to, int256 amount)`
    Transfer = 22,
    /// `(address token, address[] tos, uint256[] amounts)`
    TransferMultiple = 23,
    /// `(address user, address masterContract, bool approved, uint8 v, bytes32 r, bytes32 s)`
    SetApproval = 24,
    /// Same payload as `SetApproval`, but a failure does not abort the batch.
    TrySetApproval = 25,
}

impl ActionCode {
    pub const ALL: [ActionCode; 6] = [
        ActionCode::Deposit,
        ActionCode::Withdraw,
        ActionCode::Transfer,
        ActionCode::TransferMultiple,
        ActionCode::SetApproval,
        ActionCode::TrySetApproval,
    ];

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<ActionCode> for u8 {
    fn from(code: ActionCode) -> u8 {
        code as u8
    }
}

impl TryFrom<u8> for ActionCode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use ActionCode::*;
        let code = match value {
            20 => Deposit,
            21 => Withdraw,
            22 => Transfer,
            23 => TransferMultiple,
            24 => SetApproval,
            25 => TrySetApproval,
            _ => return Err(()),
        };
        Ok(code)
    }
}
