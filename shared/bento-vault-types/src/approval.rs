use alloy_primitives::{Address, B256, U256};

/// The typed message an owner signs to approve or revoke a master contract.
///
/// Hashed as `Approval(address user,address masterContract,bool approved,uint256 nonce)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApprovalMessage {
    pub user: Address,
    pub master_contract: Address,
    pub approved: bool,
    pub nonce: U256,
}

/// ECDSA signature in the `(v, r, s)` form accepted by `setMasterContractApproval`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Signature {
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl Signature {
    pub const LEN: usize = 65;

    pub const fn new(v: u8, r: B256, s: B256) -> Self {
        Self { v, r, s }
    }

    /// `v == 0 && r == 0 && s == 0` selects the unsigned (whitelisted) approval path.
    pub fn is_zero(&self) -> bool {
        self.v == 0 && self.r == B256::ZERO && self.s == B256::ZERO
    }

    /// Parse a packed `r || s || v` signature.
    pub fn from_rsv(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != Self::LEN {
            return None;
        }
        Some(Self {
            r: B256::from_slice(&bytes[0..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        })
    }

    /// Pack as `r || s || v`.
    pub fn to_rsv(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0..32].copy_from_slice(self.r.as_slice());
        out[32..64].copy_from_slice(self.s.as_slice());
        out[64] = self.v;
        out
    }
}

/// Approval fields as they travel in a `setMasterContractApproval` call or a cook payload.
///
/// The nonce is not part of the wire payload; the vault binds the signature to the owner's
/// current nonce when verifying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SignedApproval {
    pub user: Address,
    pub master_contract: Address,
    pub approved: bool,
    pub signature: Signature,
}

impl SignedApproval {
    pub fn message(&self, nonce: U256) -> ApprovalMessage {
        ApprovalMessage {
            user: self.user,
            master_contract: self.master_contract,
            approved: self.approved,
            nonce,
        }
    }
}
