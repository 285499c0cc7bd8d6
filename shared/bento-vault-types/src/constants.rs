//! Wire constants shared by the vault and off-chain signers.

use alloy_primitives::Address;

/// Protocol name bound into the domain separator.
pub const DEFAULT_VAULT_NAME: &str = "BentoBox V1";

/// EIP-712 domain type without a version field (the BentoBox layout).
pub const DOMAIN_TYPE: &[u8] = b"EIP712Domain(string name,uint256 chainId,address verifyingContract)";

/// EIP-712 domain type used when a version tag is configured.
pub const DOMAIN_TYPE_WITH_VERSION: &[u8] =
    b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// Approval struct type.
pub const APPROVAL_TYPE: &[u8] =
    b"Approval(address user,address masterContract,bool approved,uint256 nonce)";

/// EIP-191 prefix for EIP-712 structured data.
pub const EIP191_PREFIX_FOR_EIP712_STRUCTURED_DATA: [u8; 2] = [0x19, 0x01];

/// Token address used for the chain's native asset.
pub const NATIVE_TOKEN: Address = Address::ZERO;

/// Cook amount sentinel: use the first output of the previous value-producing action.
pub const USE_VALUE1: i64 = -1;

/// Cook amount sentinel: use the second output of the previous value-producing action.
pub const USE_VALUE2: i64 = -2;
