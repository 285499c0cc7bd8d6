//! Solidity ABI surface of the vault: the custom errors returned as revert data.

use alloy_sol_types::sol;

sol! {
    error MalformedBatch(uint256 actions, uint256 values, uint256 datas);
    error UnknownAction(uint256 index, uint8 code);
    error Unauthorized(address user, address recovered);
    error StaleNonce(address user, uint256 nonce);
    error InvalidSignature();
    error MasterContractNotSet();
    error ZeroUser();
    error UserNotSender(address user, address sender);
    error UserIsClone(address user);
    error NotWhitelisted(address masterContract);
    error NotOwner(address caller);
    error NotAllowed(address from, address operator);
    error InvalidAmountReference(int256 amount);
    error UnexpectedValue(uint256 value);
    error InsufficientValue(uint256 value, uint256 amount);
    error MalformedPayload(uint8 action);
    error InsufficientBalance(address token, address account, uint256 available, uint256 required);
    error ZeroRecipient();
    error BalanceOverflow(address token);
    error TransferLengthMismatch(uint256 tos, uint256 amounts);
    error ActionFailed(uint256 index, uint8 action, bytes reason);
}
