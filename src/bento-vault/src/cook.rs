//! The `cook` batch engine.
//!
//! A batch is three parallel sequences `(actions, values, datas)`. Slots run strictly in order
//! against one snapshot transaction; each action code has a fixed handler and a failure policy:
//! - `Fatal`: the first failure discards every effect of the batch and becomes the batch error.
//! - `Isolated`: the slot runs in a child transaction; on failure only that slot's effects are
//!   discarded and the error is recorded in its result.

use alloy_primitives::{Bytes, I256, U256};
use alloy_sol_types::SolValue;
use bento_vault_types::{
    constants::{NATIVE_TOKEN, USE_VALUE1, USE_VALUE2},
    ActionCode,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    decoder::{decode_approval, decode_token_amount, decode_transfer_multiple},
    errors::VaultError,
    transaction::{Transaction, VaultState},
    vault::{self, CallContext},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    Fatal,
    Isolated,
}

type Handler = fn(&mut VaultState, &CallContext, &mut CookValues, U256, &[u8]) -> Result<Bytes, VaultError>;

/// Static metadata of one action code.
pub struct ActionSpec {
    pub code: ActionCode,
    pub policy: FailurePolicy,
    handler: Handler,
}

static DEPOSIT: ActionSpec = ActionSpec {
    code: ActionCode::Deposit,
    policy: FailurePolicy::Fatal,
    handler: handle_deposit,
};
static WITHDRAW: ActionSpec = ActionSpec {
    code: ActionCode::Withdraw,
    policy: FailurePolicy::Fatal,
    handler: handle_withdraw,
};
static TRANSFER: ActionSpec = ActionSpec {
    code: ActionCode::Transfer,
    policy: FailurePolicy::Fatal,
    handler: handle_transfer,
};
static TRANSFER_MULTIPLE: ActionSpec = ActionSpec {
    code: ActionCode::TransferMultiple,
    policy: FailurePolicy::Fatal,
    handler: handle_transfer_multiple,
};
static SET_APPROVAL: ActionSpec = ActionSpec {
    code: ActionCode::SetApproval,
    policy: FailurePolicy::Fatal,
    handler: handle_set_approval,
};
static TRY_SET_APPROVAL: ActionSpec = ActionSpec {
    code: ActionCode::TrySetApproval,
    policy: FailurePolicy::Isolated,
    handler: handle_try_set_approval,
};

pub fn action_spec(code: ActionCode) -> &'static ActionSpec {
    match code {
        ActionCode::Deposit => &DEPOSIT,
        ActionCode::Withdraw => &WITHDRAW,
        ActionCode::Transfer => &TRANSFER,
        ActionCode::TransferMultiple => &TRANSFER_MULTIPLE,
        ActionCode::SetApproval => &SET_APPROVAL,
        ActionCode::TrySetApproval => &TRY_SET_APPROVAL,
    }
}

/// Outputs of the most recent value-producing action, referenced by amounts `-1` and `-2`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CookValues {
    pub value1: U256,
    pub value2: U256,
}

impl CookValues {
    pub fn resolve(&self, amount: I256) -> Result<U256, VaultError> {
        if !amount.is_negative() {
            return Ok(amount.into_raw());
        }
        match i64::try_from(amount) {
            Ok(USE_VALUE1) => Ok(self.value1),
            Ok(USE_VALUE2) => Ok(self.value2),
            _ => Err(VaultError::InvalidAmountReference(amount)),
        }
    }

    fn record(&mut self, value1: U256, value2: U256) -> Bytes {
        self.value1 = value1;
        self.value2 = value2;
        Bytes::from((value1, value2).abi_encode_params())
    }
}

/// Result of one cook slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionResult {
    Success(Bytes),
    /// Failure of an isolated slot.
    Failed(VaultError),
}

impl ActionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success(_))
    }

    /// Bytes returned for the slot: the action output, or the error's revert data.
    pub fn return_data(&self) -> Bytes {
        match self {
            ActionResult::Success(data) => data.clone(),
            ActionResult::Failed(err) => err.revert_data(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CookOutcome {
    pub results: Vec<ActionResult>,
}

impl CookOutcome {
    pub fn return_data(&self) -> Vec<Bytes> {
        self.results.iter().map(ActionResult::return_data).collect()
    }
}

/// Execute a batch atomically against `state`.
///
/// Shape errors (`MalformedBatch`, `UnknownAction`) are reported before anything runs. A fatal
/// failure returns `ActionFailed` and leaves `state` exactly as it was.
#[instrument(skip_all, fields(sender = %ctx.sender, operator = %ctx.operator, actions = actions.len()))]
pub fn cook<D: AsRef<[u8]>>(
    state: &mut VaultState,
    ctx: &CallContext,
    actions: &[u8],
    values: &[U256],
    datas: &[D],
) -> Result<CookOutcome, VaultError> {
    if actions.len() != values.len() || actions.len() != datas.len() {
        return Err(VaultError::MalformedBatch {
            actions: actions.len(),
            values: values.len(),
            datas: datas.len(),
        });
    }
    let specs = actions
        .iter()
        .enumerate()
        .map(|(index, code)| {
            ActionCode::try_from(*code)
                .map(action_spec)
                .map_err(|_| VaultError::UnknownAction { index, code: *code })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut tx = Transaction::begin(state);
    let mut cook_values = CookValues::default();
    let mut results = Vec::with_capacity(specs.len());

    for (index, spec) in specs.into_iter().enumerate() {
        let (value, data) = (values[index], datas[index].as_ref());
        debug!(index, action = ?spec.code, %value, "dispatching cook action");

        match spec.policy {
            FailurePolicy::Fatal => {
                match (spec.handler)(tx.state(), ctx, &mut cook_values, value, data) {
                    Ok(output) => results.push(ActionResult::Success(output)),
                    Err(err) => {
                        warn!(index, action = ?spec.code, %err, "cook action failed, batch rolled back");
                        return Err(VaultError::ActionFailed {
                            index,
                            action: spec.code,
                            source: Box::new(err),
                        });
                    }
                }
            }
            FailurePolicy::Isolated => {
                let mut leg = Transaction::begin(tx.state());
                let mut leg_values = cook_values;
                match (spec.handler)(leg.state(), ctx, &mut leg_values, value, data) {
                    Ok(output) => {
                        leg.commit();
                        cook_values = leg_values;
                        results.push(ActionResult::Success(output));
                    }
                    Err(err) => {
                        drop(leg);
                        debug!(index, action = ?spec.code, %err, "isolated cook action failed");
                        results.push(ActionResult::Failed(err));
                    }
                }
            }
        }
    }

    tx.commit();
    info!(actions = results.len(), "cook committed");
    Ok(CookOutcome { results })
}

fn ensure_no_value(value: U256) -> Result<(), VaultError> {
    if value != U256::ZERO {
        return Err(VaultError::UnexpectedValue { value });
    }
    Ok(())
}

fn handle_deposit(
    state: &mut VaultState,
    ctx: &CallContext,
    cook_values: &mut CookValues,
    value: U256,
    data: &[u8],
) -> Result<Bytes, VaultError> {
    let args = decode_token_amount(ActionCode::Deposit, data)?;
    let amount = cook_values.resolve(args.amount)?;
    if args.token == NATIVE_TOKEN {
        if value < amount {
            return Err(VaultError::InsufficientValue { value, amount });
        }
    } else {
        ensure_no_value(value)?;
    }
    let balance = vault::deposit(state, ctx, args.token, ctx.sender, args.to, amount)?;
    Ok(cook_values.record(amount, balance))
}

fn handle_withdraw(
    state: &mut VaultState,
    ctx: &CallContext,
    cook_values: &mut CookValues,
    value: U256,
    data: &[u8],
) -> Result<Bytes, VaultError> {
    ensure_no_value(value)?;
    let args = decode_token_amount(ActionCode::Withdraw, data)?;
    let amount = cook_values.resolve(args.amount)?;
    let remaining = vault::withdraw(state, ctx, args.token, ctx.sender, args.to, amount)?;
    Ok(cook_values.record(amount, remaining))
}

fn handle_transfer(
    state: &mut VaultState,
    ctx: &CallContext,
    cook_values: &mut CookValues,
    value: U256,
    data: &[u8],
) -> Result<Bytes, VaultError> {
    ensure_no_value(value)?;
    let args = decode_token_amount(ActionCode::Transfer, data)?;
    let amount = cook_values.resolve(args.amount)?;
    let balance = vault::transfer(state, ctx, args.token, ctx.sender, args.to, amount)?;
    Ok(cook_values.record(amount, balance))
}

fn handle_transfer_multiple(
    state: &mut VaultState,
    ctx: &CallContext,
    cook_values: &mut CookValues,
    value: U256,
    data: &[u8],
) -> Result<Bytes, VaultError> {
    ensure_no_value(value)?;
    let args = decode_transfer_multiple(data)?;
    let total = vault::transfer_multiple(state, ctx, args.token, ctx.sender, &args.tos, &args.amounts)?;
    let remaining = state.ledger.balance_of(args.token, ctx.sender);
    Ok(cook_values.record(total, remaining))
}

fn handle_set_approval(
    state: &mut VaultState,
    ctx: &CallContext,
    _cook_values: &mut CookValues,
    value: U256,
    data: &[u8],
) -> Result<Bytes, VaultError> {
    apply_approval(state, ctx, ActionCode::SetApproval, value, data)
}

fn handle_try_set_approval(
    state: &mut VaultState,
    ctx: &CallContext,
    _cook_values: &mut CookValues,
    value: U256,
    data: &[u8],
) -> Result<Bytes, VaultError> {
    apply_approval(state, ctx, ActionCode::TrySetApproval, value, data)
}

fn apply_approval(
    state: &mut VaultState,
    ctx: &CallContext,
    action: ActionCode,
    value: U256,
    data: &[u8],
) -> Result<Bytes, VaultError> {
    ensure_no_value(value)?;
    let approval = decode_approval(action, data)?;
    vault::set_approval(state, ctx, &approval)?;
    Ok(Bytes::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_table_is_consistent() {
        for code in ActionCode::ALL {
            assert_eq!(action_spec(code).code, code);
        }
        assert_eq!(action_spec(ActionCode::SetApproval).policy, FailurePolicy::Fatal);
        assert_eq!(action_spec(ActionCode::TrySetApproval).policy, FailurePolicy::Isolated);
        assert_eq!(action_spec(ActionCode::Deposit).policy, FailurePolicy::Fatal);
    }

    #[test]
    fn test_resolve_amount_references() {
        let values = CookValues {
            value1: U256::from(7),
            value2: U256::from(9),
        };
        assert_eq!(values.resolve(I256::try_from(5).unwrap()), Ok(U256::from(5)));
        assert_eq!(values.resolve(I256::MINUS_ONE), Ok(U256::from(7)));
        assert_eq!(values.resolve(I256::try_from(-2).unwrap()), Ok(U256::from(9)));
        let bad = I256::try_from(-3).unwrap();
        assert_eq!(values.resolve(bad), Err(VaultError::InvalidAmountReference(bad)));
        assert_eq!(
            values.resolve(I256::MIN),
            Err(VaultError::InvalidAmountReference(I256::MIN))
        );
    }

    #[test]
    fn test_record_encodes_outputs() {
        let mut values = CookValues::default();
        let out = values.record(U256::from(1), U256::from(2));
        assert_eq!(out.len(), 64);
        assert_eq!(values.value2, U256::from(2));
    }
}
