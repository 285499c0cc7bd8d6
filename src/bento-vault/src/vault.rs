//! The vault: public entry points over the ledger and the approval registry.
//!
//! Every mutating entry point runs inside a snapshot transaction, so a failing call leaves no
//! trace. The free functions at the bottom are the state-level operations shared with the cook
//! handlers.

use alloy_primitives::{Address, Bytes, B256, U256};
use bento_vault_types::{Signature, SignedApproval};
use tracing::info;

use crate::{
    config::{ConfigError, VaultConfig},
    cook::{self, CookOutcome},
    eip712::DomainContext,
    errors::VaultError,
    events::VaultEvent,
    ledger::Ledger,
    registry::ApprovalRegistry,
    transaction::{Transaction, VaultState},
};

/// Who is calling.
///
/// `operator` is the immediate caller of the vault (`msg.sender`); `sender` is the account the
/// operator acts for. A user calling the vault directly is both.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    pub operator: Address,
}

impl CallContext {
    pub fn direct(sender: Address) -> Self {
        Self {
            sender,
            operator: sender,
        }
    }

    /// `operator` (typically a master contract clone) acting for `sender`.
    pub fn via(operator: Address, sender: Address) -> Self {
        Self { sender, operator }
    }
}

pub struct Vault {
    config: VaultConfig,
    state: VaultState,
}

impl Vault {
    /// Build a vault for a validated `config`.
    pub fn new(config: VaultConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let domain = DomainContext::new(
            config.name.clone(),
            config.version.clone(),
            config.address,
            config.chain_id,
        );
        let state = VaultState {
            ledger: Ledger::new(),
            registry: ApprovalRegistry::new(domain),
            events: Vec::new(),
        };
        Ok(Self { config, state })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn owner(&self) -> Address {
        self.config.owner
    }

    pub fn domain_separator(&self) -> B256 {
        self.state.registry.domain().separator()
    }

    pub fn domain(&self) -> &DomainContext {
        self.state.registry.domain()
    }

    pub fn is_master_contract_approved(&self, master_contract: Address, user: Address) -> bool {
        self.state.registry.is_approved(master_contract, user)
    }

    pub fn nonce_of(&self, user: Address) -> U256 {
        self.state.registry.nonce_of(user)
    }

    pub fn master_contract_of(&self, clone: Address) -> Address {
        self.state.registry.master_contract_of(clone)
    }

    pub fn is_whitelisted(&self, master_contract: Address) -> bool {
        self.state.registry.is_whitelisted(master_contract)
    }

    pub fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.state.ledger.balance_of(token, account)
    }

    pub fn wallet_of(&self, token: Address, account: Address) -> U256 {
        self.state.ledger.wallet_of(token, account)
    }

    pub fn total(&self, token: Address) -> U256 {
        self.state.ledger.total(token)
    }

    pub fn total_supply(&self, token: Address) -> U256 {
        self.state.ledger.total_supply(token)
    }

    pub fn events(&self) -> &[VaultEvent] {
        &self.state.events
    }

    /// `setMasterContractApproval(user, masterContract, approved, v, r, s)`.
    #[allow(clippy::too_many_arguments)]
    pub fn set_master_contract_approval(
        &mut self,
        ctx: &CallContext,
        user: Address,
        master_contract: Address,
        approved: bool,
        v: u8,
        r: B256,
        s: B256,
    ) -> Result<(), VaultError> {
        let approval = SignedApproval {
            user,
            master_contract,
            approved,
            signature: Signature::new(v, r, s),
        };
        self.atomically(|state| set_approval(state, ctx, &approval))
    }

    /// Owner-only whitelist toggle for the unsigned approval path.
    pub fn whitelist_master_contract(
        &mut self,
        ctx: &CallContext,
        master_contract: Address,
        approved: bool,
    ) -> Result<(), VaultError> {
        if ctx.operator != self.config.owner {
            return Err(VaultError::NotOwner {
                caller: ctx.operator,
            });
        }
        self.atomically(|state| {
            state.registry.set_whitelisted(master_contract, approved)?;
            state.emit(VaultEvent::LogWhiteListMasterContract {
                master_contract,
                approved,
            });
            Ok(())
        })
    }

    /// Record `clone` as deployed from `master_contract`.
    pub fn register_clone(&mut self, master_contract: Address, clone: Address) -> Result<(), VaultError> {
        self.atomically(|state| {
            state.registry.register_clone(master_contract, clone)?;
            state.emit(VaultEvent::LogRegisterClone {
                master_contract,
                clone,
            });
            Ok(())
        })
    }

    /// Credit the external wallet of `to`; stands in for the token contract's own supply.
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), VaultError> {
        self.atomically(|state| Ok(state.ledger.mint(token, to, amount)?))
    }

    pub fn deposit(
        &mut self,
        ctx: &CallContext,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, VaultError> {
        self.atomically(|state| deposit(state, ctx, token, from, to, amount))
    }

    pub fn withdraw(
        &mut self,
        ctx: &CallContext,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, VaultError> {
        self.atomically(|state| withdraw(state, ctx, token, from, to, amount))
    }

    pub fn transfer(
        &mut self,
        ctx: &CallContext,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, VaultError> {
        self.atomically(|state| transfer(state, ctx, token, from, to, amount))
    }

    pub fn transfer_multiple(
        &mut self,
        ctx: &CallContext,
        token: Address,
        from: Address,
        tos: &[Address],
        amounts: &[U256],
    ) -> Result<U256, VaultError> {
        self.atomically(|state| transfer_multiple(state, ctx, token, from, tos, amounts))
    }

    /// `cook(actions, values, datas)`; see [`cook::cook`].
    pub fn cook<D: AsRef<[u8]>>(
        &mut self,
        ctx: &CallContext,
        actions: &[u8],
        values: &[U256],
        datas: &[D],
    ) -> Result<CookOutcome, VaultError> {
        cook::cook(&mut self.state, ctx, actions, values, datas)
    }

    /// `cook` returning the raw per-slot bytes.
    pub fn cook_raw<D: AsRef<[u8]>>(
        &mut self,
        ctx: &CallContext,
        actions: &[u8],
        values: &[U256],
        datas: &[D],
    ) -> Result<Vec<Bytes>, VaultError> {
        Ok(self.cook(ctx, actions, values, datas)?.return_data())
    }

    fn atomically<T>(
        &mut self,
        op: impl FnOnce(&mut VaultState) -> Result<T, VaultError>,
    ) -> Result<T, VaultError> {
        let mut tx = Transaction::begin(&mut self.state);
        let out = op(tx.state())?;
        tx.commit();
        Ok(out)
    }
}

fn ensure_allowed(state: &VaultState, from: Address, operator: Address) -> Result<(), VaultError> {
    if !state.registry.is_allowed(from, operator) {
        return Err(VaultError::NotAllowed { from, operator });
    }
    Ok(())
}

pub(crate) fn set_approval(
    state: &mut VaultState,
    ctx: &CallContext,
    approval: &SignedApproval,
) -> Result<(), VaultError> {
    state
        .registry
        .set_master_contract_approval(ctx.operator, approval)?;
    state.emit(VaultEvent::LogSetMasterContractApproval {
        master_contract: approval.master_contract,
        user: approval.user,
        approved: approval.approved,
    });
    Ok(())
}

pub(crate) fn deposit(
    state: &mut VaultState,
    ctx: &CallContext,
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<U256, VaultError> {
    ensure_allowed(state, from, ctx.operator)?;
    let balance = state.ledger.deposit(token, from, to, amount)?;
    info!(%token, %from, %to, %amount, "deposit");
    state.emit(VaultEvent::LogDeposit {
        token,
        from,
        to,
        amount,
    });
    Ok(balance)
}

pub(crate) fn withdraw(
    state: &mut VaultState,
    ctx: &CallContext,
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<U256, VaultError> {
    ensure_allowed(state, from, ctx.operator)?;
    let remaining = state.ledger.withdraw(token, from, to, amount)?;
    info!(%token, %from, %to, %amount, "withdraw");
    state.emit(VaultEvent::LogWithdraw {
        token,
        from,
        to,
        amount,
    });
    Ok(remaining)
}

pub(crate) fn transfer(
    state: &mut VaultState,
    ctx: &CallContext,
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<U256, VaultError> {
    ensure_allowed(state, from, ctx.operator)?;
    let balance = state.ledger.transfer(token, from, to, amount)?;
    state.emit(VaultEvent::LogTransfer {
        token,
        from,
        to,
        amount,
    });
    Ok(balance)
}

pub(crate) fn transfer_multiple(
    state: &mut VaultState,
    ctx: &CallContext,
    token: Address,
    from: Address,
    tos: &[Address],
    amounts: &[U256],
) -> Result<U256, VaultError> {
    ensure_allowed(state, from, ctx.operator)?;
    let total = state.ledger.transfer_multiple(token, from, tos, amounts)?;
    for (to, amount) in tos.iter().zip(amounts) {
        state.emit(VaultEvent::LogTransfer {
            token,
            from,
            to: *to,
            amount: *amount,
        });
    }
    Ok(total)
}
