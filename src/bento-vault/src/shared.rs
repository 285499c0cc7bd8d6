//! Thread-safe handle to one vault.
//!
//! A single lock serializes every call, and a batch holds it from validation to commit, so other
//! threads only ever see the state before or after a whole batch.

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use parking_lot::Mutex;

use crate::{
    config::{ConfigError, VaultConfig},
    cook::CookOutcome,
    errors::VaultError,
    vault::{CallContext, Vault},
};

#[derive(Clone)]
pub struct SharedVault {
    inner: Arc<Mutex<Vault>>,
}

impl SharedVault {
    pub fn new(config: VaultConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_vault(Vault::new(config)?))
    }

    pub fn from_vault(vault: Vault) -> Self {
        Self {
            inner: Arc::new(Mutex::new(vault)),
        }
    }

    /// Run `f` with exclusive access to the vault.
    pub fn with<T>(&self, f: impl FnOnce(&mut Vault) -> T) -> T {
        let mut vault = self.inner.lock();
        f(&mut vault)
    }

    pub fn cook<D: AsRef<[u8]>>(
        &self,
        ctx: &CallContext,
        actions: &[u8],
        values: &[U256],
        datas: &[D],
    ) -> Result<CookOutcome, VaultError> {
        self.inner.lock().cook(ctx, actions, values, datas)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn set_master_contract_approval(
        &self,
        ctx: &CallContext,
        user: Address,
        master_contract: Address,
        approved: bool,
        v: u8,
        r: B256,
        s: B256,
    ) -> Result<(), VaultError> {
        self.inner
            .lock()
            .set_master_contract_approval(ctx, user, master_contract, approved, v, r, s)
    }

    pub fn is_master_contract_approved(&self, master_contract: Address, user: Address) -> bool {
        self.inner.lock().is_master_contract_approved(master_contract, user)
    }

    pub fn nonce_of(&self, user: Address) -> U256 {
        self.inner.lock().nonce_of(user)
    }

    pub fn domain_separator(&self) -> B256 {
        self.inner.lock().domain_separator()
    }

    pub fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.inner.lock().balance_of(token, account)
    }
}
