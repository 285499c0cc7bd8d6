//! Balance bookkeeping for the vault.
//!
//! Two books per token: external wallet balances (the token contract side) and balances held in
//! the vault. Every operation moves value between entries, so `total_supply(token)` only changes
//! through `mint`.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::errors::LedgerError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    wallets: HashMap<(Address, Address), U256>,
    balances: HashMap<(Address, Address), U256>,
    totals: HashMap<Address, U256>,
    supply: HashMap<Address, U256>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vault balance of `account` in `token`.
    pub fn balance_of(&self, token: Address, account: Address) -> U256 {
        self.balances.get(&(token, account)).copied().unwrap_or_default()
    }

    /// External wallet balance of `account` in `token`.
    pub fn wallet_of(&self, token: Address, account: Address) -> U256 {
        self.wallets.get(&(token, account)).copied().unwrap_or_default()
    }

    /// Sum of all vault balances of `token`.
    pub fn total(&self, token: Address) -> U256 {
        self.totals.get(&token).copied().unwrap_or_default()
    }

    pub fn total_supply(&self, token: Address) -> U256 {
        self.supply.get(&token).copied().unwrap_or_default()
    }

    /// Create `amount` of `token` in the external wallet of `to`.
    pub fn mint(&mut self, token: Address, to: Address, amount: U256) -> Result<(), LedgerError> {
        let supply = self
            .total_supply(token)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { token })?;
        credit(&mut self.wallets, token, to, amount)?;
        self.supply.insert(token, supply);
        Ok(())
    }

    /// Move `amount` from the wallet of `from` into the vault balance of `to`.
    pub fn deposit(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        ensure_recipient(to)?;
        let available = self.wallet_of(token, from);
        if available < amount {
            return Err(LedgerError::InsufficientWallet {
                token,
                account: from,
                available,
                required: amount,
            });
        }
        let total = self
            .total(token)
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { token })?;
        debit(&mut self.wallets, token, from, amount);
        let balance = credit(&mut self.balances, token, to, amount)?;
        self.totals.insert(token, total);
        Ok(balance)
    }

    /// Move `amount` from the vault balance of `from` to the wallet of `to`.
    ///
    /// Returns the remaining vault balance of `from`.
    pub fn withdraw(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        ensure_recipient(to)?;
        self.ensure_balance(token, from, amount)?;
        let remaining = debit(&mut self.balances, token, from, amount);
        credit(&mut self.wallets, token, to, amount)?;
        let total = self.total(token) - amount;
        self.totals.insert(token, total);
        Ok(remaining)
    }

    /// Move `amount` between vault balances. Returns the new balance of `to`.
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<U256, LedgerError> {
        ensure_recipient(to)?;
        self.ensure_balance(token, from, amount)?;
        debit(&mut self.balances, token, from, amount);
        credit(&mut self.balances, token, to, amount)
    }

    /// Move several amounts out of `from` in one debit. Returns the total moved.
    pub fn transfer_multiple(
        &mut self,
        token: Address,
        from: Address,
        tos: &[Address],
        amounts: &[U256],
    ) -> Result<U256, LedgerError> {
        if tos.len() != amounts.len() {
            return Err(LedgerError::LengthMismatch {
                tos: tos.len(),
                amounts: amounts.len(),
            });
        }
        let mut sum = U256::ZERO;
        for (to, amount) in tos.iter().zip(amounts) {
            ensure_recipient(*to)?;
            sum = sum
                .checked_add(*amount)
                .ok_or(LedgerError::Overflow { token })?;
        }
        self.ensure_balance(token, from, sum)?;
        debit(&mut self.balances, token, from, sum);
        for (to, amount) in tos.iter().zip(amounts) {
            credit(&mut self.balances, token, *to, *amount)?;
        }
        Ok(sum)
    }

    fn ensure_balance(&self, token: Address, account: Address, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance_of(token, account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                token,
                account,
                available,
                required: amount,
            });
        }
        Ok(())
    }
}

fn ensure_recipient(to: Address) -> Result<(), LedgerError> {
    if to == Address::ZERO {
        return Err(LedgerError::ZeroRecipient);
    }
    Ok(())
}

// Callers check the balance first.
fn debit(book: &mut HashMap<(Address, Address), U256>, token: Address, account: Address, amount: U256) -> U256 {
    let entry = book.entry((token, account)).or_default();
    *entry -= amount;
    *entry
}

fn credit(
    book: &mut HashMap<(Address, Address), U256>,
    token: Address,
    account: Address,
    amount: U256,
) -> Result<U256, LedgerError> {
    let entry = book.entry((token, account)).or_default();
    *entry = entry
        .checked_add(amount)
        .ok_or(LedgerError::Overflow { token })?;
    Ok(*entry)
}
