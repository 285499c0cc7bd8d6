//! Snapshot transactions over the vault state.
//!
//! `Transaction::begin` takes a checkpoint; dropping the transaction without `commit` restores
//! it. Balances and approval tables are copied. The event log and the registry's replay log only
//! grow, so they are marked by length and truncated on rollback. Transactions nest, so an isolated
//! cook leg runs in a child transaction of the batch.

use crate::{
    events::VaultEvent,
    ledger::Ledger,
    registry::{ApprovalRegistry, RegistryCheckpoint},
};

/// Everything a vault operation may mutate.
#[derive(Debug)]
pub struct VaultState {
    pub ledger: Ledger,
    pub registry: ApprovalRegistry,
    pub events: Vec<VaultEvent>,
}

impl VaultState {
    pub fn emit(&mut self, event: VaultEvent) {
        self.events.push(event);
    }
}

struct Checkpoint {
    ledger: Ledger,
    registry: RegistryCheckpoint,
    events: usize,
}

pub struct Transaction<'a> {
    state: &'a mut VaultState,
    checkpoint: Option<Checkpoint>,
}

impl<'a> Transaction<'a> {
    pub fn begin(state: &'a mut VaultState) -> Self {
        let checkpoint = Some(Checkpoint {
            ledger: state.ledger.clone(),
            registry: state.registry.checkpoint(),
            events: state.events.len(),
        });
        Self { state, checkpoint }
    }

    pub fn state(&mut self) -> &mut VaultState {
        &mut *self.state
    }

    pub fn commit(mut self) {
        self.checkpoint = None;
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.state.ledger = checkpoint.ledger;
            self.state.registry.restore(checkpoint.registry);
            self.state.events.truncate(checkpoint.events);
        }
    }
}
