//! Master contract approvals, replay nonces and the whitelist/clone registry.
//!
//! `ApprovalState` and `Nonce` live here and nowhere else; every write goes through `apply` or the
//! unsigned whitelist path of `set_master_contract_approval`.

use std::collections::{HashMap, HashSet};

use alloy_primitives::{keccak256, Address, B256, U256};
use bento_vault_types::{ApprovalMessage, Signature, SignedApproval};
use tracing::{debug, info, warn};

use crate::{
    crypto::{canonicalize, recover_signer},
    eip712::DomainContext,
    errors::VaultError,
};

/// Restorable part of the registry, sized by accounts rather than history.
#[derive(Clone, Debug, Default)]
struct ApprovalTable {
    /// (master contract, user) -> approved
    approved: HashMap<(Address, Address), bool>,
    nonces: HashMap<Address, U256>,
    whitelisted: HashSet<Address>,
    /// clone -> master contract
    master_contract_of: HashMap<Address, Address>,
}

/// Append-only record of accepted signatures; rolled back by truncation.
#[derive(Debug, Default)]
struct ReplayLog {
    order: Vec<B256>,
    seen: HashSet<B256>,
}

impl ReplayLog {
    fn contains(&self, key: &B256) -> bool {
        self.seen.contains(key)
    }

    fn insert(&mut self, key: B256) {
        if self.seen.insert(key) {
            self.order.push(key);
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn truncate(&mut self, len: usize) {
        if len >= self.order.len() {
            return;
        }
        for key in self.order.drain(len..) {
            self.seen.remove(&key);
        }
    }
}

/// Restore point taken by [`ApprovalRegistry::checkpoint`].
#[derive(Debug)]
pub struct RegistryCheckpoint {
    table: ApprovalTable,
    consumed: usize,
}

#[derive(Debug)]
pub struct ApprovalRegistry {
    domain: DomainContext,
    table: ApprovalTable,
    /// `replay_key` of every accepted signature.
    consumed: ReplayLog,
}

impl ApprovalRegistry {
    pub fn new(domain: DomainContext) -> Self {
        Self {
            domain,
            table: ApprovalTable::default(),
            consumed: ReplayLog::default(),
        }
    }

    pub fn domain(&self) -> &DomainContext {
        &self.domain
    }

    pub fn is_approved(&self, master_contract: Address, user: Address) -> bool {
        self.table
            .approved
            .get(&(master_contract, user))
            .copied()
            .unwrap_or(false)
    }

    pub fn nonce_of(&self, user: Address) -> U256 {
        self.table.nonces.get(&user).copied().unwrap_or_default()
    }

    pub fn is_whitelisted(&self, master_contract: Address) -> bool {
        self.table.whitelisted.contains(&master_contract)
    }

    /// Master contract a clone was deployed from, or the zero address.
    pub fn master_contract_of(&self, clone: Address) -> Address {
        self.table
            .master_contract_of
            .get(&clone)
            .copied()
            .unwrap_or(Address::ZERO)
    }

    /// Whether `operator` may move funds owned by `from`.
    pub fn is_allowed(&self, from: Address, operator: Address) -> bool {
        if from == operator {
            return true;
        }
        let master_contract = self.master_contract_of(operator);
        master_contract != Address::ZERO && self.is_approved(master_contract, from)
    }

    /// Snapshot of everything but the domain. The replay log is only marked, not copied.
    pub fn checkpoint(&self) -> RegistryCheckpoint {
        RegistryCheckpoint {
            table: self.table.clone(),
            consumed: self.consumed.len(),
        }
    }

    pub fn restore(&mut self, checkpoint: RegistryCheckpoint) {
        self.table = checkpoint.table;
        self.consumed.truncate(checkpoint.consumed);
    }

    pub fn set_whitelisted(&mut self, master_contract: Address, approved: bool) -> Result<(), VaultError> {
        if master_contract == Address::ZERO {
            return Err(VaultError::MasterContractNotSet);
        }
        if approved {
            self.table.whitelisted.insert(master_contract);
        } else {
            self.table.whitelisted.remove(&master_contract);
        }
        Ok(())
    }

    pub fn register_clone(&mut self, master_contract: Address, clone: Address) -> Result<(), VaultError> {
        if master_contract == Address::ZERO {
            return Err(VaultError::MasterContractNotSet);
        }
        self.table.master_contract_of.insert(clone, master_contract);
        Ok(())
    }

    /// Verify a signed approval for an explicit nonce and apply it.
    ///
    /// The message nonce must equal the stored nonce of `message.user`. On success the approval
    /// flag is written and the nonce advances by one, even when the flag does not change.
    pub fn apply(&mut self, message: &ApprovalMessage, signature: &Signature) -> Result<(), VaultError> {
        if message.master_contract == Address::ZERO {
            return Err(VaultError::MasterContractNotSet);
        }
        if message.user == Address::ZERO {
            return Err(VaultError::ZeroUser);
        }

        let current = self.nonce_of(message.user);
        if message.nonce != current {
            warn!(user = %message.user, expected = %current, got = %message.nonce, "stale approval nonce");
            return Err(VaultError::StaleNonce {
                user: message.user,
                nonce: current,
            });
        }

        let digest = self.domain.approval_digest(message);
        let recovered = recover_signer(digest, signature).inspect_err(|err| {
            warn!(user = %message.user, %digest, %err, "approval signature rejected");
        })?;
        if recovered != message.user {
            warn!(user = %message.user, %recovered, "approval signed by another account");
            return Err(VaultError::Unauthorized {
                user: message.user,
                recovered,
            });
        }

        let key = replay_key(
            message.user,
            message.master_contract,
            message.approved,
            &canonicalize(signature)?,
        );
        self.table
            .approved
            .insert((message.master_contract, message.user), message.approved);
        self.table.nonces.insert(message.user, current + U256::from(1u64));
        self.consumed.insert(key);

        info!(
            user = %message.user,
            master_contract = %message.master_contract,
            approved = message.approved,
            nonce = %current,
            "master contract approval applied"
        );
        Ok(())
    }

    /// `setMasterContractApproval` semantics.
    ///
    /// A zero signature approves directly when `sender` is the user, the user is not a clone and
    /// the master contract is whitelisted; no nonce is consumed on that path. Otherwise the
    /// signature is verified against the user's current nonce. Resubmitting an accepted
    /// `(user, master contract, approved, signature)` is `StaleNonce`; an altered one fails
    /// verification like any other foreign signature.
    pub fn set_master_contract_approval(
        &mut self,
        sender: Address,
        approval: &SignedApproval,
    ) -> Result<(), VaultError> {
        let SignedApproval {
            user,
            master_contract,
            approved,
            signature,
        } = *approval;

        if master_contract == Address::ZERO {
            return Err(VaultError::MasterContractNotSet);
        }

        if signature.is_zero() {
            if user != sender {
                return Err(VaultError::UserNotSender { user, sender });
            }
            if self.master_contract_of(user) != Address::ZERO {
                return Err(VaultError::UserIsClone(user));
            }
            if !self.is_whitelisted(master_contract) {
                return Err(VaultError::NotWhitelisted(master_contract));
            }
            debug!(%user, %master_contract, approved, "whitelisted approval without signature");
            self.table.approved.insert((master_contract, user), approved);
            return Ok(());
        }

        if user == Address::ZERO {
            return Err(VaultError::ZeroUser);
        }

        let current = self.nonce_of(user);
        let key = replay_key(user, master_contract, approved, &canonicalize(&signature)?);
        if self.consumed.contains(&key) {
            warn!(%user, nonce = %current, "approval signature replayed");
            return Err(VaultError::StaleNonce {
                user,
                nonce: current,
            });
        }

        self.apply(&approval.message(current), &signature)
    }
}

/// `keccak256(user || masterContract || approved || r || s || v)` over the canonical signature.
fn replay_key(user: Address, master_contract: Address, approved: bool, signature: &Signature) -> B256 {
    let mut buf = Vec::with_capacity(20 + 20 + 1 + Signature::LEN);
    buf.extend_from_slice(user.as_slice());
    buf.extend_from_slice(master_contract.as_slice());
    buf.push(approved as u8);
    buf.extend_from_slice(&signature.to_rsv());
    keccak256(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    const VAULT: Address = address!("5fbdb2315678afecb367f032d93f642f64180aa3");
    const MASTER: Address = address!("e7f1725e7734ce288f8367e1bb143e90bb3f0512");
    const USER: Address = address!("7e5f4552091a69125d5dfcb7b8c2659029395bdf");

    // Signature of Approval(USER, MASTER, true, 0) on the BentoBox V1 domain of VAULT, chain 31337.
    fn known_signature() -> Signature {
        Signature::new(
            27,
            b256!("f973a0b87062c389d125d8199e803b832b6ac6bf7867a4f6cd87506060fc4c58"),
            b256!("67fe9f4e764df0a9b81cac75b100ed49e37b216e91bb8e3167aa4c771863b142"),
        )
    }

    fn registry(chain_id: u64) -> ApprovalRegistry {
        ApprovalRegistry::new(DomainContext::new("BentoBox V1", None, VAULT, chain_id))
    }

    fn approval() -> SignedApproval {
        SignedApproval {
            user: USER,
            master_contract: MASTER,
            approved: true,
            signature: known_signature(),
        }
    }

    #[test]
    fn test_apply_known_vector() {
        let mut registry = registry(31337);
        registry.apply(&approval().message(U256::ZERO), &known_signature()).unwrap();
        assert!(registry.is_approved(MASTER, USER));
        assert_eq!(registry.nonce_of(USER), U256::from(1));
    }

    #[test]
    fn test_apply_rejects_explicit_stale_nonce() {
        let mut registry = registry(31337);
        let err = registry
            .apply(&approval().message(U256::from(1)), &known_signature())
            .unwrap_err();
        assert_eq!(err, VaultError::StaleNonce { user: USER, nonce: U256::ZERO });
        assert_eq!(registry.nonce_of(USER), U256::ZERO);
    }

    #[test]
    fn test_replay_through_set_approval_is_stale() {
        let mut registry = registry(31337);
        registry.set_master_contract_approval(USER, &approval()).unwrap();
        let err = registry.set_master_contract_approval(USER, &approval()).unwrap_err();
        assert_eq!(err, VaultError::StaleNonce { user: USER, nonce: U256::from(1) });
        assert_eq!(registry.nonce_of(USER), U256::from(1));
    }

    #[test]
    fn test_altered_replay_is_unauthorized() {
        let mut registry = registry(31337);
        registry.set_master_contract_approval(USER, &approval()).unwrap();

        let revoke = SignedApproval {
            approved: false,
            ..approval()
        };
        let err = registry.set_master_contract_approval(USER, &revoke).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { user: USER, .. }));

        let other_master = SignedApproval {
            master_contract: Address::repeat_byte(0x42),
            ..approval()
        };
        let err = registry.set_master_contract_approval(USER, &other_master).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { user: USER, .. }));

        assert!(registry.is_approved(MASTER, USER));
        assert_eq!(registry.nonce_of(USER), U256::from(1));
    }

    #[test]
    fn test_high_s_replay_is_stale() {
        let mut registry = registry(31337);
        registry.set_master_contract_approval(USER, &approval()).unwrap();
        let twin = SignedApproval {
            signature: Signature::new(
                28,
                known_signature().r,
                b256!("980160b189b20f5647e3538a4eff12b4d733bb781d8d120a58281215b7d28fff"),
            ),
            ..approval()
        };
        let err = registry.set_master_contract_approval(USER, &twin).unwrap_err();
        assert_eq!(err, VaultError::StaleNonce { user: USER, nonce: U256::from(1) });
    }

    #[test]
    fn test_restore_rewinds_nonce_and_replay_log() {
        let mut registry = registry(31337);
        let checkpoint = registry.checkpoint();
        registry.set_master_contract_approval(USER, &approval()).unwrap();
        registry.restore(checkpoint);

        assert!(!registry.is_approved(MASTER, USER));
        assert_eq!(registry.nonce_of(USER), U256::ZERO);
        // The signature was never consumed, so it applies again.
        registry.set_master_contract_approval(USER, &approval()).unwrap();
        assert_eq!(registry.nonce_of(USER), U256::from(1));
    }

    #[test]
    fn test_other_chain_rejects_signature() {
        let mut registry = registry(1);
        let err = registry.set_master_contract_approval(USER, &approval()).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { user: USER, .. }));
        assert!(!registry.is_approved(MASTER, USER));
        assert_eq!(registry.nonce_of(USER), U256::ZERO);
    }

    #[test]
    fn test_flipped_flag_rejects_signature() {
        let mut registry = registry(31337);
        let revoke = SignedApproval {
            approved: false,
            ..approval()
        };
        let err = registry.set_master_contract_approval(USER, &revoke).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
    }

    #[test]
    fn test_zero_fields_rejected() {
        let mut registry = registry(31337);
        let no_master = SignedApproval {
            master_contract: Address::ZERO,
            ..approval()
        };
        assert_eq!(
            registry.set_master_contract_approval(USER, &no_master),
            Err(VaultError::MasterContractNotSet)
        );
        let no_user = SignedApproval {
            user: Address::ZERO,
            ..approval()
        };
        assert_eq!(
            registry.set_master_contract_approval(USER, &no_user),
            Err(VaultError::ZeroUser)
        );
    }

    #[test]
    fn test_unsigned_path_requires_whitelist_and_sender() {
        let mut registry = registry(31337);
        let unsigned = SignedApproval {
            signature: Signature::default(),
            ..approval()
        };

        assert_eq!(
            registry.set_master_contract_approval(VAULT, &unsigned),
            Err(VaultError::UserNotSender { user: USER, sender: VAULT })
        );
        assert_eq!(
            registry.set_master_contract_approval(USER, &unsigned),
            Err(VaultError::NotWhitelisted(MASTER))
        );

        registry.set_whitelisted(MASTER, true).unwrap();
        registry.set_master_contract_approval(USER, &unsigned).unwrap();
        assert!(registry.is_approved(MASTER, USER));
        assert_eq!(registry.nonce_of(USER), U256::ZERO);

        registry.register_clone(MASTER, USER).unwrap();
        assert_eq!(
            registry.set_master_contract_approval(USER, &unsigned),
            Err(VaultError::UserIsClone(USER))
        );
    }

    #[test]
    fn test_is_allowed_follows_clone_master() {
        let mut registry = registry(31337);
        let clone = Address::repeat_byte(0xc1);
        assert!(registry.is_allowed(USER, USER));
        assert!(!registry.is_allowed(USER, clone));

        registry.register_clone(MASTER, clone).unwrap();
        assert!(!registry.is_allowed(USER, clone));

        registry.set_master_contract_approval(USER, &approval()).unwrap();
        assert!(registry.is_allowed(USER, clone));
        assert!(!registry.is_allowed(USER, MASTER));
    }
}
