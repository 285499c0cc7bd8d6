//! Shared types for the BentoBox vault: cook action codes, approval messages and signatures.
//!
//! Used by the vault itself and by off-chain tooling that builds and signs cook batches.

#![no_std]

pub mod actions;
pub mod approval;
pub mod constants;

pub use actions::ActionCode;
pub use approval::{ApprovalMessage, Signature, SignedApproval};
