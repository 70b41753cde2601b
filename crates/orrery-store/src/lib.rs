//! Orrery Store - The client's local mirror of on-chain entity state
//!
//! This crate implements the entity store shared by the sync loop (writer
//! of authoritative values), the action submitter (writer of optimistic
//! overrides), and the scene reader:
//! - Authoritative values keyed by (entity, component kind)
//! - Token-scoped overrides layered above them
//! - Scoped override guards with exactly-once release

pub mod guard;
pub mod store;

pub use guard::*;
pub use store::*;
