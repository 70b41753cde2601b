//! Orrery Core - Fundamental types for the on-chain game client
//!
//! This crate defines the types shared by every layer of the client:
//! - Identifiers (Address, EntityId, TransactionId)
//! - Component schema (ComponentKind, ComponentValue, Position)
//! - The pure direction-to-move transform

pub mod components;
pub mod direction;
pub mod id;

pub use components::*;
pub use direction::*;
pub use id::*;
