//! Orrery Chain - The remote state client boundary
//!
//! The blockchain RPC/indexing client is an external collaborator; this
//! crate pins down the interface the rest of the client programs against:
//! - Subscription requests and the live update feed
//! - Transaction execution and handles
//! - The reconnect backoff policy

pub mod backoff;
pub mod client;
pub mod error;

pub use backoff::*;
pub use client::*;
pub use error::*;
