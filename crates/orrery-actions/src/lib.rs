//! Orrery Actions - Player intents as chain transactions
//!
//! This crate turns player intents (spawn, move) into transaction
//! submissions with optimistic local feedback:
//! - Move applies a position override before the transaction lands
//! - Every override is released exactly once, on every outcome
//! - Failures come back typed; nothing is swallowed

pub mod submit;

pub use submit::*;
