//! Orrery Test Harness - Scripted chain client and end-to-end validation
//!
//! This crate provides:
//! - `ScriptedChain`, an in-memory chain client with failure injection
//! - End-to-end tests covering the sync loop, the optimistic override
//!   lifecycle, and reconnect behavior

pub mod integration;
pub mod scripted;

pub use integration::*;
pub use scripted::*;
