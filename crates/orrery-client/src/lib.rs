//! Orrery Client - Wiring for the on-chain game client
//!
//! This crate assembles the pieces into a running client:
//! - `GameClient` owns the shared store, the sync loop, and the action
//!   submitter - all passed explicitly, no global state
//! - `SceneProjector` turns synchronized grid positions into pixel
//!   placements for the 2D scene
//! - `telemetry` initializes structured logging for host binaries

pub mod client;
pub mod scene;
pub mod telemetry;

pub use client::*;
pub use scene::*;
