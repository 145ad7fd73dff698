//! Threaded driver for the planet simulation.
//!
//! A single named worker thread advances a private planet at a fixed wake
//! rate, scaling wall-clock time by a speed multiplier, and publishes an
//! immutable snapshot whenever a cycle completes.
//!
//! # Invariants
//! - A snapshot handed to a consumer is never mutated.
//! - Simulated time never decreases across successive snapshots.
//! - The snapshot lock is held only to read or replace a pointer.
//! - A panicking pass never takes the worker down; the write planet is
//!   resynced from the last snapshot.

mod config;
mod engine;

pub use config::{EngineConfig, EngineError, PassMode};
pub use engine::ThreadedEngine;
