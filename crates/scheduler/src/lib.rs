//! Scheduling of planet physics: an amortized scheduler that spreads one cycle
//! over many short calls, and a synchronous `update` that runs a whole cycle
//! at once on a CPU or accelerated backend.
//!
//! # Invariants
//! - Phases run in the fixed `Phase::CYCLE` order; pressure walks shells top-down.
//! - Exactly one call completes each cycle; the cursor never exceeds the phase extent.
//! - An accelerator that fails once is never used again.

mod amortized;
mod backend;
mod config;
mod phase;
mod stages;
mod timer;
mod update;

pub use amortized::AmortizedScheduler;
pub use backend::{AcceleratedStage, Accelerator, AcceleratorError, Backend, NoAccelerator};
pub use config::{SchedulerConfig, SchedulerError, SimConfig};
pub use phase::Phase;
pub use timer::{CallTimer, SchedulerStats};
pub use update::update;
