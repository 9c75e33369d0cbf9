// src/monitor/mod.rs
// =============================================================================
// The polling-and-change-detection engine.
//
// Submodules:
// - scheduler: The main loop and its Running / ErrorBackoff / Stopped states
// - timing: Normally-distributed jitter and the poll delay floor
// =============================================================================

mod scheduler;
mod timing;

pub use scheduler::Monitor;
pub use timing::GaussianJitter;
