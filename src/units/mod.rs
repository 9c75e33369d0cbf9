// src/units/mod.rs
// =============================================================================
// This module holds everything about the units listed on the page.
//
// Submodules:
// - model: UnitRecord and Snapshot (what one poll "saw")
// - diff: Compares two snapshots and decides if anything changed
// - extract: Turns the raw HTML of the listings page into a Snapshot
//
// This file (mod.rs) is the module root - it re-exports the public API so
// other modules can write `units::diff()` instead of `units::diff::diff()`.
// =============================================================================

mod diff;
mod extract;
mod model;

pub use diff::{diff, SnapshotDiff};
pub use extract::{ExtractError, Extractor, HtmlExtractor, Section};
pub use model::{Snapshot, UnitRecord};
