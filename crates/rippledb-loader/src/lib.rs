//! # rippledb-loader
//!
//! The batch loader (spec §4.8): coalesces per-tick `load(id)` calls into a
//! single `Store::get_rows`, avoiding N+1 round-trips in UI list renders.

mod loader;
mod scheduler;

pub use loader::{make_loader, FlushStrategy, Loader};
pub use scheduler::{Scheduler, TokioScheduler};
