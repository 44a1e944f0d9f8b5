//! # rippledb-events
//!
//! Invalidation wiring (spec §4.7): turns `Store::on_event` notifications
//! into coalesced cache invalidations for row queries and registry-driven
//! list queries.

mod invalidation;
mod registry;
mod wiring;

pub use invalidation::{Invalidation, InvalidationCallback};
pub use registry::{Registry, RegistryEntry};
pub use wiring::{InvalidationWiring, WiringConfig};
