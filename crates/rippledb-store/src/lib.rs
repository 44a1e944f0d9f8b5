//! # rippledb-store
//!
//! The client-side local truth store (spec §4.4): transactional apply over
//! the merge algebra in `rippledb-merge`, precise row reads, broad list
//! queries, and post-commit event emission.

mod error;
mod event_bus;
mod memory;
mod store;

pub use error::StoreError;
pub use event_bus::{EventCallback, Unsubscribe};
pub use memory::MemoryStore;
pub use store::{ListQuery, Row, Store};
