//! # rippledb-types
//!
//! The wire primitive ([`Change`]), post-commit notifications ([`DbEvent`]),
//! transport-agnostic request/response shapes, and the runtime schema
//! descriptor registry (spec §4.2, §6, §9).

mod change;
mod error;
mod event;
mod schema;
mod wire;

pub use change::{Change, ChangeKind, MakeDelete, MakeUpsert};
pub use error::ValidationError;
pub use event::{DbEvent, DbEventKind};
pub use schema::{EntityDescriptor, FieldDescriptor, SchemaError, SchemaRegistry};
pub use wire::{AppendRequest, AppendResponse, PullRequest, PullResponse};

pub use rippledb_hlc::Hlc;
