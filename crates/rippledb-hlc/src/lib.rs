//! # rippledb-hlc
//!
//! Hybrid logical clocks (HLC): monotonic wall-clock-plus-logical timestamps
//! with a deterministic total order and bounded-skew detection.
//!
//! An [`Hlc`] is the immutable timestamp value carried on [`Change`]s and
//! their per-field tags. An [`HlcClock`] is the per-node mutable generator
//! that produces strictly increasing `Hlc`s via [`HlcClock::tick`] and folds
//! in causal information observed from remote replicas via
//! [`HlcClock::observe`].
//!
//! [`Change`]: https://docs.rs/rippledb-types

mod clock;
mod error;
mod hlc;

pub use clock::HlcClock;
pub use error::ClockError;
pub use hlc::Hlc;
