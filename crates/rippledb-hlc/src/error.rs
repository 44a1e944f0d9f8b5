use thiserror::Error;

/// Errors raised while generating or observing hybrid logical clocks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClockError {
    /// The logical counter would exceed `u32::MAX` on the next tick.
    ///
    /// Non-recoverable without operator intervention (spec §7): the node's
    /// wall clock has stopped advancing relative to the tick rate for long
    /// enough to exhaust the logical component.
    #[error("hlc logical counter overflow at wall={wall}")]
    LogicalOverflow {
        /// The wall-clock value at which the overflow was detected.
        wall: u64,
    },

    /// The local clock state's wall component has drifted ahead of the
    /// observed wall-clock reading by more than the configured skew bound.
    ///
    /// This fires when a prior [`observe`](crate::HlcClock::observe) pulled
    /// the state far into the future (a misbehaving or clock-glitching
    /// peer) and the local wall clock has not caught up within tolerance.
    #[error("clock skew of {skew_ms}ms exceeds bound of {bound_ms}ms")]
    SkewExceeded {
        /// Observed skew in milliseconds.
        skew_ms: u64,
        /// Configured tolerance in milliseconds.
        bound_ms: u64,
    },
}
