use std::sync::Arc;

use tracing::trace;

use crate::error::ClockError;
use crate::hlc::Hlc;

/// Default tolerance (milliseconds) for [`HlcClock::tick`]'s backward-skew
/// check. See [`HlcClock::with_max_skew`].
pub const DEFAULT_MAX_SKEW_MS: u64 = 60_000;

/// Per-node mutable HLC generator.
///
/// Holds the last emitted `(wall, logical)` pair for one node and produces
/// strictly increasing [`Hlc`]s. Process-wide per node (spec §3): a
/// replica embedding this should persist the state returned by
/// [`HlcClock::wall`]/[`HlcClock::logical`] and reconstruct via
/// [`HlcClock::restore`] so that monotonicity survives a restart.
#[derive(Debug, Clone)]
pub struct HlcClock {
    wall: u64,
    logical: u32,
    node: Arc<str>,
    max_skew_ms: u64,
}

impl HlcClock {
    /// Initializes fresh clock state for `node_id` (spec §4.1: `create`).
    pub fn create(node_id: impl Into<Arc<str>>) -> Self {
        Self {
            wall: 0,
            logical: 0,
            node: node_id.into(),
            max_skew_ms: DEFAULT_MAX_SKEW_MS,
        }
    }

    /// Restores persisted state (e.g. loaded from disk at startup). The
    /// next `tick`/`observe` is guaranteed to strictly dominate `wall`/`logical`.
    pub fn restore(node_id: impl Into<Arc<str>>, wall: u64, logical: u32) -> Self {
        Self {
            wall,
            logical,
            node: node_id.into(),
            max_skew_ms: DEFAULT_MAX_SKEW_MS,
        }
    }

    /// Overrides the default backward-skew tolerance used by `tick`.
    #[must_use]
    pub fn with_max_skew(mut self, max_skew_ms: u64) -> Self {
        self.max_skew_ms = max_skew_ms;
        self
    }

    /// The node id this clock issues timestamps for.
    pub fn node(&self) -> &Arc<str> {
        &self.node
    }

    /// Current persisted wall component (for durability snapshots).
    pub fn wall(&self) -> u64 {
        self.wall
    }

    /// Current persisted logical component (for durability snapshots).
    pub fn logical(&self) -> u32 {
        self.logical
    }

    /// Produces a new `Hlc` for `now_ms`, per spec §4.1's tick rule.
    ///
    /// Errors if the logical counter would overflow, or if `now_ms` lags
    /// the clock's own wall component by more than `max_skew_ms` — the
    /// latter indicates either a stalled local clock or a prior `observe`
    /// that pulled the state far into the future off a bad peer.
    pub fn tick(&mut self, now_ms: u64) -> Result<Hlc, ClockError> {
        if self.wall > now_ms {
            let skew_ms = self.wall - now_ms;
            if skew_ms > self.max_skew_ms {
                return Err(ClockError::SkewExceeded {
                    skew_ms,
                    bound_ms: self.max_skew_ms,
                });
            }
        }

        let new_wall = self.wall.max(now_ms);
        let new_logical = if new_wall == self.wall {
            self.logical
                .checked_add(1)
                .ok_or(ClockError::LogicalOverflow { wall: new_wall })?
        } else {
            0
        };

        self.wall = new_wall;
        self.logical = new_logical;
        trace!(wall = new_wall, logical = new_logical, node = %self.node, "hlc tick");
        Ok(Hlc::new(new_wall, new_logical, Arc::clone(&self.node)))
    }

    /// Folds an observed remote `Hlc` into local state so that the next
    /// `tick` strictly dominates it (spec §4.1: `observe`).
    ///
    /// Errors identically to `tick` if the logical counter would overflow —
    /// the same `logical == u32::MAX` precondition applies here, since
    /// `observe` advances `logical` exactly like `tick` does when the wall
    /// component does not move forward.
    pub fn observe(&mut self, incoming: &Hlc, now_ms: u64) -> Result<Hlc, ClockError> {
        let prior_max = self.wall.max(incoming.wall);
        let new_wall = prior_max.max(now_ms);
        let new_logical = if new_wall > prior_max {
            0
        } else {
            self.logical
                .max(incoming.logical)
                .checked_add(1)
                .ok_or(ClockError::LogicalOverflow { wall: new_wall })?
        };

        self.wall = new_wall;
        self.logical = new_logical;
        trace!(
            wall = new_wall,
            logical = new_logical,
            node = %self.node,
            observed_node = %incoming.node,
            "hlc observe"
        );
        Ok(Hlc::new(new_wall, new_logical, Arc::clone(&self.node)))
    }
}
