use std::time::Duration;

/// Environment-specific flush scheduling, abstracted behind a capability
/// (spec §9 "scoped flush scheduling"): a browser implementation would back
/// `defer_microtask` with `queueMicrotask` and `defer_frame` with
/// `requestAnimationFrame`; a headless runtime has neither, so
/// [`TokioScheduler`] approximates both on top of the async runtime's own
/// scheduler.
pub trait Scheduler: Send + Sync {
    fn defer_microtask(&self) -> impl Future<Output = ()> + Send;
    fn defer_frame(&self) -> impl Future<Output = ()> + Send;
}

/// Default `Scheduler`: a microtask is "yield once to the runtime and come
/// back on the next poll"; a frame is a fixed sleep approximating one
/// display frame.
#[derive(Debug, Clone, Copy)]
pub struct TokioScheduler {
    frame_duration: Duration,
}

impl TokioScheduler {
    /// 16ms, approximating one frame at 60Hz.
    const DEFAULT_FRAME_DURATION: Duration = Duration::from_millis(16);

    pub fn new() -> Self {
        Self {
            frame_duration: Self::DEFAULT_FRAME_DURATION,
        }
    }

    #[must_use]
    pub fn with_frame_duration(mut self, duration: Duration) -> Self {
        self.frame_duration = duration;
        self
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    async fn defer_microtask(&self) {
        tokio::task::yield_now().await;
    }

    async fn defer_frame(&self) {
        tokio::time::sleep(self.frame_duration).await;
    }
}
