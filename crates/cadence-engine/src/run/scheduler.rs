use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::GraphicsContext;
use crate::error::RunError;
use crate::time::{ClockSource, FpsMeter, FramePacer};

/// Callback invoked once per render step, before the update count is computed.
pub type PingFn = Arc<dyn Fn() + Send + Sync>;

struct SchedulerState {
    running: bool,
    pacer: FramePacer,
    fps: FpsMeter,
    ping: Option<PingFn>,
}

impl SchedulerState {
    fn fresh(now_ns: i64) -> Self {
        Self {
            running: false,
            pacer: FramePacer::new(now_ns),
            fps: FpsMeter::new(now_ns),
            ping: None,
        }
    }
}

/// Pacing and FPS state of one run.
///
/// Every field sits behind a single reader/writer lock: FPS readers on other
/// threads share it, the render step takes it exclusively and only briefly.
pub struct FrameScheduler {
    state: RwLock<SchedulerState>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SchedulerState::fresh(0)),
        }
    }

    /// Resets to a fresh state stamped at `now_ns` and marks it running.
    ///
    /// Fails without touching anything when a run is already active.
    pub fn start_running(&self, now_ns: i64) -> Result<(), RunError> {
        let mut st = self.state.write();
        if st.running {
            return Err(RunError::AlreadyRunning);
        }
        *st = SchedulerState::fresh(now_ns);
        st.running = true;
        Ok(())
    }

    pub fn end_running(&self) {
        self.state.write().running = false;
    }

    pub fn is_running(&self) -> bool {
        self.state.read().running
    }

    /// Last FPS sample, or 0 when no run is active.
    pub fn current_fps(&self) -> f64 {
        let st = self.state.read();
        if !st.running {
            return 0.0;
        }
        st.fps.current()
    }

    /// Logical updates issued since the current (or last) run started.
    pub fn frame_count(&self) -> i64 {
        self.state.read().pacer.frame_count()
    }

    pub fn register_ping(&self, ping: PingFn) {
        self.state.write().ping = Some(ping);
    }

    /// Number of updates due at `now_ns`; advances the pacer.
    pub fn update_count(&self, now_ns: i64, clock: &dyn ClockSource) -> u32 {
        self.state.write().pacer.update_count(now_ns, clock)
    }

    /// One render step.
    ///
    /// Pings, computes the update count, hands it to `ctx` and finally does
    /// FPS bookkeeping. An error from `ctx` is returned before the frame is
    /// counted.
    pub fn render(
        &self,
        now_ns: i64,
        clock: &dyn ClockSource,
        ctx: &mut dyn GraphicsContext,
    ) -> anyhow::Result<()> {
        // Clone out of the lock so the callback never runs under it.
        let ping = self.state.read().ping.clone();
        if let Some(ping) = ping {
            ping();
        }

        let count = self.update_count(now_ns, clock);
        ctx.update_and_draw(count)?;

        if let Some(fps) = self.state.write().fps.record_frame(now_ns) {
            log::trace!("fps sample: {fps:.2}");
        }
        Ok(())
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::time::{interval_ns, Unsynchronized, NANOS_PER_SECOND};

    #[derive(Default)]
    struct Counting {
        calls: Vec<u32>,
        fail_at: Option<usize>,
    }

    impl GraphicsContext for Counting {
        fn update_and_draw(&mut self, update_count: u32) -> anyhow::Result<()> {
            if self.fail_at == Some(self.calls.len()) {
                anyhow::bail!("draw failed");
            }
            self.calls.push(update_count);
            Ok(())
        }
    }

    #[test]
    fn second_start_is_rejected_without_reset() {
        let s = FrameScheduler::new();
        s.start_running(0).unwrap();
        s.update_count(interval_ns(60), &Unsynchronized::new(60));

        assert!(matches!(s.start_running(5), Err(RunError::AlreadyRunning)));
        assert!(s.is_running());
        assert_eq!(s.frame_count(), 1);
    }

    #[test]
    fn restart_after_end_is_fresh() {
        let s = FrameScheduler::new();
        s.start_running(0).unwrap();
        s.update_count(interval_ns(60), &Unsynchronized::new(60));
        s.end_running();

        s.start_running(1_000).unwrap();
        assert_eq!(s.frame_count(), 0);
    }

    #[test]
    fn fps_is_zero_when_not_running() {
        let s = FrameScheduler::new();
        assert_eq!(s.current_fps(), 0.0);

        s.start_running(0).unwrap();
        let clock = Unsynchronized::new(60);
        let mut ctx = Counting::default();
        for k in 1..=60i64 {
            s.render(k * NANOS_PER_SECOND / 60, &clock, &mut ctx).unwrap();
        }
        assert!((s.current_fps() - 60.0).abs() < 1e-6);

        s.end_running();
        assert_eq!(s.current_fps(), 0.0);
    }

    #[test]
    fn render_forwards_counts_and_pings() {
        let s = FrameScheduler::new();
        s.start_running(0).unwrap();

        let pings = Arc::new(AtomicUsize::new(0));
        let p = pings.clone();
        s.register_ping(Arc::new(move || {
            p.fetch_add(1, Ordering::Relaxed);
        }));

        let clock = Unsynchronized::new(60);
        let mut ctx = Counting::default();
        for i in 1..=3 {
            s.render(i * interval_ns(60), &clock, &mut ctx).unwrap();
        }

        assert_eq!(ctx.calls, vec![1, 1, 1]);
        assert_eq!(pings.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn ping_may_read_scheduler_state() {
        // The ping runs outside the lock, so it can call back in.
        let s = Arc::new(FrameScheduler::new());
        s.start_running(0).unwrap();

        let seen = Arc::new(AtomicUsize::new(0));
        let (s2, seen2) = (s.clone(), seen.clone());
        s.register_ping(Arc::new(move || {
            if s2.is_running() {
                seen2.fetch_add(1, Ordering::Relaxed);
            }
        }));

        let mut ctx = Counting::default();
        s.render(interval_ns(60), &Unsynchronized::new(60), &mut ctx).unwrap();
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn callback_error_propagates() {
        let s = FrameScheduler::new();
        s.start_running(0).unwrap();

        let mut ctx = Counting { fail_at: Some(0), ..Default::default() };
        let err = s
            .render(interval_ns(60), &Unsynchronized::new(60), &mut ctx)
            .unwrap_err();
        assert_eq!(err.to_string(), "draw failed");
    }
}
