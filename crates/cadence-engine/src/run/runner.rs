use std::sync::Arc;

use crate::core::{FrameHandler, GraphicsContext, RenderLoop};
use crate::error::{RegularTermination, RunError};
use crate::time::{ClockSource, Monotonic, SystemMonotonic, Unsynchronized};

use super::gate::ReadinessGate;
use super::scheduler::FrameScheduler;

/// Entry point that drives a [`GraphicsContext`] from a platform loop.
///
/// A `Runner` is a cheap, cloneable handle. Clones share one scheduler, so
/// only one [`run`](Self::run) can be active across all of them; the others
/// get [`RunError::AlreadyRunning`]. Other threads use a clone to read the
/// FPS or to register a ping callback.
#[derive(Clone)]
pub struct Runner {
    inner: Arc<RunnerInner>,
}

struct RunnerInner {
    scheduler: FrameScheduler,
    gate: ReadinessGate,
    time: Arc<dyn Monotonic>,
    clock: Arc<dyn ClockSource>,
}

impl Runner {
    /// Wall-clock runner without an external sync source, 60 ticks per second.
    pub fn new() -> Self {
        Self::with_sources(
            Arc::new(SystemMonotonic::new()),
            Arc::new(Unsynchronized::default()),
        )
    }

    /// Wall-clock runner paced by `clock`.
    pub fn with_clock(clock: Arc<dyn ClockSource>) -> Self {
        Self::with_sources(Arc::new(SystemMonotonic::new()), clock)
    }

    pub fn with_sources(time: Arc<dyn Monotonic>, clock: Arc<dyn ClockSource>) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                scheduler: FrameScheduler::new(),
                gate: ReadinessGate::new(),
                time,
                clock,
            }),
        }
    }

    /// Runs `ctx` inside `platform` until the loop ends.
    ///
    /// The run is marked finished however the loop exits, including unwinding.
    /// A [`RegularTermination`] from the platform is success; any other error
    /// is returned as [`RunError::Backend`].
    pub fn run<G, L>(&self, mut ctx: G, platform: L) -> Result<(), RunError>
    where
        G: GraphicsContext,
        L: RenderLoop,
    {
        let inner = &*self.inner;

        if let Err(e) = inner.scheduler.start_running(inner.time.now_ns()) {
            log::warn!("run rejected: {e}");
            return Err(e);
        }
        let _guard = RunGuard(&inner.scheduler);

        log::info!("run started at {} ticks/s", inner.clock.target_rate());
        if inner.gate.open() {
            log::debug!("readiness gate opened");
        }

        let mut driver = FrameDriver {
            scheduler: &inner.scheduler,
            time: inner.time.as_ref(),
            clock: inner.clock.as_ref(),
            ctx: &mut ctx,
        };

        match platform.run(&mut driver) {
            Ok(()) => Ok(()),
            Err(e) if e.downcast_ref::<RegularTermination>().is_some() => {
                log::info!("run ended: {e}");
                Ok(())
            }
            Err(e) => {
                log::error!("run failed: {e:#}");
                Err(RunError::Backend(e))
            }
        }
    }

    /// Stores `ping` to be called once per render step.
    ///
    /// Blocks until some run has started. The callback is cleared when the
    /// next run starts.
    pub fn register_ping<F>(&self, ping: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.gate.wait();
        self.inner.scheduler.register_ping(Arc::new(ping));
    }

    /// Last FPS sample; 0 when no run is active.
    pub fn current_fps(&self) -> f64 {
        self.inner.scheduler.current_fps()
    }

    pub fn is_running(&self) -> bool {
        self.inner.scheduler.is_running()
    }

    /// Logical updates issued by the current (or last) run.
    pub fn frame_count(&self) -> i64 {
        self.inner.scheduler.frame_count()
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

struct RunGuard<'a>(&'a FrameScheduler);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.end_running();
        log::debug!("scheduler stopped");
    }
}

/// Bridges platform readiness signals to the scheduler's render step.
struct FrameDriver<'a, G: GraphicsContext> {
    scheduler: &'a FrameScheduler,
    time: &'a dyn Monotonic,
    clock: &'a dyn ClockSource,
    ctx: &'a mut G,
}

impl<G: GraphicsContext> FrameHandler for FrameDriver<'_, G> {
    fn resize(&mut self, width: u32, height: u32, scale: f64) {
        self.ctx.resize(width, height, scale);
    }

    fn update(&mut self) -> anyhow::Result<()> {
        let now = self.time.now_ns();
        self.scheduler.render(now, self.clock, &mut *self.ctx)
    }

    fn invalidate(&mut self) {
        self.ctx.invalidate();
    }
}
