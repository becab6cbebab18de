#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use cadence_engine::core::{FrameHandler, GraphicsContext, RenderLoop};
use cadence_engine::time::Monotonic;

/// Time that only moves when a test says so.
#[derive(Default)]
pub struct ManualTime {
    now: AtomicI64,
}

impl ManualTime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, ns: i64) {
        self.now.store(ns, Ordering::SeqCst);
    }

    pub fn advance(&self, ns: i64) {
        self.now.fetch_add(ns, Ordering::SeqCst);
    }
}

impl Monotonic for ManualTime {
    fn now_ns(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Platform loop that advances `time` by a fixed step before each frame.
pub struct SteppedLoop {
    pub time: Arc<ManualTime>,
    pub step_ns: i64,
    pub frames: usize,
    pub exit: Exit,
}

pub enum Exit {
    UserClosed,
    Clean,
    Fail(&'static str),
}

impl RenderLoop for SteppedLoop {
    fn run(self, handler: &mut dyn FrameHandler) -> anyhow::Result<()> {
        handler.resize(640, 480, 1.0);
        for _ in 0..self.frames {
            self.time.advance(self.step_ns);
            handler.update()?;
        }
        match self.exit {
            Exit::UserClosed => Err(cadence_engine::RegularTermination.into()),
            Exit::Clean => Ok(()),
            Exit::Fail(msg) => Err(anyhow::anyhow!(msg)),
        }
    }
}

/// Records every update count it receives.
#[derive(Default)]
pub struct Recorder {
    pub counts: Vec<u32>,
    pub sizes: Vec<(u32, u32, f64)>,
    pub fail_after: Option<usize>,
}

impl GraphicsContext for Recorder {
    fn resize(&mut self, width: u32, height: u32, scale: f64) {
        self.sizes.push((width, height, scale));
    }

    fn update_and_draw(&mut self, update_count: u32) -> anyhow::Result<()> {
        if self.fail_after == Some(self.counts.len()) {
            anyhow::bail!("game logic exploded");
        }
        self.counts.push(update_count);
        Ok(())
    }
}
