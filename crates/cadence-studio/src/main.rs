use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use cadence_engine::audio::LoopStream;
use cadence_engine::core::GraphicsContext;
use cadence_engine::device::Canvas;
use cadence_engine::dispatch::RenderTarget;
use cadence_engine::logging::{init_logging, LoggingConfig};
use cadence_engine::paint::Color;
use cadence_engine::run::Runner;
use cadence_engine::time::ExternalClock;
use cadence_engine::window::{Runtime, RuntimeConfig};
use cadence_engine::DispatchError;

const SAMPLE_RATE: usize = 48_000;
const TICKS_PER_SECOND: u64 = 60;

/// Counts logical ticks and reports throughput once per simulated second.
struct Studio {
    runner: Runner,
    ticks: u64,
    reported_second: u64,
}

impl GraphicsContext for Studio {
    fn resize(&mut self, width: u32, height: u32, scale: f64) {
        log::info!("surface {width}x{height} @ {scale:.2}x");
    }

    fn update_and_draw(&mut self, update_count: u32) -> Result<()> {
        self.ticks += u64::from(update_count);

        let second = self.ticks / TICKS_PER_SECOND;
        if second != self.reported_second {
            self.reported_second = second;
            log::info!(
                "t={second}s ticks={} fps={:.1}",
                self.ticks,
                self.runner.current_fps()
            );
        }
        Ok(())
    }

    fn invalidate(&mut self) {
        log::debug!("contents invalidated");
    }
}

/// Endless sawtooth tone; one second of 8-bit mono samples.
fn tone() -> LoopStream<Cursor<Vec<u8>>> {
    let samples: Vec<u8> = (0..SAMPLE_RATE).map(|i| ((i * 440 * 256) / SAMPLE_RATE) as u8).collect();
    let len = samples.len() as u64;
    LoopStream::new(Cursor::new(samples), len)
}

/// Pulls one frame's worth of audio per render step.
fn spawn_audio_feeder(runner: Runner) {
    thread::spawn(move || {
        let stream = Mutex::new(tone());
        let per_frame = SAMPLE_RATE / TICKS_PER_SECOND as usize;

        runner.register_ping(move || {
            let mut buf = vec![0u8; per_frame];
            let Ok(mut s) = stream.lock() else {
                return;
            };
            if let Err(e) = s.read_exact(&mut buf) {
                log::warn!("audio feed stalled: {e}");
            }
        });
        log::info!("audio feeder registered");
    });
}

/// Recolors the canvas from a background thread through the dispatcher.
fn spawn_painter(target: RenderTarget<Canvas>) {
    const PALETTE: [(u8, u8, u8); 4] = [(24, 26, 38), (38, 70, 83), (42, 157, 143), (233, 196, 106)];

    thread::spawn(move || {
        for (r, g, b) in PALETTE.iter().copied().cycle() {
            thread::sleep(Duration::from_millis(750));
            match target.fill(Color::from_srgb_u8(r, g, b, 255)) {
                Ok(()) => {}
                Err(DispatchError::Disconnected) => break,
                Err(e) => log::warn!("fill failed: {e}"),
            }
        }
    });
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    // Ticked by the window on every presented frame.
    let vsync = ExternalClock::new(TICKS_PER_SECOND as u32);

    let runtime = Runtime::new(RuntimeConfig {
        title: "Cadence Studio".to_string(),
        vsync_clock: Some(vsync.clone()),
        ..Default::default()
    })?;
    let runner = Runner::with_clock(Arc::new(vsync));

    spawn_audio_feeder(runner.clone());
    spawn_painter(runtime.render_target());

    let studio = Studio {
        runner: runner.clone(),
        ticks: 0,
        reported_second: 0,
    };
    runner.run(studio, runtime)?;

    log::info!("studio closed after {} ticks", runner.frame_count());
    Ok(())
}
