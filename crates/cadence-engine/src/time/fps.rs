use super::clock::NANOS_PER_SECOND;

/// Rendered-frames-per-second estimator over one-second windows.
#[derive(Debug, Clone)]
pub struct FpsMeter {
    frames_since_sample: u64,
    last_sample_ns: i64,
    current: f64,
}

impl FpsMeter {
    pub fn new(now_ns: i64) -> Self {
        Self {
            frames_since_sample: 0,
            last_sample_ns: now_ns,
            current: 0.0,
        }
    }

    /// Last computed sample; 0 until the first window closes.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Counts one rendered frame at `now_ns`.
    ///
    /// Returns the new sample when at least one second has elapsed since the
    /// previous one.
    pub fn record_frame(&mut self, now_ns: i64) -> Option<f64> {
        self.frames_since_sample += 1;

        let elapsed = now_ns - self.last_sample_ns;
        if elapsed < NANOS_PER_SECOND {
            return None;
        }

        self.current = self.frames_since_sample as f64 * NANOS_PER_SECOND as f64 / elapsed as f64;
        self.frames_since_sample = 0;
        self.last_sample_ns = now_ns;
        Some(self.current)
    }
}
