use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Length of one logical tick in nanoseconds for the given rate.
///
/// A rate of zero is treated as one tick per second.
#[inline]
pub fn interval_ns(rate: u32) -> i64 {
    NANOS_PER_SECOND / i64::from(rate.max(1))
}

/// Monotonic time source with nanosecond resolution.
///
/// The runtime uses [`SystemMonotonic`]; tests substitute a manual clock so
/// pacing decisions are deterministic.
pub trait Monotonic: Send + Sync {
    fn now_ns(&self) -> i64;
}

/// Wall-clock monotonic time measured from a fixed `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemMonotonic {
    base: Instant,
}

impl SystemMonotonic {
    pub fn new() -> Self {
        Self { base: Instant::now() }
    }
}

impl Default for SystemMonotonic {
    fn default() -> Self {
        Self::new()
    }
}

impl Monotonic for SystemMonotonic {
    fn now_ns(&self) -> i64 {
        i64::try_from(self.base.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }
}

/// External frame counter used to synchronize update counts.
///
/// `frame_number` ticks at `target_rate` once some external synchronization
/// (usually vertical sync) has been observed; before that `is_valid` is false
/// and the pacer falls back to wall-clock measurement.
pub trait ClockSource: Send + Sync {
    fn is_valid(&self) -> bool;
    fn frame_number(&self) -> i64;
    fn target_rate(&self) -> u32;
}

/// Clock source that never synchronizes; only carries the target rate.
#[derive(Debug, Clone, Copy)]
pub struct Unsynchronized {
    rate: u32,
}

impl Unsynchronized {
    pub fn new(rate: u32) -> Self {
        Self { rate: rate.max(1) }
    }
}

impl Default for Unsynchronized {
    fn default() -> Self {
        Self::new(60)
    }
}

impl ClockSource for Unsynchronized {
    fn is_valid(&self) -> bool {
        false
    }

    fn frame_number(&self) -> i64 {
        0
    }

    fn target_rate(&self) -> u32 {
        self.rate
    }
}

/// Shareable frame counter advanced by whoever observes the sync signal.
///
/// Clones share the same counter. The clock becomes valid on the first
/// [`tick`](Self::tick) and stays valid.
#[derive(Debug, Clone)]
pub struct ExternalClock {
    inner: Arc<ExternalInner>,
}

#[derive(Debug)]
struct ExternalInner {
    rate: u32,
    valid: AtomicBool,
    frame: AtomicI64,
}

impl ExternalClock {
    pub fn new(rate: u32) -> Self {
        Self {
            inner: Arc::new(ExternalInner {
                rate: rate.max(1),
                valid: AtomicBool::new(false),
                frame: AtomicI64::new(0),
            }),
        }
    }

    /// Records one observed sync and returns the new frame number.
    pub fn tick(&self) -> i64 {
        let f = self.inner.frame.fetch_add(1, Ordering::AcqRel) + 1;
        self.inner.valid.store(true, Ordering::Release);
        f
    }

    /// Jumps the counter to `frame`, e.g. after the platform reports a
    /// presentation count directly.
    pub fn set_frame(&self, frame: i64) {
        self.inner.frame.store(frame, Ordering::Release);
        self.inner.valid.store(true, Ordering::Release);
    }
}

impl ClockSource for ExternalClock {
    fn is_valid(&self) -> bool {
        self.inner.valid.load(Ordering::Acquire)
    }

    fn frame_number(&self) -> i64 {
        self.inner.frame.load(Ordering::Acquire)
    }

    fn target_rate(&self) -> u32 {
        self.inner.rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_at_sixty_hz() {
        assert_eq!(interval_ns(60), 16_666_666);
    }

    #[test]
    fn zero_rate_does_not_divide_by_zero() {
        assert_eq!(interval_ns(0), NANOS_PER_SECOND);
        assert_eq!(Unsynchronized::new(0).target_rate(), 1);
    }

    #[test]
    fn external_clock_becomes_valid_on_first_tick() {
        let clock = ExternalClock::new(60);
        assert!(!clock.is_valid());

        let shared = clock.clone();
        assert_eq!(shared.tick(), 1);
        assert_eq!(shared.tick(), 2);

        assert!(clock.is_valid());
        assert_eq!(clock.frame_number(), 2);
    }

    #[test]
    fn system_monotonic_never_goes_backwards() {
        let clock = SystemMonotonic::new();
        let a = clock.now_ns();
        let b = clock.now_ns();
        assert!(b >= a);
    }
}
