use super::clock::{interval_ns, ClockSource, NANOS_PER_SECOND};

/// Upper bound on logical updates issued for a single rendered frame.
pub const MAX_UPDATES_PER_FRAME: u32 = 3;

/// A frame arriving later than this many tick intervals is treated as stale:
/// accumulated lag is dropped instead of caught up.
pub const STALE_FRAME_INTERVALS: i64 = 5;

/// Decides how many fixed-rate updates are due at each rendered frame.
///
/// Two modes, chosen per call:
/// - synchronized: a valid external clock advanced since the last call, so its
///   frame number is ground truth for how many ticks have elapsed
/// - unsynchronized: elapsed wall time is converted into ticks, with stall
///   detection and smoothing of timer jitter around tick boundaries
///
/// The result is always in `0..=MAX_UPDATES_PER_FRAME`.
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_count: i64,
    last_update_ns: i64,
    last_clock_frame: i64,
}

impl FramePacer {
    /// Creates a pacer whose baseline is `now_ns`.
    pub fn new(now_ns: i64) -> Self {
        Self {
            frame_count: 0,
            last_update_ns: now_ns,
            last_clock_frame: 0,
        }
    }

    /// Total logical updates issued so far.
    pub fn frame_count(&self) -> i64 {
        self.frame_count
    }

    /// Timestamp the next call measures elapsed time from.
    pub fn last_update_ns(&self) -> i64 {
        self.last_update_ns
    }

    /// Computes the number of updates due at `now_ns` and advances the pacer.
    pub fn update_count(&mut self, now_ns: i64, clock: &dyn ClockSource) -> u32 {
        let elapsed = now_ns - self.last_update_ns;
        if elapsed < 0 {
            // Clock went backwards; leave state alone.
            return 0;
        }

        let rate = i64::from(clock.target_rate().max(1));
        let interval = interval_ns(clock.target_rate());

        let synced = clock.is_valid() && clock.frame_number() != self.last_clock_frame;

        let mut count = if synced {
            let f = clock.frame_number();
            self.last_clock_frame = f;
            (f - self.frame_count).max(0)
        } else if elapsed > STALE_FRAME_INTERVALS * interval {
            // Likely unfocused or suspended. Never burst to catch up.
            log::debug!(
                "stale frame: {:.1}ms since last update, dropping lag",
                elapsed as f64 / 1_000_000.0
            );
            self.last_update_ns = now_ns;
            return 0;
        } else {
            elapsed.saturating_mul(rate) / NANOS_PER_SECOND
        };

        // Stabilize around tick boundaries.
        if count == 0 && elapsed > interval / 2 {
            count = 1;
        }
        if count == 2 && elapsed < interval * 3 / 2 {
            count = 1;
        }

        count = count.min(i64::from(MAX_UPDATES_PER_FRAME));

        if synced {
            self.last_update_ns = now_ns;
        } else {
            self.last_update_ns += count * interval;
        }
        self.frame_count += count;

        count as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{ExternalClock, Unsynchronized};

    const MS: i64 = 1_000_000;

    fn pacer_60() -> (FramePacer, Unsynchronized) {
        (FramePacer::new(0), Unsynchronized::new(60))
    }

    // ── steady state ─────────────────────────────────────────────────────

    #[test]
    fn one_update_per_interval() {
        let (mut p, clock) = pacer_60();
        let interval = interval_ns(60);

        for i in 1..=120 {
            assert_eq!(p.update_count(i * interval, &clock), 1, "frame {i}");
        }
        assert_eq!(p.frame_count(), 120);
    }

    #[test]
    fn render_faster_than_tick_rate_alternates() {
        // 120 Hz display, 60 Hz logic: roughly every other frame updates.
        let (mut p, clock) = pacer_60();
        let half = interval_ns(60) / 2;

        let total: u32 = (1..=240).map(|i| p.update_count(i * half, &clock)).sum();
        assert!((119..=121).contains(&total), "total = {total}");
    }

    // ── stabilization ─────────────────────────────────────────────────────

    #[test]
    fn just_over_half_interval_rounds_up() {
        let (mut p, clock) = pacer_60();
        assert_eq!(p.update_count(9 * MS, &clock), 1);
    }

    #[test]
    fn under_half_interval_yields_nothing() {
        let (mut p, clock) = pacer_60();
        assert_eq!(p.update_count(7 * MS, &clock), 0);
        assert_eq!(p.last_update_ns(), 0);
    }

    #[test]
    fn two_ticks_below_one_and_a_half_intervals_collapse() {
        // Synchronized mode can report two ticks after a short gap.
        let mut p = FramePacer::new(0);
        let clock = ExternalClock::new(60);
        clock.set_frame(2);
        assert_eq!(p.update_count(20 * MS, &clock), 1);
    }

    // ── stale frames and clamping ────────────────────────────────────────

    #[test]
    fn stale_frame_drops_lag() {
        let (mut p, clock) = pacer_60();
        assert_eq!(p.update_count(100 * MS, &clock), 0);
        assert_eq!(p.last_update_ns(), 100 * MS);

        // No catch-up burst on the following frame.
        let next = 100 * MS + interval_ns(60);
        assert_eq!(p.update_count(next, &clock), 1);
    }

    #[test]
    fn long_gap_below_stale_threshold_is_clamped() {
        let (mut p, clock) = pacer_60();
        // 4.5 intervals: four ticks due, clamped to three.
        assert_eq!(p.update_count(75 * MS, &clock), MAX_UPDATES_PER_FRAME);
        assert_eq!(p.frame_count(), 3);
        assert_eq!(p.last_update_ns(), 3 * interval_ns(60));
    }

    #[test]
    fn backwards_time_is_a_no_op() {
        let (mut p, clock) = pacer_60();
        p.update_count(20 * MS, &clock);
        let before = p.clone();

        assert_eq!(p.update_count(-5 * MS, &clock), 0);
        assert_eq!(p.frame_count(), before.frame_count());
        assert_eq!(p.last_update_ns(), before.last_update_ns());
    }

    // ── synchronized clock ───────────────────────────────────────────────

    #[test]
    fn synced_clock_is_ground_truth() {
        let mut p = FramePacer::new(0);
        let clock = ExternalClock::new(60);

        clock.tick();
        assert_eq!(p.update_count(16 * MS, &clock), 1);
        assert_eq!(p.last_update_ns(), 16 * MS);

        // Same clock frame again: falls back to wall time.
        assert_eq!(p.update_count(20 * MS, &clock), 0);

        clock.set_frame(10);
        assert_eq!(p.update_count(200 * MS, &clock), MAX_UPDATES_PER_FRAME);
        assert_eq!(p.frame_count(), 4);
        assert_eq!(p.last_update_ns(), 200 * MS);
    }

    #[test]
    fn synced_clock_behind_frame_count_yields_zero() {
        let mut p = FramePacer::new(0);
        let unsynced = Unsynchronized::new(60);
        for i in 1..=5 {
            p.update_count(i * interval_ns(60), &unsynced);
        }

        let clock = ExternalClock::new(60);
        clock.set_frame(2);
        let now = 5 * interval_ns(60) + MS;
        assert_eq!(p.update_count(now, &clock), 0);
        assert_eq!(p.frame_count(), 5);
    }
}
