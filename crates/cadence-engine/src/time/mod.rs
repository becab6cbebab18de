//! Time subsystem.
//!
//! Provides stable, testable timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FramePacer` per run, asked once per rendered frame how many logical
//!   updates are due
//! - one `FpsMeter` per run, fed once per rendered frame
//! - a `ClockSource` describing the target tick rate and, when available, an
//!   external synchronization counter (vertical sync)

mod clock;
mod fps;
mod pacer;

pub use clock::{
    interval_ns, ClockSource, ExternalClock, Monotonic, SystemMonotonic, Unsynchronized,
    NANOS_PER_SECOND,
};
pub use fps::FpsMeter;
pub use pacer::{FramePacer, MAX_UPDATES_PER_FRAME, STALE_FRAME_INTERVALS};
