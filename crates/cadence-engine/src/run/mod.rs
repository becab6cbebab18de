//! Run lifecycle.
//!
//! `Runner` owns the frame scheduler for one run at a time, bridges the
//! platform loop to the user's `GraphicsContext`, and exposes the one-shot
//! readiness gate that `register_ping` waits on.

mod gate;
mod runner;
mod scheduler;

pub use gate::ReadinessGate;
pub use runner::Runner;
pub use scheduler::{FrameScheduler, PingFn};
