//! Cadence engine crate.
//!
//! Drives a fixed-rate logical update loop from a display-paced render loop:
//! - `time` decides how many updates each rendered frame owes and measures FPS
//! - `run` owns the run lifecycle, the frame scheduler and the readiness gate
//! - `dispatch` funnels every rendering-context mutation onto the owning thread
//! - `window` and `device` are the winit/wgpu platform side

pub mod audio;
pub mod core;
pub mod device;
pub mod dispatch;
pub mod logging;
pub mod paint;
pub mod run;
pub mod time;
pub mod window;

mod error;

pub use error::{DispatchError, RegularTermination, RunError};
