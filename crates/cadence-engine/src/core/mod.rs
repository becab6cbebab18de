//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the platform loop, the
//! frame scheduler and user code. It avoids leaking runtime internals into
//! user code and lets tests drive the scheduler without a window.

mod app;
mod platform;

pub use app::GraphicsContext;
pub use platform::{FrameHandler, RenderLoop};
