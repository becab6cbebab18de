//! Window + platform loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the canvas and
//! the render dispatcher.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
