//! Cross-thread access to the rendering context.
//!
//! The native rendering context lives on the thread that created it. Other
//! threads never touch it directly: they hand closures to a
//! `RenderDispatcher`, which the owning thread's `RenderHost` runs one at a
//! time and answers synchronously.

mod channel;
mod target;

pub use channel::{render_channel, RenderDispatcher, RenderHost};
pub use target::{RenderContext, RenderTarget};
