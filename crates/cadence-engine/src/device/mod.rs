//! Native rendering context.
//!
//! `Canvas` owns the wgpu device, queue and window surface. It must only be
//! touched on the thread that runs the platform loop; everything else goes
//! through a `RenderTarget<Canvas>`.

mod canvas;
mod error;
mod init;
mod surface;

pub use canvas::{Canvas, CanvasFrame};
pub use error::SurfaceErrorAction;
pub use init::CanvasInit;
