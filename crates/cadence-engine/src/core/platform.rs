/// What a platform loop drives once it is running.
///
/// Implemented by the runner; platform loops only call into it.
pub trait FrameHandler {
    fn resize(&mut self, width: u32, height: u32, scale: f64);

    /// One render step. An error must terminate the loop and be returned
    /// from [`RenderLoop::run`] unchanged.
    fn update(&mut self) -> anyhow::Result<()>;

    fn invalidate(&mut self);
}

/// Platform render-ready loop.
///
/// Calls [`FrameHandler::update`] once per readiness signal (display refresh)
/// on the thread that owns the rendering context. Returns
/// [`RegularTermination`](crate::RegularTermination) wrapped in
/// `anyhow::Error` when the user closed the application.
pub trait RenderLoop {
    fn run(self, handler: &mut dyn FrameHandler) -> anyhow::Result<()>;
}
