/// Per-frame callback supplied to [`Runner::run`](crate::run::Runner::run).
///
/// All methods are called on the thread that owns the rendering context.
pub trait GraphicsContext {
    /// Called when the drawable size or scale factor changes.
    fn resize(&mut self, width: u32, height: u32, scale: f64) {
        let _ = (width, height, scale);
    }

    /// Runs `update_count` logical updates, then draws one frame.
    ///
    /// An error aborts the platform loop and is returned from `run`.
    fn update_and_draw(&mut self, update_count: u32) -> anyhow::Result<()>;

    /// Called when previously drawn contents may have been lost.
    fn invalidate(&mut self) {}
}

impl<G: GraphicsContext + ?Sized> GraphicsContext for &mut G {
    fn resize(&mut self, width: u32, height: u32, scale: f64) {
        (**self).resize(width, height, scale);
    }

    fn update_and_draw(&mut self, update_count: u32) -> anyhow::Result<()> {
        (**self).update_and_draw(update_count)
    }

    fn invalidate(&mut self) {
        (**self).invalidate();
    }
}
