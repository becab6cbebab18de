use crate::error::DispatchError;
use crate::paint::Color;

use super::channel::RenderDispatcher;

/// Operations a native rendering context exposes to render targets.
pub trait RenderContext: 'static {
    /// Drawable size in physical pixels.
    fn size(&self) -> (u32, u32);

    fn fill(&mut self, color: Color) -> anyhow::Result<()>;

    fn clear(&mut self) -> anyhow::Result<()> {
        self.fill(Color::transparent())
    }
}

/// Public handle for drawing into a context owned by another thread.
///
/// Every operation is transferred to the owning thread and blocks until it
/// has run there; errors from the context come back as
/// [`DispatchError::Failed`].
pub struct RenderTarget<C: RenderContext> {
    dispatcher: RenderDispatcher<C>,
}

impl<C: RenderContext> Clone for RenderTarget<C> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<C: RenderContext> RenderTarget<C> {
    pub fn new(dispatcher: RenderDispatcher<C>) -> Self {
        Self { dispatcher }
    }

    pub fn size(&self) -> Result<(u32, u32), DispatchError> {
        self.dispatcher.sync(|ctx| Ok(ctx.size()))
    }

    pub fn clear(&self) -> Result<(), DispatchError> {
        self.dispatcher.sync(|ctx| ctx.clear())
    }

    pub fn fill(&self, color: Color) -> Result<(), DispatchError> {
        self.dispatcher.sync(move |ctx| ctx.fill(color))
    }

    /// Runs arbitrary drawing code against the context.
    pub fn draw<R, F>(&self, f: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&mut C) -> anyhow::Result<R> + Send + 'static,
        R: Send + 'static,
    {
        self.dispatcher.sync(f)
    }

    pub fn dispatcher(&self) -> &RenderDispatcher<C> {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::render_channel;
    use std::thread;

    struct Surface {
        size: (u32, u32),
        fills: Vec<Color>,
        broken: bool,
    }

    impl RenderContext for Surface {
        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn fill(&mut self, color: Color) -> anyhow::Result<()> {
            anyhow::ensure!(!self.broken, "surface lost");
            self.fills.push(color);
            Ok(())
        }
    }

    fn surface() -> Surface {
        Surface { size: (640, 480), fills: Vec::new(), broken: false }
    }

    #[test]
    fn clear_fills_transparent() {
        let (host, disp) = render_channel();
        host.attach(surface());
        let target = RenderTarget::new(disp);

        target.clear().unwrap();
        target.fill(Color::BLACK).unwrap();

        let ctx = host.context().unwrap();
        assert_eq!(ctx.fills, vec![Color::transparent(), Color::BLACK]);
    }

    #[test]
    fn calls_from_other_thread_run_on_owner() {
        let (host, disp) = render_channel();
        host.attach(surface());
        let target = RenderTarget::new(disp);

        let remote = target.clone();
        let worker = thread::spawn(move || {
            remote.fill(Color::BLACK)?;
            remote.size()
        });

        while !worker.is_finished() {
            host.pump();
            thread::yield_now();
        }
        assert_eq!(worker.join().unwrap().unwrap(), (640, 480));
        assert_eq!(host.context().unwrap().fills.len(), 1);
    }

    #[test]
    fn context_errors_surface_to_caller() {
        let (host, disp) = render_channel();
        host.attach(Surface { broken: true, ..surface() });
        let target = RenderTarget::new(disp);

        let err = target.fill(Color::BLACK).unwrap_err();
        assert!(matches!(err, DispatchError::Failed(ref e) if e.to_string() == "surface lost"));
    }
}
