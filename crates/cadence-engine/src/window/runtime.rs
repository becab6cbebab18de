use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{FrameHandler, RenderLoop};
use crate::device::{Canvas, CanvasInit};
use crate::dispatch::{render_channel, RenderHost, RenderTarget};
use crate::error::RegularTermination;
use crate::time::{ClockSource, ExternalClock};

/// Window/runtime configuration.
///
/// `vsync_clock` is ticked once per presented frame. Share the same clock
/// with the runner (`Runner::with_clock`) so update counts follow the
/// display. It is only driven when the monitor refresh matches the clock's
/// rate and the present mode waits for vertical sync.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub canvas: CanvasInit,
    pub vsync_clock: Option<ExternalClock>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "cadence".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            canvas: CanvasInit::default(),
            vsync_clock: None,
        }
    }
}

/// Wake-up sent through the event loop proxy.
#[derive(Debug, Clone, Copy)]
enum UserEvent {
    Dispatch,
}

/// winit-backed platform loop.
///
/// Must be created and run on the thread that owns the event loop (the main
/// thread on most platforms); that thread becomes the owner of the [`Canvas`].
/// Redraws are requested continuously and paced by the surface's present mode.
pub struct Runtime {
    config: RuntimeConfig,
    event_loop: EventLoop<UserEvent>,
    host: RenderHost<Canvas>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        let event_loop = EventLoop::<UserEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;

        let (host, dispatcher) = render_channel::<Canvas>();

        // Submissions from other threads wake the loop so they are serviced
        // without waiting for the next redraw.
        let proxy = Mutex::new(event_loop.create_proxy());
        dispatcher.set_waker(move || {
            let _ = proxy.lock().send_event(UserEvent::Dispatch);
        });

        Ok(Self {
            config,
            event_loop,
            host,
        })
    }

    /// Handle for drawing into the window's canvas from any thread.
    ///
    /// Calls block until the loop is running and the window exists.
    pub fn render_target(&self) -> RenderTarget<Canvas> {
        RenderTarget::new(self.host.dispatcher())
    }
}

impl RenderLoop for Runtime {
    fn run(self, handler: &mut dyn FrameHandler) -> Result<()> {
        let Runtime {
            config,
            event_loop,
            host,
        } = self;

        let mut state = LoopState {
            config,
            host,
            handler,
            window: None,
            vsync: None,
            failure: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        state.host.detach();
        match state.failure {
            Some(err) => Err(err),
            None => Err(RegularTermination.into()),
        }
    }
}

struct LoopState<'a> {
    config: RuntimeConfig,
    host: RenderHost<Canvas>,
    handler: &'a mut dyn FrameHandler,
    window: Option<Arc<Window>>,
    vsync: Option<ExternalClock>,
    failure: Option<anyhow::Error>,
}

impl LoopState<'_> {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("platform loop stopping: {err:#}");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let canvas = pollster::block_on(Canvas::new(window.clone(), self.config.canvas.clone()))
            .context("GPU initialization failed for window")?;
        self.host.attach(canvas);
        self.vsync = self.vsync_for(&window);

        Ok(window)
    }

    /// The configured clock, if presenting on this window keeps its pace.
    fn vsync_for(&self, window: &Window) -> Option<ExternalClock> {
        let clock = self.config.vsync_clock.clone()?;

        if !matches!(
            self.config.canvas.present_mode,
            wgpu::PresentMode::Fifo | wgpu::PresentMode::FifoRelaxed
        ) {
            log::warn!("vsync clock ignored: present mode does not wait for vblank");
            return None;
        }

        let refresh_mhz = window
            .current_monitor()
            .and_then(|m| m.refresh_rate_millihertz());
        match refresh_mhz {
            Some(mhz) if (mhz + 500) / 1000 != clock.target_rate() => {
                log::warn!(
                    "vsync clock ignored: display refreshes at {:.2}Hz, clock expects {}Hz",
                    f64::from(mhz) / 1000.0,
                    clock.target_rate()
                );
                None
            }
            Some(_) => Some(clock),
            None => {
                log::debug!("display refresh rate unknown; trusting vsync clock");
                Some(clock)
            }
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>, scale: f64) {
        if let Some(mut canvas) = self.host.context() {
            canvas.resize(size);
        }
        self.handler.resize(size.width, size.height, scale);
    }

    fn redraw(&mut self) -> Result<()> {
        // Queued requests first, so they apply to this frame.
        self.host.pump();
        self.handler.update()?;

        let presented = match self.host.context() {
            Some(mut canvas) => canvas.present()?,
            None => false,
        };
        if presented {
            if let Some(clock) = &self.vsync {
                clock.tick();
            }
        }
        Ok(())
    }
}

impl ApplicationHandler<UserEvent> for LoopState<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window(event_loop) {
            Ok(window) => {
                let size = window.inner_size();
                log::info!("window created: {}x{}", size.width, size.height);
                self.resize(size, window.scale_factor());
                window.request_redraw();
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::Dispatch => {
                self.host.pump();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.host.pump();
        event_loop.set_control_flow(ControlFlow::Wait);

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };
        if window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                log::debug!("resized to {}x{}", size.width, size.height);
                self.resize(size, window.scale_factor());
                window.request_redraw();
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.resize(window.inner_size(), scale_factor);
                window.request_redraw();
            }

            WindowEvent::Occluded(false) => {
                self.handler.invalidate();
            }

            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }

            _ => {}
        }
    }
}
