use std::fmt;

/// Failure of [`Runner::run`](crate::run::Runner::run).
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Another run is active on the same runner. The active run is unaffected.
    #[error("a run is already active")]
    AlreadyRunning,

    /// The platform loop or the per-frame callback failed.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Failure of [`RenderDispatcher::sync`](crate::dispatch::RenderDispatcher::sync).
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The closure ran on the owning thread and returned an error.
    #[error(transparent)]
    Failed(anyhow::Error),

    /// The owning side was dropped before the closure could run.
    #[error("render host is gone")]
    Disconnected,

    /// Called on the owning thread while no render context is attached.
    #[error("no render context attached")]
    Detached,

    /// Called on the owning thread from inside another dispatched closure.
    #[error("render context is already borrowed by the current thread")]
    Reentrant,
}

/// Sentinel the platform loop returns when the user closed the window.
///
/// [`Runner::run`](crate::run::Runner::run) maps it to `Ok(())`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegularTermination;

impl fmt::Display for RegularTermination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("regular termination")
    }
}

impl std::error::Error for RegularTermination {}
