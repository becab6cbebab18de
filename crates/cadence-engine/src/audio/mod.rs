//! Audio-side helpers that resynchronize once per rendered frame.

mod loop_stream;

pub use loop_stream::{LoopStream, LoopStreamError};
