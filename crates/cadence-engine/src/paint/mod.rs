//! Paint primitives shared by render targets.

mod color;

pub use color::Color;
