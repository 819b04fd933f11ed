//! Progress reporting module
//!
//! Renders fixed-width, single-line progress bars and drives them
//! over a terminal line while work advances.

mod emitter;
mod renderer;

pub use emitter::*;
pub use renderer::*;
