//! Terminal geometry module
//!
//! Provides the terminal size lookup the bar renderer depends on,
//! abstracted behind a trait so rendering never performs platform detection.

mod size;

pub use size::*;
