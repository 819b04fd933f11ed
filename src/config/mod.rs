//! Configuration module for copybar
//!
//! Provides the CLI arguments and the runtime settings derived from them.

mod settings;

pub use settings::*;
