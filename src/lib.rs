//! # copybar - terminal progress bars for long copies
//!
//! copybar renders a single-line progress bar spanning the terminal, with
//! the completion percentage centered inside it, and uses it to show
//! byte-level progress while copying files and folders.
//!
//! ## Rendering a frame
//!
//! ```
//! use copybar::progress::{render, BarOptions};
//! use copybar::terminal::FixedTerminal;
//!
//! let options = BarOptions::default().with_width(30);
//! let frame = render(15, 20, &options, &FixedTerminal::new(80)).unwrap();
//!
//! assert_eq!(frame.len(), 32);
//! assert!(frame.contains(" 75.00% "));
//! ```
//!
//! ## Copying with progress
//!
//! ```no_run
//! use copybar::fs::Copier;
//! use copybar::progress::{BarOptions, ProgressEmitter};
//! use copybar::terminal::ConsoleTerminal;
//! use std::path::Path;
//!
//! let terminal = ConsoleTerminal::stdout().with_fallback(80);
//! let mut emitter = ProgressEmitter::stdout(terminal, BarOptions::default());
//!
//! let task = Copier::default()
//!     .copy_path(Path::new("/source"), Path::new("/destination"), &mut emitter)
//!     .unwrap();
//! task.print_summary();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod demo;
pub mod error;
pub mod fs;
pub mod progress;
pub mod terminal;

// Re-export commonly used types
pub use error::{CopybarError, Result};
pub use fs::{CopyTask, Copier};
pub use progress::{render, BarOptions, ProgressEmitter, ProgressSink};
pub use terminal::{ConsoleTerminal, TerminalSizeProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
