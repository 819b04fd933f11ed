//! File system operations module
//!
//! Walks directory trees and copies files and folders while
//! reporting byte-level progress.

mod copier;
mod walker;

pub use copier::*;
pub use walker::*;
