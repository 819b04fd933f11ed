//! Terminal size providers
//!
//! `ConsoleTerminal` asks the real terminal through `console`, while
//! `FixedTerminal` reports a constant geometry for tests and for callers
//! that already know how wide the output should be.

use crate::error::{CopybarError, Result};
use console::Term;
use tracing::debug;

/// Columns reserved for the enclosing brackets on Windows consoles
pub const WINDOWS_BORDER_WIDTH: usize = 3;

/// Columns reserved for the enclosing brackets everywhere else
pub const UNIX_BORDER_WIDTH: usize = 2;

/// Border width for the platform this binary was built for.
///
/// Windows consoles wrap when the last column is written, so one extra
/// column is kept free there.
pub fn default_border_width() -> usize {
    if cfg!(windows) {
        WINDOWS_BORDER_WIDTH
    } else {
        UNIX_BORDER_WIDTH
    }
}

/// Terminal dimensions in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    /// Number of visible rows
    pub rows: u16,
    /// Number of visible columns
    pub columns: u16,
}

/// Source of terminal dimensions for the bar renderer
pub trait TerminalSizeProvider {
    /// Current terminal size, or `Unavailable` if it cannot be determined
    fn size(&self) -> Result<TerminalSize>;

    /// Current column count
    fn columns(&self) -> Result<usize> {
        self.size().map(|size| size.columns as usize)
    }

    /// Columns to reserve around the bar for its brackets
    fn border_width(&self) -> usize {
        default_border_width()
    }
}

impl<T: TerminalSizeProvider + ?Sized> TerminalSizeProvider for &T {
    fn size(&self) -> Result<TerminalSize> {
        (**self).size()
    }

    fn columns(&self) -> Result<usize> {
        (**self).columns()
    }

    fn border_width(&self) -> usize {
        (**self).border_width()
    }
}

/// Terminal size provider backed by the process's standard output
#[derive(Debug, Clone)]
pub struct ConsoleTerminal {
    term: Term,
    fallback_columns: Option<u16>,
    border_width: usize,
}

impl ConsoleTerminal {
    /// Query the terminal attached to stdout, with no fallback
    pub fn stdout() -> Self {
        Self {
            term: Term::stdout(),
            fallback_columns: None,
            border_width: default_border_width(),
        }
    }

    /// Use `columns` whenever the real size cannot be determined
    pub fn with_fallback(mut self, columns: u16) -> Self {
        self.fallback_columns = Some(columns);
        self
    }

    /// Override the platform border width
    pub fn with_border_width(mut self, border_width: usize) -> Self {
        self.border_width = border_width;
        self
    }
}

impl Default for ConsoleTerminal {
    fn default() -> Self {
        Self::stdout()
    }
}

impl TerminalSizeProvider for ConsoleTerminal {
    fn size(&self) -> Result<TerminalSize> {
        match self.term.size_checked() {
            Some((rows, columns)) => Ok(TerminalSize { rows, columns }),
            None => match self.fallback_columns {
                Some(columns) => {
                    debug!(columns, "terminal size unavailable, using fallback width");
                    Ok(TerminalSize { rows: 0, columns })
                }
                None => Err(CopybarError::Unavailable(
                    "stdout is not attached to a terminal".to_string(),
                )),
            },
        }
    }

    fn border_width(&self) -> usize {
        self.border_width
    }
}

/// Terminal size provider with a constant geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTerminal {
    size: TerminalSize,
    border_width: usize,
}

impl FixedTerminal {
    /// A terminal that is always `columns` wide
    pub fn new(columns: u16) -> Self {
        Self {
            size: TerminalSize { rows: 24, columns },
            border_width: default_border_width(),
        }
    }

    /// Override the platform border width
    pub fn with_border_width(mut self, border_width: usize) -> Self {
        self.border_width = border_width;
        self
    }
}

impl TerminalSizeProvider for FixedTerminal {
    fn size(&self) -> Result<TerminalSize> {
        Ok(self.size)
    }

    fn border_width(&self) -> usize {
        self.border_width
    }
}
