//! Progress emitter
//!
//! Writes rendered frames to a terminal line, returning the cursor to the
//! start of the line after every frame so the next one overwrites it.

use super::renderer::{render_frame, resolve_width, BarOptions};
use crate::error::Result;
use crate::terminal::TerminalSizeProvider;
use std::io::Write;
use tracing::{debug, trace};

/// Receiver of copy progress
pub trait ProgressSink {
    /// Report `position` out of `target`
    fn update(&mut self, position: u64, target: u64) -> Result<()>;

    /// Report completion of a job that had nothing to measure
    fn complete(&mut self) -> Result<()>;

    /// Close the current line if a frame is still open
    fn finish(&mut self) -> Result<()>;

    /// Close the current line after a failure
    fn abandon(&mut self);
}

/// Sink that discards all progress (for quiet mode)
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&mut self, _position: u64, _target: u64) -> Result<()> {
        Ok(())
    }

    fn complete(&mut self) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    fn abandon(&mut self) {}
}

/// Draws progress frames on a single output line
pub struct ProgressEmitter<W: Write, T: TerminalSizeProvider> {
    out: W,
    terminal: T,
    options: BarOptions,
    /// Width resolved on the first frame, reused for the session
    width: Option<usize>,
    /// Reused frame buffer
    frame: String,
    /// A frame was written without a trailing newline
    line_open: bool,
}

impl<T: TerminalSizeProvider> ProgressEmitter<std::io::Stdout, T> {
    /// Emitter writing to standard output
    pub fn stdout(terminal: T, options: BarOptions) -> Self {
        Self::new(std::io::stdout(), terminal, options)
    }
}

impl<W: Write, T: TerminalSizeProvider> ProgressEmitter<W, T> {
    /// Create an emitter writing to `out`
    pub fn new(out: W, terminal: T, options: BarOptions) -> Self {
        Self {
            out,
            terminal,
            options,
            width: None,
            frame: String::new(),
            line_open: false,
        }
    }

    /// Bar options in use
    pub fn options(&self) -> &BarOptions {
        &self.options
    }

    /// Consume the emitter and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn width(&mut self) -> Result<usize> {
        if let Some(width) = self.width {
            return Ok(width);
        }
        let width = resolve_width(&self.options, &self.terminal)?;
        debug!(width, "resolved bar width");
        self.width = Some(width);
        Ok(width)
    }

    /// Draw one frame for `position` out of `target`.
    ///
    /// The frame ends the line when `position == target`.
    pub fn emit(&mut self, position: u64, target: u64) -> Result<()> {
        let width = self.width()?;
        render_frame(&mut self.frame, position, target, width, &self.options)?;
        trace!(position, target, "frame");
        self.write_frame(position == target)
    }

    /// Draw a 100% frame and end the line
    pub fn emit_complete(&mut self) -> Result<()> {
        let width = self.width()?;
        render_frame(&mut self.frame, 1, 1, width, &self.options)?;
        self.write_frame(true)
    }

    fn write_frame(&mut self, done: bool) -> Result<()> {
        self.out.write_all(self.frame.as_bytes())?;
        if done {
            self.out.write_all(b"\n")?;
        } else {
            self.out.write_all(b"\r")?;
        }
        self.out.flush()?;
        self.line_open = !done;
        Ok(())
    }

    /// End the line if the last frame left it open
    pub fn finish(&mut self) -> Result<()> {
        if self.line_open {
            self.out.write_all(b"\n")?;
            self.out.flush()?;
            self.line_open = false;
        }
        Ok(())
    }
}

impl<W: Write, T: TerminalSizeProvider> ProgressSink for ProgressEmitter<W, T> {
    fn update(&mut self, position: u64, target: u64) -> Result<()> {
        self.emit(position, target)
    }

    fn complete(&mut self) -> Result<()> {
        self.emit_complete()
    }

    fn finish(&mut self) -> Result<()> {
        ProgressEmitter::finish(self)
    }

    fn abandon(&mut self) {
        if let Err(e) = ProgressEmitter::finish(self) {
            debug!(error = %e, "failed to close progress line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CopybarError;
    use crate::terminal::{FixedTerminal, TerminalSize};
    use std::cell::Cell;

    fn emitter(width: usize) -> ProgressEmitter<Vec<u8>, FixedTerminal> {
        ProgressEmitter::new(
            Vec::new(),
            FixedTerminal::new(80),
            BarOptions::default().with_width(width),
        )
    }

    fn output(emitter: ProgressEmitter<Vec<u8>, FixedTerminal>) -> String {
        String::from_utf8(emitter.into_inner()).unwrap()
    }

    struct CountingTerminal {
        calls: Cell<usize>,
        columns: u16,
    }

    impl TerminalSizeProvider for CountingTerminal {
        fn size(&self) -> Result<TerminalSize> {
            self.calls.set(self.calls.get() + 1);
            Ok(TerminalSize {
                rows: 24,
                columns: self.columns,
            })
        }

        fn border_width(&self) -> usize {
            2
        }
    }

    #[test]
    fn test_frames_overwrite_until_complete() {
        let mut emitter = emitter(20);
        for i in 1..=4 {
            emitter.emit(i, 4).unwrap();
        }
        let out = output(emitter);

        assert_eq!(out.matches('\r').count(), 3);
        assert_eq!(out.matches('\n').count(), 1);
        assert!(out.ends_with("]\n"));
        for frame in out.split(['\r', '\n']).filter(|f| !f.is_empty()) {
            assert_eq!(frame.chars().count(), 22);
        }
    }

    #[test]
    fn test_finish_closes_open_line() {
        let mut emitter = emitter(20);
        emitter.emit(1, 4).unwrap();
        emitter.finish().unwrap();
        emitter.finish().unwrap();
        let out = output(emitter);
        assert!(out.ends_with("]\r\n"));
        assert_eq!(out.matches('\n').count(), 1);
    }

    #[test]
    fn test_finish_after_complete_is_noop() {
        let mut emitter = emitter(20);
        emitter.emit(4, 4).unwrap();
        emitter.finish().unwrap();
        assert_eq!(output(emitter).matches('\n').count(), 1);
    }

    #[test]
    fn test_emit_complete() {
        let mut emitter = emitter(30);
        emitter.emit_complete().unwrap();
        let out = output(emitter);
        assert!(out.contains("100.00%"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_zero_target_writes_nothing() {
        let mut emitter = emitter(20);
        let err = emitter.emit(5, 0).unwrap_err();
        assert!(matches!(err, CopybarError::DivisionByZero));
        assert!(output(emitter).is_empty());
    }

    #[test]
    fn test_width_cached_per_session() {
        let terminal = CountingTerminal {
            calls: Cell::new(0),
            columns: 52,
        };
        let mut emitter = ProgressEmitter::new(Vec::new(), &terminal, BarOptions::default());
        for i in 0..=10 {
            emitter.emit(i, 10).unwrap();
        }
        assert_eq!(terminal.calls.get(), 1);

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        let first = out.split('\r').next().unwrap();
        assert_eq!(first.chars().count(), 52);
    }

    #[test]
    fn test_fixed_width_skips_terminal() {
        let terminal = CountingTerminal {
            calls: Cell::new(0),
            columns: 52,
        };
        let options = BarOptions::default().with_width(10);
        let mut emitter = ProgressEmitter::new(Vec::new(), &terminal, options);
        emitter.emit(3, 10).unwrap();
        assert_eq!(terminal.calls.get(), 0);
    }

    #[test]
    fn test_sink_abandon_closes_line() {
        let mut emitter = emitter(20);
        ProgressSink::update(&mut emitter, 1, 3).unwrap();
        ProgressSink::abandon(&mut emitter);
        assert!(output(emitter).ends_with('\n'));
    }
}
