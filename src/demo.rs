//! Scripted demonstration of the bar styles

use crate::error::Result;
use crate::progress::{BarOptions, ProgressEmitter};
use crate::terminal::TerminalSizeProvider;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// Pause between demo frames
pub const DEMO_FRAME_DELAY: Duration = Duration::from_millis(4);

/// One bar run in the demo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoStep {
    /// Line printed above the bar
    pub title: &'static str,
    /// Options for this run
    pub options: BarOptions,
    /// Number of frames (and the target they count towards)
    pub target: u64,
}

/// Demo steps: the default bar, custom characters, then a fixed width.
pub fn demo_steps(base: &BarOptions) -> Vec<DemoStep> {
    vec![
        DemoStep {
            title: "Copying file...",
            options: *base,
            target: 499,
        },
        DemoStep {
            title: "Custom characters:",
            options: base.with_fill('#').with_lead('@'),
            target: 250,
        },
        DemoStep {
            title: "Fixed width (40 columns):",
            options: base.with_width(40),
            target: 120,
        },
    ]
}

/// Play every demo step on `out`
pub fn run_demo<W: Write, T: TerminalSizeProvider>(
    out: &mut W,
    terminal: &T,
    base: BarOptions,
    delay: Duration,
) -> Result<()> {
    for step in demo_steps(&base) {
        debug!(title = step.title, target = step.target, "demo step");
        writeln!(out, "{}", step.title)?;

        let mut emitter = ProgressEmitter::new(&mut *out, terminal, step.options);
        for position in 1..=step.target {
            emitter.emit(position, step.target)?;
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
        emitter.finish()?;
    }
    Ok(())
}
