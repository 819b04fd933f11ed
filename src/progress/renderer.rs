//! Single-line bar renderer
//!
//! Produces frames of the form `[============ 70.00% >          ]`. For a given
//! width every frame has the same length, and the percentage label keeps an
//! even length so its start column only moves when the digit count does.

use crate::error::{CopybarError, Result};
use crate::terminal::TerminalSizeProvider;

/// Default glyph for completed progress
pub const DEFAULT_FILL_CHAR: char = '=';

/// Default glyph marking the progress frontier
pub const DEFAULT_LEAD_CHAR: char = '>';

/// Rendering options for a bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarOptions {
    /// Glyph repeated behind the lead character
    pub fill_char: char,
    /// Glyph at the current edge of progress
    pub lead_char: char,
    /// Bar width between the brackets; `None` asks the terminal
    pub width: Option<usize>,
}

impl Default for BarOptions {
    fn default() -> Self {
        Self {
            fill_char: DEFAULT_FILL_CHAR,
            lead_char: DEFAULT_LEAD_CHAR,
            width: None,
        }
    }
}

impl BarOptions {
    /// Use `fill` behind the lead character
    pub fn with_fill(mut self, fill: char) -> Self {
        self.fill_char = fill;
        self
    }

    /// Use `lead` at the progress frontier
    pub fn with_lead(mut self, lead: char) -> Self {
        self.lead_char = lead;
        self
    }

    /// Fix the bar width instead of querying the terminal
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }
}

/// Resolve the number of bar columns between the brackets.
pub fn resolve_width(options: &BarOptions, terminal: &dyn TerminalSizeProvider) -> Result<usize> {
    let width = match options.width {
        Some(width) => width,
        None => terminal
            .columns()?
            .saturating_sub(terminal.border_width()),
    };

    if width < 1 {
        return Err(CopybarError::InvalidWidth(width));
    }
    Ok(width)
}

/// Completion percentage of `position` against `target`.
///
/// Anything at or past the target reports exactly 100.
pub fn percentage(position: u64, target: u64) -> Result<f64> {
    if target == 0 {
        return Err(CopybarError::DivisionByZero);
    }
    if position >= target {
        return Ok(100.0);
    }
    Ok(position as f64 * 100.0 / target as f64)
}

/// Number of filled columns, clamped to `width`.
///
/// Equal to `floor(percentage / (100 / width))`, computed exactly.
pub fn bar_length(position: u64, target: u64, width: usize) -> Result<usize> {
    if target == 0 {
        return Err(CopybarError::DivisionByZero);
    }
    let filled = position as u128 * width as u128 / target as u128;
    Ok(filled.min(width as u128) as usize)
}

/// Percentage label, padded on the left to an even length.
pub fn format_label(percentage: f64) -> String {
    let label = format!(" {:.2}% ", percentage);
    if label.len() % 2 == 1 {
        format!(" {}", label)
    } else {
        label
    }
}

/// Column where a label of `label_len` starts when centered in `width`.
///
/// `None` when the label does not fit.
pub fn label_start(width: usize, label_len: usize) -> Option<usize> {
    if label_len > width {
        return None;
    }
    let center = (width + 1) / 2;
    Some(center.saturating_sub(label_len / 2).min(width - label_len))
}

/// Render one frame into `buf` at a known width.
///
/// `buf` is cleared first and left untouched on error.
pub fn render_frame(
    buf: &mut String,
    position: u64,
    target: u64,
    width: usize,
    options: &BarOptions,
) -> Result<()> {
    if width < 1 {
        return Err(CopybarError::InvalidWidth(width));
    }
    let percentage = percentage(position, target)?;
    let filled = bar_length(position, target, width)?;
    let label = format_label(percentage);
    let label_bytes = label.as_bytes();
    let label_range = label_start(width, label_bytes.len())
        .map(|start| start..start + label_bytes.len());

    buf.clear();
    buf.reserve(width + 2);
    buf.push('[');
    for column in 0..width {
        let glyph = match &label_range {
            Some(range) if range.contains(&column) => label_bytes[column - range.start] as char,
            _ if column + 1 < filled => options.fill_char,
            _ if column + 1 == filled => options.lead_char,
            _ => ' ',
        };
        buf.push(glyph);
    }
    buf.push(']');
    Ok(())
}

/// Render one frame, resolving the width from `options` or `terminal`.
pub fn render(
    position: u64,
    target: u64,
    options: &BarOptions,
    terminal: &dyn TerminalSizeProvider,
) -> Result<String> {
    // Validate the ratio before touching the terminal.
    percentage(position, target)?;
    let width = resolve_width(options, terminal)?;
    let mut frame = String::with_capacity(width + 2);
    render_frame(&mut frame, position, target, width, options)?;
    Ok(frame)
}
