//! Configuration settings for copybar
//!
//! Defines the CLI arguments and the runtime settings derived from them.

use crate::fs::DEFAULT_CHUNK_SIZE;
use crate::progress::{BarOptions, DEFAULT_FILL_CHAR, DEFAULT_LEAD_CHAR};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Default width used when the terminal size cannot be determined
pub const DEFAULT_FALLBACK_WIDTH: u16 = 80;

/// copybar - terminal progress bars and copies that show them
#[derive(Parser, Debug, Clone)]
#[command(name = "copybar")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render a terminal-width progress bar, or copy files while showing one")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = r#"
Renders a single-line progress bar that spans the terminal, with the
completion percentage centered inside it.

Examples:
  copybar 42                      # 42%
  copybar 1337 4096               # 1337 out of 4096
  copybar --demo                  # scripted demonstration
  copybar copy ./photos /backup   # copy a folder with progress
"#)]
pub struct CliArgs {
    /// Percentage, or position when TARGET is given
    #[arg(value_name = "POSITION")]
    pub position: Option<u64>,

    /// Target the position is measured against
    #[arg(value_name = "TARGET")]
    pub target: Option<u64>,

    /// Run a scripted demonstration
    #[arg(long)]
    pub demo: bool,

    /// Character for completed progress
    #[arg(long, global = true, default_value_t = DEFAULT_FILL_CHAR, value_name = "CHAR")]
    pub fill: char,

    /// Character marking the progress frontier
    #[arg(long, global = true, default_value_t = DEFAULT_LEAD_CHAR, value_name = "CHAR")]
    pub lead: char,

    /// Bar width between the brackets (default: terminal width)
    #[arg(short = 'w', long, global = true, value_name = "COLUMNS")]
    pub width: Option<usize>,

    /// Terminal width to assume when it cannot be detected
    #[arg(long, global = true, default_value_t = DEFAULT_FALLBACK_WIDTH, value_name = "COLUMNS")]
    pub fallback_width: u16,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Copy a file or folder, showing byte-level progress
    Copy {
        /// File or folder to copy
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Where to copy it
        #[arg(value_name = "DESTINATION")]
        destination: PathBuf,

        /// Bytes per read/write (e.g., 16K, 1M)
        #[arg(short = 'c', long, default_value = "16K", value_name = "SIZE")]
        chunk_size: String,

        /// Hide the progress bar and summary
        #[arg(short = 'q', long)]
        quiet: bool,
    },
}

/// Bar settings shared by every mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarConfig {
    /// Rendering options
    pub options: BarOptions,
    /// Columns assumed when the terminal cannot be queried
    pub fallback_width: u16,
    /// Chunk size for copies
    pub chunk_size: usize,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            options: BarOptions::default(),
            fallback_width: DEFAULT_FALLBACK_WIDTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl BarConfig {
    /// Create config from CLI arguments
    pub fn from_cli(args: &CliArgs) -> Result<Self, String> {
        let mut options = BarOptions::default()
            .with_fill(args.fill)
            .with_lead(args.lead);

        if let Some(width) = args.width {
            if width == 0 {
                return Err("Bar width must be at least 1".to_string());
            }
            options = options.with_width(width);
        }

        if args.fallback_width == 0 {
            return Err("Fallback width must be at least 1".to_string());
        }

        let chunk_size = match &args.command {
            Some(Commands::Copy { chunk_size, .. }) => {
                let size = parse_size(chunk_size).map_err(|e| format!("Invalid chunk size: {}", e))?;
                if size == 0 {
                    return Err("Chunk size must be at least 1 byte".to_string());
                }
                usize::try_from(size).map_err(|_| format!("Chunk size too large: {}", chunk_size))?
            }
            None => DEFAULT_CHUNK_SIZE,
        };

        Ok(Self {
            options,
            fallback_width: args.fallback_width,
            chunk_size,
        })
    }
}

/// Parse human-readable size string to bytes
pub fn parse_size(size: &str) -> Result<u64, String> {
    let size = size.trim().to_uppercase();

    if size.is_empty() {
        return Err("Empty size string".to_string());
    }

    let (num_str, multiplier) = if size.ends_with("GB") || size.ends_with('G') {
        (size.trim_end_matches(['G', 'B']), 1024u64 * 1024 * 1024)
    } else if size.ends_with("MB") || size.ends_with('M') {
        (size.trim_end_matches(['M', 'B']), 1024u64 * 1024)
    } else if size.ends_with("KB") || size.ends_with('K') {
        (size.trim_end_matches(['K', 'B']), 1024u64)
    } else if size.ends_with('B') {
        (size.trim_end_matches('B'), 1u64)
    } else {
        // Assume bytes if no suffix
        (size.as_str(), 1u64)
    };

    let num: f64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: {}", num_str))?;

    if !num.is_finite() || num < 0.0 {
        return Err(format!("Invalid number: {}", num_str));
    }

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CopybarError, EXIT_BAD_ARGUMENTS};

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("copybar").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("16K").unwrap(), 16 * 1024);
        assert_eq!(parse_size("16kb").unwrap(), 16 * 1024);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("1G").unwrap(), 1024 * 1024 * 1024);
        assert_eq!(parse_size("512B").unwrap(), 512);
        assert!(parse_size("").is_err());
        assert!(parse_size("lots").is_err());
        assert!(parse_size("-4K").is_err());
    }

    #[test]
    fn test_percentage_args() {
        let args = parse(&["42"]);
        assert_eq!(args.position, Some(42));
        assert_eq!(args.target, None);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_ratio_args_with_options() {
        let args = parse(&["3", "7", "--fill", "#", "--lead", "@", "-w", "40"]);
        assert_eq!((args.position, args.target), (Some(3), Some(7)));

        let config = BarConfig::from_cli(&args).unwrap();
        assert_eq!(config.options.fill_char, '#');
        assert_eq!(config.options.lead_char, '@');
        assert_eq!(config.options.width, Some(40));
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_copy_subcommand() {
        let args = parse(&["copy", "src", "dst", "--chunk-size", "64K", "--width", "50"]);
        let config = BarConfig::from_cli(&args).unwrap();
        assert_eq!(config.chunk_size, 64 * 1024);
        assert_eq!(config.options.width, Some(50));
        match args.command {
            Some(Commands::Copy {
                source,
                destination,
                quiet,
                ..
            }) => {
                assert_eq!(source, PathBuf::from("src"));
                assert_eq!(destination, PathBuf::from("dst"));
                assert!(!quiet);
            }
            None => panic!("expected copy subcommand"),
        }
    }

    #[test]
    fn test_rejected_args() {
        let bad = |args: &[&str]| {
            CliArgs::try_parse_from(std::iter::once("copybar").chain(args.iter().copied())).is_err()
        };
        assert!(bad(&["-5"]));
        assert!(bad(&["1", "2", "3"]));
        assert!(bad(&["ten"]));
        assert!(bad(&["--fill", "ab"]));

        assert!(BarConfig::from_cli(&parse(&["1", "--width", "0"])).is_err());
        assert!(BarConfig::from_cli(&parse(&["copy", "a", "b", "-c", "0"])).is_err());
    }

    #[test]
    fn test_invalid_config_exits_as_bad_arguments() {
        let err = BarConfig::from_cli(&parse(&["copy", "a", "b", "-c", "lots"]))
            .map_err(CopybarError::config)
            .unwrap_err();
        assert!(matches!(err, CopybarError::Config(ref msg) if msg.starts_with("Invalid chunk size")));
        assert_eq!(err.exit_code(), EXIT_BAD_ARGUMENTS);
    }

    #[test]
    fn test_defaults() {
        let config = BarConfig::from_cli(&parse(&["--demo"])).unwrap();
        assert_eq!(config, BarConfig::default());
    }
}
