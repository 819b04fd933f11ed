//! copybar CLI - terminal progress bars and copies that show them

use clap::Parser;
use copybar::config::{BarConfig, CliArgs, Commands};
use copybar::demo::{run_demo, DEMO_FRAME_DELAY};
use copybar::error::{CopybarError, Result, EXIT_BAD_ARGUMENTS};
use copybar::fs::Copier;
use copybar::progress::{NoProgress, ProgressEmitter, ProgressSink};
use copybar::terminal::ConsoleTerminal;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    // Parse CLI arguments
    let args = CliArgs::parse();

    init_logging(args.verbose);

    // Handle result
    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Log to stderr so log lines never land on the bar's line.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: CliArgs) -> Result<()> {
    let config = BarConfig::from_cli(&args).map_err(CopybarError::config)?;
    let terminal = ConsoleTerminal::stdout().with_fallback(config.fallback_width);
    debug!(?config, "configuration");

    // Handle subcommands
    if let Some(command) = &args.command {
        return handle_command(command, &config, terminal);
    }

    if args.demo {
        if args.position.is_some() {
            return Err(CopybarError::invalid_argument(
                "--demo does not take a position or target",
            ));
        }
        let mut stdout = std::io::stdout();
        return run_demo(&mut stdout, &terminal, config.options, DEMO_FRAME_DELAY);
    }

    match (args.position, args.target) {
        (Some(percentage), None) => cmd_render(percentage, 100, &config, terminal),
        (Some(position), Some(target)) => cmd_render(position, target, &config, terminal),
        _ => {
            eprintln!("Usage: copybar <PERCENTAGE>");
            eprintln!("       copybar <POSITION> <TARGET>");
            eprintln!("       copybar --demo");
            eprintln!("       copybar copy <SOURCE> <DESTINATION>");
            eprintln!("       copybar --help for more information");
            std::process::exit(EXIT_BAD_ARGUMENTS);
        }
    }
}

fn handle_command(command: &Commands, config: &BarConfig, terminal: ConsoleTerminal) -> Result<()> {
    match command {
        Commands::Copy {
            source,
            destination,
            quiet,
            ..
        } => cmd_copy(source, destination, *quiet, config, terminal),
    }
}

fn cmd_render(position: u64, target: u64, config: &BarConfig, terminal: ConsoleTerminal) -> Result<()> {
    let mut emitter = ProgressEmitter::stdout(terminal, config.options);
    emitter.emit(position, target)?;
    emitter.finish()
}

fn cmd_copy(
    source: &Path,
    destination: &Path,
    quiet: bool,
    config: &BarConfig,
    terminal: ConsoleTerminal,
) -> Result<()> {
    let copier = Copier::new(config.chunk_size);

    let mut emitter;
    let mut silent = NoProgress;
    let sink: &mut dyn ProgressSink = if quiet {
        &mut silent
    } else {
        emitter = ProgressEmitter::stdout(terminal, config.options);
        &mut emitter
    };

    let task = copier.copy_path(source, destination, sink)?;

    if !quiet {
        task.print_summary();
    }

    Ok(())
}
