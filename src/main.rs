//! Crush On You CLI
//!
//! Offline host for the bitcrusher: render WAV files, inspect parameters,
//! write presets.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use crushon::cli::commands;
use crushon::cli::{Cli, Commands};
use crushon::CrushError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Crush On You v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Crush On You v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Render {
            input,
            output,
            preset,
            set,
            block_size,
            format,
        } => commands::render(&input, &output, preset.as_deref(), &set, block_size, format)
            .with_context(|| format!("rendering {}", input.display())),
        Commands::Params { preset, json } => commands::list_params(preset.as_deref(), json)
            .context("listing parameters"),
        Commands::Preset { output, set } => commands::write_preset(&output, &set)
            .with_context(|| format!("writing preset {}", output.display())),
        Commands::Tone {
            output,
            frequency,
            duration,
            sample_rate,
        } => commands::write_tone(&output, frequency, duration, sample_rate)
            .with_context(|| format!("writing tone {}", output.display())),
    }
}

fn report(err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);
    if let Some(crush) = err.downcast_ref::<CrushError>() {
        eprintln!("  code: {}", crush.error_code());
        eprintln!("  hint: {}", crush.recovery_hint());
    }
}
