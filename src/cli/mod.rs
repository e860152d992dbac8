//! CLI Module
//!
//! Command-line interface for rendering WAV files through the bitcrusher.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::dsp::DEFAULT_BLOCK_SIZE;
use crate::engine::ExportFormat;

/// Crush On You - bitcrusher and sample-rate reducer
#[derive(Parser, Debug)]
#[command(name = "crushon-cli")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a WAV file through the effect
    #[command(name = "render")]
    Render {
        /// Input WAV file
        input: PathBuf,

        /// Output WAV file
        output: PathBuf,

        /// Preset file applied before any --set
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// Parameter override, e.g. --set bitDepth=6 (repeatable)
        #[arg(short, long = "set", value_name = "ID=VALUE")]
        set: Vec<String>,

        /// Samples per processing block
        #[arg(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
        block_size: usize,

        /// Output sample format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::F32)]
        format: OutputFormat,
    },

    /// List parameters with their current values
    #[command(name = "params")]
    Params {
        /// Show values from this preset instead of the defaults
        #[arg(short, long)]
        preset: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write a preset file
    #[command(name = "preset")]
    Preset {
        /// Output preset file
        output: PathBuf,

        /// Parameter value, e.g. --set crushMethod=Bit-Shift (repeatable)
        #[arg(short, long = "set", value_name = "ID=VALUE")]
        set: Vec<String>,
    },

    /// Write a stereo sine tone for auditioning
    #[command(name = "tone")]
    Tone {
        /// Output WAV file
        output: PathBuf,

        /// Frequency in Hz
        #[arg(long, default_value_t = 440.0)]
        frequency: f32,

        /// Duration in seconds
        #[arg(short, long, default_value_t = 2.0)]
        duration: f32,

        /// Sample rate in Hz
        #[arg(short = 'r', long, default_value_t = 48000)]
        sample_rate: u32,
    },
}

/// WAV sample format for rendered output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// 32-bit float
    #[value(name = "f32")]
    F32,
    /// 24-bit integer
    #[value(name = "24")]
    Pcm24,
    /// 16-bit integer
    #[value(name = "16")]
    Pcm16,
}

impl OutputFormat {
    pub fn export_format(self, sample_rate: u32) -> ExportFormat {
        match self {
            OutputFormat::F32 => ExportFormat::float32(sample_rate),
            OutputFormat::Pcm24 => ExportFormat::pcm24(sample_rate),
            OutputFormat::Pcm16 => ExportFormat::pcm16(sample_rate),
        }
    }
}
